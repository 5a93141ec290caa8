/// Catalog of ionization adducts (mass delta, multiplier on the neutral mass, charge) split into
/// positive- and negative-mode lists, with a process-wide read-only instance.
///
///  # Examples
/// ```
/// use MineSearch::Adducts::adduct_table::{AdductTable, Polarity};
/// let table = AdductTable::builtin();
/// let m_h = table.by_name("M+H").unwrap();
/// assert_eq!(m_h.charge, 1);
/// assert_eq!(m_h.polarity, Polarity::Positive);
/// assert!(!table.rules_for(Polarity::Negative).is_empty());
/// ```
pub mod adduct_table;
/// eng
/// The engine maps every peak of a dataset to candidate formulas for every selected adduct and
/// resolves those formulas to isomer sets. Isomer sets are cached per dataset, so a formula hit by
/// many peaks or many adducts is looked up in the database once.
///
///  # Examples
/// ```rust, ignore
/// use MineSearch::Adducts::adduct_search::{AdductSearchParams, Dataset, Peak};
/// let params = AdductSearchParams::new(0.005, false).adducts(vec!["M+H".to_string()]);
/// let dataset = Dataset::new("demo", params).with_peaks(vec![Peak::new("165.079", 165.079, 0)]);
/// let annotations = dataset.annotate_peaks(&store, adduct_table(), &CancelToken::new())?;
/// ```
pub mod adduct_search;

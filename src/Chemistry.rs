/// Module to parse molecular formulae into element compositions and to compute monoisotopic masses.
/// Compositions support addition and subtraction; a composition with a negative element count
/// is invalid and is rejected before any mass is computed or any database lookup is made.
///
///  # Examples
/// ```
/// use MineSearch::Chemistry::formula::parse_formula;
/// let composition = parse_formula("C9H11NO2").unwrap();
/// let mass = composition.monoisotopic_mass().unwrap();
/// assert!((mass - 165.0790).abs() < 1e-3);
/// assert_eq!(composition.to_string(), "C9H11NO2");
/// ```
pub mod formula;
/// Mass algebra of ionization: neutral mass of an observed m/z under an adduct rule, the forward
/// ionization transform and tolerance windows (absolute or ppm).
pub mod mass;

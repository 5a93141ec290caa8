//! # Search Services Module
//!
//! ## Purpose
//! Single entry point for the public operations. Resolves database names to stores, builds the
//! per-request objects (`Dataset`, `PathwayQuery`), runs the engines and shapes their output.
//! Every call returns either a (possibly empty) result collection or one `SearchError`.
//!
//! ## Operations
//! - `search_adducts_single_peak`: one m/z value -> `[AdductHit]`
//! - `search_adducts_batch`: peak list text -> `[PeakReport]`, one report per peak
//! - `find_pathway`: start/end compound ids -> `[Path]`
//! - `get_adducts`, `get_models`, `get_comps`, `get_rxns`: catalog lookups
//!
//! ## Batch formats
//! Only `"form"` is understood: one m/z value per line, blank lines skipped. Any other format name
//! is rejected before the store is touched.

use crate::Adducts::adduct_search::{AdductSearchParams, Dataset, Peak, PeakAnnotation};
use crate::Adducts::adduct_table::{AdductTable, Polarity, adduct_table, install_adduct_table};
use crate::Pathways::pathway_search::{Path, PathwayQuery, search_pathways};
use crate::Store::{Compound, CompoundStore, Reaction, StoreError};
use crate::Utils::load_from_file::{LoadError, load_adduct_table, load_store};
use crate::cancel::CancelToken;
use crate::error::SearchError;
use crate::settings::MineConfig;
use log::{info, warn};
use prettytable::{Table, row};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

pub const FORM_FORMAT: &str = "form";

/// One (adduct, formula) candidate with the ids of the compounds sharing the formula.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdductHit {
    pub adduct: String,
    pub formula: String,
    pub isomers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeakReport {
    pub peak_label: String,
    pub mz: f64,
    pub charge: i32,
    pub r_t: f64,
    pub adducts: Vec<AdductHit>,
    /// isomer ids over all adduct/formula entries
    pub total_hits: usize,
    /// at least one isomer is a native compound
    pub native_hit: bool,
}

impl From<&PeakAnnotation> for PeakReport {
    fn from(annotation: &PeakAnnotation) -> Self {
        PeakReport {
            peak_label: annotation.peak.name.clone(),
            mz: annotation.peak.mz,
            charge: annotation.peak.charge,
            r_t: annotation.peak.r_t,
            adducts: hits(annotation),
            total_hits: annotation.total_hits(),
            native_hit: annotation.native_hit(),
        }
    }
}

fn hits(annotation: &PeakAnnotation) -> Vec<AdductHit> {
    annotation
        .matches
        .iter()
        .map(|m| AdductHit {
            adduct: m.adduct.clone(),
            formula: m.formula.clone(),
            isomers: m.isomer_ids(),
        })
        .collect()
}

pub fn pretty_print_reports(reports: &[PeakReport]) {
    let mut table = Table::new();
    table.add_row(row!["Peak", "m/z", "z", "Adduct", "Formula", "Isomers"]);
    for report in reports {
        if report.adducts.is_empty() {
            table.add_row(row![report.peak_label, report.mz, report.charge, "-", "-", "-"]);
        }
        for hit in report.adducts.iter() {
            table.add_row(row![
                report.peak_label,
                report.mz,
                report.charge,
                hit.adduct,
                hit.formula,
                hit.isomers.join(", ")
            ]);
        }
    }
    table.printstd();
}

/// Parses a `"form"` peak list: one m/z per line, the trimmed line is the peak label.
pub fn parse_form_peaks(text: &str, charge: i32) -> Result<Vec<Peak>, SearchError> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            let mz: f64 = line
                .parse()
                .map_err(|_| SearchError::MalformedPeak(line.to_string()))?;
            if !mz.is_finite() {
                return Err(SearchError::MalformedPeak(line.to_string()));
            }
            Ok(Peak::new(line, mz, charge))
        })
        .collect()
}

pub struct MineServices {
    databases: HashMap<String, Arc<dyn CompoundStore>>,
    adducts: &'static AdductTable,
    config: MineConfig,
}

impl MineServices {
    /// Services over the process-wide adduct table and no database.
    pub fn new(config: MineConfig) -> Self {
        Self {
            databases: HashMap::new(),
            adducts: adduct_table(),
            config,
        }
    }

    /// Loads the configured adduct lists and database files.
    pub fn from_config(config: MineConfig) -> Result<Self, LoadError> {
        if config.positive_adducts.is_some() || config.negative_adducts.is_some() {
            let table = load_adduct_table(
                config.positive_adducts.as_deref(),
                config.negative_adducts.as_deref(),
            )?;
            if install_adduct_table(table).is_err() {
                warn!("adduct table was already in use, configured lists ignored");
            }
        }
        let mut services = Self::new(config);
        let files: Vec<(String, String)> = services
            .config
            .databases
            .iter()
            .map(|(name, file)| (name.clone(), file.clone()))
            .collect();
        for (name, file) in files {
            let store = load_store(&file)?;
            services.add_database(&name, Arc::new(store));
        }
        Ok(services)
    }

    pub fn add_database(&mut self, name: &str, store: Arc<dyn CompoundStore>) {
        info!("database {} registered", name);
        self.databases.insert(name.to_string(), store);
    }

    pub fn config(&self) -> &MineConfig {
        &self.config
    }

    pub fn database_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.databases.keys().cloned().collect();
        names.sort();
        names
    }

    fn database(&self, db: &str) -> Result<&Arc<dyn CompoundStore>, SearchError> {
        self.databases
            .get(db)
            .ok_or_else(|| StoreError::UnknownDatabase(db.to_string()).into())
    }

    /// Adduct names of the positive and the negative list, in table order.
    pub fn get_adducts(&self) -> (Vec<String>, Vec<String>) {
        (
            self.adducts.names(Polarity::Positive),
            self.adducts.names(Polarity::Negative),
        )
    }

    pub fn get_models(&self, db: &str) -> Result<Vec<(String, String)>, SearchError> {
        Ok(self.database(db)?.list_models()?)
    }

    /// One entry per id, `None` for ids the database does not know.
    pub fn get_comps(&self, db: &str, ids: &[String]) -> Result<Vec<Option<Compound>>, SearchError> {
        let store = self.database(db)?;
        ids.iter()
            .map(|id| match store.find_compound_by_id(id) {
                Ok(compound) => Ok(Some(compound)),
                Err(StoreError::NotFound(_)) => Ok(None),
                Err(e) => Err(e.into()),
            })
            .collect()
    }

    /// One entry per id, `None` for ids the database does not know.
    pub fn get_rxns(&self, db: &str, ids: &[String]) -> Result<Vec<Option<Reaction>>, SearchError> {
        let store = self.database(db)?;
        ids.iter()
            .map(|id| match store.find_reaction_by_id(id) {
                Ok(reaction) => Ok(Some(reaction)),
                Err(StoreError::NotFound(_)) => Ok(None),
                Err(e) => Err(e.into()),
            })
            .collect()
    }

    pub fn search_adducts_single_peak(
        &self,
        db: &str,
        mz: f64,
        params: &AdductSearchParams,
        cancel: &CancelToken,
    ) -> Result<Vec<AdductHit>, SearchError> {
        let store = self.database(db)?;
        let dataset = Dataset::new(&format!("{} single peak", db), params.clone())
            .with_peaks(vec![Peak::new(&mz.to_string(), mz, params.charge)]);
        let annotations = dataset.annotate_peaks(&**store, self.adducts, cancel)?;
        Ok(annotations.first().map(hits).unwrap_or_default())
    }

    /// Runs a batch. `params.max_concurrency == 0` takes the configured bound.
    pub fn search_adducts_batch(
        &self,
        db: &str,
        text: &str,
        text_type: &str,
        params: &AdductSearchParams,
        cancel: &CancelToken,
    ) -> Result<Vec<PeakReport>, SearchError> {
        if text_type != FORM_FORMAT {
            return Err(SearchError::UnsupportedFormat(text_type.to_string()));
        }
        let peaks = parse_form_peaks(text, params.charge)?;
        let store = self.database(db)?;
        let mut params = params.clone();
        if params.max_concurrency == 0 {
            params.max_concurrency = self.config.max_concurrency;
        }
        info!("{} batch on {}: {} peaks", text_type, db, peaks.len());
        let dataset = Dataset::new(&format!("{} batch", text_type), params).with_peaks(peaks);
        let annotations = dataset.annotate_peaks(&**store, self.adducts, cancel)?;
        Ok(annotations.iter().map(PeakReport::from).collect())
    }

    /// Pathway search with the configured pruning thresholds.
    pub fn find_pathway(
        &self,
        db: &str,
        start: &str,
        end: &str,
        max_length: usize,
        all_paths: bool,
        cancel: &CancelToken,
    ) -> Result<Vec<Path>, SearchError> {
        let query = PathwayQuery::new(start, end, max_length, all_paths)
            .np_min(self.config.np_min)
            .gibbs_cap(self.config.gibbs_cap);
        self.find_pathway_with(db, &query, cancel)
    }

    pub fn find_pathway_with(
        &self,
        db: &str,
        query: &PathwayQuery,
        cancel: &CancelToken,
    ) -> Result<Vec<Path>, SearchError> {
        let store = self.database(db)?;
        search_pathways(&**store, query, cancel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Store::memory_store::MemoryStore;
    use serde_json::json;

    fn services() -> MineServices {
        let document = json!({
            "compounds": [
                {"id": "Crha", "formula": "C6H12O5", "names": ["Rhamnose"], "generation": 0, "novelty_score": 0.5},
                {"id": "Cglc", "formula": "C6H12O6", "names": ["Glucose"], "generation": 0},
                {"id": "Cfru", "formula": "C6H12O6", "names": ["Fructose"], "generation": 1},
                {"id": "Cx", "formula": "C6H10O5", "novelty_score": -5.0}
            ],
            "reactions": [
                {"id": "R1", "reactants": ["Cglc"], "products": ["Cfru"], "gibbs_energy": 2.0},
                {"id": "R2", "reactants": ["Cfru"], "products": ["Crha"], "gibbs_energy": -4.0},
                {"id": "R3", "reactants": ["Cglc"], "products": ["Cx"]},
                {"id": "R4", "reactants": ["Cx"], "products": ["Crha"]}
            ],
            "models": [["eco", "Escherichia coli"]]
        });
        let store = MemoryStore::from_json_str(&document.to_string()).unwrap();
        let mut services = MineServices::new(MineConfig::default());
        services.add_database("demo", Arc::new(store));
        services
    }

    fn m_plus_h() -> AdductSearchParams {
        AdductSearchParams::new(0.005, false).adducts(vec!["M+H".to_string()])
    }

    #[test]
    fn test_single_peak() {
        let hits = services()
            .search_adducts_single_peak("demo", 165.0790, &m_plus_h(), &CancelToken::new())
            .unwrap();
        assert_eq!(
            hits,
            vec![AdductHit {
                adduct: "M+H".to_string(),
                formula: "C6H12O5".to_string(),
                isomers: vec!["Crha".to_string()],
            }]
        );
    }

    #[test]
    fn test_unknown_database() {
        let result =
            services().search_adducts_single_peak("nope", 165.0790, &m_plus_h(), &CancelToken::new());
        assert!(matches!(
            result,
            Err(SearchError::Store(StoreError::UnknownDatabase(ref db))) if db == "nope"
        ));
        assert!(services().get_models("nope").is_err());
    }

    #[test]
    fn test_batch_form() {
        let text = "165.0790\n\n  181.070664 \n0.0\n";
        let reports = services()
            .search_adducts_batch("demo", text, "form", &m_plus_h(), &CancelToken::new())
            .unwrap();
        assert_eq!(reports.len(), 3);
        assert_eq!(reports[0].peak_label, "165.0790");
        assert_eq!(reports[0].total_hits, 1);
        assert!(reports[0].native_hit);

        assert_eq!(reports[1].peak_label, "181.070664");
        assert_eq!(reports[1].adducts[0].isomers, vec!["Cfru", "Cglc"]);
        assert_eq!(reports[1].total_hits, 2);

        // neutral mass below zero, no candidate but still reported
        assert!(reports[2].adducts.is_empty());
        assert_eq!(reports[2].total_hits, 0);
        assert!(!reports[2].native_hit);

        let as_json = serde_json::to_value(&reports[0]).unwrap();
        assert_eq!(as_json["adducts"][0]["formula"], "C6H12O5");
    }

    #[test]
    fn test_batch_format_checked_first() {
        let result = services().search_adducts_batch(
            "nope",
            "165.0790",
            "mgf",
            &m_plus_h(),
            &CancelToken::new(),
        );
        assert!(matches!(result, Err(SearchError::UnsupportedFormat(ref f)) if f == "mgf"));
    }

    #[test]
    fn test_batch_malformed_peak() {
        let result = services().search_adducts_batch(
            "demo",
            "165.0790\nabc\n",
            "form",
            &m_plus_h(),
            &CancelToken::new(),
        );
        assert!(matches!(result, Err(SearchError::MalformedPeak(ref line)) if line == "abc"));
    }

    #[test]
    fn test_parse_form_peaks() {
        let peaks = parse_form_peaks(" 100.5\n\n200\n", -1).unwrap();
        assert_eq!(peaks.len(), 2);
        assert_eq!(peaks[0].name, "100.5");
        assert_eq!(peaks[0].charge, -1);
        assert_eq!(peaks[1].mz, 200.0);
        assert!(parse_form_peaks("", 0).unwrap().is_empty());
        assert!(parse_form_peaks("inf", 0).is_err());
    }

    #[test]
    fn test_find_pathway() {
        let services = services();
        let cancel = CancelToken::new();
        let shortest = services
            .find_pathway("demo", "Cglc", "Crha", 3, false, &cancel)
            .unwrap();
        // the two-step route through Cx is cut by the novelty floor
        assert_eq!(shortest.len(), 1);
        assert_eq!(shortest[0].as_slice(), ["Cglc", "R1", "Cfru", "R2", "Crha"]);

        let relaxed = PathwayQuery::new("Cglc", "Crha", 3, true).np_min(-10.0);
        assert_eq!(
            services
                .find_pathway_with("demo", &relaxed, &cancel)
                .unwrap()
                .len(),
            2
        );
        assert!(services
            .find_pathway("demo", "Cglc", "Crha", 1, true, &cancel)
            .unwrap()
            .is_empty());
        assert!(services
            .find_pathway("demo", "Cglc", "Cmissing", 3, false, &cancel)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_catalog_lookups() {
        let services = services();
        let (positive, negative) = services.get_adducts();
        assert!(positive.contains(&"M+H".to_string()));
        assert!(negative.contains(&"M-H".to_string()));
        assert_eq!(
            services.get_models("demo").unwrap(),
            vec![("eco".to_string(), "Escherichia coli".to_string())]
        );

        let comps = services
            .get_comps("demo", &["Cglc".to_string(), "Cnope".to_string()])
            .unwrap();
        assert_eq!(comps[0].as_ref().map(|c| c.names.clone()), Some(vec!["Glucose".to_string()]));
        assert!(comps[1].is_none());

        let rxns = services
            .get_rxns("demo", &["R2".to_string(), "R9".to_string()])
            .unwrap();
        assert_eq!(rxns[0].as_ref().and_then(|r| r.gibbs_energy), Some(-4.0));
        assert!(rxns[1].is_none());
        assert_eq!(services.database_names(), vec!["demo"]);
    }
}

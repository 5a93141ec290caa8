//! # Adduct Search Module
//!
//! ## Purpose
//! Annotates mass-spectrometry peaks with candidate molecular formulas and the compounds
//! (isomers) sharing each formula, for every selected ionization adduct.
//!
//! ## Main Data Structures
//! - `AdductSearchParams`: tolerance (absolute or ppm), charge, adduct names, allowed models,
//!   halogen policy and the bound on peak-level parallelism
//! - `Peak`: one measurement (label, retention time, m/z, charge, halogen hint)
//! - `Dataset`: a named batch of peaks plus the formula -> isomers cache shared by all of them
//! - `PeakAnnotation`: the result for one peak, built fresh by the engine; peaks are never mutated
//!
//! ## Key Logic
//! 1. **Adduct selection**: names are resolved against the adduct table once, before any store
//!    access; a non-zero charge keeps only the adducts of its polarity
//! 2. **Neutral mass**: every (peak, adduct) pair gives a neutral mass; non-positive masses are
//!    skipped silently
//! 3. **Formula confirmation**: the store returns formulas inside the tolerance window, and every
//!    formula is tolerance-checked again on its own monoisotopic mass, since one window may hold
//!    several formulas
//! 4. **Isomer cache**: isomer sets are resolved once per formula per dataset in a `DashMap`;
//!    concurrent misses on one formula may both query the store, the first insert wins
//! 5. **Parallelism**: peaks are spread over a bounded `rayon` pool and joined before returning

use crate::Adducts::adduct_table::{AdductRule, AdductTable};
use crate::Chemistry::formula::parse_formula;
use crate::Chemistry::mass::{neutral_mass, tolerance_window, within_tolerance};
use crate::Store::{Compound, CompoundStore, FormulaFilter};
use crate::cancel::CancelToken;
use crate::error::SearchError;
use dashmap::DashMap;
use log::{debug, info};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdductSearchParams {
    pub tolerance: f64,
    /// tolerance in parts per million instead of mass units
    pub ppm: bool,
    /// 0 tries every selected adduct, otherwise only adducts of this sign with this magnitude
    pub charge: i32,
    /// adduct names, empty selects the whole table
    pub adducts: Vec<String>,
    /// allowed models, empty disables the model filter
    pub models: Vec<String>,
    pub include_halogens: bool,
    pub max_concurrency: usize,
}

impl AdductSearchParams {
    pub fn new(tolerance: f64, ppm: bool) -> Self {
        Self {
            tolerance,
            ppm,
            charge: 0,
            adducts: Vec::new(),
            models: Vec::new(),
            include_halogens: true,
            max_concurrency: 1,
        }
    }

    pub fn charge(mut self, charge: i32) -> Self {
        self.charge = charge;
        self
    }

    pub fn adducts(mut self, adducts: Vec<String>) -> Self {
        self.adducts = adducts;
        self
    }

    pub fn models(mut self, models: Vec<String>) -> Self {
        self.models = models;
        self
    }

    pub fn include_halogens(mut self, include_halogens: bool) -> Self {
        self.include_halogens = include_halogens;
        self
    }

    pub fn max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }

    pub fn filter(&self) -> FormulaFilter {
        FormulaFilter::new(self.include_halogens, self.models.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Peak {
    pub name: String,
    /// retention time, 0 when unknown
    pub r_t: f64,
    pub mz: f64,
    pub charge: i32,
    /// halogenated formulas are considered for this peak even when the dataset excludes them
    pub halogenated: bool,
}

impl Peak {
    pub fn new(name: &str, mz: f64, charge: i32) -> Self {
        Self {
            name: name.to_string(),
            r_t: 0.0,
            mz,
            charge,
            halogenated: false,
        }
    }

    pub fn halogenated(mut self, halogenated: bool) -> Self {
        self.halogenated = halogenated;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdductMatch {
    pub adduct: String,
    pub formula: String,
    pub isomers: Arc<Vec<Compound>>,
}

impl AdductMatch {
    pub fn isomer_ids(&self) -> Vec<String> {
        self.isomers.iter().map(|c| c.id.clone()).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PeakAnnotation {
    pub peak: Peak,
    /// (adduct, formula) pairs with at least one isomer; adducts in selection order,
    /// formulas in the order the store returned them
    pub matches: Vec<AdductMatch>,
    /// tolerance-confirmed (adduct, formula) pairs that resolved to no isomer
    pub empty_formulas: Vec<(String, String)>,
}

impl PeakAnnotation {
    pub fn total_hits(&self) -> usize {
        self.matches.iter().map(|m| m.isomers.len()).sum()
    }

    pub fn native_hit(&self) -> bool {
        self.matches
            .iter()
            .any(|m| m.isomers.iter().any(|c| c.is_native()))
    }

    pub fn formulas_for(&self, adduct: &str) -> Vec<&str> {
        self.matches
            .iter()
            .filter(|m| m.adduct == adduct)
            .map(|m| m.formula.as_str())
            .collect()
    }
}

/// A named batch of peaks searched with one set of parameters.
#[derive(Debug)]
pub struct Dataset {
    pub name: String,
    pub peaks: Vec<Peak>,
    pub params: AdductSearchParams,
    isomers: DashMap<String, Arc<Vec<Compound>>>,
}

impl Dataset {
    pub fn new(name: &str, params: AdductSearchParams) -> Self {
        Self {
            name: name.to_string(),
            peaks: Vec::new(),
            params,
            isomers: DashMap::new(),
        }
    }

    pub fn with_peaks(mut self, peaks: Vec<Peak>) -> Self {
        self.peaks = peaks;
        self
    }

    /// Cached isomer set of `formula`, if any peak has resolved it.
    pub fn isomers(&self, formula: &str) -> Option<Arc<Vec<Compound>>> {
        self.isomers.get(formula).map(|entry| Arc::clone(entry.value()))
    }

    pub fn cached_formulas(&self) -> usize {
        self.isomers.len()
    }

    /// Annotates every peak; the result has one entry per peak, in peak order.
    pub fn annotate_peaks<S>(
        &self,
        store: &S,
        table: &AdductTable,
        cancel: &CancelToken,
    ) -> Result<Vec<PeakAnnotation>, SearchError>
    where
        S: CompoundStore + ?Sized,
    {
        if self.peaks.is_empty() {
            info!("dataset {} has no peaks", self.name);
            return Ok(Vec::new());
        }
        // unknown adduct names abort the batch before the store is touched
        table.select(&self.params.adducts, self.params.charge)?;
        let filter = self.params.filter();
        let workers = self.params.max_concurrency.max(1);
        info!(
            "annotating {} peaks of dataset {} with {} worker(s)",
            self.peaks.len(),
            self.name,
            workers
        );

        let annotations = if workers == 1 || self.peaks.len() == 1 {
            self.peaks
                .iter()
                .map(|peak| self.annotate_peak(peak, store, table, &filter, cancel))
                .collect::<Result<Vec<_>, _>>()?
        } else {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(workers)
                .build()
                .map_err(|e| SearchError::WorkerPool(e.to_string()))?;
            pool.install(|| {
                self.peaks
                    .par_iter()
                    .map(|peak| self.annotate_peak(peak, store, table, &filter, cancel))
                    .collect::<Result<Vec<_>, _>>()
            })?
        };

        info!(
            "dataset {}: {} of {} peaks annotated, {} formulas resolved",
            self.name,
            annotations.iter().filter(|a| !a.matches.is_empty()).count(),
            annotations.len(),
            self.cached_formulas()
        );
        Ok(annotations)
    }

    fn annotate_peak<S>(
        &self,
        peak: &Peak,
        store: &S,
        table: &AdductTable,
        filter: &FormulaFilter,
        cancel: &CancelToken,
    ) -> Result<PeakAnnotation, SearchError>
    where
        S: CompoundStore + ?Sized,
    {
        let peak_filter = if peak.halogenated && !filter.include_halogens {
            FormulaFilter::new(true, filter.models.clone())
        } else {
            filter.clone()
        };
        let mut annotation = PeakAnnotation {
            peak: peak.clone(),
            matches: Vec::new(),
            empty_formulas: Vec::new(),
        };
        for rule in table.select(&self.params.adducts, peak.charge)? {
            self.annotate_adduct(&mut annotation, rule, store, &peak_filter, cancel)?;
        }
        Ok(annotation)
    }

    fn annotate_adduct<S>(
        &self,
        annotation: &mut PeakAnnotation,
        rule: &AdductRule,
        store: &S,
        filter: &FormulaFilter,
        cancel: &CancelToken,
    ) -> Result<(), SearchError>
    where
        S: CompoundStore + ?Sized,
    {
        let (tolerance, ppm) = (self.params.tolerance, self.params.ppm);
        let neutral = neutral_mass(annotation.peak.mz, rule, annotation.peak.charge);
        if !neutral.is_finite() || neutral <= 0.0 {
            debug!(
                "peak {}: {} gives neutral mass {}, skipped",
                annotation.peak.name, rule.name, neutral
            );
            return Ok(());
        }
        let window = tolerance_window(neutral, tolerance, ppm);
        cancel.check()?;
        let formulas = store.find_formulas_in_mass_range(window.low, window.high, filter)?;
        for formula in formulas {
            let composition = match parse_formula(&formula) {
                Ok(composition) => composition,
                Err(e) => {
                    debug!("formula {} skipped: {}", formula, e);
                    continue;
                }
            };
            let mass = match composition.monoisotopic_mass() {
                Ok(mass) => mass,
                Err(e) => {
                    debug!("formula {} skipped: {}", formula, e);
                    continue;
                }
            };
            if !within_tolerance(mass, neutral, tolerance, ppm) || !filter.accepts_formula(&composition)
            {
                continue;
            }
            let isomers = self.resolve_isomers(&formula, store, filter, cancel)?;
            if isomers.is_empty() {
                annotation.empty_formulas.push((rule.name.clone(), formula));
            } else {
                annotation.matches.push(AdductMatch {
                    adduct: rule.name.clone(),
                    formula,
                    isomers,
                });
            }
        }
        Ok(())
    }

    fn resolve_isomers<S>(
        &self,
        formula: &str,
        store: &S,
        filter: &FormulaFilter,
        cancel: &CancelToken,
    ) -> Result<Arc<Vec<Compound>>, SearchError>
    where
        S: CompoundStore + ?Sized,
    {
        if let Some(cached) = self.isomers.get(formula) {
            debug!("isomer cache hit for {}", formula);
            return Ok(Arc::clone(cached.value()));
        }
        cancel.check()?;
        let compounds = store.find_compounds_by_formula(formula, filter)?;
        let entry = self
            .isomers
            .entry(formula.to_string())
            .or_insert_with(|| Arc::new(compounds));
        Ok(Arc::clone(entry.value()))
    }
}

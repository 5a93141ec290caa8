//! # Compound/Reaction Store Module
//!
//! ## Purpose
//! Defines the read-only contract through which both search engines reach the compound and
//! reaction database, together with the records it returns. Engines never mutate records.
//!
//! ## Main Data Structures
//! - `CompoundStore`: lookup by id, by formula (with halogen/model filters), by mass window,
//!   incident reactions of a compound, model listing
//! - `Compound`, `Reaction`: database records
//! - `FormulaFilter`: halogen policy plus allowed-model subset
//! - `StoreError`: lookup misses, unknown databases and backend failures
//!
//! ## Implementations
//! - `memory_store::MemoryStore`: in-memory store loaded from JSON, indexes formulas by
//!   monoisotopic mass and returns incident reactions ordered by reaction id

use crate::Chemistry::formula::{ElementComposition, FormulaError, parse_formula};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod memory_store;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Record not found: {0}")]
    NotFound(String),
    #[error("Unknown database: {0}")]
    UnknownDatabase(String),
    #[error("Store backend error: {0}")]
    Backend(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error at line {line}, column {column}: {message}")]
    Json {
        line: usize,
        column: usize,
        message: String,
    },
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Json {
            line: err.line(),
            column: err.column(),
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Compound {
    pub id: String,
    pub formula: String,
    #[serde(default)]
    pub names: Vec<String>,
    /// heuristic novelty rating, lower is more unusual
    #[serde(default)]
    pub novelty_score: Option<f64>,
    /// standard Gibbs energy of formation estimate
    #[serde(default)]
    pub gibbs_formation: Option<f64>,
    /// metabolic models the compound belongs to
    #[serde(default)]
    pub models: Vec<String>,
    /// expansion generation, 0 for native (known) compounds
    #[serde(default)]
    pub generation: Option<u32>,
    #[serde(default)]
    pub reaction_ids: Vec<String>,
}

impl Compound {
    pub fn composition(&self) -> Result<ElementComposition, FormulaError> {
        parse_formula(&self.formula)
    }

    pub fn is_native(&self) -> bool {
        self.generation == Some(0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reaction {
    pub id: String,
    pub reactants: Vec<String>,
    pub products: Vec<String>,
    /// estimated reaction Gibbs energy
    #[serde(default)]
    pub gibbs_energy: Option<f64>,
    #[serde(default)]
    pub equation: Option<String>,
}

impl Reaction {
    pub fn has_reactant(&self, compound_id: &str) -> bool {
        self.reactants.iter().any(|id| id == compound_id)
    }
}

/// Filters applied to formula lookups.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormulaFilter {
    /// `false` excludes formulas containing F, Cl, Br or I
    pub include_halogens: bool,
    /// empty means no model filter
    pub models: Vec<String>,
}

impl FormulaFilter {
    pub fn new(include_halogens: bool, models: Vec<String>) -> Self {
        Self {
            include_halogens,
            models,
        }
    }

    pub fn accepts_formula(&self, composition: &ElementComposition) -> bool {
        self.include_halogens || !composition.contains_halogen()
    }

    pub fn accepts_compound(&self, compound: &Compound) -> bool {
        self.models.is_empty()
            || compound
                .models
                .iter()
                .any(|model| self.models.contains(model))
    }
}

/// Read-only access to one compound/reaction database.
pub trait CompoundStore: Send + Sync {
    fn find_compound_by_id(&self, id: &str) -> Result<Compound, StoreError>;
    /// Compounds with exactly this formula that pass `filter`.
    fn find_compounds_by_formula(
        &self,
        formula: &str,
        filter: &FormulaFilter,
    ) -> Result<Vec<Compound>, StoreError>;
    /// Distinct formulas whose monoisotopic mass lies in `[low, high]` and pass the halogen policy.
    fn find_formulas_in_mass_range(
        &self,
        low: f64,
        high: f64,
        filter: &FormulaFilter,
    ) -> Result<Vec<String>, StoreError>;
    /// Reactions in which the compound takes part, as reactant or product.
    fn find_reactions_incident(&self, compound_id: &str) -> Result<Vec<Reaction>, StoreError>;
    fn find_reaction_by_id(&self, id: &str) -> Result<Reaction, StoreError>;
    /// (model id, model name) pairs
    fn list_models(&self) -> Result<Vec<(String, String)>, StoreError>;
}

use super::{Compound, CompoundStore, FormulaFilter, Reaction, StoreError};
use crate::Chemistry::formula::calculate_monoisotopic_mass;
use log::{info, warn};
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};

/// Layout of a JSON store document.
#[derive(Debug, Deserialize)]
struct StoreDocument {
    #[serde(default)]
    compounds: Vec<Compound>,
    #[serde(default)]
    reactions: Vec<Reaction>,
    #[serde(default)]
    models: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
struct IndexedFormula {
    mass: f64,
    formula: String,
    halogenated: bool,
}

/// In-memory compound/reaction database.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    compounds: HashMap<String, Compound>,
    reactions: HashMap<String, Reaction>,
    // formula -> compound ids, sorted
    formula_index: HashMap<String, Vec<String>>,
    // one entry per distinct formula, sorted by mass
    mass_index: Vec<IndexedFormula>,
    // compound id -> ids of reactions it takes part in, sorted
    incident: HashMap<String, Vec<String>>,
    models: Vec<(String, String)>,
}

impl MemoryStore {
    pub fn new(
        compounds: Vec<Compound>,
        reactions: Vec<Reaction>,
        models: Vec<(String, String)>,
    ) -> Self {
        let mut formula_index: HashMap<String, Vec<String>> = HashMap::new();
        for compound in compounds.iter() {
            formula_index
                .entry(compound.formula.clone())
                .or_default()
                .push(compound.id.clone());
        }
        for ids in formula_index.values_mut() {
            ids.sort();
            ids.dedup();
        }

        let mut mass_index = Vec::with_capacity(formula_index.len());
        for formula in formula_index.keys() {
            match calculate_monoisotopic_mass(formula) {
                Ok((mass, composition)) => mass_index.push(IndexedFormula {
                    mass,
                    formula: formula.clone(),
                    halogenated: composition.contains_halogen(),
                }),
                Err(e) => warn!("formula {} left out of the mass index: {}", formula, e),
            }
        }
        mass_index.sort_by(|a, b| a.mass.total_cmp(&b.mass).then(a.formula.cmp(&b.formula)));

        let mut incident: HashMap<String, BTreeSet<String>> = HashMap::new();
        for reaction in reactions.iter() {
            for compound_id in reaction.reactants.iter().chain(reaction.products.iter()) {
                incident
                    .entry(compound_id.clone())
                    .or_default()
                    .insert(reaction.id.clone());
            }
        }
        let incident: HashMap<String, Vec<String>> = incident
            .into_iter()
            .map(|(id, reactions)| (id, reactions.into_iter().collect()))
            .collect();

        Self {
            compounds: compounds
                .into_iter()
                .map(|compound| (compound.id.clone(), compound))
                .collect(),
            reactions: reactions
                .into_iter()
                .map(|reaction| (reaction.id.clone(), reaction))
                .collect(),
            formula_index,
            mass_index,
            incident,
            models,
        }
    }

    /// Parses a store document `{"compounds": [...], "reactions": [...], "models": [[id, name], ...]}`.
    pub fn from_json_str(text: &str) -> Result<Self, StoreError> {
        let document: StoreDocument = serde_json::from_str(text)?;
        let store = Self::new(document.compounds, document.reactions, document.models);
        info!(
            "store loaded: {} compounds, {} reactions, {} formulas indexed by mass",
            store.compound_count(),
            store.reaction_count(),
            store.mass_index.len()
        );
        Ok(store)
    }

    pub fn compound_count(&self) -> usize {
        self.compounds.len()
    }

    pub fn reaction_count(&self) -> usize {
        self.reactions.len()
    }
}

impl CompoundStore for MemoryStore {
    fn find_compound_by_id(&self, id: &str) -> Result<Compound, StoreError> {
        self.compounds
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn find_compounds_by_formula(
        &self,
        formula: &str,
        filter: &FormulaFilter,
    ) -> Result<Vec<Compound>, StoreError> {
        let Some(ids) = self.formula_index.get(formula) else {
            return Ok(Vec::new());
        };
        Ok(ids
            .iter()
            .filter_map(|id| self.compounds.get(id))
            .filter(|compound| filter.accepts_compound(compound))
            .filter(|compound| {
                filter.include_halogens
                    || compound
                        .composition()
                        .map(|composition| !composition.contains_halogen())
                        .unwrap_or(true)
            })
            .cloned()
            .collect())
    }

    fn find_formulas_in_mass_range(
        &self,
        low: f64,
        high: f64,
        filter: &FormulaFilter,
    ) -> Result<Vec<String>, StoreError> {
        let start = self.mass_index.partition_point(|entry| entry.mass < low);
        Ok(self.mass_index[start..]
            .iter()
            .take_while(|entry| entry.mass <= high)
            .filter(|entry| filter.include_halogens || !entry.halogenated)
            .map(|entry| entry.formula.clone())
            .collect())
    }

    fn find_reactions_incident(&self, compound_id: &str) -> Result<Vec<Reaction>, StoreError> {
        if !self.compounds.contains_key(compound_id) && !self.incident.contains_key(compound_id) {
            return Err(StoreError::NotFound(compound_id.to_string()));
        }
        Ok(self
            .incident
            .get(compound_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| self.reactions.get(id))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn find_reaction_by_id(&self, id: &str) -> Result<Reaction, StoreError> {
        self.reactions
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn list_models(&self) -> Result<Vec<(String, String)>, StoreError> {
        Ok(self.models.clone())
    }
}

use crate::Adducts::adduct_table::{AdductError, AdductRule, AdductTable, Polarity, parse_adduct_list};
use crate::Store::StoreError;
use crate::Store::memory_store::MemoryStore;
use log::{error, info, warn};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("File '{0}' does not exist")]
    Missing(String),
    #[error("Failed to read file '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("Adduct list '{path}': {source}")]
    Adducts { path: String, source: AdductError },
    #[error("Store file '{path}': {source}")]
    Store { path: String, source: StoreError },
}

pub struct LoadData {
    pub file_name: String,
}

impl LoadData {
    pub fn new(file_name: String) -> Self {
        LoadData { file_name }
    }
    pub fn load_store(&self) -> Result<MemoryStore, LoadError> {
        load_store(&self.file_name)
    }
    pub fn load_text(&self) -> Result<String, LoadError> {
        read_text(&self.file_name)
    }
}

pub fn read_text(file_name: &str) -> Result<String, LoadError> {
    let path = Path::new(file_name);
    if !path.exists() {
        return Err(LoadError::Missing(file_name.to_string()));
    }
    fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: file_name.to_string(),
        source,
    })
}

// logs the offending line of `text` with a pointer under `column` (1-based, 0 = no pointer)
fn report_line(text: &str, line: usize, column: usize) {
    if let Some(problem_line) = line.checked_sub(1).and_then(|i| text.lines().nth(i)) {
        error!("Problematic line: {}", problem_line);
        if column >= 1 && column <= problem_line.len() + 1 {
            let pointer = " ".repeat(column - 1) + "^";
            error!("{}", pointer);
        }
    }
}

/// Reads one tab-delimited adduct list; every rule gets `polarity`.
pub fn load_adduct_list(file_name: &str, polarity: Polarity) -> Result<Vec<AdductRule>, LoadError> {
    let text = read_text(file_name)?;
    match parse_adduct_list(&text, polarity) {
        Ok(rules) => {
            if rules.is_empty() {
                warn!("Adduct list '{}' contains no adducts", file_name);
            }
            info!(
                "Loaded {} {} adducts from '{}'",
                rules.len(),
                polarity.as_str(),
                file_name
            );
            Ok(rules)
        }
        Err(e) => {
            error!("Error parsing adduct list '{}': {}", file_name, e);
            if let AdductError::MalformedLine { line, .. } = &e {
                report_line(&text, *line, 0);
            }
            Err(LoadError::Adducts {
                path: file_name.to_string(),
                source: e,
            })
        }
    }
}

/// Builds the adduct table from the configured list files; a list that is not configured falls
/// back to the built-in one for its polarity.
pub fn load_adduct_table(
    positive: Option<&str>,
    negative: Option<&str>,
) -> Result<AdductTable, LoadError> {
    let builtin = AdductTable::builtin();
    let load = |file: Option<&str>, polarity: Polarity| match file {
        Some(file) => load_adduct_list(file, polarity),
        None => Ok(builtin.rules_for(polarity).to_vec()),
    };
    let positive = load(positive, Polarity::Positive)?;
    let negative = load(negative, Polarity::Negative)?;
    Ok(AdductTable::new(positive, negative))
}

/// Loads a JSON store document into a `MemoryStore`.
pub fn load_store(file_name: &str) -> Result<MemoryStore, LoadError> {
    let text = read_text(file_name)?;
    match MemoryStore::from_json_str(&text) {
        Ok(store) => {
            if store.compound_count() == 0 {
                warn!("Store file '{}' contains no compounds", file_name);
            }
            Ok(store)
        }
        Err(e) => {
            error!("Error parsing store file '{}': {}", file_name, e);
            if let StoreError::Json { line, column, .. } = &e {
                report_line(&text, *line, *column);
            }
            Err(LoadError::Store {
                path: file_name.to_string(),
                source: e,
            })
        }
    }
}

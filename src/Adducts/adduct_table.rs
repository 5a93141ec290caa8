//! # Adduct Table Module
//!
//! ## Purpose
//! Holds the catalog of ionization adducts used to turn observed m/z values into neutral masses.
//! The catalog is loaded once, either from the built-in lists or from two text lists
//! (positive mode and negative mode), and is read-only afterwards.
//!
//! ## Main Data Structures
//! - `AdductRule`: name, mass delta, multiplier on the neutral mass, signed charge, polarity
//! - `AdductTable`: ordered positive and negative lists plus a name index for O(1) lookup
//! - `AdductError`: unknown names, malformed list lines, rules that cannot be inverted
//!
//! ## List format
//! One adduct per line, tab-delimited: `name  multiplier  mass_delta  charge`.
//! Lines starting with `#` and blank lines are skipped. The charge may be written `1+`, `2-`,
//! `+1`, `-2` or just `3`; the list a line belongs to decides the polarity, a sign that disagrees
//! with the list is an error.
//! ```text
//! # Ion name	Mult	Mass delta	Charge
//! M+H	1	1.007276	1+
//! 2M+Na	2	22.989218	1+
//! ```

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdductError {
    #[error("Adduct not found: {0}")]
    NotFound(String),
    #[error("Malformed adduct line {line}: {reason}")]
    MalformedLine { line: usize, reason: String },
    #[error("Adduct {0} has a zero multiplier")]
    ZeroMultiplier(String),
    #[error("Adduct {0} carries no charge")]
    ZeroCharge(String),
    #[error("Adduct table is already initialized")]
    AlreadyInitialized,
    #[error("Failed to read adduct list: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Polarity {
    Positive,
    Negative,
}

impl Polarity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Polarity::Positive => "positive",
            Polarity::Negative => "negative",
        }
    }

    /// `None` for charge 0, which selects both polarities.
    pub fn of_charge(charge: i32) -> Option<Polarity> {
        match charge {
            0 => None,
            c if c > 0 => Some(Polarity::Positive),
            _ => Some(Polarity::Negative),
        }
    }
}

/// ionization transform: `mz = (M * multiplier + mass_delta) / |charge|`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdductRule {
    pub name: String,
    pub mass_delta: f64,
    pub multiplier: f64,
    pub charge: i32,
    pub polarity: Polarity,
}

impl AdductRule {
    /// Polarity follows the sign of `charge`.
    pub fn new(
        name: &str,
        mass_delta: f64,
        multiplier: f64,
        charge: i32,
    ) -> Result<Self, AdductError> {
        let polarity =
            Polarity::of_charge(charge).ok_or_else(|| AdductError::ZeroCharge(name.to_string()))?;
        Self::with_polarity(name, mass_delta, multiplier, charge.abs(), polarity)
    }

    /// `charge` is taken as a magnitude, its sign comes from `polarity`.
    pub fn with_polarity(
        name: &str,
        mass_delta: f64,
        multiplier: f64,
        charge: i32,
        polarity: Polarity,
    ) -> Result<Self, AdductError> {
        let name = name.trim();
        if multiplier == 0.0 || !multiplier.is_finite() {
            return Err(AdductError::ZeroMultiplier(name.to_string()));
        }
        if charge == 0 {
            return Err(AdductError::ZeroCharge(name.to_string()));
        }
        let magnitude = charge.abs();
        Ok(Self {
            name: name.to_string(),
            mass_delta,
            multiplier,
            charge: match polarity {
                Polarity::Positive => magnitude,
                Polarity::Negative => -magnitude,
            },
            polarity,
        })
    }
}

// (name, multiplier, mass delta, |charge|)
const POSITIVE_ADDUCTS: &[(&str, f64, f64, i32)] = &[
    ("M+3H", 1.0, 3.021_829, 3),
    ("M+2H+Na", 1.0, 25.003_770, 3),
    ("M+H+2Na", 1.0, 46.985_712, 3),
    ("M+3Na", 1.0, 68.967_654, 3),
    ("M+2H", 1.0, 2.014_553, 2),
    ("M+H+NH4", 1.0, 19.041_099, 2),
    ("M+H+Na", 1.0, 23.996_494, 2),
    ("M+H+K", 1.0, 39.970_434, 2),
    ("M+ACN+2H", 1.0, 43.041_101, 2),
    ("M+2Na", 1.0, 45.978_436, 2),
    ("M+2ACN+2H", 1.0, 84.067_650, 2),
    ("M+3ACN+2H", 1.0, 125.094_199, 2),
    ("M+", 1.0, -0.000_549, 1),
    ("M+H", 1.0, 1.007_276, 1),
    ("M+H-H2O", 1.0, -17.003_289, 1),
    ("M+NH4", 1.0, 18.033_823, 1),
    ("M+Na", 1.0, 22.989_218, 1),
    ("M+CH3OH+H", 1.0, 33.033_489, 1),
    ("M+K", 1.0, 38.963_158, 1),
    ("M+ACN+H", 1.0, 42.033_823, 1),
    ("M+2Na-H", 1.0, 44.971_160, 1),
    ("M+IsoProp+H", 1.0, 61.065_340, 1),
    ("M+ACN+Na", 1.0, 64.015_765, 1),
    ("M+2K-H", 1.0, 76.919_040, 1),
    ("M+DMSO+H", 1.0, 79.021_220, 1),
    ("M+2ACN+H", 1.0, 83.060_370, 1),
    ("M+IsoProp+Na+H", 1.0, 84.055_110, 1),
    ("2M+H", 2.0, 1.007_276, 1),
    ("2M+NH4", 2.0, 18.033_823, 1),
    ("2M+Na", 2.0, 22.989_218, 1),
    ("2M+K", 2.0, 38.963_158, 1),
    ("2M+ACN+H", 2.0, 42.033_823, 1),
    ("2M+ACN+Na", 2.0, 64.015_765, 1),
];

const NEGATIVE_ADDUCTS: &[(&str, f64, f64, i32)] = &[
    ("M-3H", 1.0, -3.021_829, 3),
    ("M-2H", 1.0, -2.014_553, 2),
    ("M-", 1.0, 0.000_549, 1),
    ("M-H2O-H", 1.0, -19.017_841, 1),
    ("M-H", 1.0, -1.007_276, 1),
    ("M+Na-2H", 1.0, 20.974_666, 1),
    ("M+Cl", 1.0, 34.969_402, 1),
    ("M+K-2H", 1.0, 36.948_606, 1),
    ("M+FA-H", 1.0, 44.998_201, 1),
    ("M+CH3COO", 1.0, 59.013_851, 1),
    ("M+Hac-H", 1.0, 59.013_851, 1),
    ("M+Br", 1.0, 78.918_885, 1),
    ("M+TFA-H", 1.0, 112.985_586, 1),
    ("2M-H", 2.0, -1.007_276, 1),
    ("2M+FA-H", 2.0, 44.998_201, 1),
    ("2M+Hac-H", 2.0, 59.013_851, 1),
    ("3M-H", 3.0, -1.007_276, 1),
];

#[derive(Debug, Clone)]
pub struct AdductTable {
    positive: Vec<AdductRule>,
    negative: Vec<AdductRule>,
    index: HashMap<String, (Polarity, usize)>,
}

impl AdductTable {
    /// Builds the name index; on duplicate names the first entry wins.
    pub fn new(positive: Vec<AdductRule>, negative: Vec<AdductRule>) -> Self {
        let mut index = HashMap::new();
        for (polarity, rules) in [
            (Polarity::Positive, &positive),
            (Polarity::Negative, &negative),
        ] {
            for (i, rule) in rules.iter().enumerate() {
                if index.contains_key(&rule.name) {
                    warn!(
                        "duplicate adduct {} in {} list ignored",
                        rule.name,
                        polarity.as_str()
                    );
                    continue;
                }
                index.insert(rule.name.clone(), (polarity, i));
            }
        }
        Self {
            positive,
            negative,
            index,
        }
    }

    /// The table shipped with the crate, 33 positive and 17 negative mode adducts.
    pub fn builtin() -> Self {
        let build = |list: &[(&str, f64, f64, i32)], polarity: Polarity| -> Vec<AdductRule> {
            list.iter()
                .map(|&(name, multiplier, mass_delta, charge)| AdductRule {
                    name: name.to_string(),
                    mass_delta,
                    multiplier,
                    charge: match polarity {
                        Polarity::Positive => charge,
                        Polarity::Negative => -charge,
                    },
                    polarity,
                })
                .collect()
        };
        Self::new(
            build(POSITIVE_ADDUCTS, Polarity::Positive),
            build(NEGATIVE_ADDUCTS, Polarity::Negative),
        )
    }

    pub fn from_lists(positive_text: &str, negative_text: &str) -> Result<Self, AdductError> {
        let positive = parse_adduct_list(positive_text, Polarity::Positive)?;
        let negative = parse_adduct_list(negative_text, Polarity::Negative)?;
        info!(
            "adduct table loaded: {} positive, {} negative",
            positive.len(),
            negative.len()
        );
        Ok(Self::new(positive, negative))
    }

    pub fn rules_for(&self, polarity: Polarity) -> &[AdductRule] {
        match polarity {
            Polarity::Positive => &self.positive,
            Polarity::Negative => &self.negative,
        }
    }

    pub fn by_name(&self, name: &str) -> Result<&AdductRule, AdductError> {
        let &(polarity, i) = self
            .index
            .get(name.trim())
            .ok_or_else(|| AdductError::NotFound(name.to_string()))?;
        Ok(&self.rules_for(polarity)[i])
    }

    pub fn names(&self, polarity: Polarity) -> Vec<String> {
        self.rules_for(polarity)
            .iter()
            .map(|rule| rule.name.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.positive.len() + self.negative.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Rules to try for a search. `names` empty selects every configured adduct; a non-zero
    /// `charge` keeps only the adducts of its polarity. Unknown names are an error.
    pub fn select(&self, names: &[String], charge: i32) -> Result<Vec<&AdductRule>, AdductError> {
        let wanted = Polarity::of_charge(charge);
        let candidates: Vec<&AdductRule> = if names.is_empty() {
            self.positive.iter().chain(self.negative.iter()).collect()
        } else {
            names
                .iter()
                .map(|name| self.by_name(name))
                .collect::<Result<_, _>>()?
        };
        Ok(candidates
            .into_iter()
            .filter(|rule| wanted.is_none_or(|polarity| rule.polarity == polarity))
            .collect())
    }
}

fn parse_charge(field: &str, polarity: Polarity, line: usize) -> Result<i32, AdductError> {
    let field = field.trim();
    let malformed = |reason: String| AdductError::MalformedLine { line, reason };
    let (digits, sign) = if let Some(rest) = field.strip_suffix('+') {
        (rest, Some(Polarity::Positive))
    } else if let Some(rest) = field.strip_suffix('-') {
        (rest, Some(Polarity::Negative))
    } else if let Some(rest) = field.strip_prefix('+') {
        (rest, Some(Polarity::Positive))
    } else if let Some(rest) = field.strip_prefix('-') {
        (rest, Some(Polarity::Negative))
    } else {
        (field, None)
    };
    if sign.is_some_and(|sign| sign != polarity) {
        return Err(malformed(format!(
            "charge {} in the {} list",
            field,
            polarity.as_str()
        )));
    }
    let digits = if digits.is_empty() { "1" } else { digits };
    digits
        .parse::<i32>()
        .map_err(|_| malformed(format!("bad charge '{}'", field)))
}

fn parse_number(field: Option<&str>, what: &str, line: usize) -> Result<f64, AdductError> {
    let field = field.ok_or_else(|| AdductError::MalformedLine {
        line,
        reason: format!("missing {}", what),
    })?;
    field
        .trim()
        .parse::<f64>()
        .map_err(|_| AdductError::MalformedLine {
            line,
            reason: format!("bad {} '{}'", what, field.trim()),
        })
}

/// Parses one adduct list; every rule gets `polarity`.
pub fn parse_adduct_list(text: &str, polarity: Polarity) -> Result<Vec<AdductRule>, AdductError> {
    let mut rules = Vec::new();
    for (i, raw_line) in text.lines().enumerate() {
        let line_number = i + 1;
        if raw_line.starts_with('#') || raw_line.trim().is_empty() {
            continue;
        }
        let mut fields = raw_line.split('\t');
        let name = fields.next().unwrap_or("").trim();
        if name.is_empty() {
            return Err(AdductError::MalformedLine {
                line: line_number,
                reason: "missing adduct name".to_string(),
            });
        }
        let multiplier = parse_number(fields.next(), "multiplier", line_number)?;
        let mass_delta = parse_number(fields.next(), "mass delta", line_number)?;
        let charge_field = fields.next().ok_or_else(|| AdductError::MalformedLine {
            line: line_number,
            reason: "missing charge".to_string(),
        })?;
        let charge = parse_charge(charge_field, polarity, line_number)?;
        rules.push(AdductRule::with_polarity(
            name, mass_delta, multiplier, charge, polarity,
        )?);
    }
    Ok(rules)
}

static ADDUCT_TABLE: OnceLock<AdductTable> = OnceLock::new();

/// Process-wide adduct table; the built-in lists unless `install_adduct_table` ran first.
pub fn adduct_table() -> &'static AdductTable {
    ADDUCT_TABLE.get_or_init(AdductTable::builtin)
}

/// Installs the process-wide table. Fails once the table has been installed or read.
pub fn install_adduct_table(table: AdductTable) -> Result<(), AdductError> {
    ADDUCT_TABLE
        .set(table)
        .map_err(|_| AdductError::AlreadyInitialized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const POSITIVE_TEXT: &str = "# Ion name\tMult\tMass delta\tCharge\n\
M+H\t1\t1.007276\t1+\n\
M+Na \t1\t22.989218\t+1\n\
\n\
2M+H\t2\t1.007276\t1\n\
M+2H\t1\t2.014552\t2+\n";

    const NEGATIVE_TEXT: &str = "#negative mode\nM-H\t1\t-1.007276\t1-\nM+Cl\t1\t34.969402\t-1\n";

    #[test]
    fn test_builtin_table() {
        let table = AdductTable::builtin();
        assert_eq!(table.rules_for(Polarity::Positive).len(), 33);
        assert_eq!(table.rules_for(Polarity::Negative).len(), 17);
        assert_eq!(table.names(Polarity::Positive)[0], "M+3H");
        let m_na = table.by_name("M+Na").unwrap();
        assert_relative_eq!(m_na.mass_delta, 22.989_218);
        assert_eq!(m_na.charge, 1);
        let m_2h = table.by_name("M-2H").unwrap();
        assert_eq!(m_2h.charge, -2);
        assert_eq!(m_2h.polarity, Polarity::Negative);
        assert!(table.rules_for(Polarity::Positive).iter().all(|r| r.charge > 0));
        assert!(table.rules_for(Polarity::Negative).iter().all(|r| r.charge < 0));
    }

    #[test]
    fn test_from_lists() {
        let table = AdductTable::from_lists(POSITIVE_TEXT, NEGATIVE_TEXT).unwrap();
        assert_eq!(
            table.names(Polarity::Positive),
            vec!["M+H", "M+Na", "2M+H", "M+2H"]
        );
        assert_eq!(table.names(Polarity::Negative), vec!["M-H", "M+Cl"]);
        // trailing blanks in names are not significant
        assert_eq!(table.by_name("M+Na ").unwrap().name, "M+Na");
        assert_relative_eq!(table.by_name("2M+H").unwrap().multiplier, 2.0);
        assert_eq!(table.by_name("M+2H").unwrap().charge, 2);
        assert_eq!(table.by_name("M+Cl").unwrap().charge, -1);
    }

    #[test]
    fn test_malformed_lists() {
        let wrong_sign = "M+H\t1\t1.007276\t1-\n";
        assert!(matches!(
            parse_adduct_list(wrong_sign, Polarity::Positive),
            Err(AdductError::MalformedLine { line: 1, .. })
        ));
        let missing_charge = "# header\nM+H\t1\t1.007276\n";
        assert!(matches!(
            parse_adduct_list(missing_charge, Polarity::Positive),
            Err(AdductError::MalformedLine { line: 2, .. })
        ));
        let zero_multiplier = "M+H\t0\t1.007276\t1+\n";
        assert!(matches!(
            parse_adduct_list(zero_multiplier, Polarity::Positive),
            Err(AdductError::ZeroMultiplier(_))
        ));
    }

    #[test]
    fn test_select() {
        let table = AdductTable::builtin();
        let names = vec!["M+H".to_string(), "M-H".to_string()];
        let both: Vec<&str> = table
            .select(&names, 0)
            .unwrap()
            .iter()
            .map(|r| r.name.as_str())
            .collect();
        assert_eq!(both, vec!["M+H", "M-H"]);
        let positive = table.select(&names, 1).unwrap();
        assert_eq!(positive.len(), 1);
        assert_eq!(positive[0].name, "M+H");
        let negative = table.select(&names, -2).unwrap();
        assert_eq!(negative[0].name, "M-H");
        assert_eq!(table.select(&[], 1).unwrap().len(), 33);
        assert_eq!(table.select(&[], 0).unwrap().len(), table.len());
        assert!(matches!(
            table.select(&["M+Xe".to_string()], 0),
            Err(AdductError::NotFound(_))
        ));
    }

    #[test]
    fn test_rule_validation() {
        assert!(matches!(
            AdductRule::new("M", 0.0, 1.0, 0),
            Err(AdductError::ZeroCharge(_))
        ));
        assert!(matches!(
            AdductRule::new("M+H", 1.0, 0.0, 1),
            Err(AdductError::ZeroMultiplier(_))
        ));
        let rule = AdductRule::new("M-H", -1.007276, 1.0, -1).unwrap();
        assert_eq!(rule.polarity, Polarity::Negative);
        assert_eq!(rule.charge, -1);
    }

    #[test]
    fn test_global_table() {
        assert!(adduct_table().by_name("M+H").is_ok());
        assert!(matches!(
            install_adduct_table(AdductTable::builtin()),
            Err(AdductError::AlreadyInitialized)
        ));
    }
}

//! # Formula Module
//!
//! ## Purpose
//! Parses molecular formulae such as `C6H12O6` or `Ca(NO3)2` into an [`ElementComposition`]
//! and computes monoisotopic masses from the most abundant isotope of every element.
//!
//! ## Main Data Structures
//! - `Element`: element symbol with the mass of its most abundant isotope
//! - `ElementComposition`: ordered map element symbol -> signed count, with `+`/`-` arithmetic
//! - `FormulaError`: invalid compositions, unknown elements and malformed formula strings
//!
//! ## Key Logic
//! 1. **Tokenizing**: a regex splits the formula into element tokens with optional counts and
//!    brackets with optional multipliers; nested brackets are resolved with a stack
//! 2. **Arithmetic**: addition/subtraction never fails, subtraction may leave negative counts;
//!    such compositions are reported by `validate()` and refused by `monoisotopic_mass()`
//! 3. **Display**: Hill order (C, H, then alphabetical), so equal compositions print equal formulas

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;
use std::sync::LazyLock;
use thiserror::Error;

// Define a struct to hold element data
pub struct Element {
    name: &'static str,
    monoisotopic_mass: f64,
}

// most abundant isotope of every element found in metabolite databases
const ELEMENTS: &[Element] = &[
    Element {
        name: "H",
        monoisotopic_mass: 1.007_825_032_07,
    },
    Element {
        name: "He",
        monoisotopic_mass: 4.002_603_254_15,
    },
    Element {
        name: "Li",
        monoisotopic_mass: 7.016_004_55,
    },
    Element {
        name: "Be",
        monoisotopic_mass: 9.012_182_2,
    },
    Element {
        name: "B",
        monoisotopic_mass: 11.009_305_4,
    },
    Element {
        name: "C",
        monoisotopic_mass: 12.0,
    },
    Element {
        name: "N",
        monoisotopic_mass: 14.003_074_004_8,
    },
    Element {
        name: "O",
        monoisotopic_mass: 15.994_914_619_56,
    },
    Element {
        name: "F",
        monoisotopic_mass: 18.998_403_22,
    },
    Element {
        name: "Na",
        monoisotopic_mass: 22.989_769_280_9,
    },
    Element {
        name: "Mg",
        monoisotopic_mass: 23.985_041_7,
    },
    Element {
        name: "Al",
        monoisotopic_mass: 26.981_538_63,
    },
    Element {
        name: "Si",
        monoisotopic_mass: 27.976_926_532_5,
    },
    Element {
        name: "P",
        monoisotopic_mass: 30.973_761_63,
    },
    Element {
        name: "S",
        monoisotopic_mass: 31.972_071,
    },
    Element {
        name: "Cl",
        monoisotopic_mass: 34.968_852_68,
    },
    Element {
        name: "K",
        monoisotopic_mass: 38.963_706_68,
    },
    Element {
        name: "Ca",
        monoisotopic_mass: 39.962_590_98,
    },
    Element {
        name: "Ti",
        monoisotopic_mass: 47.947_946_3,
    },
    Element {
        name: "V",
        monoisotopic_mass: 50.943_959_5,
    },
    Element {
        name: "Cr",
        monoisotopic_mass: 51.940_507_5,
    },
    Element {
        name: "Mn",
        monoisotopic_mass: 54.938_045_1,
    },
    Element {
        name: "Fe",
        monoisotopic_mass: 55.934_937_5,
    },
    Element {
        name: "Co",
        monoisotopic_mass: 58.933_195,
    },
    Element {
        name: "Ni",
        monoisotopic_mass: 57.935_342_9,
    },
    Element {
        name: "Cu",
        monoisotopic_mass: 62.929_597_5,
    },
    Element {
        name: "Zn",
        monoisotopic_mass: 63.929_142_2,
    },
    Element {
        name: "As",
        monoisotopic_mass: 74.921_596_5,
    },
    Element {
        name: "Se",
        monoisotopic_mass: 79.916_521_3,
    },
    Element {
        name: "Br",
        monoisotopic_mass: 78.918_337_1,
    },
    Element {
        name: "Mo",
        monoisotopic_mass: 97.905_408_2,
    },
    Element {
        name: "Ag",
        monoisotopic_mass: 106.905_097,
    },
    Element {
        name: "Cd",
        monoisotopic_mass: 113.903_358_5,
    },
    Element {
        name: "Sn",
        monoisotopic_mass: 119.902_194_7,
    },
    Element {
        name: "I",
        monoisotopic_mass: 126.904_473,
    },
    Element {
        name: "W",
        monoisotopic_mass: 183.950_931,
    },
    Element {
        name: "Pt",
        monoisotopic_mass: 194.964_791_1,
    },
    Element {
        name: "Au",
        monoisotopic_mass: 196.966_568_7,
    },
    Element {
        name: "Hg",
        monoisotopic_mass: 201.970_643,
    },
    Element {
        name: "Pb",
        monoisotopic_mass: 207.976_652_1,
    },
];

pub const HALOGENS: [&str; 4] = ["F", "Cl", "Br", "I"];

// element symbol with optional count | opening bracket | closing bracket with optional multiplier
static TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([A-Z][a-z]?)(\d*)|\(|\)(\d*)").expect("formula token regex is valid")
});

#[derive(Debug, Error, Clone, PartialEq)]
pub enum FormulaError {
    #[error("Invalid composition: element {element} has negative count {count}")]
    InvalidComposition { element: String, count: i64 },
    #[error("Unknown element: {0}")]
    UnknownElement(String),
    #[error("Malformed formula: {0}")]
    MalformedFormula(String),
}

/// Monoisotopic mass of a single atom of `symbol`, `None` for unknown symbols.
pub fn element_mass(symbol: &str) -> Option<f64> {
    ELEMENTS
        .iter()
        .find(|element| element.name == symbol)
        .map(|element| element.monoisotopic_mass)
}

/// Elemental composition of a molecule: element symbol -> number of atoms.
/// Zero counts are never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementComposition(BTreeMap<String, i64>);

impl ElementComposition {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn from_counts<I, S>(counts: I) -> Self
    where
        I: IntoIterator<Item = (S, i64)>,
        S: Into<String>,
    {
        let mut map = BTreeMap::new();
        for (element, count) in counts {
            *map.entry(element.into()).or_insert(0) += count;
        }
        Self::normalized(map)
    }

    fn normalized(mut map: BTreeMap<String, i64>) -> Self {
        map.retain(|_, count| *count != 0);
        Self(map)
    }

    pub fn count(&self, element: &str) -> i64 {
        self.0.get(element).copied().unwrap_or(0)
    }

    pub fn elements(&self) -> impl Iterator<Item = (&str, i64)> {
        self.0.iter().map(|(element, count)| (element.as_str(), *count))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Fails with `InvalidComposition` on the first element with a negative count.
    pub fn validate(&self) -> Result<(), FormulaError> {
        match self.0.iter().find(|(_, count)| **count < 0) {
            Some((element, count)) => Err(FormulaError::InvalidComposition {
                element: element.clone(),
                count: *count,
            }),
            None => Ok(()),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Sum over elements of isotope mass x count.
    pub fn monoisotopic_mass(&self) -> Result<f64, FormulaError> {
        self.validate()?;
        let mut mass = 0.0;
        for (element, count) in self.0.iter() {
            let atomic_mass = element_mass(element)
                .ok_or_else(|| FormulaError::UnknownElement(element.clone()))?;
            mass += atomic_mass * *count as f64;
        }
        Ok(mass)
    }

    pub fn contains_halogen(&self) -> bool {
        HALOGENS.iter().any(|halogen| self.count(halogen) > 0)
    }
}

impl Add<&ElementComposition> for &ElementComposition {
    type Output = ElementComposition;

    fn add(self, other: &ElementComposition) -> ElementComposition {
        let mut map = self.0.clone();
        for (element, count) in other.0.iter() {
            *map.entry(element.clone()).or_insert(0) += count;
        }
        ElementComposition::normalized(map)
    }
}

impl Sub<&ElementComposition> for &ElementComposition {
    type Output = ElementComposition;

    fn sub(self, other: &ElementComposition) -> ElementComposition {
        let mut map = self.0.clone();
        for (element, count) in other.0.iter() {
            *map.entry(element.clone()).or_insert(0) -= count;
        }
        ElementComposition::normalized(map)
    }
}

fn write_element(f: &mut fmt::Formatter, element: &str, count: i64) -> fmt::Result {
    if count == 1 {
        write!(f, "{}", element)
    } else {
        write!(f, "{}{}", element, count)
    }
}

impl fmt::Display for ElementComposition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        // Hill order: carbon first, hydrogen second, everything else alphabetical
        let has_carbon = self.0.contains_key("C");
        if has_carbon {
            write_element(f, "C", self.count("C"))?;
            if self.0.contains_key("H") {
                write_element(f, "H", self.count("H"))?;
            }
        }
        for (element, count) in self.0.iter() {
            if has_carbon && (element == "C" || element == "H") {
                continue;
            }
            write_element(f, element, *count)?;
        }
        Ok(())
    }
}

impl FromStr for ElementComposition {
    type Err = FormulaError;

    fn from_str(formula: &str) -> Result<Self, Self::Err> {
        parse_formula(formula)
    }
}

fn parse_count(count: Option<regex::Match>, formula: &str) -> Result<i64, FormulaError> {
    match count.map(|m| m.as_str()) {
        None | Some("") => Ok(1),
        Some(digits) => digits
            .parse::<i64>()
            .map_err(|_| FormulaError::MalformedFormula(formula.to_string())),
    }
}

/// Parses a molecular formula. Whitespace is ignored, brackets may be nested and carry a
/// multiplier, e.g. `Ca(NO3)2` or `C6H4(CH3)2`.
pub fn parse_formula(formula: &str) -> Result<ElementComposition, FormulaError> {
    let cleaned: String = formula.chars().filter(|c| !c.is_whitespace()).collect();
    if cleaned.is_empty() {
        return Err(FormulaError::MalformedFormula(formula.to_string()));
    }
    let malformed = || FormulaError::MalformedFormula(formula.to_string());

    let mut stack: Vec<BTreeMap<String, i64>> = vec![BTreeMap::new()];
    let mut position = 0;
    for caps in TOKEN.captures_iter(&cleaned) {
        let Some(token) = caps.get(0) else {
            continue;
        };
        // any character the tokenizer skipped is garbage
        if token.start() != position {
            return Err(malformed());
        }
        position = token.end();

        if let Some(symbol) = caps.get(1) {
            if element_mass(symbol.as_str()).is_none() {
                return Err(FormulaError::UnknownElement(symbol.as_str().to_string()));
            }
            let count = parse_count(caps.get(2), formula)?;
            let current = stack.last_mut().ok_or_else(malformed)?;
            let total = current.entry(symbol.as_str().to_string()).or_insert(0);
            *total = total.checked_add(count).ok_or_else(malformed)?;
        } else if token.as_str() == "(" {
            stack.push(BTreeMap::new());
        } else {
            if stack.len() < 2 {
                return Err(malformed());
            }
            let group = stack.pop().ok_or_else(malformed)?;
            let multiplier = parse_count(caps.get(3), formula)?;
            let current = stack.last_mut().ok_or_else(malformed)?;
            for (element, count) in group {
                let added = count.checked_mul(multiplier).ok_or_else(malformed)?;
                let total = current.entry(element).or_insert(0);
                *total = total.checked_add(added).ok_or_else(malformed)?;
            }
        }
    }
    if position != cleaned.len() || stack.len() != 1 {
        return Err(malformed());
    }
    let counts = stack.pop().ok_or_else(malformed)?;
    Ok(ElementComposition::normalized(counts))
}

/// Parses the formula and returns its monoisotopic mass together with the composition.
pub fn calculate_monoisotopic_mass(
    formula: &str,
) -> Result<(f64, ElementComposition), FormulaError> {
    let composition = parse_formula(formula)?;
    let mass = composition.monoisotopic_mass()?;
    Ok((mass, composition))
}

/// True when the formula parses and contains F, Cl, Br or I.
pub fn formula_contains_halogen(formula: &str) -> bool {
    parse_formula(formula)
        .map(|composition| composition.contains_halogen())
        .unwrap_or(false)
}

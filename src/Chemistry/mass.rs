//! # Mass Algebra Module
//!
//! ## Purpose
//! Converts between the m/z observed by a mass spectrometer and the neutral monoisotopic mass of
//! the molecule that produced it, for a given adduct rule, and decides whether two masses agree
//! within an absolute or a ppm tolerance.
//!
//! ## Key Logic
//! - forward transform: `mz = (M * multiplier + mass_delta) / |z|`
//! - inverse transform: `M = (mz * |z| - mass_delta) / multiplier`
//! - `z` is the adduct's own charge unless the caller overrides it with a non-zero charge, in which
//!   case the override's magnitude is used and the adduct keeps its polarity
//! - ppm windows are taken relative to the larger of the two compared masses, which keeps
//!   `within_tolerance(a, b) == within_tolerance(b, a)`

use crate::Adducts::adduct_table::{AdductRule, Polarity};

pub const PROTON_MASS: f64 = 1.007_276_466_77;

// slack added to store range queries so that float rounding never drops a boundary candidate
const WINDOW_SLACK: f64 = 1e-9;

/// Signed charge actually applied to `rule` for a caller-supplied `charge` (0 = use the rule's own).
pub fn effective_charge(rule: &AdductRule, charge: i32) -> i32 {
    let magnitude = if charge != 0 {
        charge.abs()
    } else {
        rule.charge.abs()
    };
    match rule.polarity {
        Polarity::Positive => magnitude,
        Polarity::Negative => -magnitude,
    }
}

/// Neutral mass implied by an observed m/z under `rule`.
pub fn neutral_mass(observed_mz: f64, rule: &AdductRule, charge: i32) -> f64 {
    let z = effective_charge(rule, charge).unsigned_abs() as f64;
    (observed_mz * z - rule.mass_delta) / rule.multiplier
}

/// m/z at which a molecule of `neutral_mass` shows up under `rule`.
pub fn ion_mz(neutral_mass: f64, rule: &AdductRule, charge: i32) -> f64 {
    let z = effective_charge(rule, charge).unsigned_abs() as f64;
    (neutral_mass * rule.multiplier + rule.mass_delta) / z
}

/// Mass interval handed to the store; every mass accepted by `within_tolerance` lies inside it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToleranceWindow {
    pub low: f64,
    pub high: f64,
}

impl ToleranceWindow {
    pub fn contains(&self, mass: f64) -> bool {
        mass >= self.low && mass <= self.high
    }
}

pub fn tolerance_window(target_mass: f64, tolerance: f64, ppm: bool) -> ToleranceWindow {
    let tolerance = tolerance.abs();
    if ppm {
        let k = tolerance * 1e-6;
        let target = target_mass.abs();
        let high = if k < 1.0 {
            target / (1.0 - k)
        } else {
            f64::INFINITY
        };
        ToleranceWindow {
            low: target * (1.0 - k) - WINDOW_SLACK,
            high: high + WINDOW_SLACK,
        }
    } else {
        ToleranceWindow {
            low: target_mass - tolerance - WINDOW_SLACK,
            high: target_mass + tolerance + WINDOW_SLACK,
        }
    }
}

/// `|candidate - target| <= window`, the window being absolute mass units or ppm.
pub fn within_tolerance(candidate_mass: f64, target_mass: f64, tolerance: f64, ppm: bool) -> bool {
    let window = if ppm {
        candidate_mass.abs().max(target_mass.abs()) * tolerance.abs() * 1e-6
    } else {
        tolerance.abs()
    };
    (candidate_mass - target_mass).abs() <= window
}

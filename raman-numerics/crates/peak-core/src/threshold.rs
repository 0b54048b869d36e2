//! Peak height thresholds.

/// Fraction of the intensity span used by the automatic threshold.
pub const AUTO_THRESHOLD_FACTOR: f64 = 0.05;
/// Height cutoff for max-normalized series.
pub const NORMALIZED_HEIGHT: f64 = 0.05;
/// Extra vertical gap between tiers of a stacked view, as a fraction of
/// the unit tier height.
pub const STACK_SPACING: f64 = 0.3;

/// How the minimum peak height is chosen for a raw-intensity series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Threshold {
    /// A user-given height; the sign is ignored.
    Fixed(f64),
    /// `(max + |min|) · AUTO_THRESHOLD_FACTOR` of the series itself.
    Auto,
}

impl Threshold {
    pub fn from_option(fixed: Option<f64>) -> Self {
        match fixed {
            Some(t) => Threshold::Fixed(t),
            None => Threshold::Auto,
        }
    }

    /// Height cutoff for `series`. `None` only for an empty series under
    /// the automatic rule.
    pub fn resolve(&self, series: &[f64]) -> Option<f64> {
        match *self {
            Threshold::Fixed(t) => Some(t.abs()),
            Threshold::Auto => auto_threshold(series),
        }
    }
}

pub fn auto_threshold(series: &[f64]) -> Option<f64> {
    if series.is_empty() {
        return None;
    }
    let max = series.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = series.iter().copied().fold(f64::INFINITY, f64::min);
    Some((max + min.abs()) * AUTO_THRESHOLD_FACTOR)
}

/// Vertical offset of tier `tier` in a stacked view.
pub fn stacked_offset(tier: usize) -> f64 {
    let k = tier as f64;
    k + k * STACK_SPACING
}

/// Height cutoff for peaks of tier `tier` in a stacked view.
pub fn stacked_threshold(tier: usize) -> f64 {
    NORMALIZED_HEIGHT + stacked_offset(tier)
}

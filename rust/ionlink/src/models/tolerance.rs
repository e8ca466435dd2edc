use serde::{
    Deserialize,
    Serialize,
};

/// Tolerance for deciding that two mass (or m/z) values agree.
///
/// Convention: tolerances are expressed as positive half-widths. An
/// absolute tolerance of 1.01 on a mass of 1000 accepts [998.99, 1001.01].
///
/// The relative form mirrors the usual floating-point closeness test:
/// `|a - b| <= rtol * max(|a|, |b|)`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum MassTolerance {
    #[serde(rename = "da")]
    Absolute(f64),
    #[serde(rename = "relative")]
    Relative(f64),
}

/// Relative tolerance used when collapsing redundant feature rows.
pub const DEFAULT_REDUNDANCY_RTOL: f64 = 5e-6;

/// Absolute tolerance (in daltons) for cross-pipeline feature linkage.
///
/// Wide enough to span isotope-spacing ambiguity between independently
/// calibrated deconvolution and search pipelines.
pub const DEFAULT_LINKAGE_TOL: f64 = 1.01;

impl MassTolerance {
    pub fn matches(&self, a: f64, b: f64) -> bool {
        match self {
            Self::Absolute(tol) => (a - b).abs() <= *tol,
            Self::Relative(rtol) => (a - b).abs() <= rtol * a.abs().max(b.abs()),
        }
    }
}

/// Optional retention-time window, inclusive on both ends.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq)]
pub enum RtWindow {
    #[serde(rename = "minutes")]
    Minutes(f64),
    #[default]
    Unrestricted,
}

impl RtWindow {
    pub fn contains(&self, center: f64, candidate: f64) -> bool {
        match self {
            Self::Minutes(half_width) => (candidate - center).abs() <= *half_width,
            Self::Unrestricted => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_tolerance() {
        let tol = MassTolerance::Absolute(1.01);
        assert!(tol.matches(1000.0, 1001.0));
        assert!(tol.matches(1000.0, 999.0));
        assert!(!tol.matches(1000.0, 1001.02));
    }

    #[test]
    fn test_relative_tolerance() {
        let tol = MassTolerance::Relative(5e-6);
        assert!(tol.matches(1000.0, 1000.0));
        assert!(tol.matches(1000.0, 1000.004));
        assert!(!tol.matches(1000.0, 1000.1));
        // Symmetric in its arguments.
        assert_eq!(tol.matches(1000.004, 1000.0), tol.matches(1000.0, 1000.004));
    }

    #[test]
    fn test_rt_window_inclusive_ends() {
        let win = RtWindow::Minutes(1.0);
        assert!(win.contains(10.0, 11.0));
        assert!(win.contains(10.0, 9.0));
        assert!(!win.contains(10.0, 11.001));
        assert!(RtWindow::Unrestricted.contains(10.0, 1e9));
    }
}

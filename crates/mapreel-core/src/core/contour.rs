//! Strategies for choosing the surface threshold of a density map.
//!
//! Each [`ContourMethod`] is a pure function of the voxel statistics, except
//! [`ContourMethod::EngineNative`], which defers the choice to the rendering
//! engine and therefore needs no samples at all.

use crate::core::volume::samples::{VolumeError, VolumeSamples};
use phf::{Map, phf_map};
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const PERCENTILE: f64 = 99.0;
const RMSD_SIGMAS: f64 = 3.0;
const MAX_FRACTION: f64 = 0.3;

#[derive(Debug, Error, PartialEq)]
pub enum ContourError {
    #[error(
        "Unknown contour method '{0}'. Expected one of: 3sig, 6sig, 9sig, p99, rmsd, hybrid, abs30, MIT"
    )]
    UnknownMethod(String),
    #[error("Contour method '{0}' requires voxel samples but none were provided")]
    MissingSamples(ContourMethod),
    #[error("Statistics failed: {0}")]
    Statistics(#[from] VolumeError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContourMethod {
    /// `k * stddev` for k = 3.
    ThreeSigma,
    /// `k * stddev` for k = 6.
    SixSigma,
    /// `k * stddev` for k = 9.
    NineSigma,
    /// The 99th percentile of voxel values.
    Percentile99,
    /// `mean + 3 * stddev`.
    Rmsd,
    /// The smaller of [`Rmsd`](Self::Rmsd) and [`Percentile99`](Self::Percentile99).
    Hybrid,
    /// `0.3 * max`.
    AbsoluteFraction,
    /// Let the engine pick its own level.
    EngineNative,
}

static METHOD_NAMES: Map<&'static str, ContourMethod> = phf_map! {
    "3sig" => ContourMethod::ThreeSigma,
    "6sig" => ContourMethod::SixSigma,
    "9sig" => ContourMethod::NineSigma,
    "p99" => ContourMethod::Percentile99,
    "rmsd" => ContourMethod::Rmsd,
    "hybrid" => ContourMethod::Hybrid,
    "abs30" => ContourMethod::AbsoluteFraction,
    "MIT" => ContourMethod::EngineNative,
};

impl ContourMethod {
    pub const ALL: [ContourMethod; 8] = [
        Self::ThreeSigma,
        Self::SixSigma,
        Self::NineSigma,
        Self::Percentile99,
        Self::Rmsd,
        Self::Hybrid,
        Self::AbsoluteFraction,
        Self::EngineNative,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ThreeSigma => "3sig",
            Self::SixSigma => "6sig",
            Self::NineSigma => "9sig",
            Self::Percentile99 => "p99",
            Self::Rmsd => "rmsd",
            Self::Hybrid => "hybrid",
            Self::AbsoluteFraction => "abs30",
            Self::EngineNative => "MIT",
        }
    }

    pub fn requires_samples(self) -> bool {
        self != Self::EngineNative
    }
}

impl Default for ContourMethod {
    fn default() -> Self {
        Self::SixSigma
    }
}

impl fmt::Display for ContourMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContourMethod {
    type Err = ContourError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        METHOD_NAMES
            .get(s.trim())
            .copied()
            .ok_or_else(|| ContourError::UnknownMethod(s.to_string()))
    }
}

impl<'de> Deserialize<'de> for ContourMethod {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A resolved threshold: either a concrete value or a request for the
/// engine's own automatic level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ContourLevel {
    Explicit(f64),
    Deferred,
}

impl ContourLevel {
    pub fn value(self) -> Option<f64> {
        match self {
            Self::Explicit(v) => Some(v),
            Self::Deferred => None,
        }
    }
}

impl fmt::Display for ContourLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Explicit(v) => write!(f, "{}", v),
            Self::Deferred => f.write_str("engine-native"),
        }
    }
}

/// Narrows an estimate to the map's `f32` precision, keeping the shortest
/// decimal form of the narrowed value (`0.3`, not `0.30000001192092896`).
fn to_map_precision(level: f64) -> f64 {
    let narrowed = level as f32;
    narrowed
        .to_string()
        .parse()
        .unwrap_or_else(|_| f64::from(narrowed))
}

fn rmsd_level(samples: &VolumeSamples) -> f64 {
    samples.mean() + RMSD_SIGMAS * samples.stddev()
}

/// Computes a contour level for `samples` using `method`.
///
/// The result is narrowed to `f32`, the native precision of the map data.
/// Levels supplied by the caller as [`ContourLevel::Explicit`] are never narrowed.
///
/// # Errors
///
/// Returns [`ContourError::MissingSamples`] if the method needs voxel data and
/// `samples` is `None`.
pub fn estimate(
    method: ContourMethod,
    samples: Option<&VolumeSamples>,
) -> Result<ContourLevel, ContourError> {
    let level = match (method, samples) {
        (ContourMethod::EngineNative, _) => return Ok(ContourLevel::Deferred),
        (_, None) => return Err(ContourError::MissingSamples(method)),
        (ContourMethod::ThreeSigma, Some(s)) => 3.0 * s.stddev(),
        (ContourMethod::SixSigma, Some(s)) => 6.0 * s.stddev(),
        (ContourMethod::NineSigma, Some(s)) => 9.0 * s.stddev(),
        (ContourMethod::Percentile99, Some(s)) => s.percentile(PERCENTILE)?,
        (ContourMethod::Rmsd, Some(s)) => rmsd_level(s),
        (ContourMethod::Hybrid, Some(s)) => rmsd_level(s).min(s.percentile(PERCENTILE)?),
        (ContourMethod::AbsoluteFraction, Some(s)) => MAX_FRACTION * s.max(),
    };

    Ok(ContourLevel::Explicit(to_map_precision(level)))
}

/// Voxel statistics together with the level every sample-based method would choose.
#[derive(Debug, Clone, PartialEq)]
pub struct ContourReport {
    pub voxel_count: usize,
    pub mean: f64,
    pub stddev: f64,
    pub min: f64,
    pub max: f64,
    pub levels: Vec<(ContourMethod, f64)>,
}

impl ContourReport {
    pub fn from_samples(samples: &VolumeSamples) -> Result<Self, ContourError> {
        let levels = ContourMethod::ALL
            .into_iter()
            .filter(|m| m.requires_samples())
            .map(|m| {
                let level = estimate(m, Some(samples))?;
                Ok((m, level.value().unwrap_or_default()))
            })
            .collect::<Result<Vec<_>, ContourError>>()?;

        Ok(Self {
            voxel_count: samples.len(),
            mean: samples.mean(),
            stddev: samples.stddev(),
            min: samples.min(),
            max: samples.max(),
            levels,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn explicit(level: ContourLevel) -> f64 {
        level.value().expect("expected an explicit level")
    }

    fn approx_equal(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    // mean = 0.1, population stddev = 0.05
    fn known_samples() -> VolumeSamples {
        VolumeSamples::from_values(vec![0.05, 0.15, 0.05, 0.15]).unwrap()
    }

    fn ramp_samples() -> VolumeSamples {
        VolumeSamples::new([10, 10, 1], (0..100).map(|i| i as f32 / 100.0).collect()).unwrap()
    }

    #[test]
    fn engine_native_defers_without_samples() {
        assert_eq!(
            estimate(ContourMethod::EngineNative, None),
            Ok(ContourLevel::Deferred)
        );
        assert_eq!(
            estimate(ContourMethod::EngineNative, Some(&known_samples())),
            Ok(ContourLevel::Deferred)
        );
    }

    #[test]
    fn sample_based_methods_require_samples() {
        assert_eq!(
            estimate(ContourMethod::Hybrid, None),
            Err(ContourError::MissingSamples(ContourMethod::Hybrid))
        );
    }

    #[test]
    fn sigma_and_rmsd_levels_match_known_statistics() {
        let samples = known_samples();
        let six = explicit(estimate(ContourMethod::SixSigma, Some(&samples)).unwrap());
        let rmsd = explicit(estimate(ContourMethod::Rmsd, Some(&samples)).unwrap());
        let three = explicit(estimate(ContourMethod::ThreeSigma, Some(&samples)).unwrap());
        let nine = explicit(estimate(ContourMethod::NineSigma, Some(&samples)).unwrap());

        assert!(approx_equal(six, 0.3));
        assert!(approx_equal(rmsd, 0.25));
        assert!(approx_equal(three, 0.15));
        assert!(approx_equal(nine, 0.45));
    }

    #[test]
    fn percentile_and_fraction_of_max_on_ramp() {
        let samples = ramp_samples();
        let p99 = explicit(estimate(ContourMethod::Percentile99, Some(&samples)).unwrap());
        let abs30 = explicit(estimate(ContourMethod::AbsoluteFraction, Some(&samples)).unwrap());

        // rank = 0.99 * 99 = 98.01 -> 0.98 + 0.01 * 0.01
        assert!(approx_equal(p99, 0.9801));
        assert!(approx_equal(abs30, 0.297));
    }

    #[test]
    fn estimates_print_in_map_precision_and_explicit_levels_are_kept() {
        let six = estimate(ContourMethod::SixSigma, Some(&known_samples())).unwrap();
        assert_eq!(six.to_string(), "0.3");

        let user = ContourLevel::Explicit(0.123456789);
        assert_eq!(user.to_string(), "0.123456789");
        assert_eq!(user.value(), Some(0.123456789));
    }

    #[test]
    fn hybrid_is_the_minimum_of_rmsd_and_p99() {
        for samples in [known_samples(), ramp_samples()] {
            let hybrid = explicit(estimate(ContourMethod::Hybrid, Some(&samples)).unwrap());
            let rmsd = explicit(estimate(ContourMethod::Rmsd, Some(&samples)).unwrap());
            let p99 = explicit(estimate(ContourMethod::Percentile99, Some(&samples)).unwrap());

            assert!(hybrid <= rmsd);
            assert!(hybrid <= p99);
            assert!(hybrid == rmsd || hybrid == p99);
        }
    }

    #[test]
    fn estimates_are_deterministic() {
        let samples = ramp_samples();
        for method in ContourMethod::ALL {
            let first = estimate(method, Some(&samples)).unwrap();
            let second = estimate(method, Some(&samples.clone())).unwrap();
            match (first, second) {
                (ContourLevel::Explicit(a), ContourLevel::Explicit(b)) => {
                    assert_eq!(a.to_bits(), b.to_bits())
                }
                (a, b) => assert_eq!(a, b),
            }
        }
    }

    #[test]
    fn non_negative_grids_yield_non_negative_levels() {
        let grids = [
            known_samples(),
            ramp_samples(),
            VolumeSamples::from_values(vec![0.0; 8]).unwrap(),
            VolumeSamples::from_values(vec![0.0, 0.0, 0.0, 12.5]).unwrap(),
        ];
        for samples in &grids {
            for method in ContourMethod::ALL.into_iter().filter(|m| m.requires_samples()) {
                let level = explicit(estimate(method, Some(samples)).unwrap());
                assert!(level >= 0.0, "{} produced {}", method, level);
            }
        }
    }

    #[test]
    fn method_names_round_trip_and_unknown_names_fail() {
        for method in ContourMethod::ALL {
            assert_eq!(method.as_str().parse::<ContourMethod>(), Ok(method));
        }
        assert_eq!(
            "median".parse::<ContourMethod>(),
            Err(ContourError::UnknownMethod("median".to_string()))
        );
        assert_eq!(ContourMethod::default(), ContourMethod::SixSigma);
    }

    #[test]
    fn report_covers_every_sample_based_method() {
        let report = ContourReport::from_samples(&known_samples()).unwrap();
        assert_eq!(report.voxel_count, 4);
        assert_eq!(report.levels.len(), 7);
        assert!(
            report
                .levels
                .iter()
                .all(|(m, _)| *m != ContourMethod::EngineNative)
        );
    }
}

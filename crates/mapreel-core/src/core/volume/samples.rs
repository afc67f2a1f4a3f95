use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum VolumeError {
    #[error("Volume contains no voxels")]
    Empty,
    #[error(
        "Grid dimensions {nx}x{ny}x{nz} do not match the number of voxels ({count})"
    )]
    DimensionMismatch {
        nx: usize,
        ny: usize,
        nz: usize,
        count: usize,
    },
    #[error("Percentile must lie within [0, 100], got {0}")]
    InvalidPercentile(f64),
}

/// An immutable 3-D grid of voxel intensities, stored in file order
/// (x fastest, then y, then z).
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeSamples {
    dimensions: [usize; 3],
    values: Vec<f32>,
}

impl VolumeSamples {
    pub fn new(dimensions: [usize; 3], values: Vec<f32>) -> Result<Self, VolumeError> {
        if values.is_empty() {
            return Err(VolumeError::Empty);
        }
        let [nx, ny, nz] = dimensions;
        if nx.checked_mul(ny).and_then(|v| v.checked_mul(nz)) != Some(values.len()) {
            return Err(VolumeError::DimensionMismatch {
                nx,
                ny,
                nz,
                count: values.len(),
            });
        }
        Ok(Self { dimensions, values })
    }

    /// Wraps a flat list of samples as an `n x 1 x 1` grid.
    pub fn from_values(values: Vec<f32>) -> Result<Self, VolumeError> {
        let len = values.len();
        Self::new([len, 1, 1], values)
    }

    pub fn dimensions(&self) -> [usize; 3] {
        self.dimensions
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn mean(&self) -> f64 {
        let sum: f64 = self.values.iter().map(|&v| f64::from(v)).sum();
        sum / self.values.len() as f64
    }

    /// Population standard deviation (no Bessel correction).
    pub fn stddev(&self) -> f64 {
        let mean = self.mean();
        let sum_sq: f64 = self
            .values
            .iter()
            .map(|&v| {
                let d = f64::from(v) - mean;
                d * d
            })
            .sum();
        (sum_sq / self.values.len() as f64).sqrt()
    }

    pub fn max(&self) -> f64 {
        f64::from(self.values.iter().copied().fold(f32::NEG_INFINITY, f32::max))
    }

    pub fn min(&self) -> f64 {
        f64::from(self.values.iter().copied().fold(f32::INFINITY, f32::min))
    }

    /// The `p`-th percentile, linearly interpolated between the two nearest
    /// order statistics at rank `p / 100 * (n - 1)`.
    pub fn percentile(&self, p: f64) -> Result<f64, VolumeError> {
        if !(0.0..=100.0).contains(&p) {
            return Err(VolumeError::InvalidPercentile(p));
        }

        let mut sorted = self.values.clone();
        sorted.sort_unstable_by(f32::total_cmp);

        let rank = p / 100.0 * (sorted.len() - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = rank.ceil() as usize;
        let low_value = f64::from(sorted[lower]);
        let high_value = f64::from(sorted[upper]);

        Ok(low_value + (high_value - low_value) * (rank - lower as f64))
    }
}

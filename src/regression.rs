//! Ordinary least squares of every masked voxel series against the
//! independent values.
//!
//! For a series y over independent values t:
//!
//! ```text
//! slope     = SS_ty / SS_tt
//! intercept = ȳ − slope · t̄
//! r         = SS_ty / √(SS_tt · SS_yy)
//! ```
//!
//! with SS_tt = Σ(tᵢ − t̄)², SS_ty = Σ(tᵢ − t̄)(yᵢ − ȳ) and SS_yy = Σ(yᵢ − ȳ)².
//! A constant series has r = 0. When SS_tt = 0 no line can be fitted and the
//! voxel gets the value chosen by [`DegenerateFit`].

use crate::{
    enums::{DegenerateFit, OutputMap},
    error::RegressionError,
    independent_values::IndependentValues,
    volume::{Mask3D, Volume4D, validate},
};

use ndarray::{Array3, Array4, ArrayView1, Axis, Zip};
use nifti::NiftiHeader;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{Level, debug, warn};

/// Fit of a single voxel series
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RegressionResult {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
}

impl RegressionResult {
    /// Value of voxels outside the mask
    pub const ZERO: RegressionResult = RegressionResult {
        slope: 0.0,
        intercept: 0.0,
        r_squared: 0.0,
    };

    pub fn degenerate(policy: DegenerateFit) -> Self {
        match policy {
            DegenerateFit::Zero => Self::ZERO,
            DegenerateFit::NaN => RegressionResult {
                slope: f64::NAN,
                intercept: f64::NAN,
                r_squared: f64::NAN,
            },
        }
    }
}

/// Independent-value statistics shared by every voxel of a pass
#[derive(Debug)]
pub struct SeriesFitter<'a> {
    t: &'a [f64],
    t_mean: f64,
    ss_tt: f64,
    degenerate: DegenerateFit,
}

impl<'a> SeriesFitter<'a> {
    pub fn new(values: &'a IndependentValues, degenerate: DegenerateFit) -> Self {
        Self {
            t: values.as_slice(),
            t_mean: values.mean(),
            ss_tt: values.sum_sq_dev(),
            degenerate,
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.ss_tt == 0.0
    }

    /// Fit `series` (dependent) against the independent values.
    ///
    /// A series whose length differs from the independent values is treated
    /// like a degenerate fit; [`regress_volume`] rules this out up front.
    pub fn fit(&self, series: ArrayView1<'_, f64>) -> RegressionResult {
        if self.is_degenerate() || series.len() != self.t.len() {
            return RegressionResult::degenerate(self.degenerate);
        }

        let first = series[0];
        if series.iter().all(|&y| y == first) {
            return RegressionResult {
                slope: 0.0,
                intercept: first,
                r_squared: 0.0,
            };
        }

        let y_mean = series.sum() / series.len() as f64;
        let (ss_ty, ss_yy) = self
            .t
            .iter()
            .zip(series.iter())
            .fold((0.0, 0.0), |(ss_ty, ss_yy), (&t, &y)| {
                let dt = t - self.t_mean;
                let dy = y - y_mean;
                (dt.mul_add(dy, ss_ty), dy.mul_add(dy, ss_yy))
            });

        // Deviations too small to square are treated as a constant series
        if ss_yy == 0.0 {
            return RegressionResult {
                slope: 0.0,
                intercept: y_mean,
                r_squared: 0.0,
            };
        }

        let slope = ss_ty / self.ss_tt;
        let intercept = slope.mul_add(-self.t_mean, y_mean);
        // NaN samples leave ss_yy NaN and flow through to r
        let r = (ss_ty / (self.ss_tt * ss_yy).sqrt()).clamp(-1.0, 1.0);

        RegressionResult {
            slope,
            intercept,
            r_squared: r * r,
        }
    }
}

/// Slope, intercept and R² maps of shape (X, Y, Z, 1) with the source header
#[derive(Clone, Debug)]
pub struct RegressionMaps {
    slope: Array4<f64>,
    intercept: Array4<f64>,
    r_squared: Array4<f64>,
    header: NiftiHeader,
}

impl RegressionMaps {
    fn new(
        slope: Array3<f64>,
        intercept: Array3<f64>,
        r_squared: Array3<f64>,
        header: NiftiHeader,
    ) -> Self {
        Self {
            slope: slope.insert_axis(Axis(3)),
            intercept: intercept.insert_axis(Axis(3)),
            r_squared: r_squared.insert_axis(Axis(3)),
            header,
        }
    }

    pub fn slope(&self) -> &Array4<f64> {
        &self.slope
    }

    pub fn intercept(&self) -> &Array4<f64> {
        &self.intercept
    }

    pub fn r_squared(&self) -> &Array4<f64> {
        &self.r_squared
    }

    pub fn map(&self, map: OutputMap) -> &Array4<f64> {
        match map {
            OutputMap::Slope => &self.slope,
            OutputMap::Intercept => &self.intercept,
            OutputMap::RSquared => &self.r_squared,
        }
    }

    /// Header of the source volume
    pub fn header(&self) -> &NiftiHeader {
        &self.header
    }

    /// (x, y, z, 1)
    pub fn dim(&self) -> (usize, usize, usize, usize) {
        self.slope.dim()
    }

    pub fn get(&self, x: usize, y: usize, z: usize) -> Option<RegressionResult> {
        Some(RegressionResult {
            slope: *self.slope.get((x, y, z, 0))?,
            intercept: *self.intercept.get((x, y, z, 0))?,
            r_squared: *self.r_squared.get((x, y, z, 0))?,
        })
    }

    /// Voxel counts and mean R² over the finite fits inside `mask`
    pub fn summarize(&self, mask: &Mask3D) -> RegressionSummary {
        let mut masked = 0;
        let mut finite = 0;
        let mut sum_r_squared = 0.0;
        Zip::from(mask.data())
            .and(self.r_squared.index_axis(Axis(3), 0))
            .for_each(|&inside, &r_squared| {
                if inside {
                    masked += 1;
                    if r_squared.is_finite() {
                        finite += 1;
                        sum_r_squared += r_squared;
                    }
                }
            });

        RegressionSummary {
            voxels: mask.data().len(),
            masked,
            mean_r_squared: if finite > 0 {
                sum_r_squared / finite as f64
            } else {
                0.0
            },
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RegressionSummary {
    pub voxels: usize,
    pub masked: usize,
    pub mean_r_squared: f64,
}

/// Emits a debug event roughly every tenth of the grid.
///
/// Only built when debug events are enabled.
struct Progress {
    total: usize,
    step: usize,
    visited: AtomicUsize,
}

impl Progress {
    fn new(total: usize) -> Self {
        Self {
            total,
            step: (total / 10).max(1),
            visited: AtomicUsize::new(0),
        }
    }

    fn tick(&self) {
        let done = self.visited.fetch_add(1, Ordering::Relaxed) + 1;
        if done % self.step == 0 || done == self.total {
            debug!(done, total = self.total, "regressing voxels");
        }
    }

    fn visited(&self) -> usize {
        self.visited.load(Ordering::Relaxed)
    }
}

/// Every fatal precondition of [`regress_volume`]
pub fn check_inputs(
    volume: &Volume4D,
    mask: &Mask3D,
    values: &IndependentValues,
) -> Result<(), RegressionError> {
    validate(volume, mask)?;
    if values.len() != volume.timepoints() {
        return Err(RegressionError::LengthMismatch {
            values: values.len(),
            timepoints: volume.timepoints(),
        });
    }
    Ok(())
}

/// Fit every voxel inside `mask`; voxels outside stay at zero.
///
/// Runs on the current rayon pool. Each voxel writes a single disjoint cell
/// of the three output arrays.
///
/// # Errors
///
/// `ShapeMismatch` if the mask grid differs from the volume grid and
/// `LengthMismatch` if there is not exactly one independent value per
/// timepoint. Nothing is computed in either case.
pub fn regress_volume(
    volume: &Volume4D,
    mask: &Mask3D,
    values: &IndependentValues,
    degenerate: DegenerateFit,
) -> Result<RegressionMaps, RegressionError> {
    check_inputs(volume, mask, values)?;

    let fitter = SeriesFitter::new(values, degenerate);
    if fitter.is_degenerate() {
        warn!(
            policy = ?degenerate,
            "independent values have zero variance, masked voxels get the degenerate value"
        );
    }

    let spatial = volume.spatial_dim();
    let mut slope = Array3::<f64>::zeros(spatial);
    let mut intercept = Array3::<f64>::zeros(spatial);
    let mut r_squared = Array3::<f64>::zeros(spatial);
    let progress =
        tracing::enabled!(Level::DEBUG).then(|| Progress::new(spatial.0 * spatial.1 * spatial.2));

    Zip::from(&mut slope)
        .and(&mut intercept)
        .and(&mut r_squared)
        .and(mask.data())
        .and(volume.data().lanes(Axis(3)))
        .par_for_each(|slope, intercept, r_squared, &inside, series| {
            if inside {
                let fit = fitter.fit(series);
                *slope = fit.slope;
                *intercept = fit.intercept;
                *r_squared = fit.r_squared;
            }
            if let Some(progress) = &progress {
                progress.tick();
            }
        });

    if let Some(progress) = &progress {
        debug_assert_eq!(progress.visited(), progress.total);
    }

    Ok(RegressionMaps::new(
        slope,
        intercept,
        r_squared,
        volume.header().clone(),
    ))
}

//! # voxel-regression
//!
//! Per-voxel linear regression across a 4D image series.
//!
//! Every voxel inside a binary mask gets an ordinary least squares fit of its
//! T-length series against a list of independent values (echo times,
//! acquisition times, ...). The result is three maps with the geometry of the
//! source series:
//!  - slope
//!  - intercept
//!  - R² (squared Pearson correlation)
//!
//! Voxels outside the mask are zero. The voxel pass runs in parallel using
//! rayon; voxels share no state and each one writes a single output cell.
//!
//! Independent values are matched to the T axis by position, so the values
//! file has to list them in acquisition order. Values that are not ascending
//! are rejected unless [`ValueOrdering::Sort`] is requested.
//!
//! When the independent values have zero variance no line can be fitted; such
//! voxels are written as zero by default or as NaN with
//! [`DegenerateFit::NaN`].
//!
//! # Examples
//!
//! ## Regressing an in-memory series
//!
//! ```
//! # use voxel_regression::{DegenerateFit, IndependentValues, Mask3D, Volume4D, regress_volume};
//! # use ndarray::{Array3, Array4};
//! let volume = Volume4D::from_array(Array4::from_shape_fn((2, 2, 1, 3), |(_, _, _, t)| {
//!     1.0 + 2.0 * t as f64
//! }));
//! let mask = Mask3D::new(Array3::from_elem((2, 2, 1), true));
//! let values = IndependentValues::new(vec![0.0, 1.0, 2.0]).unwrap();
//!
//! let maps = regress_volume(&volume, &mask, &values, DegenerateFit::Zero).unwrap();
//! let fit = maps.get(0, 0, 0).unwrap();
//! assert!((fit.slope - 2.0).abs() < 1e-12);
//! assert!((fit.intercept - 1.0).abs() < 1e-12);
//! ```
//!
//! ## Running on NIfTI files
//!
//! ```no_run
//! # use voxel_regression::{RegressionConfig, RegressionJob};
//! # async fn run() -> Result<(), voxel_regression::PipelineError> {
//! let job = RegressionJob {
//!     volume_path: "sub-01_phase.nii.gz".into(),
//!     mask_path: "sub-01_mask.nii.gz".into(),
//!     values_path: "echo_times.txt".into(),
//!     output_name: "out/sub-01".into(),
//!     config: RegressionConfig::default(),
//! };
//! // writes out/sub-01_slope.nii.gz, out/sub-01_intercept.nii.gz and
//! // out/sub-01_r_squared.nii.gz
//! let _report = job.run().await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod enums;
pub mod error;
pub mod independent_values;
pub mod pipeline;
pub mod regression;
pub mod telemetry;
pub mod volume;
pub mod volume_loader;
pub mod volume_writer;

pub use config::RegressionConfig;
pub use enums::{DegenerateFit, OutputFormat, OutputMap, ValueOrdering};
pub use error::RegressionError;
pub use independent_values::IndependentValues;
pub use pipeline::{PipelineError, RegressionInputs, RegressionJob, RunReport};
pub use regression::{RegressionMaps, RegressionResult, RegressionSummary, regress_volume};
pub use volume::{Mask3D, Volume4D, validate};
pub use volume_loader::{VolumeLoader, VolumeLoaderError};
pub use volume_writer::{VolumeWriter, VolumeWriterError};

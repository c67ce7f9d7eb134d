use crate::{
    config::RegressionConfig,
    error::RegressionError,
    independent_values::IndependentValues,
    regression::{RegressionMaps, RegressionSummary, check_inputs, regress_volume},
    volume::{Mask3D, Volume4D},
    volume_loader::{VolumeLoader, VolumeLoaderError},
    volume_writer::{VolumeWriter, VolumeWriterError},
};

use std::path::PathBuf;
use thiserror::Error;
use tracing::info;
use web_time::Instant;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Load(#[from] VolumeLoaderError),

    #[error(transparent)]
    Regression(#[from] RegressionError),

    #[error(transparent)]
    Write(#[from] VolumeWriterError),

    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Everything a regression pass needs, fully in memory
#[derive(Clone, Debug)]
pub struct RegressionInputs {
    pub volume: Volume4D,
    pub mask: Mask3D,
    pub values: IndependentValues,
}

impl RegressionInputs {
    /// Run every fatal check without computing anything
    pub fn validate(&self) -> Result<(), RegressionError> {
        check_inputs(&self.volume, &self.mask, &self.values)
    }

    /// Regress on the global pool, or a dedicated one when `config.threads` is set
    pub fn regress(&self, config: &RegressionConfig) -> Result<RegressionMaps, PipelineError> {
        let maps = match config.threads {
            Some(threads) => rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()?
                .install(|| regress_volume(&self.volume, &self.mask, &self.values, config.degenerate))?,
            None => regress_volume(&self.volume, &self.mask, &self.values, config.degenerate)?,
        };
        Ok(maps)
    }
}

/// One invocation: three input files and an output name prefix
#[derive(Clone, Debug)]
pub struct RegressionJob {
    pub volume_path: PathBuf,
    pub mask_path: PathBuf,
    pub values_path: PathBuf,
    pub output_name: PathBuf,
    pub config: RegressionConfig,
}

#[derive(Clone, Debug)]
pub struct RunReport {
    pub outputs: Vec<PathBuf>,
    pub summary: RegressionSummary,
}

impl RegressionJob {
    /// Load the three inputs concurrently on blocking tasks
    pub async fn load(&self) -> Result<RegressionInputs, PipelineError> {
        let volume_path = self.volume_path.clone();
        let mask_path = self.mask_path.clone();
        let values_path = self.values_path.clone();
        let ordering = self.config.ordering;

        let volume = tokio::task::spawn_blocking(move || VolumeLoader::load_volume(volume_path));
        let mask = tokio::task::spawn_blocking(move || VolumeLoader::load_mask(mask_path));
        let values = tokio::task::spawn_blocking(move || {
            VolumeLoader::load_independent_values(values_path, ordering)
        });

        let (volume, mask, values) = futures::try_join!(volume, mask, values)?;
        Ok(RegressionInputs {
            volume: volume?,
            mask: mask?,
            values: values?,
        })
    }

    /// Load, validate, regress and write.
    ///
    /// Nothing is written unless loading and validation succeed.
    pub async fn run(&self) -> Result<RunReport, PipelineError> {
        let start = Instant::now();
        let inputs = self.load().await?;
        inputs.validate()?;

        info!(
            shape = ?inputs.volume.dim(),
            masked = inputs.mask.count(),
            elapsed = ?start.elapsed(),
            "inputs loaded"
        );

        let start = Instant::now();
        let config = self.config;
        let (maps, summary) = tokio::task::spawn_blocking(move || {
            let maps = inputs.regress(&config)?;
            let summary = maps.summarize(&inputs.mask);
            Ok::<_, PipelineError>((maps, summary))
        })
        .await??;
        info!(
            masked = summary.masked,
            mean_r_squared = summary.mean_r_squared,
            elapsed = ?start.elapsed(),
            "regression finished"
        );

        let output_name = self.output_name.clone();
        let format = self.config.format;
        let outputs = tokio::task::spawn_blocking(move || {
            VolumeWriter::write_maps(&maps, &output_name, format)
        })
        .await??;
        for path in &outputs {
            info!(path = %path.display(), "wrote");
        }

        Ok(RunReport { outputs, summary })
    }
}

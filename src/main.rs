use std::{path::PathBuf, process::ExitCode};

use clap::Parser;
use tracing::error;
use voxel_regression::{
    DegenerateFit, OutputFormat, RegressionConfig, RegressionJob, ValueOrdering,
    telemetry::init_tracing,
};

/// Per-voxel linear regression of a 4D NIfTI series against independent values
#[derive(Parser)]
#[command(name = "voxel-regression", version, about)]
struct Cli {
    /// 4D NIfTI series (.nii or .nii.gz)
    volume_file: PathBuf,

    /// 3D binary mask with the spatial shape of the series
    mask_file: PathBuf,

    /// Text file with one independent value per volume, in acquisition order
    independent_values_file: PathBuf,

    /// Prefix of the outputs: <output_name>_slope, _intercept and _r_squared
    output_name: PathBuf,

    /// Sort the independent values instead of requiring ascending order
    #[arg(long)]
    sort_values: bool,

    /// Value written for masked voxels when the independent values are all equal
    #[arg(long, value_enum, default_value_t = DegenerateFit::Zero)]
    degenerate: DegenerateFit,

    /// Worker threads for the voxel pass (default: one per core)
    #[arg(long)]
    threads: Option<usize>,

    /// Output file format
    #[arg(long, value_enum, default_value_t = OutputFormat::NiiGz)]
    format: OutputFormat,

    /// Log debug output, including voxel progress
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn job(self) -> RegressionJob {
        let ordering = if self.sort_values {
            ValueOrdering::Sort
        } else {
            ValueOrdering::Validate
        };
        let config = RegressionConfig::new()
            .with_ordering(ordering)
            .with_degenerate(self.degenerate)
            .with_threads(self.threads)
            .with_format(self.format);

        RegressionJob {
            volume_path: self.volume_file,
            mask_path: self.mask_file,
            values_path: self.independent_values_file,
            output_name: self.output_name,
            config,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let directive = if cli.verbose { "debug" } else { "info" };
    if let Err(err) = init_tracing(directive) {
        eprintln!("warning: {err}");
    }

    match cli.job().run().await {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

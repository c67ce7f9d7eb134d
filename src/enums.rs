use clap::ValueEnum;

/// How the independent values read from disk are matched to the T axis
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum ValueOrdering {
    /// File order is T-axis order; values must be non-decreasing
    #[default]
    Validate,
    /// Sort ascending regardless of file order
    Sort,
}

/// Value written for masked voxels when the independent values have zero variance
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum DegenerateFit {
    #[default]
    Zero,
    #[value(name = "nan")]
    NaN,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputMap {
    Slope,
    Intercept,
    RSquared,
}

impl OutputMap {
    pub const ALL: [OutputMap; 3] = [OutputMap::Slope, OutputMap::Intercept, OutputMap::RSquared];

    /// Suffix appended to the output name, e.g. `sub-01_slope`
    pub fn suffix(self) -> &'static str {
        match self {
            OutputMap::Slope => "slope",
            OutputMap::Intercept => "intercept",
            OutputMap::RSquared => "r_squared",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Gzip compressed single file (.nii.gz)
    #[default]
    NiiGz,
    /// Uncompressed single file (.nii)
    Nii,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::NiiGz => "nii.gz",
            OutputFormat::Nii => "nii",
        }
    }
}

use crate::{
    enums::{OutputFormat, OutputMap},
    regression::RegressionMaps,
};

use ndarray::Array4;
use nifti::{NiftiHeader, error::NiftiError, writer::WriterOptions};
use std::{
    ffi::OsString,
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum VolumeWriterError {
    #[error("IO error writing '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("NIfTI error writing '{path}': {source}")]
    Nifti {
        path: PathBuf,
        #[source]
        source: NiftiError,
    },
}

pub struct VolumeWriter;

impl VolumeWriter {
    /// `<output_name>_<suffix>.<ext>`, e.g. `out/sub-01_r_squared.nii.gz`
    pub fn output_path(output_name: impl AsRef<Path>, map: OutputMap, format: OutputFormat) -> PathBuf {
        let mut name = OsString::from(output_name.as_ref().as_os_str());
        name.push(format!("_{}.{}", map.suffix(), format.extension()));
        PathBuf::from(name)
    }

    /// Header for a derived map: the source geometry with identity scaling.
    ///
    /// Affine, orientation codes and voxel sizes are kept as they are;
    /// dimensions and data type are filled in by the writer from the array.
    pub fn output_header(source: &NiftiHeader) -> NiftiHeader {
        let mut header = source.clone();
        header.scl_slope = 1.0;
        header.scl_inter = 0.0;
        header.cal_min = 0.0;
        header.cal_max = 0.0;
        header
    }

    /// Write one map as 32-bit float with the given header as reference
    pub fn write_map(
        path: impl AsRef<Path>,
        data: &Array4<f64>,
        header: &NiftiHeader,
    ) -> Result<(), VolumeWriterError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| VolumeWriterError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let data = data.mapv(|v| v as f32);
        WriterOptions::new(path)
            .reference_header(header)
            .write_nifti(&data)
            .map_err(|source| VolumeWriterError::Nifti {
                path: path.to_path_buf(),
                source,
            })?;

        debug!(path = %path.display(), shape = ?data.dim(), "wrote map");
        Ok(())
    }

    /// Write slope, intercept and R² next to each other
    ///
    /// Returns the written paths in [`OutputMap::ALL`] order.
    pub fn write_maps(
        maps: &RegressionMaps,
        output_name: impl AsRef<Path>,
        format: OutputFormat,
    ) -> Result<Vec<PathBuf>, VolumeWriterError> {
        let header = Self::output_header(maps.header());
        OutputMap::ALL
            .iter()
            .map(|&map| -> Result<PathBuf, VolumeWriterError> {
                let path = Self::output_path(output_name.as_ref(), map, format);
                Self::write_map(&path, maps.map(map), &header)?;
                Ok(path)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::volume_loader::VolumeLoader;

    fn oblique_header() -> NiftiHeader {
        let mut header = NiftiHeader::default();
        header.sform_code = 1;
        header.qform_code = 1;
        header.srow_x = [0.9, 0.1, 0.0, -90.0];
        header.srow_y = [-0.1, 0.9, 0.0, -126.0];
        header.srow_z = [0.0, 0.0, 2.0, -72.0];
        header.pixdim = [1.0, 0.9, 0.9, 2.0, 0.02, 1.0, 1.0, 1.0];
        header.scl_slope = 2.0;
        header.scl_inter = 5.0;
        header
    }

    #[test]
    fn test_output_path() {
        assert_eq!(
            VolumeWriter::output_path("out/sub-01", OutputMap::Slope, OutputFormat::NiiGz),
            PathBuf::from("out/sub-01_slope.nii.gz")
        );
        assert_eq!(
            VolumeWriter::output_path("fit", OutputMap::RSquared, OutputFormat::Nii),
            PathBuf::from("fit_r_squared.nii")
        );
        assert_eq!(
            VolumeWriter::output_path("fit.v2", OutputMap::Intercept, OutputFormat::Nii),
            PathBuf::from("fit.v2_intercept.nii")
        );
    }

    #[test]
    fn test_output_header_resets_scaling() {
        let source = oblique_header();
        let header = VolumeWriter::output_header(&source);
        assert_eq!(header.scl_slope, 1.0);
        assert_eq!(header.scl_inter, 0.0);
        assert_eq!(header.srow_x, source.srow_x);
        assert_eq!(header.srow_y, source.srow_y);
        assert_eq!(header.srow_z, source.srow_z);
        assert_eq!(header.sform_code, source.sform_code);
        assert_eq!(header.pixdim, source.pixdim);
    }

    #[test]
    fn test_write_map_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/dir/map.nii.gz");
        let data = Array4::from_shape_fn((3, 2, 2, 1), |(x, y, z, _)| {
            x as f64 - 0.5 * y as f64 + 0.25 * z as f64
        });
        let header = VolumeWriter::output_header(&oblique_header());

        VolumeWriter::write_map(&path, &data, &header).unwrap();
        let loaded = VolumeLoader::load_volume(&path).unwrap();

        assert_eq!(loaded.dim(), (3, 2, 2, 1));
        for (a, b) in loaded.data().iter().zip(data.iter()) {
            assert!((a - b).abs() < 1e-6, "expected {}, got {}", b, a);
        }
        assert_eq!(loaded.header().srow_x, header.srow_x);
        assert_eq!(loaded.header().srow_y, header.srow_y);
        assert_eq!(loaded.header().srow_z, header.srow_z);
        assert_eq!(loaded.header().sform_code, header.sform_code);
    }
}

use crate::{
    enums::ValueOrdering,
    error::RegressionError,
    independent_values::IndependentValues,
    volume::{Mask3D, Volume4D},
};

use flate2::read::GzDecoder;
use ndarray::{ArrayD, Axis, Ix3, Ix4};
use nifti::{InMemNiftiObject, IntoNdArray, NiftiHeader, NiftiObject, error::NiftiError};
use std::{
    fs,
    io::Cursor,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum VolumeLoaderError {
    #[error("IO error reading '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("NIfTI error in '{path}': {source}")]
    Nifti {
        path: PathBuf,
        #[source]
        source: NiftiError,
    },

    #[error("'{path}' has shape {found:?}, expected a {expected} image")]
    Dimensionality {
        path: PathBuf,
        expected: &'static str,
        found: Vec<usize>,
    },

    #[error("Invalid independent values in '{path}': {source}")]
    Values {
        path: PathBuf,
        #[source]
        source: RegressionError,
    },
}

pub struct VolumeLoader;

impl VolumeLoader {
    /// Load a 4D NIfTI series (.nii or .nii.gz)
    ///
    /// Intensities are returned with the header scaling applied.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or decoded, or is not 4D
    pub fn load_volume(path: impl AsRef<Path>) -> Result<Volume4D, VolumeLoaderError> {
        let path = path.as_ref();
        let (array, header) = Self::read_array(path)?;

        if array.ndim() != 4 {
            return Err(Self::dimensionality_error(path, "4D", &array));
        }
        let shape = array.shape().to_vec();
        let data = array
            .into_dimensionality::<Ix4>()
            .map_err(|_| VolumeLoaderError::Dimensionality {
                path: path.to_path_buf(),
                expected: "4D",
                found: shape,
            })?;

        debug!(path = %path.display(), shape = ?data.dim(), "loaded volume");
        Ok(Volume4D::new(data, header))
    }

    /// Load a 3D mask; a 4D file with a single volume is accepted as well
    pub fn load_mask(path: impl AsRef<Path>) -> Result<Mask3D, VolumeLoaderError> {
        let path = path.as_ref();
        let (array, _) = Self::read_array(path)?;

        let shape = array.shape().to_vec();
        let array = match shape.as_slice() {
            [_, _, _] => array,
            [_, _, _, 1] => array.index_axis_move(Axis(3), 0),
            _ => return Err(Self::dimensionality_error(path, "3D", &array)),
        };
        let values = array
            .into_dimensionality::<Ix3>()
            .map_err(|_| VolumeLoaderError::Dimensionality {
                path: path.to_path_buf(),
                expected: "3D",
                found: shape,
            })?;

        let mask = Mask3D::from_values(values.view());
        debug!(path = %path.display(), shape = ?mask.dim(), voxels = mask.count(), "loaded mask");
        Ok(mask)
    }

    /// Read a text file with one independent value per line
    pub fn load_independent_values(
        path: impl AsRef<Path>,
        ordering: ValueOrdering,
    ) -> Result<IndependentValues, VolumeLoaderError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| VolumeLoaderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let values = IndependentValues::parse_str(&text, ordering).map_err(|source| {
            VolumeLoaderError::Values {
                path: path.to_path_buf(),
                source,
            }
        })?;

        debug!(path = %path.display(), count = values.len(), "loaded independent values");
        Ok(values)
    }

    fn read_array(path: &Path) -> Result<(ArrayD<f64>, NiftiHeader), VolumeLoaderError> {
        let object = Self::read_object(path)?;
        let header = object.header().clone();
        let array = object
            .into_volume()
            .into_ndarray::<f64>()
            .map_err(|source| VolumeLoaderError::Nifti {
                path: path.to_path_buf(),
                source,
            })?;
        Ok((array, header))
    }

    // Compression is detected from the content, not the file extension
    fn read_object(path: &Path) -> Result<InMemNiftiObject, VolumeLoaderError> {
        let bytes = fs::read(path).map_err(|source| VolumeLoaderError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let object = if is_gzip(&bytes) {
            InMemNiftiObject::from_reader(GzDecoder::new(Cursor::new(bytes)))
        } else {
            InMemNiftiObject::from_reader(Cursor::new(bytes))
        };

        object.map_err(|source| VolumeLoaderError::Nifti {
            path: path.to_path_buf(),
            source,
        })
    }

    fn dimensionality_error(
        path: &Path,
        expected: &'static str,
        array: &ArrayD<f64>,
    ) -> VolumeLoaderError {
        VolumeLoaderError::Dimensionality {
            path: path.to_path_buf(),
            expected,
            found: array.shape().to_vec(),
        }
    }
}

fn is_gzip(bytes: &[u8]) -> bool {
    bytes.len() >= 2 && bytes[0] == 0x1f && bytes[1] == 0x8b
}

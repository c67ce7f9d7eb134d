use crate::error::RegressionError;

use ndarray::{Array3, Array4, ArrayView1, ArrayView3, Axis};
use nifti::NiftiHeader;

/// 4D image series with axes (X, Y, Z, T) and the header it was read with.
///
/// The header is treated as opaque spatial metadata: it is never inspected by
/// the regression and is copied onto every derived map.
#[derive(Clone, Debug)]
pub struct Volume4D {
    data: Array4<f64>,
    header: NiftiHeader,
}

impl Volume4D {
    pub fn new(data: Array4<f64>, header: NiftiHeader) -> Self {
        Self { data, header }
    }

    /// Build a volume with a default header, mostly useful for in-memory data
    pub fn from_array(data: Array4<f64>) -> Self {
        Self::new(data, NiftiHeader::default())
    }

    /// Get the dimensions of the volume (x, y, z, t)
    pub fn dim(&self) -> (usize, usize, usize, usize) {
        self.data.dim()
    }

    /// Spatial dimensions (x, y, z)
    pub fn spatial_dim(&self) -> (usize, usize, usize) {
        let (nx, ny, nz, _) = self.data.dim();
        (nx, ny, nz)
    }

    /// Number of samples along T
    pub fn timepoints(&self) -> usize {
        self.data.len_of(Axis(3))
    }

    pub fn data(&self) -> &Array4<f64> {
        &self.data
    }

    pub fn header(&self) -> &NiftiHeader {
        &self.header
    }

    /// The T-length series at a voxel, or `None` when out of bounds
    pub fn series(&self, x: usize, y: usize, z: usize) -> Option<ArrayView1<'_, f64>> {
        let (nx, ny, nz) = self.spatial_dim();
        if x >= nx || y >= ny || z >= nz {
            return None;
        }
        Some(self.data.slice(ndarray::s![x, y, z, ..]))
    }
}

/// Binary inclusion mask with axes (X, Y, Z)
#[derive(Clone, Debug, PartialEq)]
pub struct Mask3D {
    data: Array3<bool>,
}

impl Mask3D {
    pub fn new(data: Array3<bool>) -> Self {
        Self { data }
    }

    /// Interpret numeric mask values, nonzero meaning included.
    ///
    /// NaN is nonzero and therefore included, matching a plain `!= 0` test.
    pub fn from_values(values: ArrayView3<'_, f64>) -> Self {
        Self::new(values.mapv(|v| v != 0.0))
    }

    pub fn dim(&self) -> (usize, usize, usize) {
        self.data.dim()
    }

    pub fn data(&self) -> &Array3<bool> {
        &self.data
    }

    pub fn count(&self) -> usize {
        self.data.iter().filter(|&&inside| inside).count()
    }

    pub fn contains(&self, x: usize, y: usize, z: usize) -> bool {
        self.data.get((x, y, z)).copied().unwrap_or(false)
    }
}

/// Check that the mask covers exactly the spatial grid of the volume
pub fn validate(volume: &Volume4D, mask: &Mask3D) -> Result<(), RegressionError> {
    let volume_dim = volume.spatial_dim();
    let mask_dim = mask.dim();
    if volume_dim != mask_dim {
        return Err(RegressionError::ShapeMismatch {
            volume: volume_dim,
            mask: mask_dim,
        });
    }
    Ok(())
}

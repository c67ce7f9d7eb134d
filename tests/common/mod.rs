//! Shared fixtures for the integration tests
#![allow(dead_code)]

use std::path::{Path, PathBuf};

use ndarray::{Array3, Array4};
use nifti::{NiftiHeader, writer::WriterOptions};

/// Header with an oblique sform and a rotated, left-handed qform so that a
/// lost affine is easy to spot
pub fn oblique_header() -> NiftiHeader {
    let mut header = NiftiHeader::default();
    header.sform_code = 1;
    header.srow_x = [0.9, 0.1, 0.0, -90.0];
    header.srow_y = [-0.1, 0.9, 0.0, -126.0];
    header.srow_z = [0.0, 0.0, 2.0, -72.0];
    header.qform_code = 1;
    header.quatern_b = 0.1;
    header.quatern_c = 0.2;
    header.quatern_d = 0.3;
    header.quatern_x = -10.0;
    header.quatern_y = 5.0;
    header.quatern_z = 7.0;
    // qfac -1
    header.pixdim = [-1.0, 0.9, 0.9, 2.0, 1.0, 1.0, 1.0, 1.0];
    // mm and seconds
    header.xyzt_units = 10;
    header
}

/// Series where voxel (x, y, z) follows y = (x + 1)·t + (y − z)
pub fn linear_series(dim: (usize, usize, usize), t: &[f64]) -> Array4<f32> {
    Array4::from_shape_fn((dim.0, dim.1, dim.2, t.len()), |(x, y, z, i)| {
        ((x + 1) as f64 * t[i] + y as f64 - z as f64) as f32
    })
}

pub fn write_series(path: &Path, data: &Array4<f32>, header: &NiftiHeader) {
    WriterOptions::new(path)
        .reference_header(header)
        .write_nifti(data)
        .unwrap();
}

pub fn write_mask(path: &Path, mask: &Array3<f32>, header: &NiftiHeader) {
    WriterOptions::new(path)
        .reference_header(header)
        .write_nifti(mask)
        .unwrap();
}

pub fn write_values(path: &Path, values: &[f64]) {
    let text: String = values.iter().map(|v| format!("{v}\n")).collect();
    std::fs::write(path, text).unwrap();
}

/// Paths of the three maps for an output prefix, in slope/intercept/R² order
pub fn output_paths(output_name: &Path, ext: &str) -> [PathBuf; 3] {
    ["slope", "intercept", "r_squared"].map(|suffix| {
        let mut name = output_name.as_os_str().to_owned();
        name.push(format!("_{suffix}.{ext}"));
        PathBuf::from(name)
    })
}

pub mod vector;
pub mod color;
pub mod ray;

pub mod material;
pub mod light;
pub mod texture;
pub mod scene;

pub mod camera;
pub mod intersect;
pub mod shade;
pub mod trace;

pub mod canvas;
pub mod render;

pub mod consts;
pub mod error;

/// Compares two floats for "render equality", absorbing accumulated
/// floating point error.
pub fn feq(left: f64, right: f64) -> bool {
    (left - right).abs() < consts::FEQ_EPSILON
}

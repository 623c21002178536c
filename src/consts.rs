// Runtime parameters
pub const DEFAULT_THREADS: usize = 4;

// Floating point comparisons
pub const FEQ_EPSILON: f64 = 0.0001;

/// The one geometric epsilon. Used for the ray-origin bias of secondary
/// rays, positive-t rejection, the near-zero discriminant test, the
/// parallel ray/plane test and the barycentric weight-sum tolerance.
pub const EPSILON: f64 = 5e-4;

/// Distance from the eye to the virtual image plane. Any positive value
/// works; only directions and ratios survive into the generated rays.
pub const VIEW_PLANE_DISTANCE: f64 = 5.0;

/// Reflection and transmission rays stop spawning at this depth.
pub const MAX_RECURSIVE_DEPTH: usize = 7;

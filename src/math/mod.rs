pub mod angle;
pub mod binomial;
pub mod distance;
pub mod fresnel;
pub mod linear_function;

/// 2D point type.
pub type Point2 = nalgebra::Point2<f64>;

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 2D vector type.
pub type Vector2 = nalgebra::Vector2<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// Angular tolerance for classifying near-collinear poses, in radians.
///
/// One tenth of a degree. Tunable: the value only needs to stay small
/// relative to the application's distance scale.
pub const ANGLE_TOLERANCE: f64 = std::f64::consts::TAU / 3600.0;

pub mod curve;
pub mod polyline;
pub mod ray;

pub use curve::{BezierCurve, Clothoid, ClothoidShape, Curve};
pub use polyline::Polyline;
pub use ray::Ray;

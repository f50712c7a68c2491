//! Curvis flattening demo — prints polylines for a few curve setups.
//!
//! Usage:
//! ```text
//! cargo run --example flatten              # all scenarios
//! RUST_LOG=curvis=trace cargo run --example flatten
//! ```

use curvis::geometry::{BezierCurve, Clothoid, Curve, Polyline, Ray};
use curvis::math::linear_function::PiecewiseLinearFunction;
use curvis::math::Point3;
use curvis::tessellation::{flatten_offset, Flattening};

fn main() -> curvis::Result<()> {
    // Default: INFO for curvis. Override with RUST_LOG
    // (e.g. RUST_LOG=curvis=trace for solver iterations).
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into())
        .add_directive("curvis=info".parse().unwrap_or_default());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let start = Ray::from_heading(Point3::origin(), 0.0);
    let end = Ray::from_heading(Point3::new(8.0, 4.0, 0.0), std::f64::consts::FRAC_PI_2);

    let bezier = BezierCurve::from_rays(&start, &end, 1.0, false)?;
    print_polyline(
        "cubic Bézier, max deviation 0.05",
        &bezier.to_polyline(&Flattening::MaxDeviation(0.05))?,
    );

    let clothoid = Clothoid::from_rays(&start, &end)?;
    println!(
        "clothoid classified as {} (A = {:.3}, length = {:.3})",
        clothoid.shape(),
        clothoid.a_value(),
        clothoid.length()
    );
    print_polyline(
        "clothoid, max angle 0.2 rad",
        &clothoid.to_polyline(&Flattening::MaxAngle(0.2))?,
    );

    let widening = PiecewiseLinearFunction::new(&[(0.0, 0.0), (1.0, 1.5)])?;
    print_polyline(
        "clothoid offset by a widening profile",
        &flatten_offset(&clothoid, &widening, &Flattening::MaxDeviation(0.05))?,
    );

    Ok(())
}

fn print_polyline(label: &str, polyline: &Polyline) {
    println!("{label}: {} points, length {:.3}", polyline.points().len(), polyline.length());
    for point in polyline {
        println!("  ({:.3}, {:.3})", point.x, point.y);
    }
}

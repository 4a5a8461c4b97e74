//! Low-precision solar position primitives.
//!
//! Mean-orbit approximations good to about one minute of clock time,
//! which is what a consumer timetable needs. No atmospheric refraction
//! model beyond the depression angles baked into each event definition.
//!
//! Sources: the usual low-precision solar ephemeris (Astronomical
//! Almanac, "Approximate Solar Coordinates"). All angles in degrees
//! unless a name says otherwise.

pub mod solver;

pub use solver::{Horizon, asr_angle, local_prayer_times, solve_time};

/// JD of the J2000.0 epoch (2000-01-01 12:00 TT).
pub const J2000_JD: f64 = 2_451_545.0;

/// Depression angle for sunrise/sunset: solar radius plus mean refraction.
pub const HORIZON_DEPRESSION_DEG: f64 = 0.833;

/// Shared mean-orbit elements for a given Julian Date.
struct SolarElements {
    /// Mean longitude L, degrees in [0, 360).
    mean_longitude_deg: f64,
    /// Apparent ecliptic longitude λ, degrees (two harmonic terms).
    ecliptic_longitude_deg: f64,
    /// Obliquity of the ecliptic ε, degrees.
    obliquity_deg: f64,
}

fn solar_elements(jd: f64) -> SolarElements {
    let n = jd - J2000_JD;
    let l = (280.460 + 0.985_647_4 * n).rem_euclid(360.0);
    let g = (357.528 + 0.985_600_3 * n).rem_euclid(360.0).to_radians();
    let lambda = l + 1.915 * g.sin() + 0.020 * (2.0 * g).sin();
    let epsilon = 23.439 - 0.000_000_4 * n;
    SolarElements { mean_longitude_deg: l, ecliptic_longitude_deg: lambda, obliquity_deg: epsilon }
}

/// Gregorian calendar date (at 0h UT) to Julian Date.
///
/// January and February count as months 13 and 14 of the prior year;
/// `b` is the Gregorian century correction.
///
/// Reference: 2000-01-01 → JD 2451544.5.
pub fn julian_date(year: i32, month: u32, day: u32) -> f64 {
    let mut y = year;
    let mut m = month as i32;
    if m <= 2 {
        y -= 1;
        m += 12;
    }
    let a = (y as f64 / 100.0).floor();
    let b = 2.0 - a + (a / 4.0).floor();
    (365.25 * (y as f64 + 4716.0)).floor() + (30.6001 * (m as f64 + 1.0)).floor() + day as f64 + b - 1524.5
}

/// Solar declination δ in degrees.
///
/// δ = asin(sin ε · sin λ).
pub fn sun_declination(jd: f64) -> f64 {
    let e = solar_elements(jd);
    (e.obliquity_deg.to_radians().sin() * e.ecliptic_longitude_deg.to_radians().sin())
        .asin()
        .to_degrees()
}

/// Equation of time in minutes (apparent minus mean solar time).
///
/// Right ascension α = atan2(cos ε · sin λ, cos λ); the result is
/// 4 minutes per degree of (L − α), with the difference wrapped into
/// (−180°, 180°] so the value stays in the true ±16-minute band.
pub fn equation_of_time(jd: f64) -> f64 {
    let e = solar_elements(jd);
    let lambda = e.ecliptic_longitude_deg.to_radians();
    let ra = (e.obliquity_deg.to_radians().cos() * lambda.sin())
        .atan2(lambda.cos())
        .to_degrees();
    let mut diff = (e.mean_longitude_deg - ra).rem_euclid(360.0);
    if diff > 180.0 {
        diff -= 360.0;
    }
    4.0 * diff
}

//! Hour-angle solver and the local prayer timetable built on it.
//!
//! One routine covers every altitude-defined event; the caller varies the
//! target angle and picks the morning or evening branch. Dhuhr (solar
//! noon) and the Makkah isha offset are the only special cases.

use chrono::{Datelike, NaiveDate};

use super::{HORIZON_DEPRESSION_DEG, equation_of_time, julian_date, sun_declination};
use crate::times::{AsrSchool, CalculationMethod, ClockTime, Coordinate, IshaRule, PrayerTimeSet};

/// Which side of solar noon an event falls on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Horizon {
    /// Sun ascending: fajr, sunrise.
    Morning,
    /// Sun descending: asr, maghrib, isha.
    Evening,
}

/// Solve the local clock time at which the sun reaches `angle_deg`.
///
/// cos H = (sin a − sin φ · sin δ) / (cos φ · cos δ), then
/// t = 12 ± H/15 − λ/15 − EoT/60 + tz, normalized into [0, 24).
///
/// When |cos H| > 1 the sun never reaches the target altitude on this
/// date at this latitude (polar conditions); the `(0, 0)` sentinel is
/// returned and callers must treat it as "undefined time".
pub fn solve_time(
    angle_deg: f64,
    declination_deg: f64,
    latitude_deg: f64,
    longitude_deg: f64,
    tz_hours: f64,
    eqtime_minutes: f64,
    horizon: Horizon,
) -> ClockTime {
    let lat = latitude_deg.to_radians();
    let decl = declination_deg.to_radians();
    let angle = angle_deg.to_radians();

    let cos_h = (angle.sin() - lat.sin() * decl.sin()) / (lat.cos() * decl.cos());
    if !(-1.0..=1.0).contains(&cos_h) {
        return ClockTime::UNDEFINED;
    }

    let h = cos_h.acos().to_degrees();
    let h = match horizon {
        Horizon::Morning => -h,
        Horizon::Evening => h,
    };
    ClockTime::from_hours(12.0 + h / 15.0 - longitude_deg / 15.0 - eqtime_minutes / 60.0 + tz_hours)
}

/// Asr solar elevation from the jurisprudence shadow factor.
///
/// a = arctan(1 / (factor + tan(φ − δ))), in degrees.
pub fn asr_angle(shadow_factor: f64, latitude_deg: f64, declination_deg: f64) -> f64 {
    (1.0 / (shadow_factor + (latitude_deg - declination_deg).to_radians().tan()))
        .atan()
        .to_degrees()
}

/// Compute a full timetable locally from solar position.
///
/// This is the offline computational capability; the remote-authority
/// client does not route its failures here (see `salah-client`), it is
/// exposed for callers that want an estimate without any network at all.
pub fn local_prayer_times(
    date: NaiveDate,
    coordinate: Coordinate,
    tz_hours: f64,
    method: CalculationMethod,
    school: AsrSchool,
) -> PrayerTimeSet {
    let jd = julian_date(date.year(), date.month(), date.day());
    let decl = sun_declination(jd);
    let eq = equation_of_time(jd);

    let solve = |angle_deg: f64, horizon: Horizon| {
        solve_time(angle_deg, decl, coordinate.latitude, coordinate.longitude, tz_hours, eq, horizon)
    };

    let fajr = solve(-method.fajr_angle(), Horizon::Morning);
    let sunrise = solve(-HORIZON_DEPRESSION_DEG, Horizon::Morning);
    let dhuhr = ClockTime::from_hours(12.0 - coordinate.longitude / 15.0 - eq / 60.0 + tz_hours);
    let asr = solve(asr_angle(school.shadow_factor(), coordinate.latitude, decl), Horizon::Evening);
    let maghrib = solve(-HORIZON_DEPRESSION_DEG, Horizon::Evening);
    let isha = match method.isha_rule() {
        IshaRule::TwilightAngle(angle) => solve(-angle, Horizon::Evening),
        // No maghrib means no offset to hang isha off either.
        IshaRule::MinutesAfterMaghrib(_) if maghrib.is_undefined() => ClockTime::UNDEFINED,
        IshaRule::MinutesAfterMaghrib(minutes) => maghrib.add_minutes(minutes),
    };

    PrayerTimeSet { fajr, sunrise, dhuhr, asr, maghrib, isha }
}

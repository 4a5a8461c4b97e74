//! Domain value types: coordinates, clock times, calculation methods,
//! jurisprudence schools, and the prayer-time set.
//!
//! The method and school registries are closed enumerations; the set of
//! supported configurations is fixed and small, and each variant carries
//! the code understood by the remote timing authority.

use serde::{Deserialize, Serialize};

use crate::Error;

/// Geographic coordinate in signed degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Build a coordinate, rejecting out-of-range values.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, Error> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(Error::InvalidInput(format!("latitude out of range: {latitude}")));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(Error::InvalidInput(format!("longitude out of range: {longitude}")));
        }
        Ok(Self { latitude, longitude })
    }
}

/// Wall-clock time of day, 24-hour local time.
///
/// `(0, 0)` doubles as the solver's "undefined time" sentinel for polar
/// latitudes where the sun never reaches the requested altitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockTime {
    pub hour: u8,
    pub minute: u8,
}

impl ClockTime {
    /// The polar sentinel: callers must treat this as "no such time",
    /// not midnight.
    pub const UNDEFINED: ClockTime = ClockTime { hour: 0, minute: 0 };

    pub const fn new(hour: u8, minute: u8) -> Self {
        Self { hour, minute }
    }

    /// Convert fractional hours to a clock time.
    ///
    /// Normalizes into [0, 24), rounds to the nearest minute, carries
    /// minute overflow into the hour, and wraps hour 24 back to 0.
    pub fn from_hours(t: f64) -> Self {
        let t = t.rem_euclid(24.0);
        let mut hour = t.floor() as u32;
        let mut minute = ((t - hour as f64) * 60.0).round() as u32;
        if minute >= 60 {
            hour += 1;
            minute = 0;
        }
        if hour >= 24 {
            hour -= 24;
        }
        Self { hour: hour as u8, minute: minute as u8 }
    }

    /// Offset by whole minutes, wrapping around midnight.
    pub fn add_minutes(self, minutes: i64) -> Self {
        let total = (self.hour as i64 * 60 + self.minute as i64 + minutes).rem_euclid(24 * 60);
        Self { hour: (total / 60) as u8, minute: (total % 60) as u8 }
    }

    pub fn is_undefined(&self) -> bool {
        *self == Self::UNDEFINED
    }
}

impl std::fmt::Display for ClockTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// How the isha time is derived for a calculation method.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IshaRule {
    /// Sun at the given depression angle below the horizon.
    TwilightAngle(f64),
    /// Fixed offset after maghrib (Umm Al-Qura convention).
    MinutesAfterMaghrib(i64),
}

/// Named prayer-time calculation method.
///
/// Each variant carries its twilight angles and the method code used by
/// the remote timing authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CalculationMethod {
    /// University of Islamic Sciences, Karachi.
    #[default]
    Karachi,
    /// Muslim World League.
    Mwl,
    /// Egyptian General Authority of Survey.
    Egypt,
    /// Islamic Society of North America.
    Isna,
    /// Umm Al-Qura, Makkah.
    Makkah,
}

impl CalculationMethod {
    pub const ALL: [CalculationMethod; 5] = [
        CalculationMethod::Karachi,
        CalculationMethod::Mwl,
        CalculationMethod::Egypt,
        CalculationMethod::Isna,
        CalculationMethod::Makkah,
    ];

    pub fn name_en(&self) -> &'static str {
        match self {
            CalculationMethod::Karachi => "University of Islamic Sciences, Karachi",
            CalculationMethod::Mwl => "Muslim World League",
            CalculationMethod::Egypt => "Egyptian General Authority of Survey",
            CalculationMethod::Isna => "Islamic Society of North America",
            CalculationMethod::Makkah => "Umm Al-Qura, Makkah",
        }
    }

    /// Method code understood by the remote timing authority.
    pub fn authority_code(&self) -> &'static str {
        match self {
            CalculationMethod::Karachi => "1",
            CalculationMethod::Isna => "2",
            CalculationMethod::Mwl => "3",
            CalculationMethod::Makkah => "4",
            CalculationMethod::Egypt => "5",
        }
    }

    /// Fajr twilight depression angle in degrees.
    pub fn fajr_angle(&self) -> f64 {
        match self {
            CalculationMethod::Karachi => 18.0,
            CalculationMethod::Mwl => 18.0,
            CalculationMethod::Egypt => 19.5,
            CalculationMethod::Isna => 15.0,
            CalculationMethod::Makkah => 18.5,
        }
    }

    pub fn isha_rule(&self) -> IshaRule {
        match self {
            CalculationMethod::Karachi => IshaRule::TwilightAngle(18.0),
            CalculationMethod::Mwl => IshaRule::TwilightAngle(17.0),
            CalculationMethod::Egypt => IshaRule::TwilightAngle(17.5),
            CalculationMethod::Isna => IshaRule::TwilightAngle(15.0),
            CalculationMethod::Makkah => IshaRule::MinutesAfterMaghrib(90),
        }
    }

    /// Look a method up by its authority code.
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|m| m.authority_code() == code)
    }
}

/// Jurisprudence school for the asr shadow-length threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AsrSchool {
    /// Standard (Shafi): shadow factor 1.
    #[default]
    Standard,
    /// Hanafi: shadow factor 2.
    Hanafi,
}

impl AsrSchool {
    pub fn shadow_factor(&self) -> f64 {
        match self {
            AsrSchool::Standard => 1.0,
            AsrSchool::Hanafi => 2.0,
        }
    }

    /// School code understood by the remote timing authority.
    pub fn authority_code(&self) -> u8 {
        match self {
            AsrSchool::Standard => 0,
            AsrSchool::Hanafi => 1,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(AsrSchool::Standard),
            1 => Some(AsrSchool::Hanafi),
            _ => None,
        }
    }
}

/// The six daily timings for one (date, coordinate, method, school) tuple.
///
/// Produced fresh on every calculation, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrayerTimeSet {
    pub fajr: ClockTime,
    pub sunrise: ClockTime,
    pub dhuhr: ClockTime,
    pub asr: ClockTime,
    pub maghrib: ClockTime,
    pub isha: ClockTime,
}

/// Approximate timetable for Dhaka, served when the remote authority is
/// unreachable or returns a malformed envelope.
pub const DHAKA_FALLBACK: PrayerTimeSet = PrayerTimeSet {
    fajr: ClockTime::new(5, 10),
    sunrise: ClockTime::new(6, 30),
    dhuhr: ClockTime::new(12, 16),
    asr: ClockTime::new(15, 45),
    maghrib: ClockTime::new(17, 59),
    isha: ClockTime::new(19, 14),
};

/// Default locale when no city or coordinate is configured.
pub const DHAKA: Coordinate = Coordinate { latitude: 23.8103, longitude: 90.4125 };

/// The ten divisional cities, (name, latitude, longitude).
pub const BD_CITIES: &[(&str, f64, f64)] = &[
    ("Dhaka", 23.8103, 90.4125),
    ("Chittagong", 22.3569, 91.7832),
    ("Sylhet", 24.8949, 91.8687),
    ("Rajshahi", 24.3745, 88.6042),
    ("Khulna", 22.8456, 89.5403),
    ("Barisal", 22.7010, 90.3535),
    ("Rangpur", 25.7439, 89.2752),
    ("Mymensingh", 24.7471, 90.4203),
    ("Comilla", 23.4607, 91.1809),
    ("Cox's Bazar", 21.4272, 92.0058),
];

/// Look up a city's coordinate by name (case-insensitive).
pub fn city_coordinate(name: &str) -> Option<Coordinate> {
    BD_CITIES
        .iter()
        .find(|(city, _, _)| city.eq_ignore_ascii_case(name))
        .map(|&(_, lat, lng)| Coordinate { latitude: lat, longitude: lng })
}

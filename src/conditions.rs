//! Simulated fishing conditions shown next to the journal. Not real weather.

use std::fmt::Display;

use chrono::{Local, NaiveTime, Timelike};
use rand::Rng;
use serde::{Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Weather {
    pub sky: &'static str,
    /// Degrees Fahrenheit.
    pub temperature: i32,
    pub quality: &'static str,
}

impl Weather {
    const fn new(sky: &'static str, temperature: i32, quality: &'static str) -> Self {
        Self {
            sky,
            temperature,
            quality,
        }
    }
}

pub static WEATHER: [Weather; 4] = [
    Weather::new("Partly Cloudy", 68, "Excellent"),
    Weather::new("Overcast", 62, "Good"),
    Weather::new("Light Breeze", 72, "Good"),
    Weather::new("Sunny", 81, "Fair"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeOfDay {
    PrimeTime,
    Morning,
    Midday,
    GoldenHour,
    Night,
}

impl TimeOfDay {
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            5..=8 => TimeOfDay::PrimeTime,
            9..=11 => TimeOfDay::Morning,
            12..=16 => TimeOfDay::Midday,
            17..=19 => TimeOfDay::GoldenHour,
            _ => TimeOfDay::Night,
        }
    }
}

impl Display for TimeOfDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            TimeOfDay::PrimeTime => "Prime Time",
            TimeOfDay::Morning => "Morning",
            TimeOfDay::Midday => "Midday",
            TimeOfDay::GoldenHour => "Golden Hour",
            TimeOfDay::Night => "Night",
        })
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Conditions {
    pub weather: Weather,
    pub time_of_day: TimeOfDay,
    /// Wall clock on a 12 hour dial, e.g. `6:30 AM`.
    pub clock: String,
}

impl Conditions {
    pub fn at<R: Rng>(rng: &mut R, time: NaiveTime) -> Self {
        Self {
            weather: WEATHER[rng.gen_range(0..WEATHER.len())],
            time_of_day: TimeOfDay::from_hour(time.hour()),
            clock: time.format("%-I:%M %p").to_string(),
        }
    }

    pub fn now() -> Self {
        Self::at(&mut rand::thread_rng(), Local::now().time())
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};
    use test_case::test_case;

    use super::*;

    #[test_case(0, TimeOfDay::Night ; "midnight")]
    #[test_case(4, TimeOfDay::Night ; "before dawn")]
    #[test_case(5, TimeOfDay::PrimeTime ; "prime time starts")]
    #[test_case(8, TimeOfDay::PrimeTime ; "prime time ends")]
    #[test_case(9, TimeOfDay::Morning ; "morning starts")]
    #[test_case(11, TimeOfDay::Morning ; "morning ends")]
    #[test_case(12, TimeOfDay::Midday ; "midday starts")]
    #[test_case(16, TimeOfDay::Midday ; "midday ends")]
    #[test_case(17, TimeOfDay::GoldenHour ; "golden hour starts")]
    #[test_case(19, TimeOfDay::GoldenHour ; "golden hour ends")]
    #[test_case(20, TimeOfDay::Night ; "night starts")]
    #[test_case(23, TimeOfDay::Night ; "late night")]
    fn hour_buckets(hour: u32, expected: TimeOfDay) {
        assert_eq!(TimeOfDay::from_hour(hour), expected);
    }

    #[test]
    fn picks_one_of_the_fixed_conditions() {
        let mut rng = StdRng::seed_from_u64(7);
        let time = NaiveTime::from_hms_opt(17, 5, 0).unwrap();

        for _ in 0..50 {
            let conditions = Conditions::at(&mut rng, time);

            assert!(WEATHER.contains(&conditions.weather));
            assert_eq!(conditions.time_of_day, TimeOfDay::GoldenHour);
            assert_eq!(conditions.clock, "5:05 PM");
        }
    }

    #[test]
    fn serializes_labels() {
        let conditions = Conditions::at(
            &mut StdRng::seed_from_u64(1),
            NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
        );
        let json = serde_json::to_value(&conditions).unwrap();

        assert_eq!(json["time_of_day"], "Prime Time");
        assert!(json["weather"]["sky"].is_string());
    }
}

use std::fmt::Display;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// Opaque identifier of a [`CatchRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CatchId(String);

impl CatchId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for CatchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One logged fish catch.
///
/// Records only come into existence through [`crate::store::CatchStore::add`]
/// (or by loading a previously stored collection) and are never edited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatchRecord {
    pub id: CatchId,
    pub species: String,
    /// Pounds.
    pub weight: f64,
    /// Inches.
    pub length: f64,
    pub location: String,
    pub date: NaiveDate,
    #[serde(with = "clock_time")]
    pub time: NaiveTime,
    #[serde(default)]
    pub notes: String,
}

impl CatchRecord {
    /// Date as shown in the journal, e.g. `June 15, 2024`.
    pub fn display_date(&self) -> String {
        self.date.format("%B %-d, %Y").to_string()
    }

    /// Time on a 12 hour clock, e.g. `6:30 AM`.
    pub fn display_time(&self) -> String {
        self.time.format("%-I:%M %p").to_string()
    }
}

impl Display for CatchRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({:.1}lbs, {}in) at {} on {} {}",
            self.species,
            self.weight,
            self.length,
            self.location,
            self.display_date(),
            self.display_time()
        )
    }
}

/// Time of day stored as `HH:MM`, the way the journal form submits it.
pub(crate) mod clock_time {
    use chrono::NaiveTime;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%H:%M";

    pub fn parse(text: &str) -> Option<NaiveTime> {
        NaiveTime::parse_from_str(text, FORMAT)
            .or_else(|_| NaiveTime::parse_from_str(text, "%H:%M:%S"))
            .ok()
    }

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&time.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let text = String::deserialize(deserializer)?;
        parse(&text).ok_or_else(|| D::Error::custom(format!("invalid time of day `{text}`")))
    }
}

#[allow(clippy::too_many_arguments)]
fn seed_record(
    id: &str,
    species: &str,
    weight: f64,
    length: f64,
    location: &str,
    (year, month, day): (i32, u32, u32),
    (hour, minute): (u32, u32),
    notes: &str,
) -> CatchRecord {
    CatchRecord {
        id: CatchId::new(id),
        species: species.to_string(),
        weight,
        length,
        location: location.to_string(),
        date: NaiveDate::from_ymd_opt(year, month, day).expect("seed date is valid"),
        time: NaiveTime::from_hms_opt(hour, minute, 0).expect("seed time is valid"),
        notes: notes.to_string(),
    }
}

/// The example catches shown when nothing has been stored yet.
pub fn seed_catches() -> Vec<CatchRecord> {
    vec![
        seed_record(
            "1",
            "Largemouth Bass",
            4.2,
            18.0,
            "Lake Serenity",
            (2024, 6, 15),
            (6, 30),
            "Caught on a topwater frog near the lily pads",
        ),
        seed_record(
            "2",
            "Rainbow Trout",
            2.8,
            14.0,
            "Silver Creek",
            (2024, 6, 10),
            (7, 15),
            "Dry fly fishing at dawn",
        ),
        seed_record(
            "3",
            "Bluegill",
            0.8,
            8.0,
            "Miller Pond",
            (2024, 6, 8),
            (16, 45),
            "Kids loved watching this one",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_has_three_distinct_catches() {
        let seed = seed_catches();
        let ids: Vec<_> = seed.iter().map(|c| c.id.as_str()).collect();

        assert_eq!(ids, ["1", "2", "3"]);
        assert_eq!(seed[0].species, "Largemouth Bass");
    }

    #[test]
    fn stored_layout_uses_plain_fields() {
        let json = serde_json::to_value(&seed_catches()[0]).unwrap();

        assert_eq!(json["id"], "1");
        assert_eq!(json["weight"], 4.2);
        assert_eq!(json["date"], "2024-06-15");
        assert_eq!(json["time"], "06:30");
    }

    #[test]
    fn accepts_time_with_seconds() {
        let json = r#"{"id":"9","species":"Carp","weight":3,"length":20,"location":"Canal","date":"2024-05-01","time":"18:05:00","notes":""}"#;
        let record: CatchRecord = serde_json::from_str(json).unwrap();

        assert_eq!(record.time, NaiveTime::from_hms_opt(18, 5, 0).unwrap());
    }

    #[test]
    fn formats_for_display() {
        let seed = seed_catches();

        assert_eq!(seed[0].display_date(), "June 15, 2024");
        assert_eq!(seed[0].display_time(), "6:30 AM");
        assert_eq!(seed[2].display_time(), "4:45 PM");
        assert_eq!(
            seed[1].to_string(),
            "Rainbow Trout (2.8lbs, 14in) at Silver Creek on June 10, 2024 7:15 AM"
        );
    }
}

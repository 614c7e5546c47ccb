//! Turns what the user typed into something the store accepts.

use std::fmt::Display;

use chrono::{Local, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::models::{clock_time, CatchId, CatchRecord};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Species offered while typing. Any other name is just as valid.
pub const COMMON_SPECIES: [&str; 12] = [
    "Largemouth Bass",
    "Smallmouth Bass",
    "Rainbow Trout",
    "Brown Trout",
    "Bluegill",
    "Crappie",
    "Catfish",
    "Northern Pike",
    "Walleye",
    "Perch",
    "Salmon",
    "Carp",
];

/// The form fields exactly as submitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawCatchInput {
    pub species: String,
    pub weight: String,
    pub length: String,
    pub location: String,
    pub date: String,
    pub time: String,
    pub notes: String,
}

/// A catch that passed validation but has no identity yet.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedCatchInput {
    species: String,
    weight: f64,
    length: f64,
    location: String,
    date: NaiveDate,
    time: NaiveTime,
    notes: String,
}

impl ValidatedCatchInput {
    pub fn species(&self) -> &str {
        &self.species
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn time(&self) -> NaiveTime {
        self.time
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub(crate) fn into_record(self, id: CatchId) -> CatchRecord {
        CatchRecord {
            id,
            species: self.species,
            weight: self.weight,
            length: self.length,
            location: self.location,
            date: self.date,
            time: self.time,
            notes: self.notes,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Species,
    Weight,
    Length,
    Location,
    Date,
    Time,
}

impl Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Field::Species => "species",
            Field::Weight => "weight",
            Field::Length => "length",
            Field::Location => "location",
            Field::Date => "date",
            Field::Time => "time",
        })
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FieldError {
    #[error("{0} is required")]
    Missing(Field),

    #[error("{field} must be a number, got {text:?}")]
    NotANumber { field: Field, text: String },

    #[error("{field} must be greater than zero")]
    NotPositive { field: Field },

    #[error("date must look like 2024-06-15, got {0:?}")]
    BadDate(String),

    #[error("time must look like 06:30, got {0:?}")]
    BadTime(String),
}

impl FieldError {
    pub fn field(&self) -> Field {
        match self {
            FieldError::Missing(field)
            | FieldError::NotANumber { field, .. }
            | FieldError::NotPositive { field } => *field,
            FieldError::BadDate(_) => Field::Date,
            FieldError::BadTime(_) => Field::Time,
        }
    }
}

/// A submission that was turned away, with every reason why.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("catch not logged: {}", join(.errors))]
pub struct Rejected {
    pub errors: Vec<FieldError>,
}

fn join(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl Rejected {
    pub fn has(&self, field: Field) -> bool {
        self.errors.iter().any(|err| err.field() == field)
    }
}

/// Time used when none was entered.
pub fn default_time() -> NaiveTime {
    NaiveTime::from_hms_opt(6, 0, 0).expect("06:00 is a valid time")
}

/// Validate against the local calendar date.
pub fn validate(raw: RawCatchInput) -> Result<ValidatedCatchInput, Rejected> {
    validate_on(raw, Local::now().date_naive())
}

/// Validate, filling in a blank date with `today`.
pub fn validate_on(raw: RawCatchInput, today: NaiveDate) -> Result<ValidatedCatchInput, Rejected> {
    let mut errors = Vec::new();

    let species = required_text(&raw.species, Field::Species, &mut errors);
    let weight = positive_number(&raw.weight, Field::Weight, &mut errors);
    let length = positive_number(&raw.length, Field::Length, &mut errors);
    let location = required_text(&raw.location, Field::Location, &mut errors);

    let date = match raw.date.trim() {
        "" => Some(today),
        text => NaiveDate::parse_from_str(text, DATE_FORMAT)
            .map_err(|_| errors.push(FieldError::BadDate(text.to_string())))
            .ok(),
    };

    let time = match raw.time.trim() {
        "" => Some(default_time()),
        text => {
            let time = clock_time::parse(text);
            if time.is_none() {
                errors.push(FieldError::BadTime(text.to_string()));
            }
            time
        }
    };

    match (species, weight, length, location, date, time) {
        (Some(species), Some(weight), Some(length), Some(location), Some(date), Some(time))
            if errors.is_empty() =>
        {
            Ok(ValidatedCatchInput {
                species,
                weight,
                length,
                location,
                date,
                time,
                notes: raw.notes,
            })
        }
        _ => Err(Rejected { errors }),
    }
}

fn required_text(text: &str, field: Field, errors: &mut Vec<FieldError>) -> Option<String> {
    let text = text.trim();
    if text.is_empty() {
        errors.push(FieldError::Missing(field));
        None
    } else {
        Some(text.to_string())
    }
}

fn positive_number(text: &str, field: Field, errors: &mut Vec<FieldError>) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() {
        errors.push(FieldError::Missing(field));
        return None;
    }

    match text.parse::<f64>() {
        Ok(number) if !number.is_finite() => {
            errors.push(FieldError::NotANumber {
                field,
                text: text.to_string(),
            });
            None
        }
        Ok(number) if number <= 0.0 => {
            errors.push(FieldError::NotPositive { field });
            None
        }
        Ok(number) => Some(number),
        Err(_) => {
            errors.push(FieldError::NotANumber {
                field,
                text: text.to_string(),
            });
            None
        }
    }
}

/// Common species containing `query`, ignoring case, in list order.
pub fn suggest_species(query: &str) -> Vec<&'static str> {
    let query = query.trim().to_lowercase();

    COMMON_SPECIES
        .iter()
        .copied()
        .filter(|species| species.to_lowercase().contains(&query))
        .collect()
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use test_case::test_case;

    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, 1).unwrap()
    }

    fn raw() -> RawCatchInput {
        RawCatchInput {
            species: "Northern Pike".to_string(),
            weight: "6.4".to_string(),
            length: "27.5".to_string(),
            location: "Reed Bay".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn fills_in_defaults() {
        let draft = validate_on(raw(), today()).unwrap();

        assert_eq!(draft.species(), "Northern Pike");
        assert_relative_eq!(draft.weight(), 6.4);
        assert_relative_eq!(draft.length(), 27.5);
        assert_eq!(draft.date(), today());
        assert_eq!(draft.time(), NaiveTime::from_hms_opt(6, 0, 0).unwrap());
        assert_eq!(draft.notes(), "");
    }

    #[test]
    fn keeps_entered_date_time_and_notes() {
        let draft = validate_on(
            RawCatchInput {
                date: "2024-05-20".to_string(),
                time: "19:40".to_string(),
                notes: "spinnerbait along the weeds".to_string(),
                ..raw()
            },
            today(),
        )
        .unwrap();

        assert_eq!(draft.date(), NaiveDate::from_ymd_opt(2024, 5, 20).unwrap());
        assert_eq!(draft.time(), NaiveTime::from_hms_opt(19, 40, 0).unwrap());
        assert_eq!(draft.notes(), "spinnerbait along the weeds");
    }

    #[test]
    fn trims_text_fields() {
        let draft = validate_on(
            RawCatchInput {
                species: "  Perch ".to_string(),
                location: "\tDock\n".to_string(),
                ..raw()
            },
            today(),
        )
        .unwrap();

        assert_eq!(draft.species(), "Perch");
        assert_eq!(draft.location(), "Dock");
    }

    #[test]
    fn accepts_species_outside_the_list() {
        let draft = validate_on(
            RawCatchInput {
                species: "Muskellunge".to_string(),
                ..raw()
            },
            today(),
        )
        .unwrap();

        assert_eq!(draft.species(), "Muskellunge");
    }

    #[test_case(RawCatchInput { species: String::new(), ..raw() }, Field::Species ; "empty species")]
    #[test_case(RawCatchInput { species: "   ".to_string(), ..raw() }, Field::Species ; "blank species")]
    #[test_case(RawCatchInput { location: String::new(), ..raw() }, Field::Location ; "empty location")]
    #[test_case(RawCatchInput { weight: String::new(), ..raw() }, Field::Weight ; "empty weight")]
    #[test_case(RawCatchInput { weight: "heavy".to_string(), ..raw() }, Field::Weight ; "non numeric weight")]
    #[test_case(RawCatchInput { weight: "0".to_string(), ..raw() }, Field::Weight ; "zero weight")]
    #[test_case(RawCatchInput { weight: "-2".to_string(), ..raw() }, Field::Weight ; "negative weight")]
    #[test_case(RawCatchInput { weight: "NaN".to_string(), ..raw() }, Field::Weight ; "nan weight")]
    #[test_case(RawCatchInput { length: "inf".to_string(), ..raw() }, Field::Length ; "infinite length")]
    #[test_case(RawCatchInput { length: "12in".to_string(), ..raw() }, Field::Length ; "length with unit")]
    #[test_case(RawCatchInput { date: "15/06/2024".to_string(), ..raw() }, Field::Date ; "bad date")]
    #[test_case(RawCatchInput { time: "6pm".to_string(), ..raw() }, Field::Time ; "bad time")]
    fn rejects(input: RawCatchInput, field: Field) {
        let rejected = validate_on(input, today()).unwrap_err();

        assert_eq!(rejected.errors.len(), 1);
        assert!(rejected.has(field));
    }

    #[test]
    fn reports_every_failing_field() {
        let rejected = validate_on(RawCatchInput::default(), today()).unwrap_err();

        assert_eq!(
            rejected.errors,
            [
                FieldError::Missing(Field::Species),
                FieldError::Missing(Field::Weight),
                FieldError::Missing(Field::Length),
                FieldError::Missing(Field::Location),
            ]
        );
        assert_eq!(
            rejected.to_string(),
            "catch not logged: species is required, weight is required, length is required, location is required"
        );
    }

    #[test_case("", 12 ; "empty query matches everything")]
    #[test_case("bass", 2 ; "lowercase")]
    #[test_case("TROUT", 2 ; "uppercase")]
    #[test_case("pik", 1 ; "inside a word")]
    #[test_case("marlin", 0 ; "no match")]
    fn suggestions(query: &str, expected: usize) {
        assert_eq!(suggest_species(query).len(), expected);
    }

    #[test]
    fn suggestions_keep_list_order() {
        assert_eq!(
            suggest_species("bass"),
            ["Largemouth Bass", "Smallmouth Bass"]
        );
        assert_eq!(suggest_species("ca"), ["Catfish", "Carp"]);
    }
}

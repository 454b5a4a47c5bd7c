use serde::{Deserialize, Serialize};
use time::{
    format_description::{well_known::Rfc3339, FormatItem},
    macros::format_description,
    Date, OffsetDateTime, PrimitiveDateTime,
};
use uuid::Uuid;

use super::repo_types::{MealFields, MealRecord};
use crate::error::ApiError;
use crate::summary::SummaryResult;

/// Body of create and update requests. Every field is checked in
/// [`MealBody::into_fields`] so that all problems surface as validation errors.
#[derive(Debug, Default, Deserialize)]
pub struct MealBody {
    pub name: Option<String>,
    pub description: Option<String>,
    pub datetime: Option<DateTimeInput>,
    pub on_diet: Option<bool>,
    /// Legacy flag: `"y"` or `"n"`.
    pub diet: Option<String>,
}

/// Either a date string or Unix epoch milliseconds.
///
/// Strings may be RFC 3339, a date-time without offset, or a bare date; the
/// last two are taken as UTC.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DateTimeInput {
    Millis(i64),
    Text(String),
}

const NAIVE_DATETIME: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second][optional [.[subsecond]]]");
const DATE_ONLY: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Earliest year Postgres `TIMESTAMPTZ` can hold in full (it starts in late 4713 BC).
const MIN_YEAR: i32 = -4711;

fn parse_text(s: &str) -> Option<OffsetDateTime> {
    OffsetDateTime::parse(s, &Rfc3339)
        .ok()
        .or_else(|| {
            PrimitiveDateTime::parse(s, NAIVE_DATETIME)
                .ok()
                .map(PrimitiveDateTime::assume_utc)
        })
        .or_else(|| {
            Date::parse(s, DATE_ONLY)
                .ok()
                .map(|d| d.midnight().assume_utc())
        })
}

impl DateTimeInput {
    /// Parses into a UTC instant truncated to microseconds.
    fn parse(&self) -> Result<OffsetDateTime, ApiError> {
        let parsed = match self {
            DateTimeInput::Millis(ms) => {
                OffsetDateTime::from_unix_timestamp_nanos(i128::from(*ms) * 1_000_000).ok()
            }
            DateTimeInput::Text(s) => parse_text(s.trim()),
        };
        let dt = parsed.ok_or_else(|| ApiError::Validation("datetime is not a valid date".into()))?;

        let out_of_range = || ApiError::Validation("datetime is out of range".into());
        let micros = dt.unix_timestamp_nanos() / 1_000;
        let utc = OffsetDateTime::from_unix_timestamp_nanos(micros * 1_000)
            .map_err(|_| out_of_range())?;
        if utc.year() < MIN_YEAR {
            return Err(out_of_range());
        }
        Ok(utc)
    }
}

fn required_text(value: Option<String>, field: &str) -> Result<String, ApiError> {
    let value = value.ok_or_else(|| ApiError::Validation(format!("{} is required", field)))?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::Validation(format!("{} must not be empty", field)));
    }
    Ok(trimmed.to_owned())
}

fn diet_flag(on_diet: Option<bool>, diet: Option<&str>) -> Result<bool, ApiError> {
    let from_diet = match diet {
        None => None,
        Some("y") => Some(true),
        Some("n") => Some(false),
        Some(other) => {
            return Err(ApiError::Validation(format!(
                "diet must be \"y\" or \"n\", got {:?}",
                other
            )))
        }
    };
    match (on_diet, from_diet) {
        (Some(a), Some(b)) if a != b => Err(ApiError::Validation(
            "on_diet and diet disagree".into(),
        )),
        (Some(v), _) | (None, Some(v)) => Ok(v),
        (None, None) => Err(ApiError::Validation("on_diet is required".into())),
    }
}

impl MealBody {
    pub fn into_fields(self) -> Result<MealFields, ApiError> {
        let name = required_text(self.name, "name")?;
        let description = required_text(self.description, "description")?;
        let datetime = self
            .datetime
            .ok_or_else(|| ApiError::Validation("datetime is required".into()))?
            .parse()?;
        let on_diet = diet_flag(self.on_diet, self.diet.as_deref())?;
        Ok(MealFields {
            name,
            description,
            datetime,
            on_diet,
        })
    }
}

/// Public view of a meal; the owner token is never exposed.
#[derive(Debug, Serialize)]
pub struct MealView {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    #[serde(with = "time::serde::rfc3339")]
    pub datetime: OffsetDateTime,
    pub on_diet: bool,
}

impl From<MealRecord> for MealView {
    fn from(m: MealRecord) -> Self {
        Self {
            id: m.id,
            name: m.name,
            description: m.description,
            datetime: m.datetime,
            on_diet: m.on_diet,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MealListResponse {
    pub meals: Vec<MealView>,
}

#[derive(Debug, Serialize)]
pub struct MealResponse {
    pub meal: MealView,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub summary: SummaryResult,
}

#[derive(Debug, Serialize)]
pub struct CreatedMealResponse {
    pub id: Uuid,
}

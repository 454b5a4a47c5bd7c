use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::session::SessionToken;

/// Caller-editable attributes of a meal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MealFields {
    pub name: String,
    pub description: String,
    pub datetime: OffsetDateTime,
    pub on_diet: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MealRecord {
    pub id: Uuid,
    pub owner_token: SessionToken,
    pub name: String,
    pub description: String,
    pub datetime: OffsetDateTime,
    pub on_diet: bool,
}

impl MealRecord {
    pub fn new(id: Uuid, owner_token: SessionToken, fields: MealFields) -> Self {
        Self {
            id,
            owner_token,
            name: fields.name,
            description: fields.description,
            datetime: fields.datetime,
            on_diet: fields.on_diet,
        }
    }

    /// Replaces the mutable attributes; id and owner stay as they are.
    pub fn apply(&mut self, fields: MealFields) {
        self.name = fields.name;
        self.description = fields.description;
        self.datetime = fields.datetime;
        self.on_diet = fields.on_diet;
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct MealRow {
    pub id: Uuid,
    pub owner_token: String,
    pub name: String,
    pub description: String,
    pub datetime: OffsetDateTime,
    pub on_diet: bool,
}

impl From<MealRow> for MealRecord {
    fn from(r: MealRow) -> Self {
        Self {
            id: r.id,
            owner_token: SessionToken::from_stored(r.owner_token),
            name: r.name,
            description: r.description,
            datetime: r.datetime,
            on_diet: r.on_diet,
        }
    }
}

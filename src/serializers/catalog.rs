use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{Actor, Genre, TheatreHall};

/* ---------- Genre ---------- */

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct GenreInput {
    #[validate(length(min = 1, max = 255, message = "Ensure this field has between 1 and 255 characters."))]
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenrePatch {
    pub name: Option<String>,
}

impl GenrePatch {
    pub fn apply(self, current: Genre) -> GenreInput {
        GenreInput {
            name: self.name.unwrap_or(current.name),
        }
    }
}

/* ---------- Actor ---------- */

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ActorInput {
    #[validate(length(min = 1, max = 255, message = "Ensure this field has between 1 and 255 characters."))]
    pub first_name: String,
    #[validate(length(min = 1, max = 255, message = "Ensure this field has between 1 and 255 characters."))]
    pub last_name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActorPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl ActorPatch {
    pub fn apply(self, current: Actor) -> ActorInput {
        ActorInput {
            first_name: self.first_name.unwrap_or(current.first_name),
            last_name: self.last_name.unwrap_or(current.last_name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActorResponse {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
}

impl From<Actor> for ActorResponse {
    fn from(actor: Actor) -> Self {
        let full_name = actor.full_name();
        ActorResponse {
            id: actor.id,
            first_name: actor.first_name,
            last_name: actor.last_name,
            full_name,
        }
    }
}

/* ---------- TheatreHall ---------- */

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TheatreHallInput {
    #[validate(length(min = 1, max = 255, message = "Ensure this field has between 1 and 255 characters."))]
    pub name: String,
    #[validate(range(min = 1, message = "Ensure this value is greater than or equal to 1."))]
    pub rows: i32,
    #[validate(range(min = 1, message = "Ensure this value is greater than or equal to 1."))]
    pub seats_in_row: i32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TheatreHallPatch {
    pub name: Option<String>,
    pub rows: Option<i32>,
    pub seats_in_row: Option<i32>,
}

impl TheatreHallPatch {
    pub fn apply(self, current: TheatreHall) -> TheatreHallInput {
        TheatreHallInput {
            name: self.name.unwrap_or(current.name),
            rows: self.rows.unwrap_or(current.rows),
            seats_in_row: self.seats_in_row.unwrap_or(current.seats_in_row),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TheatreHallResponse {
    pub id: i64,
    pub name: String,
    pub rows: i32,
    pub seats_in_row: i32,
    pub capacity: i64,
}

impl From<TheatreHall> for TheatreHallResponse {
    fn from(hall: TheatreHall) -> Self {
        let capacity = hall.capacity();
        TheatreHallResponse {
            id: hall.id,
            name: hall.name,
            rows: hall.rows,
            seats_in_row: hall.seats_in_row,
            capacity,
        }
    }
}

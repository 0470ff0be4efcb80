use serde::{Deserialize, Serialize};
use validator::Validate;

use super::catalog::ActorResponse;
use super::fields;
use crate::models::{Actor, Genre, Play};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PlayInput {
    #[validate(length(min = 1, max = 255, message = "Ensure this field has between 1 and 255 characters."))]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    // None leaves the relation set untouched on update, empty on create
    #[serde(default)]
    pub genres: Option<Vec<i64>>,
    #[serde(default)]
    pub actors: Option<Vec<i64>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlayPatch {
    pub title: Option<String>,
    // Some(None) clears the description
    #[serde(default, deserialize_with = "fields::nullable")]
    pub description: Option<Option<String>>,
    pub genres: Option<Vec<i64>>,
    pub actors: Option<Vec<i64>>,
}

impl PlayPatch {
    pub fn apply(self, current: Play) -> PlayInput {
        PlayInput {
            title: self.title.unwrap_or(current.title),
            description: match self.description {
                Some(description) => description,
                None => current.description,
            },
            genres: self.genres,
            actors: self.actors,
        }
    }
}

/// Write-side shape: relations as id lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayResponse {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub genres: Vec<i64>,
    pub actors: Vec<i64>,
}

/// List shape: relations rendered as their display strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayListItem {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub genres: Vec<String>,
    pub actors: Vec<String>,
}

impl PlayListItem {
    pub fn new(play: Play, genres: &[Genre], actors: &[Actor]) -> Self {
        PlayListItem {
            id: play.id,
            title: play.title,
            description: play.description,
            genres: genres.iter().map(|g| g.name.clone()).collect(),
            actors: actors.iter().map(Actor::full_name).collect(),
        }
    }
}

/// Detail shape: relations nested as full objects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayDetail {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub genres: Vec<Genre>,
    pub actors: Vec<ActorResponse>,
}

impl PlayDetail {
    pub fn new(play: Play, genres: Vec<Genre>, actors: Vec<Actor>) -> Self {
        PlayDetail {
            id: play.id,
            title: play.title,
            description: play.description,
            genres,
            actors: actors.into_iter().map(ActorResponse::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn hamlet() -> Play {
        Play {
            id: 1,
            title: "Hamlet".into(),
            description: Some("Prince of Denmark".into()),
        }
    }

    fn drama() -> Genre {
        Genre {
            id: 2,
            name: "Drama".into(),
        }
    }

    fn actor() -> Actor {
        Actor {
            id: 5,
            first_name: "George".into(),
            last_name: "Clooney".into(),
        }
    }

    #[test]
    fn list_item_renders_relations_as_strings() {
        let item = PlayListItem::new(hamlet(), &[drama()], &[actor()]);
        assert_eq!(
            serde_json::to_value(item).unwrap(),
            json!({
                "id": 1,
                "title": "Hamlet",
                "description": "Prince of Denmark",
                "genres": ["Drama"],
                "actors": ["George Clooney"],
            })
        );
    }

    #[test]
    fn detail_nests_relations() {
        let detail = PlayDetail::new(hamlet(), vec![drama()], vec![actor()]);
        let value = serde_json::to_value(detail).unwrap();
        assert_eq!(value["genres"][0], json!({"id": 2, "name": "Drama"}));
        assert_eq!(value["actors"][0]["full_name"], "George Clooney");
    }

    #[test]
    fn input_relations_are_optional() {
        let input: PlayInput = serde_json::from_value(json!({"title": "Macbeth"})).unwrap();
        assert!(input.genres.is_none());
        assert!(input.actors.is_none());
        assert!(input.description.is_none());

        let input: PlayInput =
            serde_json::from_value(json!({"title": "Macbeth", "genres": [1, 2]})).unwrap();
        assert_eq!(input.genres, Some(vec![1, 2]));
    }

    #[test]
    fn patch_without_relations_keeps_existing_sets() {
        let patch = PlayPatch {
            title: Some("Hamlet, revised".into()),
            ..Default::default()
        };
        let merged = patch.apply(hamlet());
        assert_eq!(merged.title, "Hamlet, revised");
        assert_eq!(merged.description.as_deref(), Some("Prince of Denmark"));
        assert!(merged.genres.is_none());
        assert!(merged.actors.is_none());
    }

    #[test]
    fn patch_with_null_description_clears_it() {
        let patch: PlayPatch = serde_json::from_value(json!({"description": null})).unwrap();
        let merged = patch.apply(hamlet());
        assert_eq!(merged.title, "Hamlet");
        assert!(merged.description.is_none());
    }

    #[test]
    fn patch_with_new_description_replaces_it() {
        let patch: PlayPatch =
            serde_json::from_value(json!({"description": "To be or not to be"})).unwrap();
        let merged = patch.apply(hamlet());
        assert_eq!(merged.description.as_deref(), Some("To be or not to be"));
    }
}

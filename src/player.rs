use serde::{Deserialize, Deserializer, Serialize};

use crate::persist::{lenient_float, lenient_optional_flag};

/// Identifier of a player, unique within a group and its games.
pub type PlayerId = String;

/// A player as stored in a group roster or in a game's player snapshot.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    #[serde(default)]
    pub firstname: String,
    #[serde(default)]
    pub name: String,
    /// Seated in the current game. Inactive players receive the table average.
    #[serde(
        rename = "aktiv",
        default = "active_by_default",
        deserialize_with = "lenient_active"
    )]
    pub active: bool,
    /// Running total, recomputed by settlement. Never edited directly.
    #[serde(default, deserialize_with = "lenient_float")]
    pub result: f64,
}

fn active_by_default() -> bool {
    true
}

fn lenient_active<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(lenient_optional_flag(deserializer)?.unwrap_or(true))
}

impl Player {
    pub fn new(
        id: impl Into<PlayerId>,
        firstname: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            firstname: firstname.into(),
            name: name.into(),
            active: true,
            result: 0.0,
        }
    }

    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.firstname.trim(), self.name.trim());
        let full = full.trim();
        if full.is_empty() {
            self.id.clone()
        } else {
            full.to_string()
        }
    }
}

//! Replay model: one recorded battle for a team.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{EntityId, ReplayId};

/// Outcome of a replay from the user's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplayResult {
    Win,
    Loss,
    /// Ties, forfeits before turn 1, unparsed logs
    #[serde(other)]
    Other,
}

impl ReplayResult {
    /// Returns true for a win or a loss.
    pub fn is_decisive(&self) -> bool {
        matches!(self, ReplayResult::Win | ReplayResult::Loss)
    }

    pub fn is_win(&self) -> bool {
        matches!(self, ReplayResult::Win)
    }
}

/// A terastallization event recorded in the battle log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeraEvent {
    /// Raw label of the Pokémon that terastallized
    pub pokemon: String,

    /// Tera type
    #[serde(rename = "type")]
    pub tera_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turn: Option<u32>,
}

/// Structured data extracted from a battle log.
///
/// Every map is keyed by side identifier (`"p1"`, `"p2"`). A side with no entry reads as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleData {
    pub user_player: String,
    pub opponent_player: String,

    /// Full roster revealed at team preview, per side
    #[serde(default)]
    pub teams: BTreeMap<String, Vec<String>>,

    /// Pokémon actually brought into play, in order; the first entries are the leads
    #[serde(default)]
    pub actual_picks: BTreeMap<String, Vec<String>>,

    #[serde(default)]
    pub tera_events: BTreeMap<String, Vec<TeraEvent>>,
}

impl BattleData {
    fn side<'a, T>(map: &'a BTreeMap<String, Vec<T>>, side: &str) -> &'a [T] {
        map.get(side).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn user_team(&self) -> &[String] {
        Self::side(&self.teams, &self.user_player)
    }

    pub fn opponent_team(&self) -> &[String] {
        Self::side(&self.teams, &self.opponent_player)
    }

    pub fn user_picks(&self) -> &[String] {
        Self::side(&self.actual_picks, &self.user_player)
    }

    pub fn opponent_picks(&self) -> &[String] {
        Self::side(&self.actual_picks, &self.opponent_player)
    }

    /// The first tera event of the user's side. Later events in the same game are ignored.
    pub fn user_first_tera(&self) -> Option<&TeraEvent> {
        Self::side(&self.tera_events, &self.user_player).first()
    }
}

/// A stored replay for one team.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Replay {
    /// Unique identifier (derived from the replay URL)
    #[serde(default)]
    pub id: ReplayId,

    /// Showdown replay URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Outcome; absent when the log could not be decided
    #[serde(default)]
    pub result: Option<ReplayResult>,

    /// When this record was created
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    /// Parsed battle log; absent when the replay was stored without one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub battle_data: Option<BattleData>,
}

impl Replay {
    /// Create a new Replay with an ID derived from its URL.
    pub fn new(url: String, result: Option<ReplayResult>) -> Self {
        let id = EntityId::generate(&[&url]);

        Self {
            id,
            url: Some(url),
            result,
            created_at: Utc::now(),
            battle_data: None,
        }
    }

    /// Fill in a missing id from the URL. Returns false if there is neither.
    pub fn ensure_id(&mut self) -> bool {
        if self.id.is_empty() {
            match self.url.as_deref() {
                Some(url) if !url.is_empty() => self.id = EntityId::generate(&[url]),
                _ => return false,
            }
        }
        true
    }

    /// Builder method to attach parsed battle data.
    pub fn with_battle_data(mut self, battle_data: BattleData) -> Self {
        self.battle_data = Some(battle_data);
        self
    }

    /// Returns true if the replay has battle data and a decisive result.
    pub fn is_analyzable(&self) -> bool {
        self.battle_data.is_some() && self.result.is_some_and(|r| r.is_decisive())
    }

    pub fn is_win(&self) -> bool {
        self.result.is_some_and(|r| r.is_win())
    }
}

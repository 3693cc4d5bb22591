//! Derived statistics models.
//!
//! Every percentage here is an integer in `0..=100`, computed from the counters carried next to
//! it and never stored independently of them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::TeamId;
use crate::calculate::percent;

/// Per-Pokémon usage on the user's own team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PokemonUsage {
    /// Canonical key
    pub pokemon: String,

    /// Games where it was brought
    pub usage: u32,
    pub wins: u32,
    pub usage_rate: u32,
    pub overall_win_rate: u32,

    /// Games where it was one of the leads
    pub lead_usage: u32,
    pub lead_wins: u32,
    pub lead_win_rate: u32,

    /// Games where it was the side's first terastallization
    pub tera_usage: u32,
    pub tera_wins: u32,

    /// `None` when it never terastallized, as opposed to terastallizing and always losing
    pub tera_win_rate: Option<u32>,
}

impl PokemonUsage {
    /// Build a usage record from its counters.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        pokemon: String,
        usage: u32,
        wins: u32,
        lead_usage: u32,
        lead_wins: u32,
        tera_usage: u32,
        tera_wins: u32,
        total_games: u32,
    ) -> Self {
        let tera_win_rate = if tera_usage > 0 {
            Some(percent(tera_wins, tera_usage))
        } else {
            None
        };

        Self {
            pokemon,
            usage,
            wins,
            usage_rate: percent(usage, total_games),
            overall_win_rate: percent(wins, usage),
            lead_usage,
            lead_wins,
            lead_win_rate: percent(lead_wins, lead_usage),
            tera_usage,
            tera_wins,
            tera_win_rate,
        }
    }
}

/// Usage of one lead group (by default an unordered pair).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadPairStat {
    /// Sorted members joined by `" + "`
    pub key: String,

    /// Canonical keys of the members, sorted
    pub pokemon: Vec<String>,

    pub usage: u32,
    pub wins: u32,
    pub win_rate: u32,
    pub usage_rate: u32,
}

impl LeadPairStat {
    pub const SEPARATOR: &'static str = " + ";

    /// Build the order-independent key for a set of leads.
    pub fn key_for(members: &[String]) -> (String, Vec<String>) {
        let mut sorted = members.to_vec();
        sorted.sort();
        (sorted.join(Self::SEPARATOR), sorted)
    }

    /// Split a key back into its canonical members.
    pub fn split_key(key: &str) -> Vec<String> {
        key.split(Self::SEPARATOR).map(str::to_string).collect()
    }

    pub fn new(key: String, pokemon: Vec<String>, usage: u32, wins: u32, total_games: u32) -> Self {
        Self {
            key,
            pokemon,
            usage,
            wins,
            win_rate: percent(wins, usage),
            usage_rate: percent(usage, total_games),
        }
    }
}

/// The two ranked lead views.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadPairViews {
    pub most_common: Vec<LeadPairStat>,
    pub best_win_rate: Vec<LeadPairStat>,
}

/// Record against one opposing Pokémon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpponentStat {
    /// Canonical key
    pub pokemon: String,

    /// Games where it was on the opponent's roster
    pub times_on_team: u32,

    /// Games where the opponent actually brought it
    pub times_brought: u32,

    pub games_against: u32,
    pub wins_against: u32,
    pub losses_against: u32,
    pub win_rate: u32,
    pub attendance_rate: u32,
}

impl OpponentStat {
    pub fn new(
        pokemon: String,
        times_on_team: u32,
        times_brought: u32,
        games_against: u32,
        wins_against: u32,
    ) -> Self {
        Self {
            pokemon,
            times_on_team,
            times_brought,
            games_against,
            wins_against,
            losses_against: games_against.saturating_sub(wins_against),
            win_rate: percent(wins_against, games_against),
            attendance_rate: percent(times_brought, times_on_team),
        }
    }
}

/// Ranked opponent views plus the full lookup map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchupViews {
    pub best: Vec<OpponentStat>,
    pub worst: Vec<OpponentStat>,
    pub highest_attendance: Vec<OpponentStat>,
    pub lowest_attendance: Vec<OpponentStat>,

    /// Every opponent seen, regardless of sample size
    pub by_key: BTreeMap<String, OpponentStat>,
}

/// Known record for one selected slot of a custom matchup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotMatchup {
    pub pokemon: String,
    pub win_rate: u32,
    pub wins: u32,
    pub games: u32,
    pub losses: u32,
}

impl From<&OpponentStat> for SlotMatchup {
    fn from(stat: &OpponentStat) -> Self {
        Self {
            pokemon: stat.pokemon.clone(),
            win_rate: stat.win_rate,
            wins: stat.wins_against,
            games: stat.games_against,
            losses: stat.losses_against,
        }
    }
}

/// Result of composing a hypothetical opposing team.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomMatchup {
    /// One entry per slot; `None` for empty or unknown slots
    pub per_slot: Vec<Option<SlotMatchup>>,
    pub average_win_rate: u32,
    pub pokemon_with_data_count: u32,
}

/// Overall record of a team over its replays.
///
/// `wins` and `losses` count every decisive replay, including ones stored without battle data;
/// `analyzed_replays` is the subset the other views are computed from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRecord {
    pub total_replays: u32,
    pub analyzed_replays: u32,
    pub wins: u32,
    pub losses: u32,
    pub win_rate: u32,
}

impl TeamRecord {
    pub fn new(total_replays: u32, analyzed_replays: u32, wins: u32, losses: u32) -> Self {
        Self {
            total_replays,
            analyzed_replays,
            wins,
            losses,
            win_rate: percent(wins, wins + losses),
        }
    }
}

/// Every view for one team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamReport {
    pub team_id: TeamId,
    pub record: TeamRecord,
    pub usage: Vec<PokemonUsage>,
    pub leads: LeadPairViews,
    pub matchups: MatchupViews,
}

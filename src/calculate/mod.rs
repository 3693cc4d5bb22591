//! Replay analytics engine.
//!
//! Computes derived metrics from a team's stored replays:
//! - Per-Pokémon usage, lead and tera win rates
//! - Lead pair usage and win rates
//! - Opponent matchups and attendance
//! - Custom matchup projections
//!
//! Every function here is pure: it reads the replays it is given and returns fresh records.
//! Unanalyzable replays are filtered out by each entry point, so callers may pass the raw store.

mod custom;
mod leads;
mod matchups;
mod usage;

pub use custom::compute_custom_matchup;
pub use leads::compute_lead_pair_stats;
pub use matchups::compute_matchup_stats;
pub use usage::{compute_usage_stats, observed_roster};

use tracing::debug;

use crate::config::AnalyticsConfig;
use crate::models::{Replay, ReplayResult, TeamId, TeamRecord, TeamReport};
use crate::normalize::NameNormalizer;

/// `round(100 * numerator / denominator)`, rounding halves up; 0 when the denominator is 0.
pub fn percent(numerator: u32, denominator: u32) -> u32 {
    if denominator == 0 {
        return 0;
    }
    let n = u64::from(numerator);
    let d = u64::from(denominator);
    ((200 * n + d) / (2 * d)) as u32
}

/// Rounded mean of percentages; 0 for an empty set.
pub fn mean_percent(values: &[u32]) -> u32 {
    if values.is_empty() {
        return 0;
    }
    let sum: u64 = values.iter().map(|v| u64::from(*v)).sum();
    let count = values.len() as u64;
    ((2 * sum + count) / (2 * count)) as u32
}

/// Replays with battle data and a win/loss result.
pub fn filter_valid_replays(replays: &[Replay]) -> Vec<&Replay> {
    let valid: Vec<&Replay> = replays.iter().filter(|r| r.is_analyzable()).collect();
    debug!(
        "Kept {} of {} replays for analysis",
        valid.len(),
        replays.len()
    );
    valid
}

/// Canonical keys for a list of labels, dropping unrecognized labels and repeats.
pub(crate) fn canonical_keys<N>(labels: &[String], normalizer: &N) -> Vec<String>
where
    N: NameNormalizer + ?Sized,
{
    let mut keys: Vec<String> = Vec::with_capacity(labels.len());
    for label in labels {
        let key = normalizer.normalize(label);
        if key.is_empty() {
            debug!("Skipping unrecognized label {:?}", label);
            continue;
        }
        if !keys.contains(&key) {
            keys.push(key);
        }
    }
    keys
}

/// The opening picks, if at least `lead_size` Pokémon were brought.
pub(crate) fn lead_slice(picks: &[String], lead_size: usize) -> Option<&[String]> {
    if lead_size == 0 || picks.len() < lead_size {
        None
    } else {
        Some(&picks[..lead_size])
    }
}

/// Compute every view for a team in one call.
pub fn compute_team_report<N>(
    team_id: TeamId,
    replays: &[Replay],
    roster: &[String],
    normalizer: &N,
    settings: &AnalyticsConfig,
) -> TeamReport
where
    N: NameNormalizer + ?Sized,
{
    let wins = replays
        .iter()
        .filter(|r| r.result == Some(ReplayResult::Win))
        .count() as u32;
    let losses = replays
        .iter()
        .filter(|r| r.result == Some(ReplayResult::Loss))
        .count() as u32;
    let analyzed = filter_valid_replays(replays).len() as u32;

    TeamReport {
        team_id,
        record: TeamRecord::new(replays.len() as u32, analyzed, wins, losses),
        usage: compute_usage_stats(replays, roster, normalizer, settings),
        leads: compute_lead_pair_stats(replays, normalizer, settings),
        matchups: compute_matchup_stats(replays, normalizer, settings),
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Replay builders shared by the engine tests.

    use crate::models::{BattleData, Replay, ReplayResult, TeraEvent};

    pub fn lower(raw: &str) -> String {
        raw.trim().to_lowercase()
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    /// A replay where the user is `p1`.
    pub fn replay(
        n: u32,
        result: ReplayResult,
        user_team: &[&str],
        user_picks: &[&str],
        opp_team: &[&str],
        opp_picks: &[&str],
    ) -> Replay {
        let mut data = BattleData {
            user_player: "p1".to_string(),
            opponent_player: "p2".to_string(),
            ..Default::default()
        };
        data.teams.insert("p1".to_string(), strings(user_team));
        data.teams.insert("p2".to_string(), strings(opp_team));
        data.actual_picks.insert("p1".to_string(), strings(user_picks));
        data.actual_picks.insert("p2".to_string(), strings(opp_picks));

        Replay::new(format!("https://replay.example/{}", n), Some(result)).with_battle_data(data)
    }

    pub fn with_tera(mut replay: Replay, side: &str, pokemon: &[&str]) -> Replay {
        if let Some(data) = replay.battle_data.as_mut() {
            let events = pokemon
                .iter()
                .enumerate()
                .map(|(i, p)| TeraEvent {
                    pokemon: p.to_string(),
                    tera_type: "Fairy".to_string(),
                    turn: Some(i as u32 + 1),
                })
                .collect();
            data.tera_events.insert(side.to_string(), events);
        }
        replay
    }

    /// A user-led game against a fixed opponent.
    pub fn lead_game(n: u32, result: ReplayResult, leads: &[&str]) -> Replay {
        replay(n, result, leads, leads, &["Incineroar"], &["Incineroar"])
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use crate::models::ReplayResult::{Loss, Other, Win};

    #[test]
    fn test_percent() {
        assert_eq!(percent(0, 0), 0);
        assert_eq!(percent(5, 0), 0);
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(2, 3), 67);
        assert_eq!(percent(1, 8), 13);
        assert_eq!(percent(3, 3), 100);
    }

    #[test]
    fn test_mean_percent() {
        assert_eq!(mean_percent(&[]), 0);
        assert_eq!(mean_percent(&[80, 40]), 60);
        assert_eq!(mean_percent(&[50, 51]), 51);
        assert_eq!(mean_percent(&[33, 33, 34]), 33);
    }

    #[test]
    fn test_filter_valid_replays() {
        let mut undecided = replay(3, Other, &["A"], &["A"], &["B"], &["B"]);
        undecided.result = None;
        let replays = vec![
            replay(1, Win, &["A"], &["A"], &["B"], &["B"]),
            replay(2, Other, &["A"], &["A"], &["B"], &["B"]),
            undecided,
            Replay::new("https://replay.example/4".to_string(), Some(Loss)),
            replay(5, Loss, &["A"], &["A"], &["B"], &["B"]),
        ];

        let valid = filter_valid_replays(&replays);
        assert_eq!(valid.len(), 2);
        assert!(valid.iter().all(|r| r.is_analyzable()));
    }

    #[test]
    fn test_canonical_keys_skip_empty_and_duplicates() {
        let normalizer = |raw: &str| if raw == "???" { String::new() } else { lower(raw) };
        let labels: Vec<String> = ["Rillaboom", "???", "rillaboom", "Amoonguss"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        assert_eq!(
            canonical_keys(&labels, &normalizer),
            vec!["rillaboom".to_string(), "amoonguss".to_string()]
        );
    }

    #[test]
    fn test_lead_slice() {
        let picks: Vec<String> = vec!["a".into(), "b".into(), "c".into()];
        assert_eq!(lead_slice(&picks, 2).unwrap().len(), 2);
        assert!(lead_slice(&picks[..1], 2).is_none());
        assert!(lead_slice(&picks, 0).is_none());
    }

    #[test]
    fn test_team_report() {
        let replays = vec![
            lead_game(1, Win, &["Rillaboom", "Incineroar"]),
            lead_game(2, Loss, &["Rillaboom", "Amoonguss"]),
            Replay::new("https://replay.example/3".to_string(), Some(Win)),
        ];
        let roster = vec!["rillaboom".to_string(), "amoonguss".to_string()];

        let report = compute_team_report(
            TeamId::from("sun"),
            &replays,
            &roster,
            &lower,
            &AnalyticsConfig::default(),
        );

        assert_eq!(report.record.total_replays, 3);
        assert_eq!(report.record.analyzed_replays, 2);
        assert_eq!(report.record.wins, 2);
        assert_eq!(report.record.losses, 1);
        assert_eq!(report.record.win_rate, 67);
        assert_eq!(report.usage.len(), 2);
        assert_eq!(report.leads.most_common.len(), 2);
        assert_eq!(report.matchups.by_key["incineroar"].games_against, 2);
    }

    #[test]
    fn test_empty_input() {
        let settings = AnalyticsConfig::default();
        let roster = vec!["rillaboom".to_string()];
        let report = compute_team_report(TeamId::from("empty"), &[], &roster, &lower, &settings);

        assert_eq!(report.record.win_rate, 0);
        assert_eq!(report.usage[0].usage, 0);
        assert_eq!(report.usage[0].tera_win_rate, None);
        assert!(report.leads.most_common.is_empty());
        assert!(report.matchups.by_key.is_empty());
    }

    #[test]
    fn test_report_is_idempotent() {
        let replays = vec![
            lead_game(1, Win, &["Rillaboom", "Incineroar"]),
            lead_game(2, Loss, &["Incineroar", "Rillaboom"]),
        ];
        let roster = vec!["rillaboom".to_string()];
        let settings = AnalyticsConfig::default();

        let first = compute_team_report(TeamId::from("t"), &replays, &roster, &lower, &settings);
        let second = compute_team_report(TeamId::from("t"), &replays, &roster, &lower, &settings);
        assert_eq!(first, second);
    }
}

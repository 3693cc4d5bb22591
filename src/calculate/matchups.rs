//! Opponent matchup and attendance statistics.

use std::cmp::Reverse;
use std::collections::HashMap;

use tracing::debug;

use super::{canonical_keys, filter_valid_replays};
use crate::config::AnalyticsConfig;
use crate::models::{MatchupViews, OpponentStat, Replay};
use crate::normalize::NameNormalizer;

#[derive(Debug)]
struct OpponentCounter {
    pokemon: String,
    times_on_team: u32,
    times_brought: u32,
    games_against: u32,
    wins_against: u32,
}

impl OpponentCounter {
    fn new(pokemon: String) -> Self {
        Self {
            pokemon,
            times_on_team: 0,
            times_brought: 0,
            games_against: 0,
            wins_against: 0,
        }
    }

    fn into_stat(self) -> OpponentStat {
        OpponentStat::new(
            self.pokemon,
            self.times_on_team,
            self.times_brought,
            self.games_against,
            self.wins_against,
        )
    }
}

/// Record against every opposing Pokémon seen at team preview, with four ranked views.
///
/// Best/worst views require `min_matchup_games` encounters; attendance views do not.
/// `by_key` carries every opponent regardless of sample size.
pub fn compute_matchup_stats<N>(
    replays: &[Replay],
    normalizer: &N,
    settings: &AnalyticsConfig,
) -> MatchupViews
where
    N: NameNormalizer + ?Sized,
{
    let valid = filter_valid_replays(replays);

    let mut index: HashMap<String, usize> = HashMap::new();
    let mut counters: Vec<OpponentCounter> = Vec::new();

    for replay in &valid {
        let Some(data) = replay.battle_data.as_ref() else {
            continue;
        };
        let won = replay.is_win();
        let brought = canonical_keys(data.opponent_picks(), normalizer);

        for pokemon in canonical_keys(data.opponent_team(), normalizer) {
            let was_brought = brought.contains(&pokemon);
            let slot = *index.entry(pokemon.clone()).or_insert_with(|| {
                counters.push(OpponentCounter::new(pokemon));
                counters.len() - 1
            });

            let counter = &mut counters[slot];
            counter.times_on_team += 1;
            counter.games_against += 1;
            if was_brought {
                counter.times_brought += 1;
            }
            if won {
                counter.wins_against += 1;
            }
        }
    }

    let stats: Vec<OpponentStat> = counters.into_iter().map(OpponentCounter::into_stat).collect();
    let limit = settings.matchup_view_limit;

    let ranked: Vec<&OpponentStat> = stats
        .iter()
        .filter(|s| s.games_against >= settings.min_matchup_games)
        .collect();

    let mut best = ranked.clone();
    best.sort_by_key(|s| (Reverse(s.win_rate), Reverse(s.games_against)));

    let mut worst = ranked;
    worst.sort_by_key(|s| (s.win_rate, Reverse(s.games_against)));

    let attended: Vec<&OpponentStat> = stats.iter().filter(|s| s.times_on_team > 0).collect();

    let mut highest_attendance = attended.clone();
    highest_attendance.sort_by_key(|s| (Reverse(s.attendance_rate), Reverse(s.times_on_team)));

    let mut lowest_attendance = attended;
    lowest_attendance.sort_by_key(|s| (s.attendance_rate, Reverse(s.times_on_team)));

    let top = |views: Vec<&OpponentStat>| -> Vec<OpponentStat> {
        views.into_iter().take(limit).cloned().collect()
    };

    let best = top(best);
    let worst = top(worst);
    let highest_attendance = top(highest_attendance);
    let lowest_attendance = top(lowest_attendance);

    debug!(
        "Computed matchups against {} opponents over {} games",
        stats.len(),
        valid.len()
    );

    MatchupViews {
        best,
        worst,
        highest_attendance,
        lowest_attendance,
        by_key: stats.into_iter().map(|s| (s.pokemon.clone(), s)).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::*;
    use super::*;
    use crate::models::ReplayResult::{Loss, Other, Win};
    use pretty_assertions::assert_eq;

    const USER: [&str; 4] = ["Rillaboom", "Incineroar", "Flutter Mane", "Amoonguss"];

    fn against(n: u32, won: bool, team: &[&str], picks: &[&str]) -> Replay {
        let result = if won { Win } else { Loss };
        replay(n, result, &USER, &USER, team, picks)
    }

    fn names(stats: &[OpponentStat]) -> Vec<&str> {
        stats.iter().map(|s| s.pokemon.as_str()).collect()
    }

    #[test]
    fn test_roster_and_attendance_counts() {
        let replays = vec![
            against(1, true, &["Ursaluna", "Incineroar"], &["Ursaluna"]),
            against(2, false, &["Ursaluna", "Incineroar"], &["Ursaluna", "Incineroar"]),
            against(3, true, &["Ursaluna", "Tornadus"], &["Tornadus"]),
        ];

        let views = compute_matchup_stats(&replays, &lower, &AnalyticsConfig::default());

        let ursaluna = &views.by_key["ursaluna"];
        assert_eq!(ursaluna.times_on_team, 3);
        assert_eq!(ursaluna.times_brought, 2);
        assert_eq!(ursaluna.games_against, 3);
        assert_eq!(ursaluna.wins_against, 2);
        assert_eq!(ursaluna.win_rate, 67);
        assert_eq!(ursaluna.attendance_rate, 67);

        let incineroar = &views.by_key["incineroar"];
        assert_eq!(incineroar.times_brought, 1);
        assert_eq!(incineroar.attendance_rate, 50);
        assert_eq!(incineroar.losses_against, 1);
    }

    #[test]
    fn test_duplicate_roster_entry_counts_once() {
        let replays = vec![against(1, true, &["Ursaluna", "ursaluna"], &["Ursaluna"])];

        let views = compute_matchup_stats(&replays, &lower, &AnalyticsConfig::default());
        assert_eq!(views.by_key["ursaluna"].games_against, 1);
        assert_eq!(views.by_key["ursaluna"].times_brought, 1);
    }

    #[test]
    fn test_min_sample_size_excludes_from_rankings() {
        let replays = vec![
            against(1, true, &["Ursaluna", "Kingambit"], &[]),
            against(2, true, &["Ursaluna", "Kingambit"], &[]),
            against(3, false, &["Ursaluna"], &[]),
        ];

        let views = compute_matchup_stats(&replays, &lower, &AnalyticsConfig::default());

        assert_eq!(names(&views.best), vec!["ursaluna"]);
        assert_eq!(names(&views.worst), vec!["ursaluna"]);
        assert_eq!(views.by_key["kingambit"].games_against, 2);
        assert_eq!(views.by_key["kingambit"].win_rate, 100);
        // Attendance has no minimum
        assert_eq!(views.highest_attendance.len(), 2);
    }

    #[test]
    fn test_best_and_worst_ordering() {
        let mut replays = Vec::new();
        let mut n = 0;
        let mut push = |pokemon: &str, wins: u32, losses: u32| {
            for i in 0..wins + losses {
                n += 1;
                replays.push(against(n, i < wins, &[pokemon], &[pokemon]));
            }
        };
        push("A", 3, 0); // 100%, 3 games
        push("B", 2, 2); // 50%, 4 games
        push("C", 1, 1); // 50%, 2 games, too few
        push("D", 3, 3); // 50%, 6 games
        push("E", 0, 3); // 0%, 3 games

        let views = compute_matchup_stats(&replays, &lower, &AnalyticsConfig::default());

        assert_eq!(names(&views.best), vec!["a", "d", "b", "e"]);
        assert_eq!(names(&views.worst), vec!["e", "d", "b", "a"]);
    }

    #[test]
    fn test_attendance_ordering() {
        let replays = vec![
            against(1, true, &["A", "B", "C"], &["A"]),
            against(2, true, &["A", "B"], &["A"]),
            against(3, true, &["A", "C"], &["C"]),
        ];

        let views = compute_matchup_stats(&replays, &lower, &AnalyticsConfig::default());

        // a: 2/3 = 67, b: 0/2 = 0, c: 1/2 = 50
        assert_eq!(names(&views.highest_attendance), vec!["a", "c", "b"]);
        assert_eq!(names(&views.lowest_attendance), vec!["b", "c", "a"]);
    }

    #[test]
    fn test_attendance_tie_break_on_roster_count() {
        let replays = vec![
            against(1, true, &["A"], &[]),
            against(2, true, &["B"], &[]),
            against(3, true, &["B"], &[]),
        ];

        let views = compute_matchup_stats(&replays, &lower, &AnalyticsConfig::default());
        assert_eq!(names(&views.lowest_attendance), vec!["b", "a"]);
        assert_eq!(names(&views.highest_attendance), vec!["b", "a"]);
    }

    #[test]
    fn test_views_capped() {
        let team = ["A", "B", "C", "D", "E", "F"];
        let replays: Vec<Replay> = (0..3).map(|n| against(n, n % 2 == 0, &team, &team)).collect();

        let views = compute_matchup_stats(&replays, &lower, &AnalyticsConfig::default());

        assert_eq!(views.by_key.len(), 6);
        assert_eq!(views.best.len(), 5);
        assert_eq!(views.worst.len(), 5);
        assert_eq!(views.highest_attendance.len(), 5);
        assert_eq!(views.lowest_attendance.len(), 5);
    }

    #[test]
    fn test_invalid_replays_ignored() {
        let mut no_data = against(2, true, &["Ursaluna"], &["Ursaluna"]);
        no_data.battle_data = None;
        let replays = vec![
            replay(1, Other, &USER, &USER, &["Ursaluna"], &["Ursaluna"]),
            no_data,
        ];

        let views = compute_matchup_stats(&replays, &lower, &AnalyticsConfig::default());
        assert!(views.by_key.is_empty());
    }

    #[test]
    fn test_variant_labels_share_bucket() {
        let normalizer = |raw: &str| match raw {
            "Urshifu-*" | "Urshifu-Rapid-Strike" => "urshifu".to_string(),
            other => other.to_lowercase(),
        };
        let replays = vec![against(1, false, &["Urshifu-*"], &["Urshifu-Rapid-Strike"])];

        let views = compute_matchup_stats(&replays, &normalizer, &AnalyticsConfig::default());
        assert_eq!(views.by_key["urshifu"].times_brought, 1);
        assert_eq!(views.by_key["urshifu"].attendance_rate, 100);
    }

    #[test]
    fn test_empty_input() {
        let views = compute_matchup_stats(&[], &lower, &AnalyticsConfig::default());
        assert_eq!(views, MatchupViews::default());
    }
}

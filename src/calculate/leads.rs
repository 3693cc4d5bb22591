//! Lead pair statistics.

use std::cmp::Reverse;
use std::collections::HashMap;

use tracing::debug;

use super::{filter_valid_replays, lead_slice};
use crate::config::AnalyticsConfig;
use crate::models::{LeadPairStat, LeadPairViews, Replay};
use crate::normalize::NameNormalizer;

struct LeadCounter {
    key: String,
    pokemon: Vec<String>,
    usage: u32,
    wins: u32,
}

/// Group replays by the user's opening picks and rank the groups.
///
/// Replays with fewer than `lead_size` picks, or with a lead that does not normalize, are
/// skipped here only. Groups are kept in first-seen order so ties rank deterministically.
pub fn compute_lead_pair_stats<N>(
    replays: &[Replay],
    normalizer: &N,
    settings: &AnalyticsConfig,
) -> LeadPairViews
where
    N: NameNormalizer + ?Sized,
{
    let valid = filter_valid_replays(replays);
    let total_games = valid.len() as u32;

    let mut index: HashMap<String, usize> = HashMap::new();
    let mut counters: Vec<LeadCounter> = Vec::new();

    for replay in &valid {
        let Some(data) = replay.battle_data.as_ref() else {
            continue;
        };
        let Some(leads) = lead_slice(data.user_picks(), settings.lead_size) else {
            debug!("Replay {} has too few picks for a lead", replay.id);
            continue;
        };

        let members: Vec<String> = leads.iter().map(|l| normalizer.normalize(l)).collect();
        if members.iter().any(String::is_empty) {
            debug!("Replay {} has an unrecognized lead", replay.id);
            continue;
        }

        let (key, pokemon) = LeadPairStat::key_for(&members);
        let slot = *index.entry(key.clone()).or_insert_with(|| {
            counters.push(LeadCounter {
                key,
                pokemon,
                usage: 0,
                wins: 0,
            });
            counters.len() - 1
        });

        let counter = &mut counters[slot];
        counter.usage += 1;
        if replay.is_win() {
            counter.wins += 1;
        }
    }

    let stats: Vec<LeadPairStat> = counters
        .into_iter()
        .map(|c| LeadPairStat::new(c.key, c.pokemon, c.usage, c.wins, total_games))
        .collect();

    let mut most_common = stats.clone();
    most_common.sort_by_key(|s| Reverse(s.usage));
    most_common.truncate(settings.lead_view_limit);

    let mut best_win_rate = stats;
    best_win_rate.sort_by_key(|s| (Reverse(s.win_rate), Reverse(s.usage)));
    best_win_rate.truncate(settings.lead_view_limit);

    debug!(
        "Ranked {} lead groups over {} games",
        index.len(),
        total_games
    );

    LeadPairViews {
        most_common,
        best_win_rate,
    }
}

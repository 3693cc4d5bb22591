//! Per-Pokémon usage on the user's own team.

use tracing::debug;

use super::{canonical_keys, filter_valid_replays, lead_slice};
use crate::config::AnalyticsConfig;
use crate::models::{PokemonUsage, Replay};
use crate::normalize::NameNormalizer;

#[derive(Debug, Default)]
struct UsageCounter {
    usage: u32,
    wins: u32,
    lead_usage: u32,
    lead_wins: u32,
    tera_usage: u32,
    tera_wins: u32,
}

/// What one replay says about the user's side, in canonical keys.
struct UserSide {
    won: bool,
    picks: Vec<String>,
    leads: Vec<String>,
    first_tera: Option<String>,
}

/// Usage, lead and tera statistics for each roster member, in roster order.
///
/// `roster` holds canonical keys; empty keys and repeats are dropped.
pub fn compute_usage_stats<N>(
    replays: &[Replay],
    roster: &[String],
    normalizer: &N,
    settings: &AnalyticsConfig,
) -> Vec<PokemonUsage>
where
    N: NameNormalizer + ?Sized,
{
    let valid = filter_valid_replays(replays);
    let total_games = valid.len() as u32;

    let sides: Vec<UserSide> = valid
        .iter()
        .filter_map(|replay| {
            let data = replay.battle_data.as_ref()?;
            let leads = lead_slice(data.user_picks(), settings.lead_size)
                .map(|leads| canonical_keys(leads, normalizer))
                .unwrap_or_default();
            let first_tera = data
                .user_first_tera()
                .map(|event| normalizer.normalize(&event.pokemon))
                .filter(|key| !key.is_empty());

            Some(UserSide {
                won: replay.is_win(),
                picks: canonical_keys(data.user_picks(), normalizer),
                leads,
                first_tera,
            })
        })
        .collect();

    let mut seen: Vec<&str> = Vec::with_capacity(roster.len());
    let mut stats = Vec::with_capacity(roster.len());

    for pokemon in roster {
        if pokemon.is_empty() || seen.contains(&pokemon.as_str()) {
            continue;
        }
        seen.push(pokemon);

        let mut counter = UsageCounter::default();
        for side in &sides {
            let won = u32::from(side.won);
            if side.picks.contains(pokemon) {
                counter.usage += 1;
                counter.wins += won;
            }
            if side.leads.contains(pokemon) {
                counter.lead_usage += 1;
                counter.lead_wins += won;
            }
            if side.first_tera.as_ref() == Some(pokemon) {
                counter.tera_usage += 1;
                counter.tera_wins += won;
            }
        }

        stats.push(PokemonUsage::new(
            pokemon.clone(),
            counter.usage,
            counter.wins,
            counter.lead_usage,
            counter.lead_wins,
            counter.tera_usage,
            counter.tera_wins,
            total_games,
        ));
    }

    debug!(
        "Computed usage for {} roster members over {} games",
        stats.len(),
        total_games
    );
    stats
}

/// The user's roster as seen across analyzable replays, in first-seen order.
///
/// Used when no paste is available for the team.
pub fn observed_roster<N>(replays: &[Replay], normalizer: &N) -> Vec<String>
where
    N: NameNormalizer + ?Sized,
{
    let mut roster: Vec<String> = Vec::new();
    for replay in filter_valid_replays(replays) {
        let Some(data) = replay.battle_data.as_ref() else {
            continue;
        };
        for key in canonical_keys(data.user_team(), normalizer) {
            if !roster.contains(&key) {
                roster.push(key);
            }
        }
    }
    roster
}

//! Custom matchup projection against a hypothetical opposing team.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use super::mean_percent;
use crate::config::AnalyticsConfig;
use crate::models::{CustomMatchup, OpponentStat, SlotMatchup};

/// Look up each selected opponent and average the known win rates.
///
/// Empty slots and keys with no recorded history yield `None` and are left out of the average
/// rather than counted as 0%. Selections beyond `custom_slots` are ignored.
pub fn compute_custom_matchup<S>(
    by_key: &BTreeMap<String, OpponentStat>,
    selected: &[Option<S>],
    settings: &AnalyticsConfig,
) -> CustomMatchup
where
    S: AsRef<str>,
{
    if selected.len() > settings.custom_slots {
        warn!(
            "Custom matchup has {} slots, only the first {} are used",
            selected.len(),
            settings.custom_slots
        );
    }

    let per_slot: Vec<Option<SlotMatchup>> = selected
        .iter()
        .take(settings.custom_slots)
        .map(|slot| {
            let key: &str = slot.as_ref()?.as_ref();
            if key.is_empty() {
                return None;
            }
            let found = by_key.get(key).map(SlotMatchup::from);
            if found.is_none() {
                debug!("No recorded history against {:?}", key);
            }
            found
        })
        .collect();

    let rates: Vec<u32> = per_slot.iter().flatten().map(|s| s.win_rate).collect();

    CustomMatchup {
        average_win_rate: mean_percent(&rates),
        pokemon_with_data_count: rates.len() as u32,
        per_slot,
    }
}

//! Pokepaste parsing.
//!
//! Only the parts needed to know the roster are read: the header line of each set and its
//! `Tera Type:` line. Abilities, spreads and moves are ignored.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::normalize::NameNormalizer;

/// Sets in a full team.
pub const MAX_TEAM_SIZE: usize = 6;

/// One set's header information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasteEntry {
    pub species: String,
    pub nickname: Option<String>,
    pub item: Option<String>,
    pub tera_type: Option<String>,
}

fn header_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?P<name>.*?)(?:\s+\((?P<gender>[MF])\))?(?:\s+@\s+(?P<item>.+?))?\s*$")
            .expect("header pattern is valid")
    })
}

fn nickname_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?P<nick>.+?)\s+\((?P<species>[^()]+)\)$").expect("nickname pattern is valid")
    })
}

/// Parse a set header such as `Kitty (Incineroar) (F) @ Safety Goggles`.
pub fn parse_header(line: &str) -> Option<PasteEntry> {
    let caps = header_re().captures(line.trim())?;
    let name = caps.name("name")?.as_str().trim();
    if name.is_empty() {
        return None;
    }

    let (species, nickname) = match nickname_re().captures(name) {
        Some(nick) => (
            nick["species"].trim().to_string(),
            Some(nick["nick"].trim().to_string()),
        ),
        None => (name.to_string(), None),
    };

    Some(PasteEntry {
        species,
        nickname,
        item: caps.name("item").map(|m| m.as_str().trim().to_string()),
        tera_type: None,
    })
}

/// Parse a pokepaste into at most six entries.
pub fn parse_paste(text: &str) -> Vec<PasteEntry> {
    let mut entries: Vec<PasteEntry> = Vec::new();
    let mut in_block = false;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            in_block = false;
            continue;
        }

        if !in_block {
            in_block = true;
            if let Some(entry) = parse_header(line) {
                entries.push(entry);
            }
            continue;
        }

        if let Some(tera) = line.strip_prefix("Tera Type:") {
            if let Some(entry) = entries.last_mut() {
                entry.tera_type = Some(tera.trim().to_string());
            }
        }
    }

    if entries.len() > MAX_TEAM_SIZE {
        debug!(
            "Paste has {} sets, keeping the first {}",
            entries.len(),
            MAX_TEAM_SIZE
        );
        entries.truncate(MAX_TEAM_SIZE);
    }

    entries
}

/// Canonical roster keys in paste order, without empties or repeats.
pub fn roster_keys<N>(entries: &[PasteEntry], normalizer: &N) -> Vec<String>
where
    N: NameNormalizer + ?Sized,
{
    let mut keys: Vec<String> = Vec::with_capacity(entries.len());
    for entry in entries {
        let key = normalizer.normalize(&entry.species);
        if !key.is_empty() && !keys.contains(&key) {
            keys.push(key);
        }
    }
    keys
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::ShowdownNormalizer;
    use pretty_assertions::assert_eq;

    const PASTE: &str = "\
Kitty (Incineroar) (F) @ Safety Goggles
Ability: Intimidate
Level: 50
Tera Type: Ghost
EVs: 252 HP / 4 Atk / 252 SpD
Careful Nature
- Fake Out
- Knock Off

Rillaboom @ Assault Vest
Ability: Grassy Surge
Tera Type: Fire
- Grassy Glide

Maushold-Four @ Wide Lens
Ability: Technician
- Population Bomb

Flutter Mane (M)
Tera Type: Fairy
- Moonblast
";

    #[test]
    fn test_parse_header_variants() {
        let entry = parse_header("Kitty (Incineroar) (F) @ Safety Goggles").unwrap();
        assert_eq!(entry.species, "Incineroar");
        assert_eq!(entry.nickname.as_deref(), Some("Kitty"));
        assert_eq!(entry.item.as_deref(), Some("Safety Goggles"));

        let entry = parse_header("Incineroar (M) @ Sitrus Berry").unwrap();
        assert_eq!(entry.species, "Incineroar");
        assert_eq!(entry.nickname, None);

        let entry = parse_header("Urshifu-Rapid-Strike").unwrap();
        assert_eq!(entry.species, "Urshifu-Rapid-Strike");
        assert_eq!(entry.item, None);

        assert!(parse_header("   ").is_none());
    }

    #[test]
    fn test_parse_paste() {
        let entries = parse_paste(PASTE);

        assert_eq!(entries.len(), 4);
        assert_eq!(entries[0].species, "Incineroar");
        assert_eq!(entries[0].tera_type.as_deref(), Some("Ghost"));
        assert_eq!(entries[1].tera_type.as_deref(), Some("Fire"));
        assert_eq!(entries[2].tera_type, None);
        assert_eq!(entries[3].species, "Flutter Mane");
    }

    #[test]
    fn test_parse_paste_caps_team_size() {
        let text: String = (0..8).map(|i| format!("Mon{}\n- Tackle\n\n", i)).collect();
        assert_eq!(parse_paste(&text).len(), MAX_TEAM_SIZE);
    }

    #[test]
    fn test_roster_keys() {
        let normalizer = ShowdownNormalizer::builtin().unwrap();
        let mut entries = parse_paste(PASTE);
        entries.push(entries[0].clone());

        assert_eq!(
            roster_keys(&entries, &normalizer),
            vec!["incineroar", "rillaboom", "maushold", "flutter-mane"]
        );
    }
}

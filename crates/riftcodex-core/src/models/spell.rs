//! Game modes and summoner spells.

use serde::Deserialize;

/// Synthetic mode placed first in the mode list; selects every spell.
pub const ALL_GAME_MODES: &str = "All Game Modes";

/// A game mode from the Riot static docs listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GameMode {
    #[serde(rename = "gameMode")]
    pub mode: String,
    pub description: String,
}

impl GameMode {
    pub fn all() -> Self {
        Self {
            mode: ALL_GAME_MODES.to_string(),
            description: "Showing all Summoner's Spells from all game modes.".to_string(),
        }
    }
}

/// A summoner spell from `summoner.json`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SummonerSpell {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub modes: Vec<String>,
    #[serde(rename = "cooldownBurn", default)]
    pub cooldown_burn: String,
    #[serde(rename = "summonerLevel", default)]
    pub summoner_level: i64,
}

impl SummonerSpell {
    pub fn available_in(&self, mode: &str) -> bool {
        mode == ALL_GAME_MODES || self.modes.iter().any(|m| m == mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_summoner_spell() {
        let json = r#"{"id":"SummonerFlash","name":"Flash","description":"Teleports your champion.","modes":["CLASSIC","ARAM"],"cooldownBurn":"300","summonerLevel":7,"key":"4"}"#;
        let spell: SummonerSpell = serde_json::from_str(json).expect("Failed to parse spell test JSON");
        assert_eq!(spell.name, "Flash");
        assert_eq!(spell.cooldown_burn, "300");
        assert_eq!(spell.summoner_level, 7);
        assert!(spell.available_in("ARAM"));
        assert!(!spell.available_in("URF"));
        assert!(spell.available_in(ALL_GAME_MODES));
    }

    #[test]
    fn test_parse_game_mode() {
        let mode: GameMode =
            serde_json::from_str(r#"{"gameMode":"ARAM","description":"ARAM games"}"#).expect("mode");
        assert_eq!(mode.mode, "ARAM");
    }
}

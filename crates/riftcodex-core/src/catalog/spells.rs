//! Game modes and summoner spells.
//!
//! Both listings are small, fetched whole, and replaced whole on refetch.

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use serde::Deserialize;
use tracing::{info, warn};

use crate::api::{fetch_ok, FetchError, RemoteFetcher};
use crate::models::{GameMode, SummonerSpell};
use crate::store::Snapshot;

#[derive(Debug, Deserialize)]
struct SummonerResponse {
    data: BTreeMap<String, SummonerSpell>,
}

pub struct SpellBook {
    fetcher: Arc<dyn RemoteFetcher>,
    game_modes_url: String,
    spells_url: String,
    modes: RwLock<Option<Snapshot<Vec<GameMode>>>>,
    spells: RwLock<Option<Snapshot<Vec<SummonerSpell>>>>,
}

impl SpellBook {
    pub fn new(
        fetcher: Arc<dyn RemoteFetcher>,
        game_modes_url: impl Into<String>,
        spells_url: impl Into<String>,
    ) -> Self {
        Self {
            fetcher,
            game_modes_url: game_modes_url.into(),
            spells_url: spells_url.into(),
            modes: RwLock::new(None),
            spells: RwLock::new(None),
        }
    }

    /// Fetch the game mode list. The synthetic "All Game Modes" entry comes first.
    pub async fn fetch_game_modes(&self) -> Result<(), FetchError> {
        let result = async {
            let body = fetch_ok(self.fetcher.as_ref(), &self.game_modes_url).await?;
            let fetched: Vec<GameMode> = serde_json::from_slice(&body)?;
            Ok::<_, FetchError>(fetched)
        }
        .await;

        let fetched = result.inspect_err(|e| warn!(error = %e, "Game mode fetch failed"))?;
        let mut modes = Vec::with_capacity(fetched.len() + 1);
        modes.push(GameMode::all());
        modes.extend(fetched);

        info!(count = modes.len(), "Game modes loaded");
        *self.modes.write().unwrap_or_else(PoisonError::into_inner) = Some(Snapshot::new(modes));
        Ok(())
    }

    pub async fn fetch_summoner_spells(&self) -> Result<(), FetchError> {
        let result = async {
            let body = fetch_ok(self.fetcher.as_ref(), &self.spells_url).await?;
            let response: SummonerResponse = serde_json::from_slice(&body)?;
            Ok::<_, FetchError>(response)
        }
        .await;

        let response = result.inspect_err(|e| warn!(error = %e, "Summoner spell fetch failed"))?;
        let spells: Vec<SummonerSpell> = response.data.into_values().collect();

        info!(count = spells.len(), "Summoner spells loaded");
        *self.spells.write().unwrap_or_else(PoisonError::into_inner) = Some(Snapshot::new(spells));
        Ok(())
    }

    pub fn game_modes(&self) -> Vec<GameMode> {
        self.modes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|s| s.data.clone())
            .unwrap_or_default()
    }

    pub fn summoner_spells(&self) -> Vec<SummonerSpell> {
        self.spells_for(|_| true)
    }

    /// Spells usable in `mode`; "All Game Modes" returns every spell
    pub fn spells_for_mode(&self, mode: &str) -> Vec<SummonerSpell> {
        self.spells_for(|spell| spell.available_in(mode))
    }

    fn spells_for(&self, keep: impl Fn(&SummonerSpell) -> bool) -> Vec<SummonerSpell> {
        self.spells
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|s| s.data.iter().filter(|spell| keep(spell)).cloned().collect())
            .unwrap_or_default()
    }
}

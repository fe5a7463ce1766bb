//! Data models for Data Dragon and Meraki entities.
//!
//! This module contains the data structures the stores hand out:
//!
//! - `EntityRecord`, `DetailRecord`: schemaless JSON documents with soft
//!   field access through the `Document` trait
//! - `IdList`: entity id lists normalized from mixed string/number arrays
//! - `GameMode`, `SummonerSpell`: game mode and summoner spell listings

pub mod ids;
pub mod record;
pub mod spell;

pub use ids::IdList;
pub use record::{DetailRecord, Document, EntityRecord};
pub use spell::{GameMode, SummonerSpell, ALL_GAME_MODES};

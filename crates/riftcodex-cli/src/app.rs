//! Command handlers and the interactive item browser.
//!
//! `App` owns the catalog, the navigation history and the randomizer for
//! one run of the program. One-shot commands fetch what they need and
//! print; `browse` runs a line REPL over the history until `quit`.

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, warn};

use riftcodex_core::catalog::{resolve_view, Catalog, ItemView};
use riftcodex_core::history::{NavigationHistory, ViewState};
use riftcodex_core::models::{Document, ALL_GAME_MODES};
use riftcodex_core::{Config, HttpFetcher, Randomizer, RemoteFetcher};

use crate::utils::{format_price, strip_markup, truncate_string};

// ============================================================================
// Constants
// ============================================================================

/// Column width for names in item listings
const NAME_WIDTH: usize = 32;

/// Descriptions longer than this are cut in listings
const DESCRIPTION_WIDTH: usize = 72;

const BROWSE_HELP: &str = "\
  tag <TAG>        list items with TAG
  item <name|id>   show one item
  random           pick a random item from the current listing
  back / forward   move through history
  reset            clear history
  history          show history
  quit             save history and exit";

// ============================================================================
// Browser commands
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseCommand {
    Tag(String),
    Item(String),
    Random,
    Back,
    Forward,
    Reset,
    History,
    Help,
    Quit,
    Unknown(String),
}

impl BrowseCommand {
    /// Parse one input line; `None` for a blank line
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match (word.to_lowercase().as_str(), rest.is_empty()) {
            ("tag", false) => BrowseCommand::Tag(rest.to_uppercase()),
            ("item", false) => BrowseCommand::Item(rest.to_string()),
            ("random", true) => BrowseCommand::Random,
            ("back" | "b", true) => BrowseCommand::Back,
            ("forward" | "f", true) => BrowseCommand::Forward,
            ("reset", true) => BrowseCommand::Reset,
            ("history", true) => BrowseCommand::History,
            ("help" | "?", true) => BrowseCommand::Help,
            ("quit" | "q" | "exit", true) => BrowseCommand::Quit,
            _ => BrowseCommand::Unknown(line.to_string()),
        };
        Some(command)
    }
}

// ============================================================================
// App
// ============================================================================

pub struct App {
    config: Config,
    catalog: Catalog,
    history: NavigationHistory,
    randomizer: Randomizer,
    /// Tag carried into entity views opened from a tag listing
    active_tag: Option<String>,
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        let fetcher = HttpFetcher::with_timeout(config.request_timeout())
            .context("Failed to build HTTP client")?;
        let fetcher: Arc<dyn RemoteFetcher> = Arc::new(fetcher);

        Ok(Self {
            catalog: Catalog::new(config.clone(), fetcher),
            config,
            history: NavigationHistory::new(),
            randomizer: Randomizer::new(),
            active_tag: None,
        })
    }

    // =========================================================================
    // Champions
    // =========================================================================

    pub async fn list_champions(&self) -> Result<()> {
        self.catalog
            .fetch_champions()
            .await
            .context("Failed to load champions")?;

        for name in self.catalog.champion_names() {
            println!("{:<16} {}", name, self.catalog.champion_title(&name));
        }
        println!(
            "\n{} champions, fetched {}",
            self.catalog.champions().len(),
            self.catalog.champions().age_display()
        );
        Ok(())
    }

    pub async fn show_champion(&self, name: &str) -> Result<()> {
        self.catalog
            .fetch_champions()
            .await
            .context("Failed to load champions")?;

        let id = self.catalog.champion_id(name);
        let detail = self
            .catalog
            .champion_detail(&id)
            .await
            .with_context(|| format!("Failed to load champion '{}'", name))?;

        println!("{} - {}", name, self.catalog.champion_title(&id));
        let tags = self.catalog.champion_tags(&id);
        if !tags.is_empty() {
            println!("Roles: {}", tags.join(", "));
        }
        println!("{}\n", self.catalog.champion_splash_url(&id));

        println!("{}\n", strip_markup(&self.catalog.champion_lore(&id).await?));

        if let Some(passive) = self.catalog.champion_passive(&id).await? {
            let passive_name = passive.get("name").and_then(|v| v.as_str()).unwrap_or("");
            println!("Passive: {}", passive_name);
        }
        for spell in self.catalog.champion_spells(&id).await? {
            let spell_name = spell.get("name").and_then(|v| v.as_str()).unwrap_or("?");
            let text = spell.get("description").and_then(|v| v.as_str()).unwrap_or("");
            println!(
                "  {:<24} {}",
                spell_name,
                truncate_string(&strip_markup(text), DESCRIPTION_WIDTH)
            );
        }

        let ally_tips = self.catalog.champion_ally_tips(&id).await?;
        let enemy_tips = self.catalog.champion_enemy_tips(&id).await?;
        {
            let mut rng = rand::thread_rng();
            print_tips("Playing as", &shuffle_tips(ally_tips, &mut rng));
            print_tips("Playing against", &shuffle_tips(enemy_tips, &mut rng));
        }

        let skins = self.catalog.champion_skins(&id).await?;
        println!("\n{} skins", skins.len());
        debug!(id = detail.id(), "Champion shown");
        Ok(())
    }

    pub async fn random_champion(&self) -> Result<()> {
        self.catalog
            .fetch_champions()
            .await
            .context("Failed to load champions")?;

        self.randomizer.pick_random(self.catalog.champion_ids());
        match self.randomizer.wait().await {
            Some(id) => {
                let name = self
                    .catalog
                    .champion_summary(&id)
                    .map(|record| record.name().to_string())
                    .unwrap_or_else(|| id.clone());
                println!("{} - {}", name, self.catalog.champion_title(&id));
                println!("{}", self.catalog.champion_icon_url(&id));
            }
            None => println!("No champions to pick from"),
        }
        Ok(())
    }

    // =========================================================================
    // Items
    // =========================================================================

    pub async fn list_items(&self, tag: Option<&str>) -> Result<()> {
        self.load_items().await?;

        let ids = match tag {
            Some(tag) => self.catalog.items_by_tag(tag),
            None => self.catalog.item_ids(),
        };
        if ids.is_empty() {
            println!("No items found");
        }
        for id in &ids {
            self.print_item_row(id);
        }
        println!("\n{} items, fetched {}", ids.len(), self.catalog.items().age_display());
        Ok(())
    }

    pub async fn show_item(&self, name_or_id: &str) -> Result<()> {
        self.load_items().await?;

        let id = self.catalog.item_id(name_or_id);
        if !self.catalog.item_exists(&id) {
            bail!("No item named '{}'", name_or_id);
        }
        self.print_item(&id).await
    }

    async fn load_items(&self) -> Result<()> {
        self.catalog
            .fetch_items()
            .await
            .context("Failed to load items")
    }

    fn print_item_row(&self, id: &str) {
        println!(
            "{:>6}  {:<width$} {:>6}",
            id,
            truncate_string(&self.catalog.item_name(id), NAME_WIDTH),
            format_price(self.catalog.item_cost(id)),
            width = NAME_WIDTH
        );
    }

    async fn print_item(&self, id: &str) -> Result<()> {
        println!("{} ({})", self.catalog.item_name(id), id);
        println!("{}", strip_markup(&self.catalog.item_description(id)));
        println!(
            "Cost {}  Sell {}{}",
            format_price(self.catalog.item_cost(id)),
            format_price(self.catalog.item_sell_price(id)),
            if self.catalog.item_purchasable(id) { "" } else { "  (not purchasable)" }
        );

        let tags = self.catalog.item_tags(id);
        if !tags.is_empty() {
            println!("Tags: {}", tags.join(", "));
        }
        if let serde_json::Value::Object(stats) = self.catalog.item_stats(id) {
            for (stat, value) in stats {
                if let Some(flat) = value.get("flat").and_then(|v| v.as_f64()).filter(|v| *v != 0.0) {
                    println!("  {:<24} {}", stat, flat);
                }
            }
        }

        let from = self.item_names(self.catalog.builds_from(id).await?);
        if !from.is_empty() {
            println!("Builds from: {}", from.join(", "));
        }
        let into = self.item_names(self.catalog.builds_into(id).await?);
        if !into.is_empty() {
            println!("Builds into: {}", into.join(", "));
        }
        Ok(())
    }

    fn item_names(&self, ids: Vec<String>) -> Vec<String> {
        ids.iter().map(|id| self.catalog.item_name(id)).collect()
    }

    // =========================================================================
    // Summoner spells
    // =========================================================================

    pub async fn list_spells(&self, mode: Option<&str>) -> Result<()> {
        self.catalog
            .spells()
            .fetch_summoner_spells()
            .await
            .context("Failed to load summoner spells")?;

        let mode = mode.unwrap_or(ALL_GAME_MODES);
        let spells = self.catalog.spells().spells_for_mode(mode);
        if spells.is_empty() {
            println!("No summoner spells for {}", mode);
        }
        for spell in spells {
            println!(
                "{:<12} lvl {:>2}  cd {:>4}s  {}",
                spell.name,
                spell.summoner_level,
                spell.cooldown_burn,
                truncate_string(&strip_markup(&spell.description), DESCRIPTION_WIDTH)
            );
            debug!(icon = %self.config.summoner_spell_icon_url(&spell.id), "Spell listed");
        }
        Ok(())
    }

    pub async fn list_modes(&self) -> Result<()> {
        self.catalog
            .spells()
            .fetch_game_modes()
            .await
            .context("Failed to load game modes")?;

        for mode in self.catalog.spells().game_modes() {
            println!("{:<16} {}", mode.mode, mode.description);
        }
        Ok(())
    }

    // =========================================================================
    // Browser
    // =========================================================================

    /// Line REPL over the navigation history. History is loaded on start
    /// and saved on quit or end of input.
    pub async fn browse(&mut self) -> Result<()> {
        self.load_items().await?;

        let history_path = self.config.history_path()?;
        self.history = NavigationHistory::load(&history_path).unwrap_or_else(|e| {
            warn!(error = %e, path = %history_path.display(), "Ignoring unreadable history");
            NavigationHistory::new()
        });
        let start = self.history.current().clone();
        self.show_view(&start).await;

        println!("Type 'help' for commands.");
        loop {
            print!("> ");
            io::stdout().flush()?;

            let mut input = String::new();
            if io::stdin().read_line(&mut input)? == 0 {
                break;
            }
            let Some(command) = BrowseCommand::parse(&input) else {
                continue;
            };
            if command == BrowseCommand::Quit {
                break;
            }
            self.run_browse_command(command).await;
        }

        self.history
            .save(&history_path)
            .with_context(|| format!("Failed to save history to {}", history_path.display()))?;
        Ok(())
    }

    async fn run_browse_command(&mut self, command: BrowseCommand) {
        match command {
            BrowseCommand::Tag(tag) => {
                self.navigate(ViewState::tag(tag)).await;
            }
            BrowseCommand::Item(name) => {
                let id = self.catalog.item_id(&name);
                if self.catalog.item_exists(&id) {
                    self.navigate(ViewState::entity(id, self.active_tag.clone())).await;
                } else {
                    println!("No item named '{}'", name);
                }
            }
            BrowseCommand::Random => self.random_item().await,
            BrowseCommand::Back => match self.history.back().cloned() {
                Some(view) => self.show_view(&view).await,
                None => println!("Already at the oldest entry"),
            },
            BrowseCommand::Forward => match self.history.forward().cloned() {
                Some(view) => self.show_view(&view).await,
                None => println!("Already at the newest entry"),
            },
            BrowseCommand::Reset => {
                self.history.reset();
                self.active_tag = None;
                println!("History cleared");
            }
            BrowseCommand::History => self.print_history(),
            BrowseCommand::Help => println!("{}", BROWSE_HELP),
            BrowseCommand::Quit => {}
            BrowseCommand::Unknown(line) => println!("Unknown command '{}'", line),
        }
    }

    async fn navigate(&mut self, view: ViewState) {
        let view = self.history.push(view, true).clone();
        self.show_view(&view).await;
    }

    /// Pick from the current listing, or from every item when it is empty
    async fn random_item(&mut self) {
        let listed = resolve_view(&self.catalog, self.history.current(), self.active_tag.as_deref())
            .map(|view| view.items)
            .unwrap_or_default();
        let population = if listed.len() > 1 {
            listed
        } else {
            self.catalog.item_ids()
        };

        if !self.randomizer.pick_random(population) {
            println!("A pick is already running");
            return;
        }
        let picked = loop {
            if let Some(result) = self.randomizer.poll() {
                break result;
            }
            tokio::task::yield_now().await;
        };
        match picked {
            Some(id) => self.navigate(ViewState::entity(id, self.active_tag.clone())).await,
            None => println!("Nothing to pick from"),
        }
    }

    async fn show_view(&mut self, view: &ViewState) {
        let Some(resolved) = resolve_view(&self.catalog, view, self.active_tag.as_deref()) else {
            println!("Item '{}' is no longer available", view.entity_id());
            return;
        };
        self.active_tag = resolved.active_tag.clone();

        if view.is_tag_view {
            self.print_listing(&resolved).await;
        } else if let Some(id) = resolved.items.first() {
            if let Err(e) = self.print_item(id).await {
                println!("Failed to show item: {}", e);
            }
        }
    }

    async fn print_listing(&self, view: &ItemView) {
        match view.active_tag {
            Some(ref tag) => println!("{} items tagged {}", view.items.len(), tag),
            None => {
                println!("Pick a tag: {}", riftcodex_core::catalog::ALLOWED_TAGS.join(", "));
                return;
            }
        }
        let resident = self.catalog.prefetch_item_details(&view.items).await;
        debug!(resident, listed = view.items.len(), "Listing prefetched");
        for id in &view.items {
            self.print_item_row(id);
        }
    }

    fn print_history(&self) {
        for (index, entry) in self.history.entries().iter().enumerate() {
            let marker = if index == self.history.current_index() { ">" } else { " " };
            let label = if entry.is_initial() {
                "(start)".to_string()
            } else if entry.is_tag_view {
                format!("tag {}", entry.tag_name())
            } else {
                format!("item {}", self.catalog.item_name(entry.entity_id()))
            };
            println!("{} {:>3}  {}", marker, index, label);
        }
    }
}

/// Tips in a fresh random order
fn shuffle_tips<R: Rng + ?Sized>(mut tips: Vec<String>, rng: &mut R) -> Vec<String> {
    tips.shuffle(rng);
    tips
}

fn print_tips(heading: &str, tips: &[String]) {
    if tips.is_empty() {
        return;
    }
    println!("\n{}:", heading);
    for tip in tips {
        println!("  - {}", tip);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_browse_commands() {
        assert_eq!(BrowseCommand::parse("tag tank"), Some(BrowseCommand::Tag("TANK".to_string())));
        assert_eq!(
            BrowseCommand::parse("item  Plated Steelcaps "),
            Some(BrowseCommand::Item("Plated Steelcaps".to_string()))
        );
        assert_eq!(BrowseCommand::parse("back"), Some(BrowseCommand::Back));
        assert_eq!(BrowseCommand::parse("F"), Some(BrowseCommand::Forward));
        assert_eq!(BrowseCommand::parse("quit"), Some(BrowseCommand::Quit));
        assert_eq!(BrowseCommand::parse("   "), None);
    }

    #[test]
    fn test_shuffle_tips_keeps_every_tip() {
        use rand::rngs::StdRng;
        use rand::SeedableRng;

        let tips: Vec<String> = (1..=6).map(|n| format!("tip {}", n)).collect();
        let mut rng = StdRng::seed_from_u64(3);
        let mut orders = std::collections::HashSet::new();
        for _ in 0..20 {
            let shuffled = shuffle_tips(tips.clone(), &mut rng);
            let mut sorted = shuffled.clone();
            sorted.sort();
            assert_eq!(sorted, tips);
            orders.insert(shuffled);
        }
        assert!(orders.len() > 1);
        assert!(shuffle_tips(Vec::new(), &mut rng).is_empty());
    }

    #[test]
    fn test_parse_browse_command_missing_argument() {
        assert_eq!(BrowseCommand::parse("tag"), Some(BrowseCommand::Unknown("tag".to_string())));
        assert_eq!(
            BrowseCommand::parse("back now"),
            Some(BrowseCommand::Unknown("back now".to_string()))
        );
    }
}

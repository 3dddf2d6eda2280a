//! Quoter plugin: replies with a configured quote when one of its triggers is heard.
//!
//! Each quote config is registered twice: as a hidden hear action that fires with the configured
//! frequency on ambient traffic, and as a command (mentions and DMs) that always fires.

mod cache;
mod selector;

use std::sync::Arc;

use async_trait::async_trait;
use sentinel_core::config::QuoterConfig;
use sentinel_core::{Answer, IncomingMessage, QuoteConfig, Responses, UserInfoFinder};
use tracing::debug;

use crate::action::{Action, Answerer, Matcher, Plugin};
use crate::degrade::Degrade;

pub use cache::RegexCache;
pub use selector::{select, timestamp_seed, unit_draw};

pub const QUOTER_PLUGIN_NAME: &str = "quoter";

/// At or above this frequency the draw is skipped and the matcher always fires.
pub const CERTAIN_FREQUENCY: f64 = 0.99;

pub struct TriggerMatcher {
    triggers: Vec<String>,
    frequency: f64,
    cache: Arc<RegexCache>,
    users: Arc<dyn UserInfoFinder>,
}

impl TriggerMatcher {
    pub fn new(
        triggers: Vec<String>,
        frequency: f64,
        cache: Arc<RegexCache>,
        users: Arc<dyn UserInfoFinder>,
    ) -> Self {
        Self { triggers, frequency, cache, users }
    }

    /// True if any trigger appears in `text`. Triggers that fail to compile are skipped.
    pub fn heard(&self, text: &str) -> bool {
        self.triggers.iter().any(|trigger| {
            self.cache
                .get_or_compile(trigger)
                .or_degrade(QUOTER_PLUGIN_NAME, "trigger_pattern")
                .is_some_and(|pattern| pattern.is_match(text))
        })
    }
}

#[async_trait]
impl Matcher for TriggerMatcher {
    async fn matches(&self, message: &IncomingMessage) -> bool {
        // never quote bots, this one included
        let user = self
            .users
            .get_user_info(&message.user_id)
            .await
            .or_degrade(QUOTER_PLUGIN_NAME, "user_lookup");
        if user.is_some_and(|user| user.is_bot) {
            debug!(plugin = QUOTER_PLUGIN_NAME, user_id = %message.user_id, "ignoring bot message");
            return false;
        }

        if !self.heard(&message.normalized_text) {
            return false;
        }

        if self.frequency >= CERTAIN_FREQUENCY {
            return true;
        }

        timestamp_seed(&message.timestamp)
            .or_degrade(QUOTER_PLUGIN_NAME, "frequency_gate")
            .is_some_and(|seed| unit_draw(seed) < self.frequency)
    }
}

/// Answers with one response, chosen reproducibly from the message timestamp.
pub struct DeterministicSelector {
    responses: Responses,
}

impl DeterministicSelector {
    pub fn new(responses: Responses) -> Self {
        Self { responses }
    }

    /// A malformed timestamp falls back to seed 0 so commands still get a reply.
    pub fn select(&self, timestamp: &str) -> &str {
        let seed =
            timestamp_seed(timestamp).or_degrade(QUOTER_PLUGIN_NAME, "select").unwrap_or_default();
        select(&self.responses, seed)
    }
}

impl Answerer for DeterministicSelector {
    fn answer(&self, message: &IncomingMessage) -> Option<Answer> {
        Some(Answer::new(self.select(&message.timestamp)))
    }
}

/// Builds quoter plugins. Every matcher it creates shares one regex cache.
pub struct Quoter {
    cache: Arc<RegexCache>,
    users: Arc<dyn UserInfoFinder>,
}

impl Quoter {
    pub fn new(users: Arc<dyn UserInfoFinder>) -> Self {
        Self { cache: Arc::new(RegexCache::new()), users }
    }

    pub fn matcher(&self, triggers: &[String], frequency: f64) -> TriggerMatcher {
        TriggerMatcher::new(
            triggers.to_vec(),
            frequency,
            Arc::clone(&self.cache),
            Arc::clone(&self.users),
        )
    }

    pub fn cache(&self) -> &RegexCache {
        &self.cache
    }

    pub fn plugin(&self, config: &QuoterConfig) -> Plugin {
        config
            .quote_configs
            .iter()
            .fold(Plugin::new(QUOTER_PLUGIN_NAME), |plugin, quote| {
                plugin.with_action(self.hear_action(quote)).with_action(self.command(quote))
            })
    }

    fn hear_action(&self, quote: &QuoteConfig) -> Action {
        Action::hear(
            self.matcher(quote.triggers(), quote.frequency()),
            DeterministicSelector::new(quote.responses().clone()),
        )
        .hidden()
    }

    // mentions and DMs never reach hear actions, so the same triggers also run as a command
    fn command(&self, quote: &QuoteConfig) -> Action {
        Action::command(
            self.matcher(quote.triggers(), 1.0),
            DeterministicSelector::new(quote.responses().clone()),
        )
        .usage(quote.triggers().join("|"))
        .description("Get a quotable quote")
    }
}

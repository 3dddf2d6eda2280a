use std::sync::Arc;

use async_trait::async_trait;
use regex::Regex;
use sentinel_core::{Answer, IncomingMessage};

/// Decides whether an action participates in a message.
#[async_trait]
pub trait Matcher: Send + Sync {
    async fn matches(&self, message: &IncomingMessage) -> bool;
}

/// Produces the reply for a message its matcher accepted.
pub trait Answerer: Send + Sync {
    fn answer(&self, message: &IncomingMessage) -> Option<Answer>;
}

impl<F> Answerer for F
where
    F: Fn(&IncomingMessage) -> Option<Answer> + Send + Sync,
{
    fn answer(&self, message: &IncomingMessage) -> Option<Answer> {
        self(message)
    }
}

/// Matches the normalized text against a fixed pattern.
pub struct PatternMatcher {
    pattern: &'static Regex,
}

impl PatternMatcher {
    pub fn new(pattern: &'static Regex) -> Self {
        Self { pattern }
    }
}

#[async_trait]
impl Matcher for PatternMatcher {
    async fn matches(&self, message: &IncomingMessage) -> bool {
        self.pattern.is_match(&message.normalized_text)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ActionKind {
    /// Evaluated on messages addressed to the bot.
    Command,
    /// Evaluated on ambient channel traffic.
    Hear,
}

#[derive(Clone)]
pub struct Action {
    kind: ActionKind,
    hidden: bool,
    usage: String,
    description: String,
    matcher: Arc<dyn Matcher>,
    answerer: Arc<dyn Answerer>,
}

impl Action {
    pub fn command(matcher: impl Matcher + 'static, answerer: impl Answerer + 'static) -> Self {
        Self::new(ActionKind::Command, matcher, answerer)
    }

    pub fn hear(matcher: impl Matcher + 'static, answerer: impl Answerer + 'static) -> Self {
        Self::new(ActionKind::Hear, matcher, answerer)
    }

    fn new(
        kind: ActionKind,
        matcher: impl Matcher + 'static,
        answerer: impl Answerer + 'static,
    ) -> Self {
        Self {
            kind,
            hidden: false,
            usage: String::new(),
            description: String::new(),
            matcher: Arc::new(matcher),
            answerer: Arc::new(answerer),
        }
    }

    pub fn usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = usage.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Leave the action out of the help listing.
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn kind(&self) -> ActionKind {
        self.kind
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn usage_text(&self) -> &str {
        &self.usage
    }

    pub fn description_text(&self) -> &str {
        &self.description
    }

    pub async fn matches(&self, message: &IncomingMessage) -> bool {
        self.matcher.matches(message).await
    }

    pub fn answer(&self, message: &IncomingMessage) -> Option<Answer> {
        self.answerer.answer(message)
    }
}

impl std::fmt::Debug for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Action")
            .field("kind", &self.kind)
            .field("hidden", &self.hidden)
            .field("usage", &self.usage)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Debug)]
pub struct Plugin {
    name: String,
    commands: Vec<Action>,
    hear_actions: Vec<Action>,
}

impl Plugin {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), commands: Vec::new(), hear_actions: Vec::new() }
    }

    /// Registers the action under its own kind, preserving registration order.
    pub fn with_action(mut self, action: Action) -> Self {
        match action.kind() {
            ActionKind::Command => self.commands.push(action),
            ActionKind::Hear => self.hear_actions.push(action),
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn commands(&self) -> &[Action] {
        &self.commands
    }

    pub fn hear_actions(&self) -> &[Action] {
        &self.hear_actions
    }
}

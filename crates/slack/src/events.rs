use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use sentinel_core::{IncomingMessage, InMemoryUserDirectory, UserInfo};
use tokio::sync::Mutex;
use tracing::debug;

use crate::outgoing::OutgoingMessage;
use crate::router::PluginRouter;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlackEnvelope {
    pub envelope_id: String,
    pub event: SlackEvent,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SlackEvent {
    Message(MessageEvent),
    /// An edit. Carries the edited message with its original `ts`.
    MessageChanged(MessageEvent),
    Unsupported { event_type: String },
}

impl SlackEvent {
    pub fn event_type(&self) -> SlackEventType {
        match self {
            Self::Message(_) => SlackEventType::Message,
            Self::MessageChanged(_) => SlackEventType::MessageChanged,
            Self::Unsupported { .. } => SlackEventType::Unsupported,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SlackEventType {
    Message,
    MessageChanged,
    Unsupported,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ChannelType {
    #[default]
    Channel,
    Group,
    Im,
    Mpim,
}

impl ChannelType {
    pub fn parse(value: &str) -> Self {
        match value {
            "im" => Self::Im,
            "mpim" => Self::Mpim,
            "group" => Self::Group,
            _ => Self::Channel,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageEvent {
    pub channel_id: String,
    pub channel_type: ChannelType,
    pub user_id: Option<String>,
    pub bot_id: Option<String>,
    pub text: String,
    pub ts: String,
    pub thread_ts: Option<String>,
}

impl MessageEvent {
    /// The user id, or the bot id for integrations that post without a user.
    pub fn author_id(&self) -> &str {
        self.user_id.as_deref().or(self.bot_id.as_deref()).unwrap_or_default()
    }

    /// Normalizes the raw event: a leading mention of the bot is stripped and marks the
    /// message as addressed, as does a direct-message channel.
    pub fn to_incoming(&self, bot_user_id: Option<&str>) -> IncomingMessage {
        let direct = self.channel_type == ChannelType::Im;
        let unmentioned = bot_user_id.and_then(|bot| strip_mention(&self.text, bot));
        let addressed = direct || unmentioned.is_some();
        let normalized_text = unmentioned.unwrap_or(&self.text).to_owned();

        IncomingMessage {
            channel_id: self.channel_id.clone(),
            user_id: self.author_id().to_owned(),
            text: self.text.clone(),
            normalized_text,
            timestamp: self.ts.clone(),
            thread_timestamp: self.thread_ts.clone().filter(|thread| thread != &self.ts),
            direct,
            addressed,
        }
    }
}

/// Strips `<@BOT>` or `<@BOT|name>` from the start of `text`, along with the separator after it.
fn strip_mention<'a>(text: &'a str, bot_user_id: &str) -> Option<&'a str> {
    let rest = text.trim_start().strip_prefix("<@")?;
    let (mention, rest) = rest.split_once('>')?;
    let mentioned = mention.split('|').next().unwrap_or_default();
    (mentioned == bot_user_id)
        .then(|| rest.trim_start_matches(|ch: char| ch == ':' || ch == ',' || ch.is_whitespace()))
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventContext {
    pub correlation_id: String,
}

impl Default for EventContext {
    fn default() -> Self {
        Self { correlation_id: "unknown-correlation-id".to_owned() }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HandlerResult {
    Responded(Vec<OutgoingMessage>),
    Processed,
    Ignored,
}

#[async_trait]
pub trait EventHandler: Send + Sync {
    fn event_types(&self) -> &'static [SlackEventType];
    async fn handle(&self, envelope: &SlackEnvelope, ctx: &EventContext) -> HandlerResult;
}

#[derive(Default)]
pub struct EventDispatcher {
    handlers: HashMap<SlackEventType, Arc<dyn EventHandler>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<H>(&mut self, handler: H)
    where
        H: EventHandler + 'static,
    {
        let handler: Arc<dyn EventHandler> = Arc::new(handler);
        for event_type in handler.event_types() {
            self.handlers.insert(*event_type, Arc::clone(&handler));
        }
    }

    pub async fn dispatch(&self, envelope: &SlackEnvelope, ctx: &EventContext) -> HandlerResult {
        let Some(handler) = self.handlers.get(&envelope.event.event_type()) else {
            return HandlerResult::Ignored;
        };

        handler.handle(envelope, ctx).await
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }
}

const ANSWERED_CAPACITY: usize = 1024;

/// Recently answered messages, so an edit does not produce a second reply.
#[derive(Default)]
struct AnsweredMessages {
    order: VecDeque<(String, String)>,
    keys: HashSet<(String, String)>,
}

impl AnsweredMessages {
    fn contains(&self, message: &IncomingMessage) -> bool {
        self.keys.contains(&(message.channel_id.clone(), message.timestamp.clone()))
    }

    fn remember(&mut self, message: &IncomingMessage) {
        let key = (message.channel_id.clone(), message.timestamp.clone());
        if !self.keys.insert(key.clone()) {
            return;
        }
        self.order.push_back(key);
        if self.order.len() > ANSWERED_CAPACITY {
            if let Some(oldest) = self.order.pop_front() {
                self.keys.remove(&oldest);
            }
        }
    }
}

/// Feeds message events through the plugin router.
pub struct MessageHandler {
    router: PluginRouter,
    directory: Arc<InMemoryUserDirectory>,
    bot_user_id: Option<String>,
    answered: Mutex<AnsweredMessages>,
}

impl MessageHandler {
    pub fn new(
        router: PluginRouter,
        directory: Arc<InMemoryUserDirectory>,
        bot_user_id: Option<String>,
    ) -> Self {
        Self { router, directory, bot_user_id, answered: Mutex::new(AnsweredMessages::default()) }
    }
}

#[async_trait]
impl EventHandler for MessageHandler {
    fn event_types(&self) -> &'static [SlackEventType] {
        &[SlackEventType::Message, SlackEventType::MessageChanged]
    }

    async fn handle(&self, envelope: &SlackEnvelope, ctx: &EventContext) -> HandlerResult {
        let (event, edited) = match &envelope.event {
            SlackEvent::Message(event) => (event, false),
            SlackEvent::MessageChanged(event) => (event, true),
            SlackEvent::Unsupported { .. } => return HandlerResult::Ignored,
        };

        self.directory
            .record(UserInfo { id: event.author_id().to_owned(), is_bot: event.bot_id.is_some() })
            .await;

        let message = event.to_incoming(self.bot_user_id.as_deref());
        if edited && self.answered.lock().await.contains(&message) {
            debug!(
                correlation_id = %ctx.correlation_id,
                channel_id = %message.channel_id,
                timestamp = %message.timestamp,
                "edited message was already answered"
            );
            return HandlerResult::Processed;
        }

        let answers = self.router.route(&message).await;
        if answers.is_empty() {
            return HandlerResult::Processed;
        }

        self.answered.lock().await.remember(&message);
        HandlerResult::Responded(
            answers.iter().map(|answer| OutgoingMessage::render(&message, answer)).collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use sentinel_core::config::QuoterConfig;
    use sentinel_core::{InMemoryUserDirectory, QuoteConfig, UserInfoFinder};
    use sentinel_plugins::quoter::Quoter;

    use super::{
        ChannelType, EventContext, EventDispatcher, EventHandler, HandlerResult, MessageEvent,
        MessageHandler, SlackEnvelope, SlackEvent, SlackEventType,
    };
    use crate::router::PluginRouter;

    fn event(user_id: &str, text: &str, ts: &str) -> MessageEvent {
        MessageEvent {
            channel_id: "C1".to_owned(),
            channel_type: ChannelType::Channel,
            user_id: Some(user_id.to_owned()),
            bot_id: None,
            text: text.to_owned(),
            ts: ts.to_owned(),
            thread_ts: None,
        }
    }

    fn envelope(id: &str, event: SlackEvent) -> SlackEnvelope {
        SlackEnvelope { envelope_id: id.to_owned(), event }
    }

    fn handler(directory: Arc<InMemoryUserDirectory>) -> MessageHandler {
        let quoter = Quoter::new(directory.clone());
        let plugin = quoter.plugin(&QuoterConfig {
            enabled: true,
            quote_configs: vec![QuoteConfig::new(
                vec!["tea".to_owned()],
                1.0,
                vec!["Earl Grey, hot.".to_owned()],
            )
            .expect("valid quote config")],
        });
        let router = PluginRouter::new(vec![plugin]).with_bot_user_id(Some("UBOT".to_owned()));
        MessageHandler::new(router, directory, Some("UBOT".to_owned()))
    }

    #[test]
    fn mention_prefix_is_stripped_and_marks_message_addressed() {
        let message = event("U1", "<@UBOT>: tea please", "1.0").to_incoming(Some("UBOT"));

        assert!(message.addressed);
        assert!(!message.direct);
        assert_eq!(message.normalized_text, "tea please");
        assert_eq!(message.text, "<@UBOT>: tea please");
    }

    #[test]
    fn mentions_of_other_users_are_left_alone() {
        let message = event("U1", "<@U2|jo> tea please", "1.0").to_incoming(Some("UBOT"));

        assert!(!message.addressed);
        assert_eq!(message.normalized_text, "<@U2|jo> tea please");
    }

    #[test]
    fn direct_messages_are_addressed_without_a_mention() {
        let mut raw = event("U1", "tea", "1.0");
        raw.channel_type = ChannelType::Im;
        let message = raw.to_incoming(None);

        assert!(message.direct);
        assert!(message.addressed);
    }

    #[test]
    fn thread_parent_is_not_treated_as_a_thread_reply() {
        let mut raw = event("U1", "tea", "5.0");
        raw.thread_ts = Some("5.0".to_owned());
        assert_eq!(raw.to_incoming(None).thread_timestamp, None);

        raw.ts = "6.0".to_owned();
        assert_eq!(raw.to_incoming(None).thread_timestamp.as_deref(), Some("5.0"));
    }

    #[tokio::test]
    async fn dispatcher_returns_ignored_when_no_handler_registered() {
        let dispatcher = EventDispatcher::new();
        let message = envelope("env-1", SlackEvent::Message(event("U1", "tea", "1.0")));
        let result = dispatcher.dispatch(&message, &EventContext::default()).await;

        assert_eq!(result, HandlerResult::Ignored);
    }

    #[tokio::test]
    async fn message_handler_registers_for_messages_and_edits() {
        let mut dispatcher = EventDispatcher::new();
        dispatcher.register(handler(Arc::new(InMemoryUserDirectory::new())));

        assert_eq!(dispatcher.handler_count(), 2);
        let unsupported =
            envelope("env-2", SlackEvent::Unsupported { event_type: "hello".to_owned() });
        assert_eq!(
            dispatcher.dispatch(&unsupported, &EventContext::default()).await,
            HandlerResult::Ignored
        );
    }

    #[tokio::test]
    async fn heard_trigger_produces_an_outgoing_message() {
        let handler = handler(Arc::new(InMemoryUserDirectory::new()));
        let message = envelope("env-3", SlackEvent::Message(event("U1", "tea time", "1.0")));
        let result = handler.handle(&message, &EventContext::default()).await;

        let HandlerResult::Responded(messages) = result else {
            panic!("expected a response");
        };
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].channel, "C1");
        assert_eq!(messages[0].text, "Earl Grey, hot.");
    }

    #[tokio::test]
    async fn edits_of_answered_messages_are_not_answered_again() {
        let handler = handler(Arc::new(InMemoryUserDirectory::new()));
        let ctx = EventContext::default();

        let first = handler
            .handle(&envelope("env-4", SlackEvent::Message(event("U1", "tea", "7.0"))), &ctx)
            .await;
        let edited = envelope("env-5", SlackEvent::MessageChanged(event("U1", "tea!", "7.0")));
        let edit = handler.handle(&edited, &ctx).await;

        assert!(matches!(first, HandlerResult::Responded(_)));
        assert_eq!(edit, HandlerResult::Processed);
    }

    #[tokio::test]
    async fn bot_authors_are_recorded_and_ignored() {
        let directory = Arc::new(InMemoryUserDirectory::new());
        let handler = handler(directory.clone());
        let mut raw = event("B1", "tea", "8.0");
        raw.bot_id = Some("BID".to_owned());

        let result = handler
            .handle(&envelope("env-6", SlackEvent::Message(raw)), &EventContext::default())
            .await;

        assert_eq!(result, HandlerResult::Processed);
        assert!(directory.get_user_info("B1").await.expect("recorded").is_bot);
    }

    struct CountingHandler;

    #[async_trait]
    impl EventHandler for CountingHandler {
        fn event_types(&self) -> &'static [SlackEventType] {
            &[SlackEventType::Unsupported]
        }

        async fn handle(&self, _envelope: &SlackEnvelope, _ctx: &EventContext) -> HandlerResult {
            HandlerResult::Processed
        }
    }

    #[tokio::test]
    async fn custom_handlers_can_claim_unsupported_events() {
        let mut dispatcher = EventDispatcher::new();
        dispatcher.register(CountingHandler);
        let unsupported =
            envelope("env-7", SlackEvent::Unsupported { event_type: "reaction_added".to_owned() });

        assert_eq!(
            dispatcher.dispatch(&unsupported, &EventContext::default()).await,
            HandlerResult::Processed
        );
    }
}

use sentinel_core::{Answer, IncomingMessage};
use sentinel_plugins::Plugin;
use tracing::debug;

/// Routes messages to plugin actions.
///
/// Addressed messages (mentions and DMs) go to commands, first match wins, with `help` built
/// in. Ambient messages go to every hear action that matches.
pub struct PluginRouter {
    plugins: Vec<Plugin>,
    bot_user_id: Option<String>,
}

impl PluginRouter {
    pub fn new(plugins: Vec<Plugin>) -> Self {
        Self { plugins, bot_user_id: None }
    }

    pub fn with_bot_user_id(mut self, bot_user_id: Option<String>) -> Self {
        self.bot_user_id = bot_user_id;
        self
    }

    pub fn plugins(&self) -> &[Plugin] {
        &self.plugins
    }

    pub async fn route(&self, message: &IncomingMessage) -> Vec<Answer> {
        if self.bot_user_id.as_deref() == Some(message.user_id.as_str()) {
            return Vec::new();
        }

        if message.addressed {
            self.route_command(message).await.into_iter().collect()
        } else {
            self.route_hear_actions(message).await
        }
    }

    async fn route_command(&self, message: &IncomingMessage) -> Option<Answer> {
        if message.normalized_text.trim().eq_ignore_ascii_case("help") {
            return Some(Answer::new(self.help()));
        }

        for plugin in &self.plugins {
            for command in plugin.commands() {
                if command.matches(message).await {
                    debug!(
                        plugin = plugin.name(),
                        usage = command.usage_text(),
                        channel_id = %message.channel_id,
                        "command matched"
                    );
                    return command.answer(message);
                }
            }
        }

        Some(Answer::new(format!(
            "I don't understand `{}`. Try `help` to see what I can do.",
            message.normalized_text.trim()
        )))
    }

    async fn route_hear_actions(&self, message: &IncomingMessage) -> Vec<Answer> {
        let mut answers = Vec::new();
        for plugin in &self.plugins {
            for action in plugin.hear_actions() {
                if !action.matches(message).await {
                    continue;
                }
                debug!(
                    plugin = plugin.name(),
                    channel_id = %message.channel_id,
                    "hear action matched"
                );
                answers.extend(action.answer(message));
            }
        }
        answers
    }

    /// Lists every visible command.
    pub fn help(&self) -> String {
        let mut lines = vec!["Here's what I can do:".to_owned()];
        lines.extend(
            self.plugins
                .iter()
                .flat_map(Plugin::commands)
                .filter(|command| !command.is_hidden())
                .map(|command| {
                    format!("• `{}`: {}", command.usage_text(), command.description_text())
                }),
        );
        lines.push("• `help`: List the commands I understand".to_owned());
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use std::sync::LazyLock;

    use regex::Regex;
    use sentinel_core::{Answer, IncomingMessage};
    use sentinel_plugins::{Action, PatternMatcher, Plugin};

    use super::PluginRouter;

    static TEA: LazyLock<Regex> = LazyLock::new(|| Regex::new("tea").expect("valid regex"));
    static ANY: LazyLock<Regex> = LazyLock::new(|| Regex::new("").expect("valid regex"));

    fn reply(text: &'static str) -> impl Fn(&IncomingMessage) -> Option<Answer> + Send + Sync {
        move |_: &IncomingMessage| Some(Answer::new(text))
    }

    fn router() -> PluginRouter {
        let drinks = Plugin::new("drinks")
            .with_action(
                Action::command(PatternMatcher::new(&TEA), reply("command tea"))
                    .usage("tea")
                    .description("Order tea"),
            )
            .with_action(Action::hear(PatternMatcher::new(&TEA), reply("heard tea")).hidden());
        let echo = Plugin::new("echo")
            .with_action(Action::command(PatternMatcher::new(&ANY), reply("catch-all")).hidden())
            .with_action(Action::hear(PatternMatcher::new(&TEA), reply("echo tea")));
        PluginRouter::new(vec![drinks, echo]).with_bot_user_id(Some("UBOT".to_owned()))
    }

    #[tokio::test]
    async fn addressed_messages_use_the_first_matching_command() {
        let message = IncomingMessage::ambient("C1", "U1", "tea please", "1.0").addressed();

        assert_eq!(router().route(&message).await, vec![Answer::new("command tea")]);
    }

    #[tokio::test]
    async fn ambient_messages_fan_out_to_every_matching_hear_action() {
        let message = IncomingMessage::ambient("C1", "U1", "tea please", "1.0");

        assert_eq!(
            router().route(&message).await,
            vec![Answer::new("heard tea"), Answer::new("echo tea")]
        );
    }

    #[tokio::test]
    async fn own_messages_are_ignored() {
        let message = IncomingMessage::ambient("C1", "UBOT", "tea please", "1.0");

        assert!(router().route(&message).await.is_empty());
    }

    #[tokio::test]
    async fn help_lists_visible_commands_only() {
        let message = IncomingMessage::ambient("D1", "U1", " HELP ", "1.0").direct();
        let answers = router().route(&message).await;

        assert_eq!(answers.len(), 1);
        assert!(answers[0].text.contains("• `tea`: Order tea"));
        // header, the visible `tea` command, built-in help
        assert_eq!(answers[0].text.lines().count(), 3);
    }

    #[tokio::test]
    async fn unmatched_commands_get_a_hint() {
        let router = PluginRouter::new(Vec::new());
        let message = IncomingMessage::ambient("D1", "U1", "coffee", "1.0").direct();

        assert_eq!(
            router.route(&message).await,
            vec![Answer::new("I don't understand `coffee`. Try `help` to see what I can do.")]
        );
        assert!(router.plugins().is_empty());
    }
}

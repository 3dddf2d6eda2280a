use std::sync::Arc;

use sentinel_core::config::AppConfig;
use sentinel_core::InMemoryUserDirectory;
use sentinel_plugins::quoter::Quoter;
use sentinel_plugins::{schoolcode, version, Plugin, SchoolCodeTable};
use sentinel_slack::events::{EventDispatcher, MessageHandler};
use sentinel_slack::router::PluginRouter;
use sentinel_slack::socket::{NoopSocketTransport, ReconnectPolicy, SocketModeRunner};
use serde::Serialize;
use tracing::info;

pub struct Application {
    pub config: AppConfig,
    pub summary: PluginSummary,
    pub slack_runner: SocketModeRunner,
}

/// What `--check` reports about the loaded plugins.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PluginSummary {
    pub bot_name: String,
    pub plugins: Vec<PluginEntry>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PluginEntry {
    pub name: String,
    pub commands: Vec<String>,
    pub command_count: usize,
    pub hear_action_count: usize,
}

impl PluginSummary {
    fn from_plugins(bot_name: &str, plugins: &[Plugin]) -> Self {
        let plugins = plugins
            .iter()
            .map(|plugin| PluginEntry {
                name: plugin.name().to_owned(),
                commands: plugin
                    .commands()
                    .iter()
                    .filter(|command| !command.is_hidden())
                    .map(|command| command.usage_text().to_owned())
                    .collect(),
                command_count: plugin.commands().len(),
                hear_action_count: plugin.hear_actions().len(),
            })
            .collect();
        Self { bot_name: bot_name.to_owned(), plugins }
    }
}

pub fn bootstrap_with_config(config: AppConfig) -> Application {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        bot_name = %config.bot.name,
        "starting application bootstrap"
    );

    let directory = Arc::new(InMemoryUserDirectory::new());
    let plugins = build_plugins(&config, directory.clone());
    let summary = PluginSummary::from_plugins(&config.bot.name, &plugins);
    info!(
        event_name = "system.bootstrap.plugins_loaded",
        correlation_id = "bootstrap",
        plugin_count = plugins.len(),
        "plugins loaded"
    );

    let bot_user_id = config.slack.bot_user_id.clone();
    let router = PluginRouter::new(plugins).with_bot_user_id(bot_user_id.clone());
    let mut dispatcher = EventDispatcher::new();
    dispatcher.register(MessageHandler::new(router, directory, bot_user_id));

    let slack_runner = SocketModeRunner::new(
        Arc::new(NoopSocketTransport),
        dispatcher,
        ReconnectPolicy::default(),
    );

    Application { config, summary, slack_runner }
}

fn build_plugins(config: &AppConfig, directory: Arc<InMemoryUserDirectory>) -> Vec<Plugin> {
    let mut plugins = vec![version::plugin(&config.bot.name, env!("CARGO_PKG_VERSION"))];

    if config.plugins.quoter.enabled {
        let quoter = Quoter::new(directory);
        plugins.push(quoter.plugin(&config.plugins.quoter));
    }
    if config.plugins.schoolcode.enabled {
        plugins.push(schoolcode::plugin(&config.plugins.schoolcode, SchoolCodeTable::builtin()));
    }

    plugins
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use sentinel_core::config::{AppConfig, ConfigError, ConfigOverrides, LoadOptions};
    use sentinel_slack::events::{
        ChannelType, EventContext, HandlerResult, MessageEvent, SlackEnvelope, SlackEvent,
    };

    use crate::bootstrap::{bootstrap_with_config, Application};

    const CONFIG: &str = r#"
[bot]
name = "sentinel-test"

[[plugins.quoter.quote_configs]]
triggers = ["tea"]
frequency = 1.0
responses = ["Earl Grey, hot."]

[plugins.schoolcode]
threaded_replies = true
"#;

    fn options(path: &std::path::Path) -> LoadOptions {
        LoadOptions {
            config_path: Some(path.to_path_buf()),
            require_file: true,
            overrides: ConfigOverrides {
                slack_bot_token: Some("xoxb-test".to_owned()),
                slack_bot_user_id: Some("UBOT".to_owned()),
                ..ConfigOverrides::default()
            },
        }
    }

    fn bootstrap(options: LoadOptions) -> Result<Application, ConfigError> {
        AppConfig::load(options).map(bootstrap_with_config)
    }

    fn config_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(contents.as_bytes()).expect("write config");
        file
    }

    #[test]
    fn bootstrap_fails_fast_with_an_xapp_token() {
        let file = config_file(CONFIG);
        let mut options = options(file.path());
        options.overrides.slack_bot_token = Some("xapp-1-wrong".to_owned());

        let error = bootstrap(options).err().expect("bootstrap should fail");
        assert!(matches!(error, ConfigError::Validation(_)));
        assert!(error.to_string().contains("xoxb-"));
    }

    #[test]
    fn summary_lists_enabled_plugins_in_registration_order() {
        let file = config_file(CONFIG);
        let app = bootstrap(options(file.path())).expect("bootstrap should succeed");

        let names: Vec<_> = app.summary.plugins.iter().map(|plugin| plugin.name.as_str()).collect();
        assert_eq!(names, vec!["versioner", "quoter", "schoolcode"]);
        assert_eq!(app.summary.bot_name, "sentinel-test");

        let quoter = &app.summary.plugins[1];
        assert_eq!(quoter.commands, vec!["tea"]);
        assert_eq!(quoter.hear_action_count, 1);
        assert_eq!(app.slack_runner.dispatcher().handler_count(), 2);
    }

    #[test]
    fn disabled_plugins_are_not_loaded() {
        let file = config_file(CONFIG);
        let mut options = options(file.path());
        options.overrides.quoter_enabled = Some(false);
        options.overrides.schoolcode_enabled = Some(false);

        let app = bootstrap(options).expect("bootstrap should succeed");
        assert_eq!(app.summary.plugins.len(), 1);
        assert_eq!(app.summary.plugins[0].name, "versioner");
    }

    #[tokio::test]
    async fn wired_dispatcher_answers_school_lookups_in_a_thread() {
        let file = config_file(CONFIG);
        let app = bootstrap(options(file.path())).expect("bootstrap should succeed");
        let envelope = SlackEnvelope {
            envelope_id: "env-1".to_owned(),
            event: SlackEvent::Message(MessageEvent {
                channel_id: "C1".to_owned(),
                channel_type: ChannelType::Channel,
                user_id: Some("U1".to_owned()),
                bot_id: None,
                text: "<@UBOT> find school 3015".to_owned(),
                ts: "1700000000.000100".to_owned(),
                thread_ts: None,
            }),
        };

        let result =
            app.slack_runner.dispatcher().dispatch(&envelope, &EventContext::default()).await;

        let HandlerResult::Responded(messages) = result else {
            panic!("expected a response");
        };
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].text, "`3015` RAFFLES INSTITUTION");
        assert_eq!(messages[0].thread_ts.as_deref(), Some("1700000000.000100"));
    }
}

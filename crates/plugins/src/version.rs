use std::sync::LazyLock;

use regex::Regex;
use sentinel_core::{Answer, IncomingMessage};

use crate::action::{Action, PatternMatcher, Plugin};

pub const VERSIONER_PLUGIN_NAME: &str = "versioner";

static VERSION_COMMAND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*version\s*$").expect("invalid version regex"));

/// Reports the bot's name and version when asked.
pub fn plugin(bot_name: &str, version: &str) -> Plugin {
    let text = format!("I'm `{bot_name}`, version `{version}`");
    let command = Action::command(
        PatternMatcher::new(&VERSION_COMMAND),
        move |_: &IncomingMessage| Some(Answer::new(text.clone())),
    )
    .usage("version")
    .description("Reply with the bot version");

    Plugin::new(VERSIONER_PLUGIN_NAME).with_action(command)
}

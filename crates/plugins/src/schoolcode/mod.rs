//! Schoolcode plugin: `find school 1234` and `find school <name or initials>`.

mod table;

use std::sync::{Arc, LazyLock};

use regex::Regex;
use sentinel_core::config::SchoolcodeConfig;
use sentinel_core::{Answer, AnswerOption, IncomingMessage};
use tracing::warn;

use crate::action::{Action, PatternMatcher, Plugin};

pub use table::SchoolCodeTable;

pub const SCHOOLCODE_PLUGIN_NAME: &str = "schoolcode";
pub const MAX_RESULTS: usize = 10;

// school codes are always 4 digits
static CODE_QUERY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^find school (\d{4})").expect("invalid school code regex"));

// a leading non-digit keeps the two command shapes disjoint
static STRING_QUERY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^find school (\D.*)").expect("invalid school string regex"));

#[derive(Clone, Debug)]
pub struct SchoolCodeLookup {
    table: Arc<SchoolCodeTable>,
}

impl SchoolCodeLookup {
    pub fn new(table: Arc<SchoolCodeTable>) -> Self {
        Self { table }
    }

    /// Answers either command shape; `None` if the text is neither.
    pub fn answer(&self, normalized_text: &str) -> Option<String> {
        self.answer_code_query(normalized_text)
            .or_else(|| self.answer_string_query(normalized_text))
    }

    pub fn answer_code_query(&self, normalized_text: &str) -> Option<String> {
        let code = CODE_QUERY.captures(normalized_text)?.get(1)?.as_str();
        Some(match self.table.get(code) {
            Some(name) => format_school(code, name),
            None => format!("No school found with school code {code}."),
        })
    }

    pub fn answer_string_query(&self, normalized_text: &str) -> Option<String> {
        let raw = STRING_QUERY.captures(normalized_text)?.get(1)?.as_str();
        // the capture runs to end of line, so trailing whitespace comes along
        let query = raw.trim().to_uppercase();

        let results = self
            .table
            .iter()
            .filter(|(_, name)| name.contains(query.as_str()) || initials(name) == query)
            .map(|(code, name)| format_school(code, name))
            .collect::<Vec<_>>();

        Some(match results.len() {
            0 => format!("No schools found with string {query}."),
            count if count > MAX_RESULTS => format!(
                "There are more than {MAX_RESULTS} results. Please try a more specific query."
            ),
            _ => results.join("\n"),
        })
    }
}

/// First character of each whitespace-separated word.
pub fn initials(name: &str) -> String {
    name.split_whitespace().filter_map(|word| word.chars().next()).collect()
}

fn format_school(code: &str, name: &str) -> String {
    format!("`{code}` {name}")
}

pub fn plugin(config: &SchoolcodeConfig, table: Arc<SchoolCodeTable>) -> Plugin {
    let lookup = SchoolCodeLookup::new(table);
    let options: Vec<AnswerOption> =
        if config.threaded_replies { vec![AnswerOption::InThread] } else { Vec::new() };

    let code_lookup = lookup.clone();
    let code_options = options.clone();
    let code_command = Action::command(
        PatternMatcher::new(&CODE_QUERY),
        move |message: &IncomingMessage| {
            let text = code_lookup.answer_code_query(&message.normalized_text);
            answered(text, message, &code_options)
        },
    )
    .usage("find school 1234")
    .description("Find school name for school code 1234");

    let string_command = Action::command(
        PatternMatcher::new(&STRING_QUERY),
        move |message: &IncomingMessage| {
            answered(lookup.answer_string_query(&message.normalized_text), message, &options)
        },
    )
    .usage("find school <string>")
    .description("Find school name containing <string> or with exact initials <string>");

    Plugin::new(SCHOOLCODE_PLUGIN_NAME).with_action(code_command).with_action(string_command)
}

fn answered(
    text: Option<String>,
    message: &IncomingMessage,
    options: &[AnswerOption],
) -> Option<Answer> {
    let Some(text) = text else {
        warn!(
            event_name = "plugin.degraded",
            plugin = SCHOOLCODE_PLUGIN_NAME,
            channel_id = %message.channel_id,
            timestamp = %message.timestamp,
            "answerer invoked without a matching query"
        );
        return None;
    };
    Some(Answer::new(text).with_options(options))
}

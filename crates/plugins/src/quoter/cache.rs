use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use regex::Regex;
use sentinel_core::TransientError;

/// Compiled trigger patterns, filled on first use and never evicted.
#[derive(Debug, Default)]
pub struct RegexCache {
    patterns: Mutex<HashMap<String, Regex>>,
}

impl RegexCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the case-insensitive, word-bounded pattern for `trigger`.
    ///
    /// Lookup, compile and insert happen under one lock so concurrent first use of the same
    /// trigger compiles it once.
    pub fn get_or_compile(&self, trigger: &str) -> Result<Regex, TransientError> {
        let mut patterns = self.patterns.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(pattern) = patterns.get(trigger) {
            return Ok(pattern.clone());
        }

        let pattern = trigger_pattern(trigger)?;
        patterns.insert(trigger.to_owned(), pattern.clone());
        Ok(pattern)
    }

    pub fn len(&self) -> usize {
        self.patterns.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn trigger_pattern(trigger: &str) -> Result<Regex, TransientError> {
    Regex::new(&format!(r"(?i)\b{}\b", regex::escape(trigger))).map_err(|error| {
        TransientError::TriggerPattern { trigger: trigger.to_owned(), reason: error.to_string() }
    })
}

use thiserror::Error;

/// Failures that abort plugin construction at startup.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum PluginError {
    #[error("missing or 0-length responses")]
    EmptyResponses,
    #[error("frequency {0} is outside 0.0..=1.0")]
    FrequencyOutOfRange(f64),
}

/// Failures that occur while matching or answering a single message.
///
/// These are logged and degraded into a non-match; they never reach the caller.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TransientError {
    #[error("user info lookup failed for user `{user_id}`: {reason}")]
    UserLookup { user_id: String, reason: String },
    #[error("malformed message timestamp `{0}`")]
    MalformedTimestamp(String),
    #[error("invalid pattern for trigger `{trigger}`: {reason}")]
    TriggerPattern { trigger: String, reason: String },
}

impl TransientError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UserLookup { .. } => "user_lookup",
            Self::MalformedTimestamp(_) => "malformed_timestamp",
            Self::TriggerPattern { .. } => "trigger_pattern",
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::errors::{PluginError, TransientError};

    #[test]
    fn plugin_errors_describe_the_invalid_value() {
        assert_eq!(PluginError::EmptyResponses.to_string(), "missing or 0-length responses");
        assert_eq!(
            PluginError::FrequencyOutOfRange(1.5).to_string(),
            "frequency 1.5 is outside 0.0..=1.0"
        );
    }

    #[test]
    fn transient_errors_expose_stable_kind_labels() {
        assert_eq!(
            TransientError::MalformedTimestamp("abc".to_owned()).kind(),
            "malformed_timestamp"
        );
        assert_eq!(
            TransientError::UserLookup { user_id: "U1".to_owned(), reason: "gone".to_owned() }
                .kind(),
            "user_lookup"
        );
        assert_eq!(
            TransientError::TriggerPattern { trigger: "x".to_owned(), reason: "bad".to_owned() }
                .kind(),
            "trigger_pattern"
        );
    }
}

use sentinel_core::TransientError;
use tracing::warn;

/// Attempt, and on failure log and carry on as if nothing matched.
///
/// Per-message failures must never stop the bot from processing the next message, so every
/// fallible step inside a matcher or answerer goes through this one combinator.
pub trait Degrade<T> {
    fn or_degrade(self, plugin: &'static str, stage: &'static str) -> Option<T>;
}

impl<T> Degrade<T> for Result<T, TransientError> {
    fn or_degrade(self, plugin: &'static str, stage: &'static str) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(error) => {
                warn!(
                    event_name = "plugin.degraded",
                    plugin,
                    stage,
                    error_kind = error.kind(),
                    error = %error,
                    "plugin step failed; treating as no match"
                );
                None
            }
        }
    }
}

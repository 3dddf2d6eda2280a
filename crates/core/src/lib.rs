//! Shared types for prime-sentinel: configuration, message and answer shapes, error
//! taxonomy and the user directory plugins consult.

pub mod config;
pub mod errors;
pub mod message;
pub mod users;

pub use config::{AppConfig, ConfigError, LoadOptions, QuoteConfig, Responses};
pub use errors::{PluginError, TransientError};
pub use message::{Answer, AnswerOption, IncomingMessage};
pub use users::{InMemoryUserDirectory, UserInfo, UserInfoFinder};

//! Chat plugins for prime-sentinel.
//!
//! - **quoter** - probabilistic quote replies to configured trigger phrases, decided
//!   reproducibly from the message timestamp
//! - **schoolcode** - `find school` lookups against the built-in school code table
//! - **versioner** - reports the running bot version
//!
//! Plugins are plain data (`Plugin` holding `Action`s); routing them is the host's job.

pub mod action;
pub mod degrade;
pub mod quoter;
pub mod schoolcode;
pub mod version;

pub use action::{Action, ActionKind, Answerer, Matcher, PatternMatcher, Plugin};
pub use degrade::Degrade;
pub use quoter::{DeterministicSelector, Quoter, RegexCache, TriggerMatcher};
pub use schoolcode::{SchoolCodeLookup, SchoolCodeTable};

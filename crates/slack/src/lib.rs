//! Slack host for prime-sentinel.
//!
//! - **Socket Mode** (`socket`) - envelope loop with reconnection, acks and posting
//! - **Wire** (`wire`) - decoding Socket Mode frames into typed events
//! - **Events** (`events`) - message and edit handling, user directory upkeep
//! - **Router** (`router`) - commands for addressed messages, hear actions for the rest
//! - **Outgoing** (`outgoing`) - `chat.postMessage` bodies, threaded where asked
//!
//! # Architecture
//!
//! ```text
//! Socket Mode frame → wire → EventDispatcher → MessageHandler → PluginRouter → plugins
//!                                                   ↓
//!                                   OutgoingMessage → transport.post
//! ```

pub mod events;
pub mod outgoing;
pub mod router;
pub mod socket;
pub mod wire;

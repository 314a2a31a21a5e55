//! Conversation-driven scene editing core.
//!
//! Turns free-form assistant replies into concrete project edits: one scene
//! document body plus zero or more path-tagged script files. The crate owns
//! the conversation state, prompt composition, response extraction, transcript
//! sanitizing, the apply engine, and the single-flight request lifecycle.
//!
//! # Public API Overview
//! - [`ChatController`] wires every component to a [`HostUi`] callback surface.
//! - [`extract`] and [`sanitize`] are pure scanners over response text.
//! - [`ApplyEngine`] writes an [`ExtractedEdit`] with backups and bounded retries.
//! - [`RequestController`] enforces at most one in-flight provider request.
//!
//! Components are constructed explicitly and passed by handle; there is no
//! process-wide instance.

pub mod apply;
pub mod chat;
pub mod compose;
pub mod config;
pub mod error;
pub mod extract;
pub mod fence;
pub mod host;
pub mod lifecycle;
pub mod logging;
pub mod paths;
pub mod sanitize;
pub mod session;

pub use crate::apply::{ApplyEngine, ApplyOutcome, ApplyPolicy, ArtifactFailure};
pub use crate::chat::ChatController;
pub use crate::compose::RequestComposer;
pub use crate::config::{ChatConfig, ConfigError};
pub use crate::error::ChatError;
pub use crate::extract::{extract, ExtractedEdit, PathOrigin, SourceEdit};
pub use crate::host::{HostUi, Speaker};
pub use crate::lifecycle::{LifecycleState, RequestController};
pub use crate::sanitize::sanitize;
pub use crate::session::{AttachedDocument, ConversationMode, Message, Role, SessionState};

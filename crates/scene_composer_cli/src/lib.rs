//! Line-oriented terminal host for `scene_composer`.
//!
//! ## Provider bootstrap
//!
//! `SCENE_COMPOSER_PROVIDER` selects the transport:
//!
//! - `messages-api` (default) sends requests to the configured messages endpoint
//! - `mock` replies with a canned scene and script, for local runs without a key
//!
//! The messages transport reads its key, endpoint and model from
//! [`scene_composer::ChatConfig`]. A missing key is not fatal at startup; each
//! submit reports it instead.
//!
//! ## Input
//!
//! Each stdin line is either a slash command (see [`commands::HELP_TEXT`]) or
//! a message for the assistant. Transcript lines go to stdout, diagnostics to
//! stderr.

pub mod commands;
pub mod providers;
pub mod transcript;

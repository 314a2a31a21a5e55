//! Callback surface implemented by the embedding host.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    System,
    User,
    Assistant,
}

impl Speaker {
    pub fn label(self) -> &'static str {
        match self {
            Self::System => "System",
            Self::User => "You",
            Self::Assistant => "Assistant",
        }
    }
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Receives transcript lines and affordance updates from [`crate::ChatController`].
pub trait HostUi {
    /// Called once per transcript line.
    fn on_message(&mut self, from: Speaker, text: &str);

    /// Enables or disables the host's apply action.
    fn on_apply_availability(&mut self, available: bool);

    /// Informational count of script edits found in the latest response.
    fn on_scripts_found(&mut self, count: usize);
}

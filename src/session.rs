//! Conversation state: mode, replayed history, and attached documents.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Governs the system prompt, host affordances, and whether apply is possible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationMode {
    #[default]
    Ask,
    Composer,
}

impl ConversationMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ask => "ask",
            Self::Composer => "composer",
        }
    }

    /// Human-facing mode name used in transcript lines.
    pub fn label(self) -> &'static str {
        match self {
            Self::Ask => "Ask Mode",
            Self::Composer => "Composer Mode",
        }
    }

    /// Parses `ask` or `composer`, ignoring case and surrounding whitespace.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "ask" => Some(Self::Ask),
            "composer" => Some(Self::Composer),
            _ => None,
        }
    }
}

impl fmt::Display for ConversationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
    System,
}

/// One immutable history entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    role: Role,
    content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachedDocument {
    pub path: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ActiveTarget {
    path: String,
    content: String,
}

/// Mode, history, and attachments owned by a single conversation.
///
/// History is append-only; the only removal is a full clear, which also
/// happens on every mode switch.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    mode: ConversationMode,
    history: Vec<Message>,
    attachments: Vec<AttachedDocument>,
    active: Option<ActiveTarget>,
}

impl SessionState {
    pub fn new(mode: ConversationMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn mode(&self) -> ConversationMode {
        self.mode
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }

    pub fn attachments(&self) -> &[AttachedDocument] {
        &self.attachments
    }

    pub fn active_path(&self) -> Option<&str> {
        self.active.as_ref().map(|active| active.path.as_str())
    }

    pub fn active_content(&self) -> Option<&str> {
        self.active.as_ref().map(|active| active.content.as_str())
    }

    pub fn append(&mut self, role: Role, content: impl Into<String>) {
        self.history.push(Message::new(role, content));
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }

    /// Switches mode and clears history; attachments are kept.
    pub fn set_mode(&mut self, mode: ConversationMode) {
        self.mode = mode;
        self.history.clear();
    }

    /// Inserts or replaces the attachment keyed by `path`.
    ///
    /// A replaced attachment moves to the end of the collection. Returns true
    /// when `path` was already attached.
    pub fn attach(&mut self, path: impl Into<String>, content: impl Into<String>) -> bool {
        let path = path.into();
        let previous = self
            .attachments
            .iter()
            .position(|document| document.path == path);
        if let Some(index) = previous {
            self.attachments.remove(index);
        }

        self.attachments.push(AttachedDocument {
            path,
            content: content.into(),
        });
        previous.is_some()
    }

    /// Designates an attached document as the Composer edit target.
    ///
    /// Returns false, leaving the current target untouched, when `path` is not attached.
    pub fn designate_active(&mut self, path: &str) -> bool {
        let Some(document) = self
            .attachments
            .iter()
            .find(|document| document.path == path)
        else {
            return false;
        };

        self.active = Some(ActiveTarget {
            path: document.path.clone(),
            content: document.content.clone(),
        });
        true
    }

    /// Sets a target document that is not part of the attachment collection.
    ///
    /// The composer embeds its content directly when nothing is attached.
    pub fn set_detached_target(&mut self, path: impl Into<String>, content: impl Into<String>) {
        self.active = Some(ActiveTarget {
            path: path.into(),
            content: content.into(),
        });
    }

    /// Records content that was just written to `path` on disk.
    pub fn refresh_document(&mut self, path: &str, content: &str) {
        if let Some(document) = self
            .attachments
            .iter_mut()
            .find(|document| document.path == path)
        {
            document.content = content.to_string();
        }

        if let Some(active) = self.active.as_mut().filter(|active| active.path == path) {
            active.content = content.to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_switch_clears_history_but_keeps_attachments() {
        let mut session = SessionState::new(ConversationMode::Ask);
        session.attach("res://main.tscn", "[gd_scene]");
        session.append(Role::User, "hi");
        session.append(Role::Assistant, "hello");

        session.set_mode(ConversationMode::Composer);

        assert_eq!(session.mode(), ConversationMode::Composer);
        assert!(session.history().is_empty());
        assert_eq!(session.attachments().len(), 1);
    }

    #[test]
    fn attach_replaces_existing_path_and_moves_it_last() {
        let mut session = SessionState::default();
        assert!(!session.attach("a.tscn", "one"));
        assert!(!session.attach("b.tscn", "two"));
        assert!(session.attach("a.tscn", "three"));

        let paths: Vec<&str> = session
            .attachments()
            .iter()
            .map(|document| document.path.as_str())
            .collect();
        assert_eq!(paths, ["b.tscn", "a.tscn"]);
        assert_eq!(session.attachments()[1].content, "three");
    }

    #[test]
    fn designate_active_requires_attachment() {
        let mut session = SessionState::default();
        assert!(!session.designate_active("missing.tscn"));
        assert_eq!(session.active_path(), None);

        session.attach("main.tscn", "[gd_scene]");
        assert!(session.designate_active("main.tscn"));
        assert_eq!(session.active_path(), Some("main.tscn"));
        assert_eq!(session.active_content(), Some("[gd_scene]"));
    }

    #[test]
    fn refresh_updates_attachment_and_active_target() {
        let mut session = SessionState::default();
        session.attach("main.tscn", "old");
        session.designate_active("main.tscn");

        session.refresh_document("main.tscn", "new");

        assert_eq!(session.attachments()[0].content, "new");
        assert_eq!(session.active_content(), Some("new"));
    }

    #[test]
    fn history_preserves_insertion_order() {
        let mut session = SessionState::default();
        session.append(Role::User, "1");
        session.append(Role::Assistant, "2");
        session.append(Role::User, "3");

        let contents: Vec<&str> = session.history().iter().map(Message::content).collect();
        assert_eq!(contents, ["1", "2", "3"]);
    }

    #[test]
    fn mode_parse_is_case_insensitive() {
        assert_eq!(ConversationMode::parse(" Composer "), Some(ConversationMode::Composer));
        assert_eq!(ConversationMode::parse("ASK"), Some(ConversationMode::Ask));
        assert_eq!(ConversationMode::parse("edit"), None);
    }
}

//! Builds the outbound request payload from session state.

use chat_provider::{ChatMessage, ChatPayload};

use crate::paths::file_name;
use crate::session::{AttachedDocument, ConversationMode, Role, SessionState};

pub const ASK_SYSTEM_PROMPT: &str = "You are an assistant integrated into the Godot game engine editor. \
Help developers with Godot and GDScript questions: engine features, GDScript syntax, game development \
concepts, and debugging. When asked for code, provide working GDScript that follows Godot best practices \
and fence it with the language tag. Keep answers technical, accurate, and focused on Godot-specific solutions.";

pub const COMPOSER_SYSTEM_PROMPT: &str = "You are an assistant integrated into the Godot game engine editor in \
Composer Mode. You modify scene files (.tscn) and create GDScript (.gd) files. When the user asks for changes:\n\n\
1. Provide the COMPLETE modified .tscn file content inside a ```tscn fenced block. Never truncate, abbreviate, \
or elide any part of the scene file.\n\
2. Preserve the .tscn format exactly, including section headers, resource ids, and node paths.\n\n\
For every GDScript file that must be created or modified:\n\n\
3. FIRST write the destination on its own line as 'Path: res://path/to/script.gd'.\n\
4. IMMEDIATELY after that line, provide the complete file content inside a ```gdscript fenced block.\n\
5. Repeat this pattern for each script file.\n\n\
IMPORTANT: the Path line is mandatory and is read by a program; each script is written to exactly that path. \
Truncated output is forbidden: your response must contain full, complete file contents because every change \
is applied to the user's files automatically.";

/// Pure payload builder: mode-dependent system prompt plus replayed history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestComposer {
    model: String,
    max_tokens: u32,
}

impl RequestComposer {
    pub fn new(model: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            model: model.into(),
            max_tokens,
        }
    }

    pub fn compose(&self, session: &SessionState) -> ChatPayload {
        let messages = session
            .history()
            .iter()
            .filter_map(|message| match message.role() {
                Role::User => Some(ChatMessage::user(message.content())),
                Role::Assistant => Some(ChatMessage::assistant(message.content())),
                Role::System => None,
            })
            .collect();

        ChatPayload {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            system: self.system_prompt(session),
            messages,
        }
    }

    pub fn system_prompt(&self, session: &SessionState) -> String {
        let context = attachment_context(session.attachments());

        match session.mode() {
            ConversationMode::Ask => {
                let mut prompt = ASK_SYSTEM_PROMPT.to_string();
                if !context.is_empty() {
                    prompt.push_str(
                        "\n\nThe user has attached the following scene file(s) for context:",
                    );
                    prompt.push_str(&context);
                }
                prompt
            }
            ConversationMode::Composer => {
                let mut prompt = COMPOSER_SYSTEM_PROMPT.to_string();
                if !context.is_empty() {
                    prompt.push_str("\n\nThe user has attached the following scene file(s):");
                    prompt.push_str(&context);
                    if let Some(active) = session.active_path() {
                        prompt.push_str("\n\nThe scene file to be modified is: ");
                        prompt.push_str(file_name(active));
                    }
                } else if let Some(content) = session.active_content().filter(|c| !c.is_empty()) {
                    prompt.push_str("\n\nHere is the current .tscn file content:\n```tscn\n");
                    prompt.push_str(content);
                    prompt.push_str("\n```");
                }
                prompt
            }
        }
    }
}

fn attachment_context(attachments: &[AttachedDocument]) -> String {
    attachments
        .iter()
        .map(|document| {
            format!(
                "\n\nScene file: {}\n```tscn\n{}\n```\n",
                file_name(&document.path),
                document.content
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chat_provider::ChatRole;

    use super::*;

    fn composer() -> RequestComposer {
        RequestComposer::new("claude-3-sonnet-20240229", 4096)
    }

    #[test]
    fn ask_prompt_has_no_context_without_attachments() {
        let session = SessionState::new(ConversationMode::Ask);
        let payload = composer().compose(&session);

        assert_eq!(payload.system, ASK_SYSTEM_PROMPT);
        assert_eq!(payload.model, "claude-3-sonnet-20240229");
        assert_eq!(payload.max_tokens, 4096);
        assert!(payload.messages.is_empty());
    }

    #[test]
    fn ask_prompt_lists_each_attachment_by_file_name() {
        let mut session = SessionState::new(ConversationMode::Ask);
        session.attach("res://levels/one.tscn", "[gd_scene format=3]");
        session.attach("res://levels/two.tscn", "[gd_resource]");

        let system = composer().system_prompt(&session);

        assert!(system.contains("attached the following scene file(s) for context:"));
        assert!(system.contains("Scene file: one.tscn\n```tscn\n[gd_scene format=3]\n```"));
        assert!(system.contains("Scene file: two.tscn\n```tscn\n[gd_resource]\n```"));
    }

    #[test]
    fn composer_prompt_names_active_target() {
        let mut session = SessionState::new(ConversationMode::Composer);
        session.attach("res://levels/one.tscn", "[gd_scene]");
        session.designate_active("res://levels/one.tscn");

        let system = composer().system_prompt(&session);

        assert!(system.starts_with(COMPOSER_SYSTEM_PROMPT));
        assert!(system.contains("Path: res://path/to/script.gd"));
        assert!(system.contains("Truncated output is forbidden"));
        assert!(system.ends_with("The scene file to be modified is: one.tscn"));
    }

    #[test]
    fn composer_prompt_embeds_detached_target_content() {
        let mut session = SessionState::new(ConversationMode::Composer);
        session.set_detached_target("res://main.tscn", "[gd_scene load_steps=1]");

        let system = composer().system_prompt(&session);

        assert!(system.ends_with(
            "Here is the current .tscn file content:\n```tscn\n[gd_scene load_steps=1]\n```"
        ));
        assert!(!system.contains("Scene file:"));
    }

    #[test]
    fn history_is_replayed_oldest_first_without_system_entries() {
        let mut session = SessionState::new(ConversationMode::Ask);
        session.append(Role::User, "first");
        session.append(Role::System, "local note");
        session.append(Role::Assistant, "second");
        session.append(Role::User, "third");

        let payload = composer().compose(&session);

        let roles: Vec<ChatRole> = payload.messages.iter().map(|m| m.role).collect();
        let contents: Vec<&str> = payload.messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(roles, [ChatRole::User, ChatRole::Assistant, ChatRole::User]);
        assert_eq!(contents, ["first", "second", "third"]);
    }
}

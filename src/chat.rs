//! Orchestration between session state, the request lifecycle, and a host.

use std::path::PathBuf;
use std::sync::Arc;

use chat_provider::ProviderEvent;

use crate::apply::{is_document_root, ApplyEngine, ApplyOutcome};
use crate::compose::RequestComposer;
use crate::config::{ChatConfig, API_KEY_ENV_VAR};
use crate::error::ChatError;
use crate::extract::{extract, ExtractedEdit, PathOrigin};
use crate::host::{HostUi, Speaker};
use crate::lifecycle::{LifecycleState, RequestController};
use crate::paths::{extension, file_name};
use crate::sanitize::sanitize;
use crate::session::{ConversationMode, Role, SessionState};

const ATTACHABLE_EXTENSION: &str = "tscn";

/// Drives one conversation on behalf of a [`HostUi`].
///
/// All methods run on the owner thread; provider work happens on the
/// [`RequestController`]'s workers and is picked up by [`Self::poll`].
pub struct ChatController {
    session: SessionState,
    composer: RequestComposer,
    pending_edit: ExtractedEdit,
    engine: ApplyEngine,
    requests: Arc<RequestController>,
}

impl ChatController {
    pub fn new(
        config: &ChatConfig,
        project_root: impl Into<PathBuf>,
        requests: Arc<RequestController>,
    ) -> Self {
        Self {
            session: SessionState::new(config.mode),
            composer: RequestComposer::new(config.model.clone(), config.max_tokens),
            pending_edit: ExtractedEdit::default(),
            engine: ApplyEngine::new(project_root).with_policy(config.apply),
            requests,
        }
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn mode(&self) -> ConversationMode {
        self.session.mode()
    }

    pub fn pending_edit(&self) -> &ExtractedEdit {
        &self.pending_edit
    }

    pub fn lifecycle_state(&self) -> LifecycleState {
        self.requests.state()
    }

    pub fn greet(&mut self, host: &mut dyn HostUi) {
        host.on_message(Speaker::System, "Welcome to Scene Composer!");
        host.on_message(
            Speaker::System,
            &format!("Current mode: {}", self.mode().label()),
        );
        if self.requests.provider().check_ready().is_err() {
            host.on_message(
                Speaker::System,
                &format!("Please configure an API key ({API_KEY_ENV_VAR}) before sending messages."),
            );
        }
        host.on_apply_availability(self.apply_available());
    }

    pub fn submit(&mut self, text: &str, host: &mut dyn HostUi) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }

        host.on_message(Speaker::User, text);
        self.session.append(Role::User, text);

        if let Err(failure) = self.requests.provider().check_ready() {
            report_error(host, &ChatError::from(failure));
            return;
        }

        let payload = self.composer.compose(&self.session);
        match self.requests.send(payload) {
            Ok(request_id) => {
                tracing::debug!(request_id, mode = %self.mode(), "submitted request");
                host.on_message(Speaker::System, &self.waiting_line());
            }
            Err(error) => host.on_message(
                Speaker::System,
                &format!("Error sending request: {error}"),
            ),
        }
    }

    /// Processes events of the current request. Returns how many were handled.
    pub fn poll(&mut self, host: &mut dyn HostUi) -> usize {
        let events = self.requests.drain_events();
        let handled = events.len();

        for event in events {
            match event {
                ProviderEvent::Started { .. } => {}
                ProviderEvent::Completed { text, .. } => self.handle_response(text, host),
                ProviderEvent::Failed { failure, .. } => {
                    report_error(host, &ChatError::from(failure));
                }
                ProviderEvent::Cancelled { .. } => {
                    host.on_message(Speaker::System, "Request cancelled.");
                }
            }
        }

        handled
    }

    /// Applies the pending edit. Returns the outcome when the engine ran.
    pub fn apply(&mut self, host: &mut dyn HostUi) -> Option<ApplyOutcome> {
        if self.mode() != ConversationMode::Composer {
            host.on_message(
                Speaker::System,
                "Switch to Composer Mode to apply changes.",
            );
            return None;
        }
        if self.pending_edit.is_empty() {
            host.on_message(Speaker::System, "Nothing to apply.");
            return None;
        }

        let active = self.session.active_path().map(str::to_owned);
        let outcome = match self.engine.apply(&self.pending_edit, active.as_deref()) {
            Ok(outcome) => outcome,
            Err(error) => {
                report_error(host, &error);
                return None;
            }
        };

        self.report_outcome(&outcome, active.as_deref(), host);

        if outcome.any_success() {
            if outcome.document_applied {
                if let (Some(path), Some(body)) = (&active, &self.pending_edit.document_body) {
                    self.session.refresh_document(path, body);
                }
            }
            self.pending_edit.clear();
            host.on_apply_availability(false);
        }

        Some(outcome)
    }

    /// Switches mode. History and the pending edit are discarded; attachments stay.
    pub fn set_mode(&mut self, mode: ConversationMode, host: &mut dyn HostUi) {
        if let Some(request_id) = self.requests.cancel() {
            tracing::debug!(request_id, "cancelled in-flight request on mode switch");
        }

        self.session.set_mode(mode);
        self.pending_edit.clear();
        host.on_message(
            Speaker::System,
            &format!("Switched to {}", mode.label()),
        );

        if mode == ConversationMode::Composer {
            let has_active = self.session.active_path().is_some();
            let latest = self
                .session
                .attachments()
                .last()
                .map(|document| document.path.clone());
            match (has_active, latest) {
                (true, _) => {}
                (false, Some(path)) => {
                    self.session.designate_active(&path);
                    host.on_message(
                        Speaker::System,
                        &format!("Active scene: {}", file_name(&path)),
                    );
                }
                (false, None) => host.on_message(
                    Speaker::System,
                    "Attach a .tscn file to get started with modifications.",
                ),
            }
        }

        host.on_apply_availability(self.apply_available());
    }

    /// Reads and attaches a scene file, designating it active in Composer Mode.
    pub fn attach_file(&mut self, path: &str, host: &mut dyn HostUi) -> Result<(), ChatError> {
        let result = self.load_attachment(path);
        let content = match result {
            Ok(content) => content,
            Err(error) => {
                report_error(host, &error);
                return Err(error);
            }
        };

        let updated = self.session.attach(path, content);
        if self.mode() == ConversationMode::Composer {
            self.session.designate_active(path);
        }

        host.on_message(
            Speaker::System,
            &format!(
                "Attached scene: {}{}",
                file_name(path),
                if updated { " (updated)" } else { "" }
            ),
        );
        if self.mode() == ConversationMode::Composer {
            host.on_message(
                Speaker::System,
                "Describe the changes you want made to this scene.",
            );
        }
        Ok(())
    }

    pub fn cancel(&mut self, host: &mut dyn HostUi) {
        match self.requests.cancel() {
            Some(_) => host.on_message(Speaker::System, "Request cancelled."),
            None => host.on_message(Speaker::System, "No request in progress."),
        }
    }

    /// Clears history and the pending edit; attachments are kept.
    pub fn clear(&mut self, host: &mut dyn HostUi) {
        self.requests.cancel();
        self.session.clear();
        self.pending_edit.clear();
        host.on_apply_availability(false);
        host.on_message(Speaker::System, "Conversation cleared.");
    }

    fn load_attachment(&self, path: &str) -> Result<String, ChatError> {
        match extension(path).as_deref() {
            Some(ATTACHABLE_EXTENSION) => {}
            Some("blend") => {
                return Err(ChatError::attachment(
                    path,
                    ".blend files must be imported first; attach the .tscn scene created from the import",
                ));
            }
            Some(other) => {
                return Err(ChatError::attachment(
                    path,
                    format!("only .tscn files are supported, not .{other}"),
                ));
            }
            None => {
                return Err(ChatError::attachment(
                    path,
                    "only .tscn files are supported",
                ));
            }
        }

        let resolved = self.engine.resolve(path, None);
        let content = std::fs::read_to_string(&resolved).map_err(|error| {
            ChatError::attachment(path, format!("failed to read {}: {error}", resolved.display()))
        })?;

        if !is_document_root(&content) {
            return Err(ChatError::attachment(
                path,
                "the file does not look like a scene; it must start with [gd_scene or [gd_resource",
            ));
        }

        Ok(content)
    }

    fn handle_response(&mut self, text: String, host: &mut dyn HostUi) {
        match self.mode() {
            ConversationMode::Ask => host.on_message(Speaker::Assistant, &text),
            ConversationMode::Composer => {
                let edit = extract(&text, self.session.active_path());
                self.announce_edit(&edit, host);

                let ready = !edit.is_empty();
                self.pending_edit = edit;
                host.on_apply_availability(ready);
                host.on_message(Speaker::Assistant, &sanitize(&text));
            }
        }

        self.session.append(Role::Assistant, text);
    }

    fn announce_edit(&self, edit: &ExtractedEdit, host: &mut dyn HostUi) {
        for source in &edit.source_edits {
            let line = match source.origin {
                PathOrigin::Declared => format!("Found script: {}", source.path),
                PathOrigin::Generated => {
                    format!("Generated script will be saved as: {}", source.path)
                }
            };
            host.on_message(Speaker::System, &line);
        }

        match (&edit.document_body, self.session.active_path()) {
            (Some(_), Some(active)) => host.on_message(
                Speaker::System,
                &format!("Scene content ready to apply to: {}", file_name(active)),
            ),
            (Some(_), None) => host.on_message(
                Speaker::System,
                "Scene content found, but no scene is attached to receive it.",
            ),
            (None, _) => host.on_message(
                Speaker::System,
                "No scene content found in the response.",
            ),
        }

        let scripts = edit.source_edits.len();
        if scripts > 0 {
            host.on_scripts_found(scripts);
            host.on_message(
                Speaker::System,
                &format!("Found {scripts} script file(s) ready to apply"),
            );
        }

        if !edit.is_empty() {
            host.on_message(
                Speaker::System,
                "Apply the changes to update your files with these modifications.",
            );
        }
    }

    fn report_outcome(&self, outcome: &ApplyOutcome, active: Option<&str>, host: &mut dyn HostUi) {
        for backup in &outcome.backups_created {
            host.on_message(
                Speaker::System,
                &format!("Created backup: {}", backup.display()),
            );
        }

        if outcome.document_applied {
            host.on_message(
                Speaker::System,
                &format!(
                    "Changes applied to {}",
                    active.map(file_name).unwrap_or("the scene")
                ),
            );
        }
        if let Some(error) = &outcome.document_error {
            report_error(host, error);
        }

        for path in &outcome.applied_sources {
            host.on_message(
                Speaker::System,
                &format!("Created/updated script: {}", path.display()),
            );
        }
        for failure in &outcome.source_failures {
            host.on_message(
                Speaker::System,
                &format!("Failed to save script {}: {}", failure.path, failure.error),
            );
        }

        if outcome.any_success() {
            let scripts = outcome.sources_applied();
            if scripts > 0 {
                host.on_message(
                    Speaker::System,
                    &format!("Created/updated {scripts} script file(s)."),
                );
            }
            host.on_message(
                Speaker::System,
                "Reopen the scene in the editor to see the changes.",
            );
        } else {
            host.on_message(
                Speaker::System,
                "No changes were applied. Make sure the response contained valid content.",
            );
        }
    }

    fn waiting_line(&self) -> String {
        match (self.mode(), self.session.active_path()) {
            (ConversationMode::Ask, _) => "Waiting for the assistant's response...".to_string(),
            (ConversationMode::Composer, Some(active)) => {
                format!("Processing modifications for {}...", file_name(active))
            }
            (ConversationMode::Composer, None) => {
                "Processing scene modifications... Please wait.".to_string()
            }
        }
    }

    fn apply_available(&self) -> bool {
        self.mode() == ConversationMode::Composer && !self.pending_edit.is_empty()
    }
}

fn report_error(host: &mut dyn HostUi, error: &ChatError) {
    tracing::warn!(%error, "reported error");
    host.on_message(Speaker::System, &format!("Error: {error}"));
}

//! Deterministic mock implementation of the shared `chat_provider` contract.
//!
//! This crate contains no transport/protocol logic and is intended for local
//! development and contract-level integration testing.

use std::collections::VecDeque;
use std::sync::atomic::Ordering;
use std::sync::{Mutex, MutexGuard};
use std::thread;
use std::time::{Duration, Instant};

use chat_provider::{
    CancelSignal, ChatPayload, ChatProvider, ChatRequest, ProviderEvent, ProviderFailure,
    ProviderProfile,
};

/// Stable provider identifier used for explicit startup selection.
pub const MOCK_PROVIDER_ID: &str = "mock";

const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(5);

/// One scripted outcome for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockReply {
    Text(String),
    Failure(ProviderFailure),
}

/// Deterministic mock provider used by tests and local runs.
///
/// Replies are consumed in order; once the script is exhausted every request
/// receives the default reply.
#[derive(Debug)]
pub struct MockProvider {
    default_reply: MockReply,
    script: Mutex<VecDeque<MockReply>>,
    delay: Duration,
    received: Mutex<Vec<ChatPayload>>,
}

impl MockProvider {
    /// Creates a mock provider replying with `text` to every request.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_script(Vec::new(), MockReply::Text(text.into()))
    }

    /// Creates a mock provider replaying `script` before falling back to `default_reply`.
    #[must_use]
    pub fn with_script(script: Vec<MockReply>, default_reply: MockReply) -> Self {
        Self {
            default_reply,
            script: Mutex::new(script.into()),
            delay: Duration::ZERO,
            received: Mutex::new(Vec::new()),
        }
    }

    /// Delays every reply; cancellation is still observed while waiting.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Payloads received so far, in send order.
    pub fn received_payloads(&self) -> Vec<ChatPayload> {
        lock_unpoisoned(&self.received).clone()
    }

    fn next_reply(&self) -> MockReply {
        lock_unpoisoned(&self.script)
            .pop_front()
            .unwrap_or_else(|| self.default_reply.clone())
    }

    fn wait_or_cancel(&self, cancel: &CancelSignal) -> bool {
        let deadline = Instant::now() + self.delay;
        loop {
            if cancel.load(Ordering::SeqCst) {
                return false;
            }
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            thread::sleep(CANCEL_POLL_INTERVAL.min(deadline - now));
        }
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new(concat!(
            "Here is the updated scene.\n\n",
            "```tscn\n",
            "[gd_scene load_steps=2 format=3]\n\n",
            "[ext_resource type=\"Script\" path=\"res://scripts/player.gd\" id=\"1\"]\n\n",
            "[node name=\"Player\" type=\"CharacterBody2D\"]\n",
            "script = ExtResource(\"1\")\n",
            "```\n\n",
            "Path: res://scripts/player.gd\n",
            "```gdscript\n",
            "extends CharacterBody2D\n\n",
            "func _physics_process(delta):\n",
            "\tmove_and_slide()\n",
            "```\n",
        ))
    }
}

impl ChatProvider for MockProvider {
    fn profile(&self) -> ProviderProfile {
        ProviderProfile {
            provider_id: MOCK_PROVIDER_ID.to_string(),
            model_id: "mock".to_string(),
        }
    }

    fn send(
        &self,
        req: ChatRequest,
        cancel: CancelSignal,
        emit: &mut dyn FnMut(ProviderEvent),
    ) -> Result<(), String> {
        let request_id = req.request_id;
        lock_unpoisoned(&self.received).push(req.payload);

        emit(ProviderEvent::Started { request_id });

        if !self.wait_or_cancel(&cancel) {
            emit(ProviderEvent::Cancelled { request_id });
            return Ok(());
        }

        match self.next_reply() {
            MockReply::Text(text) => emit(ProviderEvent::Completed { request_id, text }),
            MockReply::Failure(failure) => emit(ProviderEvent::Failed {
                request_id,
                failure,
            }),
        }

        Ok(())
    }
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

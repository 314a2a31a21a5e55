//! Single-flight request lifecycle.
//!
//! Each request runs on its own worker thread. Provider events are queued and
//! drained on the owner thread, where events from any request other than the
//! current one are discarded.

use std::collections::VecDeque;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use chat_provider::{
    CancelSignal, ChatPayload, ChatProvider, ChatRequest, ProviderEvent, ProviderFailure,
    RequestId,
};

/// Wake-up hook invoked from worker threads after an event is queued.
pub type Notifier = Arc<dyn Fn() + Send + Sync>;

const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Idle,
    InFlight { request_id: RequestId },
}

struct ActiveRequest {
    request_id: RequestId,
    cancel: CancelSignal,
    join_handle: Option<JoinHandle<()>>,
}

pub struct RequestController {
    provider: Arc<dyn ChatProvider>,
    pending_events: Mutex<VecDeque<ProviderEvent>>,
    next_request_id: AtomicU64,
    active: Mutex<Option<ActiveRequest>>,
    drain_timeout: Duration,
    cancellations: AtomicU64,
    notifier: Option<Notifier>,
}

impl RequestController {
    pub fn new(provider: Arc<dyn ChatProvider>, drain_timeout: Duration) -> Arc<Self> {
        Self::build(provider, drain_timeout, None)
    }

    /// Creates a controller that calls `notifier` whenever a worker queues an event.
    ///
    /// Hosts use this to wake their owner loop and call [`Self::drain_events`].
    pub fn with_notifier(
        provider: Arc<dyn ChatProvider>,
        drain_timeout: Duration,
        notifier: Notifier,
    ) -> Arc<Self> {
        Self::build(provider, drain_timeout, Some(notifier))
    }

    fn build(
        provider: Arc<dyn ChatProvider>,
        drain_timeout: Duration,
        notifier: Option<Notifier>,
    ) -> Arc<Self> {
        Arc::new(Self {
            provider,
            pending_events: Mutex::new(VecDeque::new()),
            next_request_id: AtomicU64::new(1),
            active: Mutex::new(None),
            drain_timeout,
            cancellations: AtomicU64::new(0),
            notifier,
        })
    }

    pub fn provider(&self) -> &Arc<dyn ChatProvider> {
        &self.provider
    }

    pub fn state(&self) -> LifecycleState {
        match self.lock_active().as_ref() {
            Some(active) => LifecycleState::InFlight {
                request_id: active.request_id,
            },
            None => LifecycleState::Idle,
        }
    }

    /// Number of cancel signals raised so far.
    pub fn cancellation_count(&self) -> u64 {
        self.cancellations.load(Ordering::SeqCst)
    }

    /// Issues a new request, cancelling and briefly draining any in-flight one first.
    pub fn send(self: &Arc<Self>, payload: ChatPayload) -> Result<RequestId, String> {
        let previous = self.lock_active().take();
        if let Some(previous) = previous {
            self.cancel_and_drain(previous);
        }

        let mut active = self.lock_active();
        let request_id = self.next_request_id.fetch_add(1, Ordering::SeqCst);
        let cancel = Arc::new(AtomicBool::new(false));
        let request = ChatRequest {
            request_id,
            payload,
        };
        let join_handle = self.spawn_worker(request, Arc::clone(&cancel))?;

        *active = Some(ActiveRequest {
            request_id,
            cancel,
            join_handle: Some(join_handle),
        });
        tracing::debug!(request_id, "request in flight");

        Ok(request_id)
    }

    /// Cancels the in-flight request, returning its id.
    ///
    /// The controller returns to idle immediately; the worker's eventual
    /// terminal event is discarded as stale.
    pub fn cancel(&self) -> Option<RequestId> {
        let active = self.lock_active().take()?;
        active.cancel.store(true, Ordering::SeqCst);
        self.cancellations.fetch_add(1, Ordering::SeqCst);
        tracing::info!(request_id = active.request_id, "request cancelled");
        Some(active.request_id)
    }

    /// Returns queued events belonging to the current request, oldest first.
    ///
    /// A terminal event returns the controller to idle.
    pub fn drain_events(&self) -> Vec<ProviderEvent> {
        let queued: Vec<ProviderEvent> = lock_unpoisoned(&self.pending_events).drain(..).collect();
        let mut delivered = Vec::with_capacity(queued.len());

        for event in queued {
            let request_id = event.request_id();
            let mut active = self.lock_active();
            if active.as_ref().map(|current| current.request_id) != Some(request_id) {
                tracing::debug!(request_id, "discarding event from stale request");
                continue;
            }

            if event.is_terminal() {
                if let Some(finished) = active.take() {
                    join_if_finished(finished);
                }
                tracing::debug!(request_id, "request finished");
            }
            delivered.push(event);
        }

        delivered
    }

    fn cancel_and_drain(&self, previous: ActiveRequest) {
        let request_id = previous.request_id;
        previous.cancel.store(true, Ordering::SeqCst);
        self.cancellations.fetch_add(1, Ordering::SeqCst);
        tracing::info!(request_id, "cancelling in-flight request before sending a new one");

        let Some(join_handle) = previous.join_handle else {
            return;
        };

        let deadline = Instant::now() + self.drain_timeout;
        while !join_handle.is_finished() && Instant::now() < deadline {
            thread::sleep(DRAIN_POLL_INTERVAL);
        }

        if join_handle.is_finished() {
            let _ = join_handle.join();
        } else {
            tracing::warn!(request_id, "cancelled request did not drain in time; detaching");
        }
    }

    fn spawn_worker(
        self: &Arc<Self>,
        request: ChatRequest,
        cancel: CancelSignal,
    ) -> Result<JoinHandle<()>, String> {
        let request_id = request.request_id;
        let controller = Arc::clone(self);
        thread::Builder::new()
            .name(format!("scene-composer-request-{request_id}"))
            .spawn(move || controller.run_worker(request, cancel))
            .map_err(|error| format!("Failed to spawn request worker: {error}"))
    }

    fn run_worker(self: Arc<Self>, request: ChatRequest, cancel: CancelSignal) {
        let request_id = request.request_id;
        let terminal_emitted = AtomicBool::new(false);
        let mut emit = |event: ProviderEvent| {
            if event.is_terminal() {
                terminal_emitted.store(true, Ordering::SeqCst);
            }
            self.enqueue_event(event);
        };

        let outcome = catch_unwind(AssertUnwindSafe(|| {
            self.provider.send(request, Arc::clone(&cancel), &mut emit)
        }));

        let fallback_message = match outcome {
            Ok(Ok(())) => "provider exited without terminal event".to_string(),
            Ok(Err(error)) => error,
            Err(_) => "provider panicked".to_string(),
        };

        if !terminal_emitted.load(Ordering::SeqCst) {
            if cancel.load(Ordering::SeqCst) {
                emit(ProviderEvent::Cancelled { request_id });
            } else {
                emit(ProviderEvent::Failed {
                    request_id,
                    failure: ProviderFailure::Transport {
                        code: None,
                        message: fallback_message,
                    },
                });
            }
        }
    }

    fn enqueue_event(&self, event: ProviderEvent) {
        lock_unpoisoned(&self.pending_events).push_back(event);
        if let Some(notifier) = &self.notifier {
            notifier();
        }
    }

    fn lock_active(&self) -> MutexGuard<'_, Option<ActiveRequest>> {
        lock_unpoisoned(&self.active)
    }
}

fn join_if_finished(mut finished: ActiveRequest) {
    if let Some(join_handle) = finished.join_handle.take() {
        let is_current_thread = join_handle.thread().id() == thread::current().id();
        if !is_current_thread && join_handle.is_finished() {
            let _ = join_handle.join();
        }
    }
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

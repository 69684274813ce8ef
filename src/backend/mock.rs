//! Scripted backend for tests

use std::sync::atomic::{AtomicBool, AtomicI32, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

use super::{Backend, BootstrapRequest, PredictRequest};
use crate::error::Result;

/// Shared counters so tests can inspect a backend after it moved into a session
#[derive(Debug, Default)]
pub(crate) struct Tally {
    pub allocated: AtomicUsize,
    pub released: AtomicUsize,
    pub context_size: AtomicI32,
    pub in_flight: AtomicBool,
    pub overlapped: AtomicBool,
    pub requests: Mutex<Vec<RecordedRequest>>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RecordedRequest {
    pub prompt: String,
    pub seed: i32,
    pub tokens: i32,
    pub top_k: i32,
    pub temperature: f32,
    pub ignore_eos: bool,
}

#[derive(Debug, Clone)]
pub(crate) enum Reply {
    /// Output is `" " + prompt + suffix`
    EchoSpaced(String),
    /// Output is `prompt + suffix`
    Echo(String),
    Fixed(String),
    Fail(i32),
}

#[derive(Debug, Clone)]
pub(crate) struct MockBackend {
    pub tally: Arc<Tally>,
    pub bootstrap_status: i32,
    pub reply: Reply,
    pub delay: Duration,
}

#[derive(Debug)]
pub(crate) struct MockState;

impl MockBackend {
    pub fn new(reply: Reply) -> Self {
        Self {
            tally: Arc::new(Tally::default()),
            bootstrap_status: 0,
            reply,
            delay: Duration::ZERO,
        }
    }

    pub fn failing_bootstrap(status: i32) -> Self {
        Self {
            bootstrap_status: status,
            ..Self::new(Reply::Fixed(String::new()))
        }
    }
}

impl Backend for MockBackend {
    type State = MockState;

    fn allocate_state(&self) -> Result<MockState> {
        self.tally.allocated.fetch_add(1, Ordering::SeqCst);
        Ok(MockState)
    }

    fn bootstrap(&self, _state: &mut MockState, request: &BootstrapRequest<'_>) -> i32 {
        self.tally.context_size.store(request.context_size, Ordering::SeqCst);
        self.bootstrap_status
    }

    fn predict(&self, _state: &mut MockState, request: &PredictRequest<'_>) -> std::result::Result<String, i32> {
        if self.tally.in_flight.swap(true, Ordering::SeqCst) {
            self.tally.overlapped.store(true, Ordering::SeqCst);
        }
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }

        self.tally.requests.lock().push(RecordedRequest {
            prompt: request.prompt.to_string(),
            seed: request.seed,
            tokens: request.tokens,
            top_k: request.top_k,
            temperature: request.temperature,
            ignore_eos: request.ignore_eos,
        });

        let reply = match &self.reply {
            Reply::EchoSpaced(suffix) => Ok(format!(" {}{}", request.prompt, suffix)),
            Reply::Echo(suffix) => Ok(format!("{}{}", request.prompt, suffix)),
            Reply::Fixed(text) => Ok(text.clone()),
            Reply::Fail(status) => Err(*status),
        };

        self.tally.in_flight.store(false, Ordering::SeqCst);
        reply
    }

    fn release_state(&self, _state: MockState) {
        self.tally.released.fetch_add(1, Ordering::SeqCst);
    }
}

//! In-memory providers and a recording sink for unit tests.

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::models::ImageBackend;
use crate::orchestrator::{ComicEvent, EventSink};
use crate::providers::{ChatRequest, ImageProvider, ImageRequest, ProviderError, TextModel};

/// Replays queued completions in order; an empty queue yields `""`.
#[derive(Default)]
pub struct ScriptedText {
    responses: Mutex<VecDeque<Result<String, String>>>,
    pub requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedText {
    pub fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            responses: Mutex::new(responses.into_iter().map(|s| Ok(s.into())).collect()),
            requests: Mutex::default(),
        }
    }

    /// Queue a transport failure.
    pub fn then_fail(self, message: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
        self
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl TextModel for ScriptedText {
    async fn complete(&self, request: ChatRequest) -> Result<String, ProviderError> {
        self.requests.lock().unwrap().push(request);
        match self.responses.lock().unwrap().pop_front() {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(ProviderError::Api {
                provider: "Scripted",
                status: 500,
                body: message,
            }),
            None => Ok(String::new()),
        }
    }
}

/// Returns `https://img.test/<backend>/<n>.png`, failing for listed backends
/// and for the first `fail_first` calls.
#[derive(Default)]
pub struct ScriptedImages {
    failing: HashSet<ImageBackend>,
    fail_first: AtomicUsize,
    counter: AtomicUsize,
    pub requests: Mutex<Vec<ImageRequest>>,
}

impl ScriptedImages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(backends: &[ImageBackend]) -> Self {
        Self {
            failing: backends.iter().copied().collect(),
            ..Self::default()
        }
    }

    pub fn flaky(fail_first: usize) -> Self {
        Self {
            fail_first: AtomicUsize::new(fail_first),
            ..Self::default()
        }
    }

    pub fn backends(&self) -> Vec<ImageBackend> {
        self.requests.lock().unwrap().iter().map(|r| r.backend).collect()
    }
}

#[async_trait]
impl ImageProvider for ScriptedImages {
    async fn generate(&self, request: ImageRequest) -> Result<String, ProviderError> {
        let backend = request.backend;
        self.requests.lock().unwrap().push(request);

        let flaky = self
            .fail_first
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if flaky || self.failing.contains(&backend) {
            return Err(ProviderError::MissingOutput(format!(
                "{} unavailable",
                backend.display_name()
            )));
        }

        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        Ok(format!("https://img.test/{}/{}.png", backend.display_name(), n))
    }
}

/// Sink that keeps every event and counts closes.
#[derive(Default)]
pub struct RecordingSink {
    pub events: Mutex<Vec<ComicEvent>>,
    closes: AtomicUsize,
}

impl RecordingSink {
    pub fn names(&self) -> Vec<&'static str> {
        self.events.lock().unwrap().iter().map(ComicEvent::name).collect()
    }

    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EventSink for RecordingSink {
    async fn emit(&self, event: ComicEvent) {
        if !self.is_closed() {
            self.events.lock().unwrap().push(event);
        }
    }

    async fn close(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }

    fn is_closed(&self) -> bool {
        self.closes.load(Ordering::SeqCst) > 0
    }
}

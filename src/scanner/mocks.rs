// Mock decoder for tests - scripted decode events, no camera, and
// counters so tests can assert lifecycle calls (pause on confirmation,
// dispose on teardown) actually happened.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::scanner::traits::QrDecoder;
use crate::scanner::types::{DecodeEvent, ScanError};

#[derive(Debug, Default)]
pub struct MockDecoderState {
    pub pause_count: AtomicUsize,
    pub resume_count: AtomicUsize,
    pub close_count: AtomicUsize,
    pub dispose_count: AtomicUsize,
}

/// Test-side handle onto a `MockDecoder` that has been moved into a session.
#[derive(Clone)]
pub struct MockDecoderHandle {
    state: Arc<MockDecoderState>,
    sender: Arc<Mutex<Option<mpsc::Sender<DecodeEvent>>>>,
}

impl MockDecoderHandle {
    pub fn pause_count(&self) -> usize {
        self.state.pause_count.load(Ordering::SeqCst)
    }

    pub fn resume_count(&self) -> usize {
        self.state.resume_count.load(Ordering::SeqCst)
    }

    pub fn close_count(&self) -> usize {
        self.state.close_count.load(Ordering::SeqCst)
    }

    pub fn dispose_count(&self) -> usize {
        self.state.dispose_count.load(Ordering::SeqCst)
    }

    /// Push a decode event into the open channel, as if a frame decoded.
    pub async fn push(&self, event: DecodeEvent) {
        let sender = self
            .sender
            .lock()
            .expect("decoder mock lock poisoned")
            .clone();
        if let Some(sender) = sender {
            let _ = sender.send(event).await;
        }
    }

    /// Drop the sender so the session observes a closed channel.
    pub fn close_channel(&self) {
        self.sender
            .lock()
            .expect("decoder mock lock poisoned")
            .take();
    }
}

pub struct MockDecoder {
    has_camera: bool,
    open_failure: Option<String>,
    scripted: Vec<DecodeEvent>,
    state: Arc<MockDecoderState>,
    sender: Arc<Mutex<Option<mpsc::Sender<DecodeEvent>>>>,
}

impl MockDecoder {
    pub fn new() -> (Self, MockDecoderHandle) {
        let state = Arc::new(MockDecoderState::default());
        let sender = Arc::new(Mutex::new(None));
        let handle = MockDecoderHandle {
            state: Arc::clone(&state),
            sender: Arc::clone(&sender),
        };
        (
            Self {
                has_camera: true,
                open_failure: None,
                scripted: Vec::new(),
                state,
                sender,
            },
            handle,
        )
    }

    pub fn without_camera(mut self) -> Self {
        self.has_camera = false;
        self
    }

    pub fn failing_open(mut self, message: &str) -> Self {
        self.open_failure = Some(message.to_string());
        self
    }

    /// Events delivered as soon as the decoder is opened.
    pub fn with_events(mut self, events: Vec<DecodeEvent>) -> Self {
        self.scripted = events;
        self
    }
}

#[async_trait]
impl QrDecoder for MockDecoder {
    async fn has_camera(&self) -> Result<bool, ScanError> {
        Ok(self.has_camera)
    }

    async fn open(&mut self) -> Result<mpsc::Receiver<DecodeEvent>, ScanError> {
        if let Some(message) = &self.open_failure {
            return Err(ScanError::CameraAccess(message.clone()));
        }
        let (sender, receiver) = mpsc::channel(self.scripted.len().max(1) + 8);
        for event in self.scripted.drain(..) {
            let _ = sender.try_send(event);
        }
        *self.sender.lock().expect("decoder mock lock poisoned") = Some(sender);
        Ok(receiver)
    }

    async fn pause(&mut self) {
        self.state.pause_count.fetch_add(1, Ordering::SeqCst);
    }

    async fn resume(&mut self) {
        self.state.resume_count.fetch_add(1, Ordering::SeqCst);
    }

    async fn close(&mut self) {
        self.state.close_count.fetch_add(1, Ordering::SeqCst);
        self.sender
            .lock()
            .expect("decoder mock lock poisoned")
            .take();
    }

    fn dispose(&mut self) {
        self.state.dispose_count.fetch_add(1, Ordering::SeqCst);
        self.sender
            .lock()
            .expect("decoder mock lock poisoned")
            .take();
    }
}

//! Test helpers for soundq-bot integration tests
//!
//! Provides reusable test infrastructure components:
//! - RecordingTransport: records every message operation, hands out prompts
//! - ScriptedBackend: answers queries from a fixed table and records them
//! - Harness: a SoundCommand wired to a SessionQueue and both of the above

#![allow(dead_code)]

use async_trait::async_trait;
use soundq_bot::config::BotSettings;
use soundq_bot::confirm::{Choice, ConfirmationSession};
use soundq_bot::library::SoundLibrary;
use soundq_bot::policy::DurationPolicy;
use soundq_bot::queue::{QueueService, SessionQueue};
use soundq_bot::resolver::{ResolutionOutcome, ResolverBackend};
use soundq_bot::track::{Requester, SourceRef, Track, TrackBundle};
use soundq_bot::transport::{MessageId, Transport, TransportError};
use soundq_bot::{CommandReport, Invocation, SoundCommand};
use soundq_common::events::{EventBus, SoundEvent};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{broadcast, Notify};
use tokio::task::JoinHandle;

pub const GUILD_ID: u64 = 42;

/// One transport operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    Sent(MessageId, String),
    Edited(MessageId, String),
    Offered(MessageId, String),
    Cleared(MessageId),
}

/// Transport that records everything and exposes open prompts to the test
pub struct RecordingTransport {
    records: Mutex<Vec<Record>>,
    last_id: AtomicU64,
    prompts: bool,
    clear_error: Option<TransportError>,
    offer_delay: Option<Duration>,
    send_error: Option<TransportError>,
    session: Mutex<Option<Arc<ConfirmationSession>>>,
    offered: Notify,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            last_id: AtomicU64::new(0),
            prompts: true,
            clear_error: None,
            offer_delay: None,
            send_error: None,
            session: Mutex::new(None),
            offered: Notify::new(),
        }
    }

    /// Transport that cannot attach choices
    pub fn without_prompts() -> Self {
        Self {
            prompts: false,
            ..Self::new()
        }
    }

    /// Transport whose clear_choices always fails with `error`
    pub fn failing_clear(error: TransportError) -> Self {
        Self {
            clear_error: Some(error),
            ..Self::new()
        }
    }

    /// Transport whose send always fails with `error`
    pub fn failing_send(error: TransportError) -> Self {
        Self {
            send_error: Some(error),
            ..Self::new()
        }
    }

    /// Transport that takes `delay` to show choices
    pub fn slow_offer(delay: Duration) -> Self {
        Self {
            offer_delay: Some(delay),
            ..Self::new()
        }
    }

    pub fn records(&self) -> Vec<Record> {
        self.records.lock().unwrap().clone()
    }

    /// Text of the most recent send or edit
    pub fn last_text(&self) -> Option<String> {
        self.records().into_iter().rev().find_map(|r| match r {
            Record::Sent(_, text) | Record::Edited(_, text) => Some(text),
            _ => None,
        })
    }

    pub fn offered_count(&self) -> usize {
        self.records()
            .iter()
            .filter(|r| matches!(r, Record::Offered(..)))
            .count()
    }

    pub fn cleared_count(&self) -> usize {
        self.records()
            .iter()
            .filter(|r| matches!(r, Record::Cleared(_)))
            .count()
    }

    /// Wait until a prompt is offered and return its session
    pub async fn next_session(&self) -> Arc<ConfirmationSession> {
        loop {
            if let Some(session) = self.session.lock().unwrap().take() {
                return session;
            }
            self.offered.notified().await;
        }
    }

    fn push(&self, record: Record) {
        self.records.lock().unwrap().push(record);
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, text: &str) -> Result<MessageId, TransportError> {
        if let Some(e) = &self.send_error {
            return Err(e.clone());
        }
        let id = MessageId(self.last_id.fetch_add(1, Ordering::SeqCst) + 1);
        self.push(Record::Sent(id, text.to_string()));
        Ok(id)
    }

    async fn edit(&self, message: MessageId, text: &str) -> Result<(), TransportError> {
        self.push(Record::Edited(message, text.to_string()));
        Ok(())
    }

    fn can_prompt(&self) -> bool {
        self.prompts
    }

    async fn offer_choices(
        &self,
        message: MessageId,
        text: &str,
        _choices: &[Choice],
        session: Arc<ConfirmationSession>,
    ) -> Result<(), TransportError> {
        if let Some(delay) = self.offer_delay {
            tokio::time::sleep(delay).await;
        }
        self.push(Record::Offered(message, text.to_string()));
        *self.session.lock().unwrap() = Some(session);
        self.offered.notify_one();
        Ok(())
    }

    async fn clear_choices(&self, message: MessageId) -> Result<(), TransportError> {
        self.push(Record::Cleared(message));
        match &self.clear_error {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }
}

/// Backend answering from a fixed table; unknown queries are NoMatch
#[derive(Default)]
pub struct ScriptedBackend {
    answers: HashMap<String, ResolutionOutcome>,
    queries: Mutex<Vec<String>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(mut self, query: impl Into<String>, outcome: ResolutionOutcome) -> Self {
        self.answers.insert(query.into(), outcome);
        self
    }

    /// Every query received, in order
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl ResolverBackend for ScriptedBackend {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn load(&self, query: &str) -> ResolutionOutcome {
        self.queries.lock().unwrap().push(query.to_string());
        self.answers
            .get(query)
            .cloned()
            .unwrap_or(ResolutionOutcome::NoMatch)
    }
}

pub fn track(title: &str, duration_ms: u64) -> Track {
    Track::new(title, duration_ms, SourceRef::new(format!("test://{}", title)))
}

pub fn bundle(name: &str, tracks: Vec<Track>) -> TrackBundle {
    TrackBundle::new(Some(name.to_string()), tracks)
}

/// Settings with remote queries on and the given limit
pub fn settings(max_duration_ms: Option<u64>) -> BotSettings {
    BotSettings {
        policy: DurationPolicy::new(max_duration_ms),
        ..BotSettings::default()
    }
    .with_remote_queries(true)
}

/// A command wired to in-memory collaborators
pub struct Harness {
    pub command: Arc<SoundCommand>,
    pub backend: Arc<ScriptedBackend>,
    pub queue: Arc<SessionQueue>,
    pub transport: Arc<RecordingTransport>,
    pub events: Arc<EventBus>,
    pub requester: Requester,
}

impl Harness {
    pub fn new(backend: ScriptedBackend, settings: BotSettings) -> Self {
        Self::build(backend, settings, RecordingTransport::new(), Path::new("/no/such/sounds"))
    }

    pub fn build(
        backend: ScriptedBackend,
        settings: BotSettings,
        transport: RecordingTransport,
        sounds_folder: &Path,
    ) -> Self {
        let backend = Arc::new(backend);
        let events = Arc::new(EventBus::default());
        let command = Arc::new(SoundCommand::new(
            settings,
            SoundLibrary::new(sounds_folder),
            backend.clone(),
            events.clone(),
        ));
        Self {
            command,
            backend,
            queue: Arc::new(SessionQueue::new(GUILD_ID)),
            transport: Arc::new(transport),
            events,
            requester: Requester::new(7, "ann"),
        }
    }

    pub fn as_dj(mut self) -> Self {
        self.requester = self.requester.dj();
        self
    }

    pub fn invocation(&self, args: &str) -> Invocation {
        Invocation {
            guild_id: GUILD_ID,
            requester: self.requester.clone(),
            args: args.to_string(),
            queue: self.queue.clone(),
            transport: self.transport.clone(),
        }
    }

    pub async fn run(&self, args: &str) -> CommandReport {
        self.command.execute(self.invocation(args)).await
    }

    pub fn spawn(&self, args: &str) -> JoinHandle<CommandReport> {
        self.command.spawn(self.invocation(args))
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SoundEvent> {
        self.events.subscribe()
    }

    pub async fn queued_titles(&self) -> Vec<String> {
        self.queue
            .entries()
            .await
            .into_iter()
            .map(|e| e.track.title)
            .collect()
    }

    pub async fn queue_len(&self) -> usize {
        self.queue.len().await
    }
}

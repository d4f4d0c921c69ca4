//! The `sound` command
//!
//! Entry point of the pipeline:
//! 1. Empty arguments resume a paused player (DJs only) or show help
//! 2. The argument is looked up in the sounds folder, or passed on as a query
//! 3. A loading placeholder is sent, then resolution runs
//! 4. The outcome is dispatched to single, prompted or bulk insertion
//! 5. The placeholder is edited into the final status line
//!
//! Every path ends in a status line. Transport failures while updating
//! that line are logged and dropped.

use crate::config::BotSettings;
use crate::confirm::{run_prompt, ConfirmationSession};
use crate::dispatch::{classify, Dispatch};
use crate::error::Error;
use crate::library::SoundLibrary;
use crate::queue::{BulkInsertion, QueueHandle, QueueInserter, QueuePosition};
use crate::report::Reporter;
use crate::resolver::{Identifier, ResolutionOutcome, ResolverBackend, Severity, TrackResolver};
use crate::track::{Requester, Track, TrackBundle};
use crate::transport::{MessageId, Transport};
use chrono::Utc;
use soundq_common::events::{ConfirmationOutcome, EventBus, SoundEvent};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// One invocation of the command
#[derive(Clone)]
pub struct Invocation {
    pub guild_id: u64,
    pub requester: Requester,
    /// Everything after the command name
    pub args: String,
    pub queue: QueueHandle,
    pub transport: Arc<dyn Transport>,
}

/// Why a command queued nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Nothing matched, search retry included
    NotFound,
    /// The single candidate exceeded the duration limit
    TooLong,
    LoadFailed(Severity),
}

/// What happened to an attached bundle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpansionReport {
    pub outcome: ConfirmationOutcome,
    /// Present only when the bundle was expanded
    pub insertion: Option<BulkInsertion>,
}

/// Machine-readable summary of one command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandReport {
    Help,
    Resumed { title: String },
    ResumeDenied,
    /// No local sound matched and remote queries are off
    SoundNotFound,
    /// The loading placeholder could not be sent
    Undeliverable,
    Queued {
        title: String,
        position: QueuePosition,
        /// None when no prompt was shown
        confirmation: Option<ExpansionReport>,
    },
    BundleQueued {
        name: Option<String>,
        insertion: BulkInsertion,
    },
    Failed(FailureKind),
}

impl CommandReport {
    /// Tracks this command put in the queue
    pub fn inserted(&self) -> usize {
        match self {
            CommandReport::Queued { confirmation, .. } => {
                1 + confirmation
                    .and_then(|c| c.insertion)
                    .map_or(0, |i| i.inserted)
            }
            CommandReport::BundleQueued { insertion, .. } => insertion.inserted,
            _ => 0,
        }
    }
}

/// The sound command, shared by every invocation
pub struct SoundCommand {
    settings: BotSettings,
    library: SoundLibrary,
    resolver: TrackResolver,
    reporter: Reporter,
    events: Arc<EventBus>,
    shutdown: CancellationToken,
}

impl SoundCommand {
    pub fn new(
        settings: BotSettings,
        library: SoundLibrary,
        backend: Arc<dyn ResolverBackend>,
        events: Arc<EventBus>,
    ) -> Self {
        let resolver = TrackResolver::new(backend, settings.search_prefix.clone());
        let reporter = Reporter::new(settings.emojis.clone(), settings.policy);
        Self {
            settings,
            library,
            resolver,
            reporter,
            events,
            shutdown: CancellationToken::new(),
        }
    }

    /// Open prompts are declined when `shutdown` is cancelled
    pub fn with_shutdown(mut self, shutdown: CancellationToken) -> Self {
        self.shutdown = shutdown;
        self
    }

    pub fn settings(&self) -> &BotSettings {
        &self.settings
    }

    /// Run the command on the runtime without blocking the caller
    pub fn spawn(self: &Arc<Self>, invocation: Invocation) -> JoinHandle<CommandReport> {
        let command = Arc::clone(self);
        tokio::spawn(async move { command.execute(invocation).await })
    }

    /// Run the command to completion
    pub async fn execute(&self, inv: Invocation) -> CommandReport {
        let args = inv.args.trim().to_string();
        info!(
            guild_id = inv.guild_id,
            requester = %inv.requester.name,
            args = %args,
            "Sound command"
        );

        if args.is_empty() {
            return self.handle_empty(&inv).await;
        }

        let identifier = match self.locate(&args).await {
            Some(path) => Identifier::local(args.as_str(), &path),
            None if self.settings.allow_remote_queries => Identifier::query(args.as_str()),
            None => {
                warn!(args = %args, folder = %self.library.folder().display(), "Failed to find sound");
                self.reply(&inv, &self.reporter.sound_not_found(&args)).await;
                return CommandReport::SoundNotFound;
            }
        };

        let message = match inv.transport.send(&self.reporter.loading(&args)).await {
            Ok(id) => id,
            Err(e) => {
                warn!(error = %e, "Could not send loading message");
                return CommandReport::Undeliverable;
            }
        };

        self.run_pipeline(&inv, &identifier, message).await
    }

    async fn handle_empty(&self, inv: &Invocation) -> CommandReport {
        if let Some(track) = inv.queue.paused_track().await {
            if !inv.requester.is_dj {
                self.reply(inv, &self.reporter.resume_denied()).await;
                return CommandReport::ResumeDenied;
            }
            if inv.queue.resume().await {
                self.reply(inv, &self.reporter.resumed(&track.title)).await;
                return CommandReport::Resumed { title: track.title };
            }
        }

        self.reply(inv, &self.reporter.help(&self.settings.prefix)).await;
        CommandReport::Help
    }

    /// Prefix lookup in the sounds folder (blocking filesystem walk)
    async fn locate(&self, name: &str) -> Option<PathBuf> {
        let library = self.library.clone();
        let name = name.to_string();
        match tokio::task::spawn_blocking(move || library.find(&name)).await {
            Ok(found) => found,
            Err(e) => {
                warn!(error = %e, "Sound lookup task failed");
                None
            }
        }
    }

    async fn run_pipeline(
        &self,
        inv: &Invocation,
        identifier: &Identifier,
        message: MessageId,
    ) -> CommandReport {
        let resolution = self.resolver.resolve(identifier).await;
        self.events.emit_lossy(SoundEvent::ResolutionFinished {
            guild_id: inv.guild_id,
            query: resolution.query.clone(),
            attempts: resolution.attempts,
            outcome: resolution.outcome.kind(),
            timestamp: Utc::now(),
        });

        let inserter = QueueInserter::new(inv.queue.clone(), self.settings.policy);

        match resolution.outcome {
            ResolutionOutcome::Single(track) => {
                self.load_single(inv, message, &inserter, track, None).await
            }
            ResolutionOutcome::Bundle(bundle) => match classify(bundle) {
                Dispatch::Single(track) => {
                    self.load_single(inv, message, &inserter, track, None).await
                }
                Dispatch::WithAttachment { primary, bundle } => {
                    self.load_single(inv, message, &inserter, primary, Some(bundle))
                        .await
                }
                Dispatch::Bulk(bundle) => self.load_bulk(inv, message, &inserter, bundle).await,
                Dispatch::Empty => {
                    self.fail(inv, message, Error::NotFound(resolution.query))
                        .await
                }
            },
            ResolutionOutcome::NoMatch => {
                self.fail(inv, message, Error::NotFound(resolution.query))
                    .await
            }
            ResolutionOutcome::Failed(failure) => {
                warn!(
                    query = %resolution.query,
                    severity = %failure.severity,
                    error = %failure.message,
                    "Load failed"
                );
                let err = Error::ResolutionFailure {
                    severity: failure.severity,
                    message: failure.message,
                };
                self.fail(inv, message, err).await
            }
        }
    }

    async fn load_single(
        &self,
        inv: &Invocation,
        message: MessageId,
        inserter: &QueueInserter,
        track: Track,
        attached: Option<TrackBundle>,
    ) -> CommandReport {
        let position = match inserter.insert_one(&track, &inv.requester).await {
            Ok(position) => position,
            Err(err) => {
                if let Error::DurationExceeded {
                    duration_ms,
                    max_duration_ms,
                    ..
                } = &err
                {
                    self.events.emit_lossy(SoundEvent::TrackRejected {
                        guild_id: inv.guild_id,
                        title: track.title.clone(),
                        duration_ms: *duration_ms,
                        max_duration_ms: *max_duration_ms,
                        timestamp: Utc::now(),
                    });
                }
                return self.fail(inv, message, err).await;
            }
        };

        self.events.emit_lossy(SoundEvent::TrackQueued {
            guild_id: inv.guild_id,
            requester_id: inv.requester.id,
            title: track.title.clone(),
            duration_ms: track.duration_ms,
            position: match position {
                QueuePosition::NowPlaying => None,
                QueuePosition::Queued(index) => Some(index),
            },
            timestamp: Utc::now(),
        });

        let added = self.reporter.added(&track, position);
        let confirmation = match attached {
            Some(bundle) if inv.transport.can_prompt() => Some(
                self.confirm(inv, message, inserter, &added, track.clone(), bundle)
                    .await,
            ),
            Some(_) => {
                debug!("Transport cannot prompt, attached bundle dropped");
                self.edit(inv, message, &added).await;
                None
            }
            None => {
                self.edit(inv, message, &added).await;
                None
            }
        };

        CommandReport::Queued {
            title: track.title,
            position,
            confirmation,
        }
    }

    async fn confirm(
        &self,
        inv: &Invocation,
        message: MessageId,
        inserter: &QueueInserter,
        added: &str,
        primary: Track,
        bundle: TrackBundle,
    ) -> ExpansionReport {
        let session = Arc::new(ConfirmationSession::new(primary, bundle).with_parent(&self.shutdown));
        self.events.emit_lossy(SoundEvent::ConfirmationOffered {
            guild_id: inv.guild_id,
            bundle_size: session.bundle().len(),
            timestamp: Utc::now(),
        });

        let prompt = self.reporter.prompt(added, session.bundle());
        let outcome = run_prompt(inv.transport.as_ref(), message, &prompt, session.clone()).await;
        info!(guild_id = inv.guild_id, outcome = %outcome, "Confirmation resolved");
        self.events.emit_lossy(SoundEvent::ConfirmationResolved {
            guild_id: inv.guild_id,
            outcome,
            timestamp: Utc::now(),
        });

        if !outcome.expands() {
            self.edit(inv, message, added).await;
            return ExpansionReport {
                outcome,
                insertion: None,
            };
        }

        let bundle = session.bundle();
        let insertion = inserter
            .insert_many(&bundle.tracks, &inv.requester, Some(session.excluded()))
            .await;
        self.emit_bundle_queued(inv, bundle.name.clone(), &insertion);
        self.edit(inv, message, &self.reporter.expanded(added, &insertion))
            .await;

        ExpansionReport {
            outcome,
            insertion: Some(insertion),
        }
    }

    async fn load_bulk(
        &self,
        inv: &Invocation,
        message: MessageId,
        inserter: &QueueInserter,
        bundle: TrackBundle,
    ) -> CommandReport {
        let insertion = inserter
            .insert_many(&bundle.tracks, &inv.requester, None)
            .await;
        self.emit_bundle_queued(inv, bundle.name.clone(), &insertion);
        self.edit(inv, message, &self.reporter.bulk(bundle.name.as_deref(), &insertion))
            .await;

        CommandReport::BundleQueued {
            name: bundle.name,
            insertion,
        }
    }

    fn emit_bundle_queued(&self, inv: &Invocation, name: Option<String>, insertion: &BulkInsertion) {
        self.events.emit_lossy(SoundEvent::BundleQueued {
            guild_id: inv.guild_id,
            name,
            total: insertion.total,
            inserted: insertion.inserted,
            too_long: insertion.too_long,
            excluded: insertion.excluded,
            timestamp: Utc::now(),
        });
    }

    async fn fail(&self, inv: &Invocation, message: MessageId, err: Error) -> CommandReport {
        debug!(error = %err, "Command produced no queue entry");
        self.edit(inv, message, &self.reporter.render_error(&err, inv.args.trim()))
            .await;

        let kind = match err {
            Error::NotFound(_) => FailureKind::NotFound,
            Error::DurationExceeded { .. } => FailureKind::TooLong,
            Error::ResolutionFailure { severity, .. } => FailureKind::LoadFailed(severity),
            _ => FailureKind::LoadFailed(Severity::Fault),
        };
        CommandReport::Failed(kind)
    }

    async fn edit(&self, inv: &Invocation, message: MessageId, text: &str) {
        if let Err(e) = inv.transport.edit(message, text).await {
            warn!(message = %message, error = %e, "Could not update status message");
        }
    }

    async fn reply(&self, inv: &Invocation, text: &str) {
        if let Err(e) = inv.transport.send(text).await {
            warn!(error = %e, "Could not send reply");
        }
    }
}

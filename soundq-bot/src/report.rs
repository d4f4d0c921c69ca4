//! Status line rendering
//!
//! Every line the command shows a user is built here and passed through
//! `filter` so track titles and arguments cannot ping the whole server.

use crate::error::Error;
use crate::policy::DurationPolicy;
use crate::queue::{BulkInsertion, QueuePosition};
use crate::resolver::{LoadFailure, Severity};
use crate::track::{SourceRef, Track, TrackBundle};
use soundq_common::config::EmojiConfig;
use soundq_common::human_time::{format_max_duration, format_track_time};

/// Defuse mass mentions and strip right-to-left overrides
pub fn filter(text: &str) -> String {
    text.replace('\u{202E}', "")
        .replace("@everyone", "@\u{0435}veryone")
        .replace("@here", "@h\u{0435}re")
        .trim()
        .to_string()
}

/// Builds status lines with the configured emoji prefixes
#[derive(Debug, Clone)]
pub struct Reporter {
    emojis: EmojiConfig,
    policy: DurationPolicy,
}

impl Reporter {
    pub fn new(emojis: EmojiConfig, policy: DurationPolicy) -> Self {
        Self { emojis, policy }
    }

    fn max_time(&self) -> String {
        format_max_duration(self.policy.max_duration_ms())
    }

    pub fn help(&self, prefix: &str) -> String {
        filter(&format!(
            "{} Sound Commands:\n\n`{}sound <song file name>` - plays a sound from the sounds folder",
            self.emojis.warning, prefix
        ))
    }

    pub fn loading(&self, args: &str) -> String {
        filter(&format!("{} Loading... `[{}]`", self.emojis.loading, args))
    }

    pub fn resumed(&self, title: &str) -> String {
        filter(&format!("{} Resumed **{}**.", self.emojis.success, title))
    }

    pub fn resume_denied(&self) -> String {
        format!("{} Only DJs can unpause the player!", self.emojis.error)
    }

    pub fn sound_not_found(&self, args: &str) -> String {
        filter(&format!(
            "{} Could not find sound {}, make sure it is added to the server's sounds folder",
            self.emojis.error, args
        ))
    }

    pub fn too_long(&self, track: &Track) -> String {
        filter(&format!(
            "{} This track (**{}**) is longer than the allowed maximum: `{}` > `{}`",
            self.emojis.warning,
            track.title,
            format_track_time(track.duration_ms),
            self.max_time()
        ))
    }

    pub fn added(&self, track: &Track, position: QueuePosition) -> String {
        let place = match position.display_position() {
            None => "to begin playing".to_string(),
            Some(pos) => format!("to the queue at position {}", pos),
        };
        filter(&format!(
            "{} Added **{}** (`{}`) {}",
            self.emojis.success,
            track.title,
            format_track_time(track.duration_ms),
            place
        ))
    }

    /// Added line plus the expand prompt
    pub fn prompt(&self, added: &str, bundle: &TrackBundle) -> String {
        filter(&format!(
            "{}\n{} This track has a playlist of **{}** tracks attached. Select 📥 to load playlist.",
            added,
            self.emojis.warning,
            bundle.len()
        ))
    }

    /// Added line plus the expansion result
    pub fn expanded(&self, added: &str, insertion: &BulkInsertion) -> String {
        let noun = if insertion.inserted == 1 { "track" } else { "tracks" };
        let mut text = format!(
            "{}\n{} Loaded **{}** additional {}!",
            added, self.emojis.success, insertion.inserted, noun
        );
        self.push_omitted_note(&mut text, insertion);
        filter(&text)
    }

    fn push_omitted_note(&self, text: &mut String, insertion: &BulkInsertion) {
        if insertion.too_long > 0 {
            text.push_str(&format!(
                "\n{} Tracks longer than the allowed maximum (`{}`) have been omitted.",
                self.emojis.warning,
                self.max_time()
            ));
        }
    }

    /// Result of queueing a bundle with no pre-selected track
    pub fn bulk(&self, name: Option<&str>, insertion: &BulkInsertion) -> String {
        if insertion.inserted == 0 {
            let label = name.map(|n| format!("(**{}**) ", n)).unwrap_or_default();
            return filter(&format!(
                "{} All entries in this playlist {}were longer than the allowed maximum (`{}`)",
                self.emojis.warning,
                label,
                self.max_time()
            ));
        }

        let label = match name {
            Some(n) => format!("playlist **{}**", n),
            None => "a playlist".to_string(),
        };
        let mut text = format!(
            "{} Found {} with `{}` entries; added `{}` to the queue!",
            self.emojis.success, label, insertion.total, insertion.inserted
        );
        self.push_omitted_note(&mut text, insertion);
        filter(&text)
    }

    pub fn no_match(&self, args: &str) -> String {
        filter(&format!("{} No results found for `{}`.", self.emojis.warning, args))
    }

    pub fn load_failed(&self, failure: &LoadFailure) -> String {
        match failure.severity {
            Severity::Common => filter(&format!(
                "{} Error loading: {}",
                self.emojis.error, failure.message
            )),
            _ => format!("{} Error loading track.", self.emojis.error),
        }
    }

    /// Status line for a pipeline error
    pub fn render_error(&self, error: &Error, args: &str) -> String {
        match error {
            Error::NotFound(_) => self.no_match(args),
            Error::ResolutionFailure { severity, message } => {
                self.load_failed(&LoadFailure::new(*severity, message.clone()))
            }
            Error::DurationExceeded {
                title, duration_ms, ..
            } => self.too_long(&Track::new(
                title.clone(),
                *duration_ms,
                SourceRef::new(""),
            )),
            _ => format!("{} Error loading track.", self.emojis.error),
        }
    }
}

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Events published to the consumer (status display, line view, definition panel)
#[derive(Debug, Clone)]
pub enum AppEvent {
    Connection(ConnectionState),
    Line(String),
    Definition {
        request_id: Uuid,
        event: ResolveEvent,
    },
}

/// Connection lifecycle of the line stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConnectionState {
    #[default]
    Idle,
    Connecting,
    Connected,
    Disconnected,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConnectionState::Idle => "idle",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Disconnected => "disconnected",
        };
        f.write_str(s)
    }
}

/// Emitted by the connection manager, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    State(ConnectionState),
    Line(String),
}

/// Result of a dictionary or remote lookup.
///
/// `valid == false` means the word was looked up and nothing was found.
/// A word that was never looked up has no `Entry` at all.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Entry {
    pub valid: bool,
    pub surface: String,
    pub reading: String,
    pub meaning: String,
    pub part_of_speech: String,
}

impl Entry {
    pub fn found(
        surface: impl Into<String>,
        reading: impl Into<String>,
        meaning: impl Into<String>,
        part_of_speech: impl Into<String>,
    ) -> Self {
        Self {
            valid: true,
            surface: surface.into(),
            reading: reading.into(),
            meaning: meaning.into(),
            part_of_speech: part_of_speech.into(),
        }
    }

    pub fn not_found() -> Self {
        Self::default()
    }

    /// Multi-line text for a definition panel
    pub fn display_text(&self) -> String {
        let mut text = self.surface.clone();
        if !self.reading.is_empty() {
            text.push_str(&format!(" [{}]", self.reading));
        }
        text.push_str(&format!("\nMeaning: {}", self.meaning));
        if !self.part_of_speech.is_empty() {
            text.push_str(&format!("\nType: {}", self.part_of_speech));
        }
        text
    }
}

/// Script-homogeneous substring of a line. `start` and `end` are char offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub text: String,
    pub start: usize,
    pub end: usize,
}

impl Candidate {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// The matched word of a resolution and the entry that validated it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    /// Key the entry was found under (the candidate, possibly particle-stripped)
    pub word: String,
    pub start: usize,
    pub entry: Entry,
}

impl Match {
    /// Length in chars
    pub fn len(&self) -> usize {
        self.word.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.word.is_empty()
    }
}

/// Publications of one resolution. Ends with exactly one `Final` or `NotFound`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveEvent {
    Interim(Match),
    Final(Match),
    NotFound,
}

/// A tap on `clicked_index` (char offset) of `full_text`
#[derive(Debug, Clone)]
pub struct ResolveRequest {
    pub id: Uuid,
    pub full_text: String,
    pub clicked_index: usize,
}

impl ResolveRequest {
    pub fn new(full_text: impl Into<String>, clicked_index: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            full_text: full_text.into(),
            clicked_index,
        }
    }
}

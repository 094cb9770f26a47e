use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Who produced a transcript line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    /// Session-level notices (connection events, mode changes)
    System,
    /// The AI interviewer
    Agent,
    /// The user
    Candidate,
}

/// One line of the interview transcript
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptEntry {
    /// Monotonically increasing sequence id, assigned locally on append
    pub seq: u64,

    /// Who said it
    pub speaker: Speaker,

    /// Plain text
    pub text: String,

    /// When the entry was appended
    pub timestamp: DateTime<Utc>,
}

/// Append-only, ordered transcript of an interview session.
///
/// Entries are never reordered or mutated after insertion; the sequence id
/// only ever increases.
#[derive(Debug, Default)]
pub struct TranscriptLog {
    entries: Vec<TranscriptEntry>,
    next_seq: u64,
    tail: Option<mpsc::UnboundedSender<TranscriptEntry>>,
}

impl TranscriptLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a line and return its sequence id.
    pub fn push(&mut self, speaker: Speaker, text: impl Into<String>) -> u64 {
        let entry = TranscriptEntry {
            seq: self.next_seq,
            speaker,
            text: text.into(),
            timestamp: Utc::now(),
        };
        self.next_seq += 1;

        if let Some(tail) = &self.tail {
            // A dropped listener is fine; the log is the source of truth
            let _ = tail.send(entry.clone());
        }

        self.entries.push(entry);
        self.next_seq - 1
    }

    /// Stream every future entry to the returned receiver.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<TranscriptEntry> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.tail = Some(tx);
        rx
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Clone the full transcript so far.
    pub fn snapshot(&self) -> Vec<TranscriptEntry> {
        self.entries.clone()
    }
}

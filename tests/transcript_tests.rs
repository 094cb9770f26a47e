// Unit tests for the append-only transcript log.

use coach_live::{Speaker, TranscriptLog};

#[test]
fn test_sequence_ids_increase_monotonically() {
    let mut log = TranscriptLog::new();

    assert_eq!(log.push(Speaker::System, "Voice session connected."), 0);
    assert_eq!(log.push(Speaker::Agent, "Tell me about yourself."), 1);
    assert_eq!(log.push(Speaker::Candidate, "Sure."), 2);
}

#[test]
fn test_entries_keep_insertion_order() {
    let mut log = TranscriptLog::new();

    log.push(Speaker::Agent, "first");
    log.push(Speaker::Candidate, "second");
    log.push(Speaker::Agent, "third");

    let texts: Vec<&str> = log.entries().iter().map(|e| e.text.as_str()).collect();
    assert_eq!(texts, vec!["first", "second", "third"]);

    let seqs: Vec<u64> = log.entries().iter().map(|e| e.seq).collect();
    assert_eq!(seqs, vec![0, 1, 2]);
}

#[test]
fn test_empty_log() {
    let log = TranscriptLog::new();

    assert!(log.is_empty());
    assert_eq!(log.len(), 0);
    assert!(log.snapshot().is_empty());
}

#[tokio::test]
async fn test_subscribe_streams_future_entries() {
    let mut log = TranscriptLog::new();
    let mut rx = log.subscribe();

    log.push(Speaker::System, "Session ended.");

    let entry = rx.recv().await.expect("entry should be streamed");
    assert_eq!(entry.seq, 0);
    assert_eq!(entry.speaker, Speaker::System);
    assert_eq!(entry.text, "Session ended.");
}

#[test]
fn test_push_survives_dropped_subscriber() {
    let mut log = TranscriptLog::new();
    drop(log.subscribe());

    log.push(Speaker::Agent, "still appended");
    assert_eq!(log.len(), 1);
}

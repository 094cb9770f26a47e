// Unit tests for the playback cursor and the frame scheduler.

use coach_live::audio::pcm::encode_i16le;
use coach_live::audio::playback::{AudioPlayer, NullSink, PlaybackScheduler, PlaybackSink};

#[test]
fn test_cursor_starts_at_zero() {
    let scheduler = PlaybackScheduler::new();
    assert_eq!(scheduler.next_start(), 0.0);
}

#[test]
fn test_gapless_scheduling_back_to_back() {
    let mut scheduler = PlaybackScheduler::new();

    // Clock has not advanced; chunks stack back to back.
    assert_eq!(scheduler.schedule(0.0, 0.5), 0.0);
    assert_eq!(scheduler.schedule(0.0, 0.25), 0.5);
    assert_eq!(scheduler.schedule(0.0, 0.25), 0.75);
    assert_eq!(scheduler.next_start(), 1.0);
}

#[test]
fn test_cursor_is_monotonically_non_decreasing() {
    let mut scheduler = PlaybackScheduler::new();
    let clocks = [0.0, 0.1, 0.05, 0.3, 0.3, 1.2, 0.9];

    let mut previous = scheduler.next_start();
    for now in clocks {
        scheduler.schedule(now, 0.1);
        assert!(
            scheduler.next_start() >= previous,
            "cursor went backwards at clock {}",
            now
        );
        previous = scheduler.next_start();
    }
}

#[test]
fn test_underrun_resets_cursor_to_now() {
    let mut scheduler = PlaybackScheduler::new();

    // First chunk plays at 0.0 for 0.2s.
    scheduler.schedule(0.0, 0.2);

    // Next frame arrives late: clock is already past the cursor.
    let start = scheduler.schedule(1.0, 0.2);
    assert_eq!(start, 1.0, "late frame starts at the clock, not earlier");
    assert_eq!(scheduler.next_start(), 1.2);
}

#[test]
fn test_never_schedules_in_the_past() {
    let mut scheduler = PlaybackScheduler::new();

    for i in 0..50 {
        // Clock jumps around, sometimes far ahead of the cursor.
        let now = (i as f64 * 0.37) % 3.0;
        let start = scheduler.schedule(now, 0.05);
        assert!(start >= now, "scheduled {} before clock {}", start, now);
    }
}

#[test]
fn test_player_schedules_decoded_frames_in_order() {
    let mut player = AudioPlayer::new(Box::new(NullSink::new(24000)), 24000);

    // Two frames of 2400 samples each: 100ms at 24 kHz.
    let frame = encode_i16le(&vec![0.1f32; 2400]);
    player.play_frame(&frame);
    assert!((player.cursor_secs() - 0.1).abs() < 1e-9);

    player.play_frame(&frame);
    assert!((player.cursor_secs() - 0.2).abs() < 1e-9);
}

#[test]
fn test_player_ignores_empty_frames() {
    let mut player = AudioPlayer::new(Box::new(NullSink::new(24000)), 24000);

    player.play_frame(&[]);
    assert_eq!(player.cursor_secs(), 0.0);
}

#[test]
fn test_null_sink_accounts_written_audio() {
    let mut sink = NullSink::new(24000);

    sink.write(&vec![0.0; 12000]);
    assert!((sink.buffered_secs() - 0.5).abs() < 1e-9);

    sink.write_silence(0.25);
    assert!((sink.buffered_secs() - 0.75).abs() < 1e-9);
}

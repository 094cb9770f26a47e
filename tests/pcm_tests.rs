// Unit tests for PCM encoding, decoding, and sample-rate conversion.

use coach_live::audio::pcm::{decode_i16le, encode_i16le, mix_to_mono, resample_linear};

fn encode_one(sample: f32) -> i16 {
    let bytes = encode_i16le(&[sample]);
    i16::from_le_bytes([bytes[0], bytes[1]])
}

#[test]
fn test_encode_edge_values() {
    assert_eq!(encode_one(0.0), 0);
    assert_eq!(encode_one(1.0), 32767);
    assert_eq!(encode_one(-1.0), -32768);
}

#[test]
fn test_encode_clamps_out_of_range() {
    assert_eq!(encode_one(2.5), 32767);
    assert_eq!(encode_one(-3.0), -32768);
}

#[test]
fn test_encode_rounds_to_nearest() {
    // 0.7 * 32767 = 22936.9; truncation would lose a full step.
    assert_eq!(encode_one(0.7), 22937);
    assert_eq!(encode_one(-0.7), -22938); // -0.7 * 32768 = -22937.6
}

#[test]
fn test_encode_is_little_endian() {
    let bytes = encode_i16le(&[1.0]);
    assert_eq!(bytes, vec![0xFF, 0x7F]);
}

#[test]
fn test_decode_edge_values() {
    let decoded = decode_i16le(&encode_i16le(&[0.0, 1.0, -1.0]));

    assert_eq!(decoded[0], 0.0);
    // 1.0 encodes to 32767 and decodes to 32767/32768: exactly one step off.
    assert!(
        (decoded[1] - 1.0).abs() <= 1.0 / 32768.0,
        "1.0 recovered within quantization error"
    );
    assert_eq!(decoded[2], -1.0);
}

#[test]
fn test_round_trip_within_quantization_error() {
    let samples = [0.25f32, -0.5, 0.9, -0.99, 0.0001];
    let decoded = decode_i16le(&encode_i16le(&samples));

    assert_eq!(decoded.len(), samples.len());
    // The encode scale is 32767 while decode divides by 32768, so recovery
    // carries the scale mismatch on top of rounding: just under two steps
    // in the worst case.
    for (original, recovered) in samples.iter().zip(&decoded) {
        assert!(
            (original - recovered).abs() < 2.0 / 32768.0,
            "sample {} decoded to {}",
            original,
            recovered
        );
    }
}

#[test]
fn test_decode_drops_trailing_odd_byte() {
    let decoded = decode_i16le(&[0x00, 0x00, 0x7F]);
    assert_eq!(decoded.len(), 1);
}

#[test]
fn test_decode_empty_frame() {
    assert!(decode_i16le(&[]).is_empty());
}

#[test]
fn test_mix_to_mono_averages_channels() {
    let stereo = [0.5f32, -0.5, 1.0, 0.0];
    let mono = mix_to_mono(&stereo, 2);

    assert_eq!(mono, vec![0.0, 0.5]);
}

#[test]
fn test_mix_to_mono_passes_through_mono() {
    let samples = [0.1f32, 0.2, 0.3];
    assert_eq!(mix_to_mono(&samples, 1), samples.to_vec());
}

#[test]
fn test_resample_halves_length_for_double_rate() {
    let samples: Vec<f32> = (0..100).map(|i| i as f32 / 100.0).collect();
    let resampled = resample_linear(&samples, 32000, 16000);

    assert_eq!(resampled.len(), 50);
}

#[test]
fn test_resample_same_rate_is_identity() {
    let samples = [0.1f32, 0.5, -0.2];
    assert_eq!(resample_linear(&samples, 16000, 16000), samples.to_vec());
}

#[test]
fn test_resample_preserves_constant_signal() {
    let samples = vec![0.5f32; 480];
    let resampled = resample_linear(&samples, 48000, 16000);

    assert_eq!(resampled.len(), 160);
    for sample in resampled {
        assert!((sample - 0.5).abs() < 1e-6);
    }
}

use tracing::warn;

/// Encode normalized f32 samples as signed 16-bit little-endian PCM.
///
/// Each sample is clamped to [-1, 1] before scaling. Negative samples scale
/// by 32768 and non-negative samples by 32767 so that both -1.0 and 1.0 map
/// onto the exact ends of the i16 range. Scaled values round to the nearest
/// integer rather than truncating toward zero.
pub fn encode_i16le(samples: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(samples.len() * 2);
    for &sample in samples {
        let clamped = sample.clamp(-1.0, 1.0);
        let value = if clamped < 0.0 {
            (clamped * 32768.0).round() as i16
        } else {
            (clamped * 32767.0).round() as i16
        };
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

/// Decode signed 16-bit little-endian PCM into normalized f32 samples.
///
/// A trailing odd byte cannot form a sample and is dropped.
pub fn decode_i16le(bytes: &[u8]) -> Vec<f32> {
    if bytes.len() % 2 != 0 {
        warn!("PCM frame has odd length ({} bytes), dropping last byte", bytes.len());
    }

    bytes
        .chunks_exact(2)
        .map(|pair| {
            let value = i16::from_le_bytes([pair[0], pair[1]]);
            value as f32 / 32768.0
        })
        .collect()
}

/// Mix interleaved multi-channel samples down to mono by averaging.
pub fn mix_to_mono(samples: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return samples.to_vec();
    }

    samples
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

/// Resample mono audio between rates using linear interpolation.
pub fn resample_linear(samples: &[f32], source_rate: u32, target_rate: u32) -> Vec<f32> {
    if source_rate == target_rate || samples.is_empty() {
        return samples.to_vec();
    }

    let ratio = source_rate as f64 / target_rate as f64;
    let output_len = (samples.len() as f64 / ratio).floor() as usize;
    let mut output = Vec::with_capacity(output_len);

    for i in 0..output_len {
        let position = i as f64 * ratio;
        let index = position as usize;
        let frac = (position - index as f64) as f32;

        let current = samples[index];
        let next = if index + 1 < samples.len() {
            samples[index + 1]
        } else {
            current
        };

        output.push(current + (next - current) * frac);
    }

    output
}

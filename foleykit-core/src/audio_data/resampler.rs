//! Single-channel resampling on top of rubato.
//!
//! Clips are stored per channel, so resampling works on one plane at a time;
//! [`crate::audio_data::FoleyAudioData::resample`] handles the interleaving.

use rubato::{FftFixedIn, Resampler};

use crate::error::{FoleyError, Result};

const CHUNK_SIZE: usize = 1024;
const SUB_CHUNKS: usize = 2;

/// Resamples one channel of audio from `source_rate` to `target_rate`.
///
/// Full chunks go through the regular process path; the tail is handed over
/// as a partial chunk and the resampler is drained afterwards, so the output
/// length stays close to `len * target / source` without a padded-silence
/// tail.
pub(crate) fn resample_channel(
    samples: &[f32],
    source_rate: u32,
    target_rate: u32,
) -> Result<Vec<f32>> {
    if source_rate == 0 || target_rate == 0 {
        return Err(FoleyError::AudioFormat(
            "Sample rates must be greater than 0".to_string(),
        ));
    }

    if source_rate == target_rate {
        return Ok(samples.to_vec());
    }

    let mut resampler = FftFixedIn::<f32>::new(
        source_rate as usize,
        target_rate as usize,
        CHUNK_SIZE,
        SUB_CHUNKS,
        1, // single channel
    )
    .map_err(|e| FoleyError::Decode(format!("Failed to create resampler: {}", e)))?;

    let mut output = Vec::with_capacity(
        (samples.len() as f64 * target_rate as f64 / source_rate as f64) as usize + CHUNK_SIZE,
    );

    let mut chunks = samples.chunks_exact(CHUNK_SIZE);
    for chunk in &mut chunks {
        let waves_in = [chunk];
        let waves_out = resampler
            .process(&waves_in, None)
            .map_err(|e| FoleyError::Decode(format!("Resampling error: {}", e)))?;
        if let Some(channel) = waves_out.first() {
            output.extend_from_slice(channel);
        }
    }

    let tail = chunks.remainder();
    if !tail.is_empty() {
        let waves_in = [tail];
        let waves_out = resampler
            .process_partial(Some(&waves_in), None)
            .map_err(|e| FoleyError::Decode(format!("Resampling error: {}", e)))?;
        if let Some(channel) = waves_out.first() {
            output.extend_from_slice(channel);
        }
    }

    // Flush whatever the resampler still buffers internally.
    let waves_out = resampler
        .process_partial::<&[f32]>(None, None)
        .map_err(|e| FoleyError::Decode(format!("Resampling error: {}", e)))?;
    if let Some(channel) = waves_out.first() {
        output.extend_from_slice(channel);
    }

    Ok(output)
}

//! Decoding of audio files and in-memory WAVE data via symphonia.

use std::fs::File;
use std::io::Cursor;
use std::path::Path;
use std::time::Duration;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::{MediaSource, MediaSourceStream};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::default::{get_codecs, get_probe};

use super::FoleyAudioData;
use crate::error::{FoleyError, Result};

/// Loads an audio file from disk, decoding it to interleaved f32 samples.
///
/// The container format is probed from the file contents with the extension
/// as a hint, so anything symphonia's default registry understands works.
pub fn load_audio_file(path: impl AsRef<Path>) -> Result<FoleyAudioData> {
    let path = path.as_ref();
    let file = File::open(path)?;

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    decode(Box::new(file), hint)
}

/// Decodes a WAVE file held in memory, the inverse of
/// [`FoleyAudioData::to_wav_bytes`].
pub fn decode_wav_bytes(bytes: Vec<u8>) -> Result<FoleyAudioData> {
    let mut hint = Hint::new();
    hint.with_extension("wav");
    decode(Box::new(Cursor::new(bytes)), hint)
}

fn decode(source: Box<dyn MediaSource>, hint: Hint) -> Result<FoleyAudioData> {
    let mss = MediaSourceStream::new(source, Default::default());

    let probed = get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| FoleyError::Decode(format!("Failed to probe audio format: {:?}", e)))?;

    let mut format = probed.format;

    let track = format
        .default_track()
        .ok_or_else(|| FoleyError::Decode("No default audio track found".to_string()))?;

    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| FoleyError::Decode("Sample rate not found".to_string()))?;

    let channels = track
        .codec_params
        .channels
        .ok_or_else(|| FoleyError::Decode("Channel count not found".to_string()))?
        .count() as u16;

    let mut decoder = get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| FoleyError::Decode(format!("Failed to create decoder: {:?}", e)))?;

    let mut samples: Vec<f32> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(Error::IoError(_)) => break, // end-of-stream
            Err(e) => {
                return Err(FoleyError::Decode(format!("Error reading packet: {:?}", e)));
            }
        };

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(Error::IoError(_)) => break, // also EOF in some formats
            Err(Error::DecodeError(_)) => continue, // recoverable corruption
            Err(e) => {
                return Err(FoleyError::Decode(format!("Error decoding packet: {:?}", e)));
            }
        };

        // Convert whatever the codec produced into f32.
        let spec = *decoded.spec();
        let capacity = decoded.capacity();
        let mut buf = SampleBuffer::<f32>::new(capacity as u64, spec);
        buf.copy_interleaved_ref(decoded);
        samples.extend_from_slice(buf.samples());
    }

    let duration =
        Duration::from_secs_f64(samples.len() as f64 / (sample_rate * channels as u32) as f64);

    Ok(FoleyAudioData::new(samples, sample_rate, channels, duration))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wav;

    fn ramp(len: usize) -> Vec<f32> {
        (0..len).map(|i| (i as f32 / len as f32) - 0.5).collect()
    }

    #[test]
    fn decodes_encoded_wav_bytes() {
        let samples = ramp(2000);
        let bytes = wav::encode_wav_to_vec(&samples, 44100);

        let decoded = decode_wav_bytes(bytes).unwrap();
        assert_eq!(decoded.sample_rate(), 44100);
        assert_eq!(decoded.channels(), 1);
        assert_eq!(decoded.total_frames(), 2000);

        // 16-bit quantization bounds the round-trip error.
        for (original, restored) in samples.iter().zip(decoded.samples()) {
            assert!((original - restored).abs() < 1e-3);
        }
    }

    #[test]
    fn garbage_bytes_fail_to_probe() {
        let result = decode_wav_bytes(vec![0xDE, 0xAD, 0xBE, 0xEF]);
        assert!(result.is_err());
    }

    #[test]
    fn loads_wav_from_disk() {
        let samples = ramp(500);
        let bytes = wav::encode_wav_to_vec(&samples, 22050);

        let path = std::env::temp_dir().join(format!("foleykit-loader-{}.wav", std::process::id()));
        std::fs::write(&path, &bytes).unwrap();

        let loaded = load_audio_file(&path);
        std::fs::remove_file(&path).unwrap();

        let loaded = loaded.unwrap();
        assert_eq!(loaded.sample_rate(), 22050);
        assert_eq!(loaded.total_frames(), 500);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = load_audio_file("/nonexistent/foleykit-no-such-file.wav");
        assert!(matches!(result, Err(FoleyError::Io(_))));
    }
}

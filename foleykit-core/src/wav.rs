//! Minimal RIFF/WAVE encoding for rendered effects.
//!
//! Only the layout this crate emits is supported: a 44-byte canonical header
//! (PCM format tag, no extension chunks) followed by one `data` chunk of
//! 16-bit little-endian samples.

use std::io::Write;

use crate::error::Result;

/// PCM format descriptor written into the `fmt ` chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavFormat {
    pub channels: u16,
    pub sample_rate: u32,
    pub bits_per_sample: u16,
}

impl WavFormat {
    /// Mono 16-bit format at the given rate, the layout every rendered
    /// effect uses.
    pub fn mono16(sample_rate: u32) -> Self {
        Self {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
        }
    }

    pub fn block_align(&self) -> u16 {
        self.channels * (self.bits_per_sample / 8)
    }

    pub fn byte_rate(&self) -> u32 {
        self.sample_rate * self.block_align() as u32
    }
}

/// Quantizes float samples to 16-bit PCM bytes.
///
/// Values are clamped to [-1.0, 1.0] here and nowhere earlier, so generator
/// output keeps its full dynamic range until the final encoding step. The
/// positive scale factor means -1.0 maps to -32767, never i16::MIN.
pub fn samples_to_pcm16(samples: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(samples.len() * 2);
    for &sample in samples {
        let clamped = sample.clamp(-1.0, 1.0);
        let quantized = (clamped * 32767.0).round() as i16;
        bytes.extend_from_slice(&quantized.to_le_bytes());
    }
    bytes
}

/// Writes a complete WAVE file: 44-byte header followed by `pcm_data`.
pub fn write_wav<W: Write>(writer: &mut W, format: &WavFormat, pcm_data: &[u8]) -> Result<()> {
    let data_size = pcm_data.len() as u32;

    // RIFF chunk descriptor. The size field counts everything after itself.
    writer.write_all(b"RIFF")?;
    writer.write_all(&(36 + data_size).to_le_bytes())?;
    writer.write_all(b"WAVE")?;

    // fmt subchunk, 16 bytes of PCM description.
    writer.write_all(b"fmt ")?;
    writer.write_all(&16u32.to_le_bytes())?;
    writer.write_all(&1u16.to_le_bytes())?; // PCM, no compression
    writer.write_all(&format.channels.to_le_bytes())?;
    writer.write_all(&format.sample_rate.to_le_bytes())?;
    writer.write_all(&format.byte_rate().to_le_bytes())?;
    writer.write_all(&format.block_align().to_le_bytes())?;
    writer.write_all(&format.bits_per_sample.to_le_bytes())?;

    // data subchunk.
    writer.write_all(b"data")?;
    writer.write_all(&data_size.to_le_bytes())?;
    writer.write_all(pcm_data)?;

    Ok(())
}

/// Encodes mono float samples straight to an in-memory WAVE file.
pub fn encode_wav_to_vec(samples: &[f32], sample_rate: u32) -> Vec<u8> {
    let format = WavFormat::mono16(sample_rate);
    let pcm = samples_to_pcm16(samples);
    let mut out = Vec::with_capacity(44 + pcm.len());
    // Writing into a Vec cannot fail.
    write_wav(&mut out, &format, &pcm).expect("vec write");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn u16_at(bytes: &[u8], offset: usize) -> u16 {
        u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
    }

    fn u32_at(bytes: &[u8], offset: usize) -> u32 {
        u32::from_le_bytes([
            bytes[offset],
            bytes[offset + 1],
            bytes[offset + 2],
            bytes[offset + 3],
        ])
    }

    fn i16_at(bytes: &[u8], offset: usize) -> i16 {
        i16::from_le_bytes([bytes[offset], bytes[offset + 1]])
    }

    #[test]
    fn header_layout_is_canonical() {
        let samples = vec![0.0f32; 100];
        let bytes = encode_wav_to_vec(&samples, 44100);

        assert_eq!(bytes.len(), 44 + 200);
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(u32_at(&bytes, 4), 36 + 200);
        assert_eq!(&bytes[8..12], b"WAVE");
        assert_eq!(&bytes[12..16], b"fmt ");
        assert_eq!(u32_at(&bytes, 16), 16);
        assert_eq!(u16_at(&bytes, 20), 1); // PCM
        assert_eq!(u16_at(&bytes, 22), 1); // mono
        assert_eq!(u32_at(&bytes, 24), 44100);
        assert_eq!(u32_at(&bytes, 28), 88200); // byte rate
        assert_eq!(u16_at(&bytes, 32), 2); // block align
        assert_eq!(u16_at(&bytes, 34), 16); // bits per sample
        assert_eq!(&bytes[36..40], b"data");
        assert_eq!(u32_at(&bytes, 40), 200);
    }

    #[test]
    fn quantization_is_symmetric_and_exact() {
        let pcm = samples_to_pcm16(&[0.0, 1.0, -1.0, 0.5]);
        assert_eq!(i16_at(&pcm, 0), 0);
        assert_eq!(i16_at(&pcm, 2), 32767);
        assert_eq!(i16_at(&pcm, 4), -32767);
        assert_eq!(i16_at(&pcm, 6), 16384); // 0.5 * 32767 = 16383.5, rounds up
    }

    #[test]
    fn out_of_range_samples_are_clamped() {
        let pcm = samples_to_pcm16(&[2.0, -2.0, 1.0001, -1.0001]);
        for i in 0..4 {
            let value = i16_at(&pcm, i * 2);
            assert!(value == 32767 || value == -32767);
            assert_ne!(value, i16::MIN);
        }
        assert_eq!(i16_at(&pcm, 0), 32767);
        assert_eq!(i16_at(&pcm, 2), -32767);
    }

    #[test]
    fn data_size_tracks_sample_count() {
        for count in [0usize, 1, 7, 441] {
            let samples = vec![0.25f32; count];
            let bytes = encode_wav_to_vec(&samples, 22050);
            assert_eq!(bytes.len(), 44 + count * 2);
            assert_eq!(u32_at(&bytes, 40), (count * 2) as u32);
        }
    }
}

//! Configuration for foleykit

use crate::error::{FoleyError, Result};

/// Description of the audio world: the sample rate and output shape shared by
/// the synthesizer, the clip registry, and the output stream.
#[derive(Debug, Clone)]
pub struct FoleyWorldDesc {
    /// Sample rate in Hz that clips are rendered and played at.
    pub sample_rate: u32,
    /// Requested output buffer size in frames.
    pub block_size: usize,
    /// Number of output channels. Clips are mono and fan out to every channel.
    pub channels: u16,
}

impl Default for FoleyWorldDesc {
    fn default() -> Self {
        Self {
            sample_rate: 48000,
            block_size: 512,
            channels: 2,
        }
    }
}

impl FoleyWorldDesc {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sample_rate(mut self, rate: u32) -> Self {
        self.sample_rate = rate;
        self
    }

    pub fn block_size(mut self, size: usize) -> Self {
        self.block_size = size;
        self
    }

    pub fn channels(mut self, channels: u16) -> Self {
        self.channels = channels;
        self
    }

    /// Checks that the description can actually drive a stream.
    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(FoleyError::Configuration(
                "sample rate must be positive".to_string(),
            ));
        }
        if self.block_size == 0 {
            return Err(FoleyError::Configuration(
                "block size must be positive".to_string(),
            ));
        }
        if self.channels == 0 {
            return Err(FoleyError::Configuration(
                "channel count must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_desc_is_valid() {
        let desc = FoleyWorldDesc::default();
        assert_eq!(desc.sample_rate, 48000);
        assert_eq!(desc.block_size, 512);
        assert_eq!(desc.channels, 2);
        assert!(desc.validate().is_ok());
    }

    #[test]
    fn builder_overrides_fields() {
        let desc = FoleyWorldDesc::new()
            .sample_rate(44100)
            .block_size(1024)
            .channels(1);
        assert_eq!(desc.sample_rate, 44100);
        assert_eq!(desc.block_size, 1024);
        assert_eq!(desc.channels, 1);
    }

    #[test]
    fn zero_fields_fail_validation() {
        assert!(FoleyWorldDesc::new().sample_rate(0).validate().is_err());
        assert!(FoleyWorldDesc::new().block_size(0).validate().is_err());
        assert!(FoleyWorldDesc::new().channels(0).validate().is_err());
    }
}

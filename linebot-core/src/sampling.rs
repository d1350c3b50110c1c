//! Analog sampling pipeline
//!
//! Tracks which converter channel is sampled next. Two configurations
//! exist: free-running on one fixed channel (trim-pot), and round-robin
//! over the four line sensors. Each completed conversion is reported
//! back together with the request that started it; completions that
//! belong to a configuration that has since been replaced are dropped.

/// Number of line sensor channels
pub const LINE_CHANNELS: u8 = 4;

/// Sampling configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SamplingMode {
    /// No conversions requested
    Idle,
    /// Continuously resample one channel
    FreeRunning { channel: u8 },
    /// Visit channels 0..4 in turn, one per conversion
    RoundRobin,
}

/// A conversion the hardware should perform next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConversionRequest {
    /// Converter channel to sample
    pub channel: u8,
    /// Configuration generation the request belongs to
    pub epoch: u16,
}

/// A completed conversion accepted by the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Sample {
    /// Channel that produced the value
    pub channel: u8,
    /// Raw 8-bit magnitude
    pub value: u8,
}

/// Reduce a converter result to the 8-bit magnitude used by the algorithms
///
/// Keeps the most significant bits, like reading the high byte of a
/// left-adjusted result.
pub fn to_8bit(raw: u16, resolution_bits: u8) -> u8 {
    if resolution_bits <= 8 {
        (raw << (8 - resolution_bits)) as u8
    } else {
        (raw >> (resolution_bits - 8)).min(u8::MAX as u16) as u8
    }
}

/// Channel selector state
#[derive(Debug, Clone)]
pub struct Sampler {
    mode: SamplingMode,
    channel: u8,
    epoch: u16,
}

impl Default for Sampler {
    fn default() -> Self {
        Self::new()
    }
}

impl Sampler {
    /// Start idle; nothing is converted until a mode configures sampling
    pub const fn new() -> Self {
        Self {
            mode: SamplingMode::Idle,
            channel: 0,
            epoch: 0,
        }
    }

    /// Current configuration
    pub fn mode(&self) -> SamplingMode {
        self.mode
    }

    /// Channel the next conversion will use
    pub fn channel(&self) -> u8 {
        self.channel
    }

    /// Replace the configuration and restart the sequence
    pub fn configure(&mut self, mode: SamplingMode) {
        self.mode = mode;
        self.channel = match mode {
            SamplingMode::FreeRunning { channel } => channel,
            SamplingMode::RoundRobin | SamplingMode::Idle => 0,
        };
        self.epoch = self.epoch.wrapping_add(1);
    }

    /// Next conversion to start, if sampling is enabled
    pub fn request(&self) -> Option<ConversionRequest> {
        match self.mode {
            SamplingMode::Idle => None,
            SamplingMode::FreeRunning { .. } | SamplingMode::RoundRobin => {
                Some(ConversionRequest {
                    channel: self.channel,
                    epoch: self.epoch,
                })
            }
        }
    }

    /// Accept a completed conversion
    ///
    /// Returns the sample if it belongs to the current configuration. In
    /// round-robin mode the selector then moves to the next channel.
    pub fn complete(&mut self, request: ConversionRequest, value: u8) -> Option<Sample> {
        if request.epoch != self.epoch || self.mode == SamplingMode::Idle {
            return None;
        }

        let sample = Sample {
            channel: request.channel,
            value,
        };

        if self.mode == SamplingMode::RoundRobin {
            self.channel = (self.channel + 1) % LINE_CHANNELS;
        }

        Some(sample)
    }
}

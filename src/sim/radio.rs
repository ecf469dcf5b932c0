//! Simulated MAC and channel monitor.

use rand::rngs::SmallRng;
use rand::Rng;

use wpan_config::CfgRadioInfo;
use wpan_core::ChannelMask;

use crate::entities::{ChannelMonitor, MacLayer};

pub struct SimMac {
    pan_channel: u8,
    supported: ChannelMask,
    cca_failure_rate: u16,
}

impl SimMac {
    pub fn new(cfg: &CfgRadioInfo) -> Self {
        Self {
            pan_channel: cfg.pan_channel,
            supported: cfg.supported_channels,
            cca_failure_rate: cfg.cca_failure_rate,
        }
    }

    /// Apply an activated pending dataset: the whole PAN moves here.
    pub fn set_pan_channel(&mut self, channel: u8) {
        tracing::info!(
            "SimMac: PAN moved from channel {} to channel {}",
            self.pan_channel,
            channel
        );
        self.pan_channel = channel;
    }
}

impl MacLayer for SimMac {
    fn pan_channel(&self) -> u8 {
        self.pan_channel
    }

    fn supported_channel_mask(&self) -> ChannelMask {
        self.supported
    }

    fn cca_failure_rate(&self) -> u16 {
        self.cca_failure_rate
    }
}

/// Channel monitor over a synthetic interference profile: each supported
/// channel gets a fixed occupancy drawn at startup, and the sample counter
/// advances once per tick.
pub struct SimChannelMonitor {
    /// Occupancy per channel, indexed by channel - 11.
    occupancy: [u16; 16],
    samples: u32,
}

impl SimChannelMonitor {
    pub fn new(rng: &mut SmallRng) -> Self {
        let mut occupancy = [0u16; 16];
        for slot in occupancy.iter_mut() {
            *slot = rng.gen();
        }

        let monitor = Self {
            occupancy,
            samples: 0,
        };

        for ch in ChannelMask::all().iter() {
            tracing::debug!(
                "SimChannelMonitor: channel {} occupancy 0x{:04x}",
                ch,
                monitor.channel_occupancy(ch)
            );
        }

        monitor
    }

    /// Monitor over a fixed occupancy profile, indexed by channel - 11.
    pub fn with_profile(occupancy: [u16; 16]) -> Self {
        Self {
            occupancy,
            samples: 0,
        }
    }

    /// One monitor sampling round.
    pub fn tick(&mut self) {
        self.samples = self.samples.saturating_add(1);
    }
}

impl ChannelMonitor for SimChannelMonitor {
    fn sample_count(&self) -> u32 {
        self.samples
    }

    fn channel_occupancy(&self, channel: u8) -> u16 {
        self.occupancy[usize::from(channel - 11)]
    }

    fn find_best_channels(&self, mask: ChannelMask) -> (ChannelMask, u16) {
        let mut best = ChannelMask::new();
        let mut best_occupancy = 0xffff;

        for ch in mask.iter() {
            let occupancy = self.channel_occupancy(ch);
            if occupancy < best_occupancy {
                best = ChannelMask::new();
                best.add(ch);
                best_occupancy = occupancy;
            } else if occupancy == best_occupancy {
                best.add(ch);
            }
        }

        (best, best_occupancy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_find_best_channels_tie_set() {
        let mut rng = SmallRng::seed_from_u64(3);
        let mut monitor = SimChannelMonitor::new(&mut rng);
        monitor.occupancy = [0x3000; 16];
        monitor.occupancy[1] = 0x1000; // channel 12
        monitor.occupancy[4] = 0x1000; // channel 15

        let (best, occupancy) = monitor.find_best_channels(ChannelMask::all());
        assert_eq!(best, ChannelMask::from_channels(&[12, 15]).unwrap());
        assert_eq!(occupancy, 0x1000);

        let masked = ChannelMask::from_channels(&[13, 14]).unwrap();
        let (best, occupancy) = monitor.find_best_channels(masked);
        assert_eq!(best, masked);
        assert_eq!(occupancy, 0x3000);

        let (best, occupancy) = monitor.find_best_channels(ChannelMask::new());
        assert!(best.is_empty());
        assert_eq!(occupancy, 0xffff);
    }
}

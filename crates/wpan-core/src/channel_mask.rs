use std::fmt;

use rand::Rng;
use serde::Deserialize;

/// First channel number of the 2.4 GHz O-QPSK PHY (IEEE 802.15.4-2015, clause 10.1.2).
pub const MIN_CHANNEL: u8 = 11;
/// Last channel number of the 2.4 GHz O-QPSK PHY.
pub const MAX_CHANNEL: u8 = 26;

/// Bitmap covering all sixteen 2.4 GHz channels (11-26).
const MASK_ALL_2P4GHZ: u32 = 0x07ff_f800;

/// A set of 802.15.4 channel numbers, stored as a 32-bit bitmap indexed by
/// channel number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "Vec<u8>")]
pub struct ChannelMask(u32);

impl ChannelMask {
    /// The empty mask.
    pub const fn new() -> Self {
        Self(0)
    }

    /// All channels of the 2.4 GHz PHY.
    pub const fn all() -> Self {
        Self(MASK_ALL_2P4GHZ)
    }

    /// Build a mask from a raw bitmap. Bits outside channels 11-26 are discarded.
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits & MASK_ALL_2P4GHZ)
    }

    /// Build a mask from a list of channel numbers.
    pub fn from_channels(channels: &[u8]) -> Result<Self, String> {
        let mut mask = Self::new();
        for &ch in channels {
            if !(MIN_CHANNEL..=MAX_CHANNEL).contains(&ch) {
                return Err(format!(
                    "Channel {} outside valid range {}-{}",
                    ch, MIN_CHANNEL, MAX_CHANNEL
                ));
            }
            mask.add(ch);
        }
        Ok(mask)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Number of channels in the mask.
    pub const fn len(self) -> u32 {
        self.0.count_ones()
    }

    pub const fn contains(self, channel: u8) -> bool {
        channel >= MIN_CHANNEL && channel <= MAX_CHANNEL && (self.0 >> channel) & 1 == 1
    }

    pub fn add(&mut self, channel: u8) {
        assert!(
            (MIN_CHANNEL..=MAX_CHANNEL).contains(&channel),
            "Channel {} outside valid range",
            channel
        );
        self.0 |= 1 << channel;
    }

    /// Set intersection.
    pub const fn intersection(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    /// Iterate members in ascending channel order.
    pub fn iter(self) -> impl Iterator<Item = u8> {
        (MIN_CHANNEL..=MAX_CHANNEL).filter(move |&ch| self.contains(ch))
    }

    /// Pick one member uniformly at random, or `None` if the mask is empty.
    pub fn choose_random<R: Rng>(self, rng: &mut R) -> Option<u8> {
        if self.is_empty() {
            return None;
        }
        let nth = rng.gen_range(0..self.len());
        self.iter().nth(nth as usize)
    }
}

impl TryFrom<Vec<u8>> for ChannelMask {
    type Error = String;

    fn try_from(channels: Vec<u8>) -> Result<Self, Self::Error> {
        Self::from_channels(&channels)
    }
}

/// Renders as `{ 11, 14-16, 25 }`, collapsing runs of consecutive channels.
impl fmt::Display for ChannelMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        let mut first = true;
        let mut ch = MIN_CHANNEL;
        while ch <= MAX_CHANNEL {
            if self.contains(ch) {
                let run_start = ch;
                while ch < MAX_CHANNEL && self.contains(ch + 1) {
                    ch += 1;
                }
                if !first {
                    write!(f, ",")?;
                }
                first = false;
                if run_start == ch {
                    write!(f, " {}", run_start)?;
                } else {
                    write!(f, " {}-{}", run_start, ch)?;
                }
            }
            ch += 1;
        }
        write!(f, " }}")
    }
}

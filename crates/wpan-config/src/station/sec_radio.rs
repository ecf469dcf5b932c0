use serde::Deserialize;
use std::collections::HashMap;

use toml::Value;
use wpan_core::ChannelMask;

#[derive(Debug, Clone)]
pub struct CfgRadioInfo {
    /// Operating PAN channel at startup, 11-26.
    pub pan_channel: u8,
    /// Channels the radio hardware supports at all.
    pub supported_channels: ChannelMask,
    /// CCA failure rate reported by the backend-less MAC, 0x0000-0xffff.
    pub cca_failure_rate: u16,
}

#[derive(Default, Deserialize)]
pub struct RadioInfoDto {
    pub pan_channel: u8,
    pub supported_channels: Option<ChannelMask>,
    pub cca_failure_rate: Option<u16>,

    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

pub fn radio_dto_to_cfg(ri: RadioInfoDto) -> CfgRadioInfo {
    CfgRadioInfo {
        pan_channel: ri.pan_channel,
        supported_channels: ri.supported_channels.unwrap_or(ChannelMask::all()),
        cca_failure_rate: ri.cca_failure_rate.unwrap_or(0),
    }
}

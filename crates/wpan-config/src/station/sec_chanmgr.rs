use serde::Deserialize;
use std::collections::HashMap;

use toml::Value;
use wpan_core::ChannelMask;

#[derive(Debug, Clone)]
pub struct CfgChannelMgr {
    /// Channels the manager may migrate the network to.
    pub supported_channels: ChannelMask,
    /// Channels the operator prefers, e.g. clear of co-sited Wi-Fi.
    pub favored_channels: ChannelMask,
    /// Migration delay carried in the pending dataset, seconds.
    pub delay_s: u16,
    /// Autonomous channel selection on a periodic timer.
    pub auto_select: bool,
    /// Auto-selection period, seconds.
    pub auto_select_interval_s: u32,
}

#[derive(Default, Deserialize)]
pub struct ChannelMgrDto {
    pub supported_channels: Option<ChannelMask>,
    pub favored_channels: Option<ChannelMask>,
    pub delay_s: Option<u16>,
    pub auto_select: Option<bool>,
    pub auto_select_interval_s: Option<u32>,

    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

pub fn chanmgr_dto_to_cfg(cm: ChannelMgrDto) -> CfgChannelMgr {
    CfgChannelMgr {
        supported_channels: cm.supported_channels.unwrap_or(ChannelMask::all()),
        favored_channels: cm.favored_channels.unwrap_or(ChannelMask::all()),
        delay_s: cm.delay_s.unwrap_or(120),
        auto_select: cm.auto_select.unwrap_or(false),
        auto_select_interval_s: cm.auto_select_interval_s.unwrap_or(10_800), // 3 hours
    }
}

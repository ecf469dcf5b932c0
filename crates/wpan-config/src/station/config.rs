use serde::Deserialize;
use std::sync::{Arc, RwLock};

use crate::station::{CfgChannelMgr, CfgRadioInfo, StackState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum StackMode {
    /// Full Thread device: router-capable, runs the channel manager.
    Ftd,
    /// Minimal Thread device: end device only.
    Mtd,
}

#[derive(Debug, Clone)]
pub struct StackConfig {
    pub stack_mode: StackMode,
    pub debug_log: Option<String>,

    pub radio: CfgRadioInfo,
    pub chanmgr: CfgChannelMgr,
}

impl StackConfig {
    /// Validate that all required configuration fields are properly set.
    pub fn validate(&self) -> Result<(), &str> {
        if !self.radio.supported_channels.contains(self.radio.pan_channel) {
            return Err("radio pan_channel must be one of the radio's supported_channels");
        }

        // The channel manager coordinates network-wide migrations, which only
        // a router-capable device can drive.
        if self.stack_mode != StackMode::Ftd {
            return Err("channel manager requires stack_mode = \"Ftd\"");
        }

        if self
            .chanmgr
            .supported_channels
            .intersection(self.radio.supported_channels)
            .is_empty()
        {
            return Err("channel_manager supported_channels share no channel with the radio");
        }

        Ok(())
    }
}

/// Global shared configuration: immutable config + mutable state.
#[derive(Clone, Debug)]
pub struct SharedConfig {
    /// Read-only configuration (immutable after construction).
    cfg: Arc<StackConfig>,
    /// Mutable state guarded with RwLock (write by the stack, read by others).
    state: Arc<RwLock<StackState>>,
}

impl SharedConfig {
    pub fn from_config(cfg: StackConfig) -> Self {
        Self::from_parts(cfg, StackState::default())
    }

    pub fn from_parts(cfg: StackConfig, state: StackState) -> Self {
        // Check config for validity before returning the SharedConfig object
        match cfg.validate() {
            Ok(_) => {}
            Err(e) => panic!("Invalid stack configuration: {}", e),
        }

        Self {
            cfg: Arc::new(cfg),
            state: Arc::new(RwLock::new(state)),
        }
    }

    /// Access immutable config.
    pub fn config(&self) -> Arc<StackConfig> {
        Arc::clone(&self.cfg)
    }

    /// Read guard for mutable state.
    pub fn state_read(&self) -> std::sync::RwLockReadGuard<'_, StackState> {
        self.state.read().expect("StackState RwLock blocked")
    }

    /// Write guard for mutable state.
    pub fn state_write(&self) -> std::sync::RwLockWriteGuard<'_, StackState> {
        self.state.write().expect("StackState RwLock blocked")
    }
}

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::Deserialize;
use toml::Value;

use super::config::{SharedConfig, StackConfig, StackMode};
use super::{chanmgr_dto_to_cfg, radio_dto_to_cfg, ChannelMgrDto, RadioInfoDto, StackState};

/// Build `SharedConfig` from a TOML configuration file
pub fn from_toml_str(toml_str: &str) -> Result<SharedConfig, Box<dyn std::error::Error>> {
    let root: TomlConfigRoot = toml::from_str(toml_str)?;

    // Various sanity checks
    let expected_config_version = "0.1";
    if !root.config_version.eq(expected_config_version) {
        return Err(format!(
            "Unrecognized config_version: {}, expect {}",
            root.config_version, expected_config_version
        )
        .into());
    }
    if !root.extra.is_empty() {
        return Err(format!("Unrecognized top-level fields: {:?}", sorted_keys(&root.extra)).into());
    }

    if !root.radio.extra.is_empty() {
        return Err(format!("Unrecognized fields: radio::{:?}", sorted_keys(&root.radio.extra)).into());
    }
    if let Some(ref cm) = root.channel_manager {
        if !cm.extra.is_empty() {
            return Err(
                format!("Unrecognized fields: channel_manager::{:?}", sorted_keys(&cm.extra)).into(),
            );
        }
    }

    // Build config from required and optional values
    let cfg = StackConfig {
        stack_mode: root.stack_mode,
        debug_log: root.debug_log,
        radio: radio_dto_to_cfg(root.radio),
        chanmgr: chanmgr_dto_to_cfg(root.channel_manager.unwrap_or_default()),
    };

    if let Err(e) = cfg.validate() {
        return Err(format!("Invalid stack configuration: {}", e).into());
    }

    // Mutable runtime state
    let state = StackState::default();

    Ok(SharedConfig::from_parts(cfg, state))
}

/// Build `SharedConfig` from any reader.
pub fn from_reader<R: Read>(reader: R) -> Result<SharedConfig, Box<dyn std::error::Error>> {
    let mut contents = String::new();
    let mut reader = BufReader::new(reader);
    reader.read_to_string(&mut contents)?;
    from_toml_str(&contents)
}

/// Build `SharedConfig` from a file path.
pub fn from_file<P: AsRef<Path>>(path: P) -> Result<SharedConfig, Box<dyn std::error::Error>> {
    let f = File::open(path)?;
    let r = BufReader::new(f);
    let cfg = from_reader(r)?;
    Ok(cfg)
}

fn sorted_keys(map: &HashMap<String, Value>) -> Vec<&str> {
    let mut v: Vec<&str> = map.keys().map(|s| s.as_str()).collect();
    v.sort_unstable();
    v
}

/// ----------------------- DTOs for input shape -----------------------

#[derive(Deserialize)]
struct TomlConfigRoot {
    config_version: String,
    stack_mode: StackMode,
    debug_log: Option<String>,

    radio: RadioInfoDto,
    channel_manager: Option<ChannelMgrDto>,

    #[serde(flatten)]
    extra: HashMap<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use wpan_core::ChannelMask;

    const GOOD_CONFIG: &str = r#"
        config_version = "0.1"
        stack_mode = "Ftd"

        [radio]
        pan_channel = 11
        supported_channels = [11, 12, 13, 14, 15, 16, 17, 18, 19, 20]
        cca_failure_rate = 0x4000

        [channel_manager]
        supported_channels = [12, 13, 14, 15, 16]
        favored_channels = [15, 16]
        delay_s = 300
        auto_select = true
        auto_select_interval_s = 3600
    "#;

    #[test]
    fn test_parse_full_config() {
        let shared = from_toml_str(GOOD_CONFIG).unwrap();
        let cfg = shared.config();

        assert_eq!(cfg.stack_mode, StackMode::Ftd);
        assert_eq!(cfg.radio.pan_channel, 11);
        assert_eq!(cfg.radio.cca_failure_rate, 0x4000);
        assert_eq!(
            cfg.chanmgr.supported_channels,
            ChannelMask::from_channels(&[12, 13, 14, 15, 16]).unwrap()
        );
        assert_eq!(
            cfg.chanmgr.favored_channels,
            ChannelMask::from_channels(&[15, 16]).unwrap()
        );
        assert_eq!(cfg.chanmgr.delay_s, 300);
        assert!(cfg.chanmgr.auto_select);
        assert_eq!(cfg.chanmgr.auto_select_interval_s, 3600);

        assert!(!shared.state_read().mesh_active);
    }

    #[test]
    fn test_channel_manager_section_optional() {
        let toml = r#"
            config_version = "0.1"
            stack_mode = "Ftd"

            [radio]
            pan_channel = 20
        "#;
        let shared = from_toml_str(toml).unwrap();
        let cfg = shared.config();

        assert_eq!(cfg.radio.supported_channels, ChannelMask::all());
        assert_eq!(cfg.chanmgr.supported_channels, ChannelMask::all());
        assert_eq!(cfg.chanmgr.delay_s, 120);
        assert!(!cfg.chanmgr.auto_select);
        assert_eq!(cfg.chanmgr.auto_select_interval_s, 10_800);
    }

    #[test]
    fn test_rejects_wrong_version() {
        let toml = GOOD_CONFIG.replace("\"0.1\"", "\"9.9\"");
        assert!(from_toml_str(&toml).is_err());
    }

    #[test]
    fn test_rejects_unknown_fields() {
        let toml = format!("{}\n        retry_count = 3\n", GOOD_CONFIG);
        let err = from_toml_str(&toml).unwrap_err().to_string();
        assert!(err.contains("retry_count"), "unexpected error: {}", err);
    }

    #[test]
    fn test_rejects_out_of_range_channel() {
        let toml = GOOD_CONFIG.replace("[12, 13, 14, 15, 16]", "[12, 27]");
        assert!(from_toml_str(&toml).is_err());
    }

    #[test]
    fn test_rejects_pan_channel_outside_radio_mask() {
        let toml = GOOD_CONFIG.replace("pan_channel = 11", "pan_channel = 25");
        let err = from_toml_str(&toml).unwrap_err().to_string();
        assert!(err.contains("pan_channel"), "unexpected error: {}", err);
    }

    #[test]
    fn test_rejects_mtd_with_channel_manager() {
        let toml = GOOD_CONFIG.replace("\"Ftd\"", "\"Mtd\"");
        assert!(from_toml_str(&toml).is_err());
    }

    #[test]
    fn test_rejects_disjoint_manager_and_radio_masks() {
        let toml = GOOD_CONFIG.replace("[12, 13, 14, 15, 16]", "[25, 26]");
        assert!(from_toml_str(&toml).is_err());
    }
}

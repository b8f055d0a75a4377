use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::Deserialize;
use toml::Value;

use ofdma_core::ChannelWidth;

use super::sched_config::{CfgPhy, CfgScheduler, CursorPolicy, OfdmaConfig};

pub const EXPECTED_CONFIG_VERSION: &str = "0.1";

/// Build `OfdmaConfig` from a TOML configuration string
pub fn from_toml_str(toml_str: &str) -> Result<OfdmaConfig, Box<dyn std::error::Error>> {
    let root: TomlConfigRoot = toml::from_str(toml_str)?;

    if root.config_version != EXPECTED_CONFIG_VERSION {
        return Err(format!(
            "Unrecognized config_version: {}, expect {}",
            root.config_version, EXPECTED_CONFIG_VERSION
        )
        .into());
    }
    if !root.extra.is_empty() {
        return Err(format!("Unrecognized top-level fields: {:?}", sorted_keys(&root.extra)).into());
    }
    if let Some(ref s) = root.scheduler {
        if !s.extra.is_empty() {
            return Err(format!("Unrecognized fields: scheduler::{:?}", sorted_keys(&s.extra)).into());
        }
    }
    if let Some(ref p) = root.phy {
        if !p.extra.is_empty() {
            return Err(format!("Unrecognized fields: phy::{:?}", sorted_keys(&p.extra)).into());
        }
    }

    let mut cfg = OfdmaConfig {
        debug_log: root.debug_log,
        sched: CfgScheduler::default(),
        phy: CfgPhy::default(),
    };

    if let Some(s) = root.scheduler {
        apply_scheduler_patch(&mut cfg.sched, s);
    }
    if let Some(p) = root.phy {
        apply_phy_patch(&mut cfg.phy, p);
    }

    cfg.validate().map_err(|e| format!("Invalid configuration: {}", e))?;
    Ok(cfg)
}

/// Build `OfdmaConfig` from any reader.
pub fn from_reader<R: Read>(reader: R) -> Result<OfdmaConfig, Box<dyn std::error::Error>> {
    let mut contents = String::new();
    let mut reader = BufReader::new(reader);
    reader.read_to_string(&mut contents)?;
    from_toml_str(&contents)
}

/// Build `OfdmaConfig` from a file path.
pub fn from_file<P: AsRef<Path>>(path: P) -> Result<OfdmaConfig, Box<dyn std::error::Error>> {
    let f = File::open(path)?;
    from_reader(f)
}

fn apply_scheduler_patch(dst: &mut CfgScheduler, src: SchedulerDto) {
    if let Some(v) = src.n_stations {
        dst.n_stations = v;
    }
    if let Some(v) = src.force_dl_ofdma {
        dst.force_dl_ofdma = v;
    }
    if let Some(v) = src.enable_ul_ofdma {
        dst.enable_ul_ofdma = v;
    }
    if let Some(v) = src.ul_psdu_size {
        dst.ul_psdu_size = v;
    }
    if let Some(v) = src.cursor_policy {
        dst.cursor_policy = v;
    }
    if let Some(v) = src.priority_allocation {
        dst.priority_allocation = v;
    }
    if let Some(v) = src.randomize_mcs {
        dst.randomize_mcs = v;
    }
    dst.mcs_seed = src.mcs_seed;
}

fn apply_phy_patch(dst: &mut CfgPhy, src: PhyDto) {
    if let Some(v) = src.channel_width {
        dst.channel_width = v;
    }
    if let Some(v) = src.guard_interval_ns {
        dst.guard_interval_ns = v;
    }
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
    debug_log: Option<String>,

    #[serde(default)]
    scheduler: Option<SchedulerDto>,

    #[serde(default)]
    phy: Option<PhyDto>,

    #[serde(flatten)]
    extra: HashMap<String, Value>,
}

#[derive(Default, Deserialize)]
struct SchedulerDto {
    pub n_stations: Option<u8>,
    pub force_dl_ofdma: Option<bool>,
    pub enable_ul_ofdma: Option<bool>,
    pub ul_psdu_size: Option<u32>,
    pub cursor_policy: Option<CursorPolicy>,
    pub priority_allocation: Option<bool>,
    pub randomize_mcs: Option<bool>,
    pub mcs_seed: Option<u64>,

    #[serde(flatten)]
    extra: HashMap<String, Value>,
}

#[derive(Default, Deserialize)]
struct PhyDto {
    pub channel_width: Option<ChannelWidth>,
    pub guard_interval_ns: Option<u16>,

    #[serde(flatten)]
    extra: HashMap<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config() {
        let cfg = from_toml_str("config_version = \"0.1\"\n").unwrap();
        assert_eq!(cfg.sched.n_stations, 4);
        assert!(cfg.sched.enable_ul_ofdma);
        assert!(cfg.sched.priority_allocation);
        assert!(cfg.debug_log.is_none());
    }

    #[test]
    fn test_full_config() {
        let toml_str = r#"
            config_version = "0.1"
            debug_log = "/tmp/ofdma.log"

            [scheduler]
            n_stations = 8
            force_dl_ofdma = true
            enable_ul_ofdma = false
            ul_psdu_size = 1000
            cursor_policy = "AdvancePastGranted"
            priority_allocation = false
            randomize_mcs = false
            mcs_seed = 42

            [phy]
            channel_width = 80
            guard_interval_ns = 3200
        "#;
        let cfg = from_toml_str(toml_str).unwrap();
        assert_eq!(cfg.debug_log.as_deref(), Some("/tmp/ofdma.log"));
        assert_eq!(cfg.sched.n_stations, 8);
        assert!(cfg.sched.force_dl_ofdma);
        assert!(!cfg.sched.enable_ul_ofdma);
        assert_eq!(cfg.sched.ul_psdu_size, 1000);
        assert_eq!(cfg.sched.cursor_policy, CursorPolicy::AdvancePastGranted);
        assert!(!cfg.sched.priority_allocation);
        assert!(!cfg.sched.randomize_mcs);
        assert_eq!(cfg.sched.mcs_seed, Some(42));
        assert_eq!(cfg.phy.channel_width, ChannelWidth::Mhz80);
        assert_eq!(cfg.phy.guard_interval_ns, 3200);
    }

    #[test]
    fn test_rejects_wrong_version() {
        assert!(from_toml_str("config_version = \"0.5\"\n").is_err());
    }

    #[test]
    fn test_rejects_unknown_fields() {
        let err = from_toml_str("config_version = \"0.1\"\n[scheduler]\nn_stationz = 3\n").unwrap_err();
        assert!(err.to_string().contains("n_stationz"));
        assert!(from_toml_str("config_version = \"0.1\"\nfoo = 1\n").is_err());
    }

    #[test]
    fn test_rejects_bad_channel_width() {
        assert!(from_toml_str("config_version = \"0.1\"\n[phy]\nchannel_width = 60\n").is_err());
    }

    #[test]
    fn test_rejects_zero_ul_psdu_size() {
        let err = from_toml_str("config_version = \"0.1\"\n[scheduler]\nul_psdu_size = 0\n").unwrap_err();
        assert!(err.to_string().contains("ul_psdu_size"));
    }
}

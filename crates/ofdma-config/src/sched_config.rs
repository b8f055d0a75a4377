use serde::Deserialize;

use ofdma_core::ChannelWidth;

/// Maximum number of stations that can be granted an RU in one DL MU PPDU
/// (74 x 26-tone RUs in 160 MHz)
pub const MAX_N_STATIONS: u8 = 74;

/// What happens to the round robin cursor once the DL MU PPDU is built
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum CursorPolicy {
    /// After advancing to the first station that was not granted an RU, the cursor is
    /// overwritten with the first candidate. Every decision then restarts from the
    /// same station.
    PinFirstCandidate,
    /// The cursor is left at the first station that was not served
    AdvancePastGranted,
}

/// Scheduling behaviour
#[derive(Debug, Clone)]
pub struct CfgScheduler {
    /// Maximum number of stations granted an RU in a DL MU PPDU, 1..=74
    pub n_stations: u8,
    /// Return DL OFDMA with an empty receiver set instead of falling back to SU
    pub force_dl_ofdma: bool,
    /// Solicit an UL OFDMA exchange after each DL OFDMA transmission
    pub enable_ul_ofdma: bool,
    /// Size in bytes of the PSDU solicited in HE TB PPDUs. Must be non-zero when
    /// UL OFDMA is enabled
    pub ul_psdu_size: u32,
    pub cursor_policy: CursorPolicy,
    /// Rank candidates by weighted queued bytes and hand out RUs of different sizes
    /// ("largest weighted first"). When off, every granted station gets an RU of the same size
    pub priority_allocation: bool,
    /// Overwrite the MCS of stations granted through the priority path with random values
    pub randomize_mcs: bool,
    /// Seed for the MCS randomizer. None seeds from the OS
    pub mcs_seed: Option<u64>,
}

impl Default for CfgScheduler {
    fn default() -> Self {
        Self {
            n_stations: default_n_stations(),
            force_dl_ofdma: false,
            enable_ul_ofdma: true,
            ul_psdu_size: default_ul_psdu_size(),
            cursor_policy: CursorPolicy::PinFirstCandidate,
            priority_allocation: true,
            randomize_mcs: true,
            mcs_seed: None,
        }
    }
}

#[inline]
fn default_n_stations() -> u8 {
    4
}

#[inline]
fn default_ul_psdu_size() -> u32 {
    500
}

/// PHY parameters, used by the simulated environment
#[derive(Debug, Clone)]
pub struct CfgPhy {
    pub channel_width: ChannelWidth,
    /// 800, 1600 or 3200
    pub guard_interval_ns: u16,
}

impl Default for CfgPhy {
    fn default() -> Self {
        Self {
            channel_width: ChannelWidth::Mhz20,
            guard_interval_ns: 800,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct OfdmaConfig {
    pub debug_log: Option<String>,
    pub sched: CfgScheduler,
    pub phy: CfgPhy,
}

impl OfdmaConfig {
    /// Validate that all configuration fields hold usable values.
    pub fn validate(&self) -> Result<(), &str> {
        self.sched.validate()?;
        if ![800, 1600, 3200].contains(&self.phy.guard_interval_ns) {
            return Err("phy.guard_interval_ns must be 800, 1600 or 3200");
        }
        Ok(())
    }
}

impl CfgScheduler {
    pub fn validate(&self) -> Result<(), &str> {
        if self.n_stations == 0 || self.n_stations > MAX_N_STATIONS {
            return Err("n_stations must be in 1..=74");
        }
        if self.enable_ul_ofdma && self.ul_psdu_size == 0 {
            return Err("ul_psdu_size must be non-zero when enable_ul_ofdma is set");
        }
        Ok(())
    }
}

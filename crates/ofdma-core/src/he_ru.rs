use core::fmt;

use serde::Deserialize;

/// Operating channel width
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(try_from = "u16")]
pub enum ChannelWidth {
    Mhz20,
    Mhz40,
    Mhz80,
    Mhz160,
}

impl ChannelWidth {
    pub const ALL: [ChannelWidth; 4] = [ChannelWidth::Mhz20, ChannelWidth::Mhz40, ChannelWidth::Mhz80, ChannelWidth::Mhz160];

    pub fn mhz(self) -> u16 {
        match self {
            ChannelWidth::Mhz20 => 20,
            ChannelWidth::Mhz40 => 40,
            ChannelWidth::Mhz80 => 80,
            ChannelWidth::Mhz160 => 160,
        }
    }
}

impl TryFrom<u16> for ChannelWidth {
    type Error = String;
    fn try_from(mhz: u16) -> Result<Self, Self::Error> {
        match mhz {
            20 => Ok(ChannelWidth::Mhz20),
            40 => Ok(ChannelWidth::Mhz40),
            80 => Ok(ChannelWidth::Mhz80),
            160 => Ok(ChannelWidth::Mhz160),
            _ => Err(format!("unsupported channel width {} MHz, expect 20, 40, 80 or 160", mhz)),
        }
    }
}

impl fmt::Display for ChannelWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}MHz", self.mhz())
    }
}

/// HE resource unit type, ordered by number of tones
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RuType {
    Ru26,
    Ru52,
    Ru106,
    Ru242,
    Ru484,
    Ru996,
    Ru2x996,
}

impl RuType {
    pub const ALL: [RuType; 7] = [
        RuType::Ru26,
        RuType::Ru52,
        RuType::Ru106,
        RuType::Ru242,
        RuType::Ru484,
        RuType::Ru996,
        RuType::Ru2x996,
    ];

    pub fn tones(self) -> u16 {
        match self {
            RuType::Ru26 => 26,
            RuType::Ru52 => 52,
            RuType::Ru106 => 106,
            RuType::Ru242 => 242,
            RuType::Ru484 => 484,
            RuType::Ru996 => 996,
            RuType::Ru2x996 => 2 * 996,
        }
    }
}

impl fmt::Display for RuType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuType::Ru2x996 => write!(f, "RU_2x996_TONE"),
            _ => write!(f, "RU_{}_TONE", self.tones()),
        }
    }
}

/// Identifies one RU within the channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuSpec {
    /// True if the RU lies in the primary 80 MHz segment
    pub primary80: bool,
    pub ru_type: RuType,
    /// 1-based index among the RUs of the same type within the 80 MHz segment
    pub index: usize,
}

impl RuSpec {
    pub fn new(primary80: bool, ru_type: RuType, index: usize) -> Self {
        Self { primary80, ru_type, index }
    }
}

impl fmt::Display for RuSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RU{{{} {} #{}}}", if self.primary80 { "P80" } else { "S80" }, self.ru_type, self.index)
    }
}

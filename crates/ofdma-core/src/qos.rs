/// Traffic identifier, 0..=7 for QoS data
pub type Tid = u8;

/// Access category index. The declaration order matches the numeric AC index used for
/// EDCA queue selection, which is NOT the priority order: BE < BK < VI < VO.
/// Candidate selection compares categories with this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum AcIndex {
    Be = 0,
    Bk = 1,
    Vi = 2,
    Vo = 3,
}

impl AcIndex {
    pub fn into_raw(self) -> u8 {
        self as u8
    }

    /// Maps a TID to its access category (802.11 Table 10-1)
    pub fn from_tid(tid: Tid) -> Self {
        match tid {
            0 | 3 => AcIndex::Be,
            1 | 2 => AcIndex::Bk,
            4 | 5 => AcIndex::Vi,
            6 | 7 => AcIndex::Vo,
            _ => panic!("invalid TID {}", tid),
        }
    }
}

impl core::fmt::Display for AcIndex {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            AcIndex::Be => write!(f, "AC_BE"),
            AcIndex::Bk => write!(f, "AC_BK"),
            AcIndex::Vi => write!(f, "AC_VI"),
            AcIndex::Vo => write!(f, "AC_VO"),
        }
    }
}

/// TIDs probed after the triggering TID when looking for a frame to send to a candidate
pub const TID_FALLBACK_ORDER: [Tid; 8] = [1, 2, 0, 3, 4, 5, 6, 7];

/// Coarse application class attached to a candidate, used by the priority cost
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum QosClass {
    Voice = 1,
    Video = 2,
    BestEffort = 3,
    Background = 4,
}

impl QosClass {
    pub fn from_ac(ac: AcIndex) -> Self {
        match ac {
            AcIndex::Vo => QosClass::Voice,
            AcIndex::Vi => QosClass::Video,
            AcIndex::Be => QosClass::BestEffort,
            AcIndex::Bk => QosClass::Background,
        }
    }

    /// Delay-sensitivity weight of the class
    pub fn weight(self) -> f64 {
        match self {
            QosClass::Voice => 16.0,
            QosClass::Video => 8.0,
            QosClass::BestEffort => 4.0,
            QosClass::Background => 2.0,
        }
    }
}

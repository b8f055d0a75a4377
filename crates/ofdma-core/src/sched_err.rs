use core::fmt;

use crate::UlMuAckSequence;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedErr {
    /// A required configuration value is missing or out of range
    InvalidConfig { field: &'static str, reason: &'static str },
    /// The ack policy collaborator asked for a UL MU ack sequence the scheduler can't build
    UnsupportedUlAckSequence(UlMuAckSequence),
    /// The MPDU that triggered channel access is not a QoS data frame with a valid TID
    InvalidMpdu { tid: u8 },
}

impl fmt::Display for SchedErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchedErr::InvalidConfig { field, reason } => write!(f, "invalid configuration: {}: {}", field, reason),
            SchedErr::UnsupportedUlAckSequence(seq) => write!(f, "unsupported UL MU ack sequence {:?}", seq),
            SchedErr::InvalidMpdu { tid } => write!(f, "MPDU is not QoS data (tid {})", tid),
        }
    }
}

impl std::error::Error for SchedErr {}

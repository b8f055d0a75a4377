use crate::{MacAddr, Tid};

/// The scheduler only needs the addressing and size of a queued QoS data frame.
/// Payload and full header stay with the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mpdu {
    /// Addr1
    pub receiver: MacAddr,
    pub tid: Tid,
    /// Size in bytes of the packet carried by the MPDU
    pub size: u32,
}

impl Mpdu {
    pub fn new(receiver: MacAddr, tid: Tid, size: u32) -> Self {
        Self { receiver, tid, size }
    }

    /// Copy of this MPDU readdressed to another receiver
    pub fn with_receiver(&self, receiver: MacAddr) -> Self {
        Self { receiver, ..*self }
    }
}

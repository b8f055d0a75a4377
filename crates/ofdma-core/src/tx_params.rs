use crate::MacAddr;

/// Acknowledgment sequence following a DL MU PPDU
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DlMuAckSequence {
    /// BlockAckReq/BlockAck exchanged with each station in turn, SU format
    SuFormat,
    /// A MU-BAR trigger frame solicits BlockAcks from all stations at once
    MuBar,
    /// The trigger is aggregated to the DL PSDUs, BlockAcks come back in HE TB PPDUs
    AggregateTf,
}

impl DlMuAckSequence {
    /// True if the sequence needs a MU-BAR trigger descriptor
    pub fn needs_trigger(self) -> bool {
        matches!(self, DlMuAckSequence::MuBar | DlMuAckSequence::AggregateTf)
    }
}

/// Acknowledgment sequence following an HE TB PPDU exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UlMuAckSequence {
    /// The AP answers with a single Multi-STA BlockAck
    MultiStaBlockAck,
    /// BlockAcks sent inside a DL MU PPDU. Not supported by the scheduler.
    DlMuBlockAck,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockAckReqType {
    #[default]
    Compressed,
    ExtendedCompressed,
    MultiTid,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BlockAckType {
    #[default]
    Compressed,
    ExtendedCompressed,
    /// Bitmap length, in bits, of each per-station info field
    MultiSta { bitmap_lens: Vec<u16> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockAckRequest {
    pub addr: MacAddr,
    pub bar_type: BlockAckReqType,
    pub ba_type: BlockAckType,
}

/// MAC-level parameters of a transmission: which ack sequence follows, and which
/// stations are sent a BlockAckReq or are expected to answer with a BlockAck.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TxParams {
    pub dl_mu_ack_sequence: Option<DlMuAckSequence>,
    pub ul_mu_ack_sequence: Option<UlMuAckSequence>,
    pub block_ack_requests: Vec<BlockAckRequest>,
    pub block_acks: Vec<(MacAddr, BlockAckType)>,
}

impl TxParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_dl_mu_ack_sequence(&mut self, seq: DlMuAckSequence) {
        self.dl_mu_ack_sequence = Some(seq);
    }

    pub fn set_ul_mu_ack_sequence(&mut self, seq: UlMuAckSequence) {
        self.ul_mu_ack_sequence = Some(seq);
    }

    pub fn enable_block_ack_request(&mut self, addr: MacAddr, bar_type: BlockAckReqType, ba_type: BlockAckType) {
        self.block_ack_requests.push(BlockAckRequest { addr, bar_type, ba_type });
    }

    pub fn enable_block_ack(&mut self, addr: MacAddr, ba_type: BlockAckType) {
        self.block_acks.push((addr, ba_type));
    }

    pub fn expects_block_ack(&self, addr: &MacAddr) -> bool {
        self.block_acks.iter().any(|(a, _)| a == addr)
    }
}

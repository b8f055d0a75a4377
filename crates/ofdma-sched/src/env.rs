//! Narrow query interfaces to the rest of the access point.
//! The scheduler never owns any of this state; it is handed a `SchedEnv` on every call.

use ofdma_core::{
    AcIndex, Aid, BlockAckReqType, BlockAckType, ChannelWidth, DlMuAckSequence, MacAddr, Mpdu, PreambleType, StaHandle,
    Tid, TriggerFrame, TxParams, TxTime, TxVector, UlMuAckSequence,
};

/// Association directory of the BSS
pub trait StationDirectory {
    /// Currently associated stations, ascending by AID
    fn sta_list(&self) -> Vec<StaHandle>;

    /// Largest queue size reported by the station in its buffer status reports.
    /// 255 means unknown, 254 means unbounded, anything else is in units of 256 bytes
    fn max_buffer_status(&self, addr: MacAddr) -> u8;

    fn addr_of(&self, aid: Aid) -> Option<MacAddr> {
        self.sta_list().into_iter().find(|s| s.aid == aid).map(|s| s.addr)
    }
}

/// Per-AC queues and block ack bookkeeping
pub trait MacQueues {
    fn ba_agreement_established(&self, addr: MacAddr, tid: Tid) -> bool;
    fn block_ack_req_type(&self, addr: MacAddr, tid: Tid) -> BlockAckReqType;
    fn block_ack_type(&self, addr: MacAddr, tid: Tid) -> BlockAckType;

    /// Head of line frame for (tid, receiver), without dequeuing it
    fn peek_next_frame(&self, tid: Tid, addr: MacAddr) -> Option<Mpdu>;

    /// Configured TXOP limit of the AC. Zero if the AC does not use TXOPs
    fn txop_limit(&self, ac: AcIndex) -> TxTime;
    fn txop_remaining(&self, ac: AcIndex) -> TxTime;

    /// Ack policy selected for DL MU PPDUs sent on the AC
    fn ack_sequence_for_dl_mu(&self, ac: AcIndex) -> DlMuAckSequence;
    /// Ack policy selected for HE TB PPDUs solicited on the AC
    fn ack_sequence_for_ul_mu(&self, ac: AcIndex) -> UlMuAckSequence;
}

/// Remote station manager
pub trait RateControl {
    /// TX vector rate control would use to send `mpdu` as a SU PPDU
    fn data_tx_vector(&self, mpdu: &Mpdu) -> TxVector;
    fn default_tx_power_level(&self) -> u8;
    /// Channel quality sample for the station, as seen by the AP
    fn channel_quality(&self, addr: MacAddr) -> f64;
    /// UL target RSSI (dBm) to advertise to the station in trigger frames
    fn target_rssi(&self, aid: Aid) -> i8;
}

/// Duration and size calculations owned by the MAC/PHY
pub trait TimingOracle {
    /// True if `mpdu` sent with `tx_vector` respects the size limits and, if given, the duration limit
    fn is_within_size_and_time_limits(&self, mpdu: &Mpdu, tx_vector: &TxVector, duration_limit: Option<TxTime>) -> bool;

    /// Time taken by the ack sequence that follows a PPDU sent with these parameters
    fn response_duration(&self, params: &TxParams, tx_vector: &TxVector, trigger: Option<&TriggerFrame>) -> TxTime;

    /// Time to send `size` bytes. For MU vectors `aid` selects the user
    fn tx_duration(&self, size: u32, tx_vector: &TxVector, aid: Option<Aid>) -> TxTime;

    /// Time to send the trigger frame itself
    fn trigger_tx_duration(&self, trigger: &TriggerFrame) -> TxTime;

    fn ppdu_max_time(&self, preamble: PreambleType) -> TxTime;

    fn he_tb_duration_to_lsig_length(&self, duration: TxTime) -> u16;
    fn lsig_length_to_he_tb_duration(&self, length: u16, tx_vector: &TxVector) -> TxTime;

    /// UL length to put in a MU-BAR so that all solicited BlockAcks fit
    fn ul_length_for_block_acks(&self, trigger: &TriggerFrame, params: &TxParams) -> u16;
}

pub trait PhyInfo {
    fn channel_width(&self) -> ChannelWidth;
    fn guard_interval_ns(&self) -> u16;
}

/// Everything the scheduler needs from its surroundings
pub trait SchedEnv: StationDirectory + MacQueues + RateControl + TimingOracle + PhyInfo {}

impl<T> SchedEnv for T where T: StationDirectory + MacQueues + RateControl + TimingOracle + PhyInfo {}

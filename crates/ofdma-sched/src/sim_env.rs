//! Deterministic stand-in for the MAC, PHY and station manager of an access point.
//! Durations follow the HE PPDU structure closely enough for budget decisions to behave
//! realistically: preamble plus a whole number of OFDM symbols for the data.

use std::collections::{BTreeMap, VecDeque};

use ofdma_config::OfdmaConfig;
use ofdma_core::{
    AcIndex, Aid, BlockAckReqType, BlockAckType, ChannelWidth, DlMuAckSequence, Mcs, MacAddr, Mpdu, Nss, PreambleType,
    RuType, StaHandle, Tid, TriggerFrame, TxParams, TxTime, TxVector, UlMuAckSequence,
};

use crate::dl_info::DlOfdmaInfo;
use crate::env::{MacQueues, PhyInfo, RateControl, StationDirectory, TimingOracle};
use crate::ul_info::UlOfdmaInfo;

pub const SIFS: TxTime = TxTime::from_micros(16);
/// Legacy (6 Mb/s) preamble and symbol duration, used for control frames
const LEGACY_PREAMBLE: TxTime = TxTime::from_micros(20);
const LEGACY_SYMBOL: TxTime = TxTime::from_micros(4);
const LEGACY_BITS_PER_SYMBOL: u64 = 24;

/// HE data symbol without guard interval
const HE_SYMBOL_NS: i64 = 12_800;
/// Service field and tail bits added to every PSDU
const SERVICE_TAIL_BITS: u64 = 16 + 6;

/// Max HE PPDU duration
pub const PPDU_MAX_TIME: TxTime = TxTime::from_micros(5_484);
/// Max HE PSDU size, bytes
pub const MAX_PSDU_SIZE: u32 = 6_500_631;

const BLOCK_ACK_SIZE: u32 = 32;
const BLOCK_ACK_REQ_SIZE: u32 = 24;
const MULTI_STA_BA_BASE_SIZE: u32 = 24;
const MULTI_STA_BA_PER_STA_SIZE: u32 = 14;
const TRIGGER_BASE_SIZE: u32 = 28;
const TRIGGER_PER_USER_SIZE: u32 = 6;

/// L-SIG length bias of HE TB PPDUs (m in 802.11ax 27.3.11.5)
const LSIG_M: i64 = 2;
const LSIG_MAX_LENGTH: u16 = 4095;

/// (bits per subcarrier, coding rate numerator, denominator) for HE MCS 0..=11
const HE_MCS: [(u64, u64, u64); 12] = [
    (1, 1, 2),
    (2, 1, 2),
    (2, 3, 4),
    (4, 1, 2),
    (4, 3, 4),
    (6, 2, 3),
    (6, 3, 4),
    (6, 5, 6),
    (8, 3, 4),
    (8, 5, 6),
    (10, 3, 4),
    (10, 5, 6),
];

/// Data subcarriers of an RU
fn data_tones(ru: RuType) -> u64 {
    match ru {
        RuType::Ru26 => 24,
        RuType::Ru52 => 48,
        RuType::Ru106 => 102,
        RuType::Ru242 => 234,
        RuType::Ru484 => 468,
        RuType::Ru996 => 980,
        RuType::Ru2x996 => 1960,
    }
}

/// RU covering the whole channel, used for SU PPDUs
fn full_channel_ru(bw: ChannelWidth) -> RuType {
    match bw {
        ChannelWidth::Mhz20 => RuType::Ru242,
        ChannelWidth::Mhz40 => RuType::Ru484,
        ChannelWidth::Mhz80 => RuType::Ru996,
        ChannelWidth::Mhz160 => RuType::Ru2x996,
    }
}

fn he_preamble(preamble: PreambleType) -> TxTime {
    match preamble {
        PreambleType::HeSu => TxTime::from_micros(36),
        PreambleType::HeMu => TxTime::from_micros(44),
        PreambleType::HeTb => TxTime::from_micros(40),
    }
}

fn he_duration(size: u32, preamble: PreambleType, ru: RuType, mcs: Mcs, nss: Nss, gi_ns: u16) -> TxTime {
    let (bits, num, den) = HE_MCS[(mcs as usize).min(HE_MCS.len() - 1)];
    let bits_per_symbol = (data_tones(ru) * bits * num / den * nss.max(1) as u64).max(1);
    let n_symbols = (SERVICE_TAIL_BITS + 8 * size as u64).div_ceil(bits_per_symbol);
    let symbol_ns = HE_SYMBOL_NS + gi_ns as i64;
    he_preamble(preamble) + TxTime::from_nanos((n_symbols as i64).saturating_mul(symbol_ns))
}

fn legacy_duration(size: u32) -> TxTime {
    let n_symbols = (SERVICE_TAIL_BITS + 8 * size as u64).div_ceil(LEGACY_BITS_PER_SYMBOL);
    LEGACY_PREAMBLE + TxTime::from_nanos(n_symbols as i64 * LEGACY_SYMBOL.as_nanos())
}

/// A simulated associated station
#[derive(Debug, Clone)]
pub struct SimStation {
    pub aid: Aid,
    pub addr: MacAddr,
    /// Frame sizes queued at the AP for this station, per TID
    pub queues: BTreeMap<Tid, VecDeque<u32>>,
    /// TIDs without a block ack agreement
    pub no_ba: Vec<Tid>,
    pub bar_type: BlockAckReqType,
    pub ba_type: BlockAckType,
    /// Buffer status the station reports for UL
    pub buffer_status: u8,
    pub mcs: Mcs,
    pub nss: Nss,
    pub channel_quality: f64,
    pub target_rssi: i8,
}

impl SimStation {
    pub fn new(aid: Aid) -> Self {
        Self {
            aid,
            addr: MacAddr::local(aid),
            queues: BTreeMap::new(),
            no_ba: Vec::new(),
            bar_type: BlockAckReqType::Compressed,
            ba_type: BlockAckType::Compressed,
            buffer_status: 0,
            mcs: 7,
            nss: 1,
            channel_quality: 1.0,
            target_rssi: -70,
        }
    }

    pub fn with_frame(mut self, tid: Tid, size: u32) -> Self {
        self.queues.entry(tid).or_default().push_back(size);
        self
    }

    pub fn without_ba(mut self, tid: Tid) -> Self {
        self.no_ba.push(tid);
        self
    }

    pub fn with_ba_types(mut self, bar_type: BlockAckReqType, ba_type: BlockAckType) -> Self {
        self.bar_type = bar_type;
        self.ba_type = ba_type;
        self
    }

    pub fn with_buffer_status(mut self, buffer_status: u8) -> Self {
        self.buffer_status = buffer_status;
        self
    }

    pub fn with_mcs(mut self, mcs: Mcs) -> Self {
        self.mcs = mcs;
        self
    }

    pub fn with_channel_quality(mut self, channel_quality: f64) -> Self {
        self.channel_quality = channel_quality;
        self
    }

    pub fn handle(&self) -> StaHandle {
        StaHandle { addr: self.addr, aid: self.aid }
    }

    pub fn has_ba(&self, tid: Tid) -> bool {
        !self.no_ba.contains(&tid)
    }
}

/// Simulated AP surroundings
#[derive(Debug, Clone)]
pub struct SimEnv {
    pub channel_width: ChannelWidth,
    pub guard_interval_ns: u16,
    pub tx_power_level: u8,
    pub dl_ack_sequence: DlMuAckSequence,
    pub ul_ack_sequence: UlMuAckSequence,
    stations: BTreeMap<Aid, SimStation>,
    txop_limit: [TxTime; 4],
    txop_remaining: [TxTime; 4],
}

impl SimEnv {
    pub fn new(channel_width: ChannelWidth) -> Self {
        Self {
            channel_width,
            guard_interval_ns: 800,
            tx_power_level: 0,
            dl_ack_sequence: DlMuAckSequence::MuBar,
            ul_ack_sequence: UlMuAckSequence::MultiStaBlockAck,
            stations: BTreeMap::new(),
            txop_limit: [TxTime::ZERO; 4],
            txop_remaining: [TxTime::ZERO; 4],
        }
    }

    pub fn from_config(cfg: &OfdmaConfig) -> Self {
        let mut env = Self::new(cfg.phy.channel_width);
        env.guard_interval_ns = cfg.phy.guard_interval_ns;
        env
    }

    pub fn with_stations(channel_width: ChannelWidth, stations: impl IntoIterator<Item = SimStation>) -> Self {
        let mut env = Self::new(channel_width);
        for sta in stations {
            env.add_station(sta);
        }
        env
    }

    pub fn add_station(&mut self, sta: SimStation) {
        tracing::info!("station {} associated", sta.handle());
        self.stations.insert(sta.aid, sta);
    }

    /// Disassociates the station
    pub fn remove_station(&mut self, aid: Aid) -> Option<SimStation> {
        let sta = self.stations.remove(&aid);
        if let Some(ref sta) = sta {
            tracing::info!("station {} left", sta.handle());
        }
        sta
    }

    pub fn station_mut(&mut self, aid: Aid) -> Option<&mut SimStation> {
        self.stations.get_mut(&aid)
    }

    fn station_by_addr(&self, addr: MacAddr) -> Option<&SimStation> {
        self.stations.values().find(|s| s.addr == addr)
    }

    pub fn enqueue(&mut self, aid: Aid, tid: Tid, size: u32) {
        if let Some(sta) = self.stations.get_mut(&aid) {
            sta.queues.entry(tid).or_default().push_back(size);
        }
    }

    /// Total number of frames queued for the station
    pub fn queued_frames(&self, aid: Aid) -> usize {
        self.stations.get(&aid).map_or(0, |s| s.queues.values().map(|q| q.len()).sum())
    }

    /// Gives the AC a TXOP with `remaining` time left out of `limit`
    pub fn set_txop(&mut self, ac: AcIndex, limit: TxTime, remaining: TxTime) {
        self.txop_limit[ac.into_raw() as usize] = limit;
        self.txop_remaining[ac.into_raw() as usize] = remaining;
    }

    /// Dequeues the frame each receiver of a DL MU PPDU was selected for
    pub fn complete_dl(&mut self, info: &DlOfdmaInfo) {
        for (addr, sta_info) in &info.sta_info {
            let Some(sta) = self.stations.get_mut(&sta_info.aid) else {
                tracing::warn!("DL MU PPDU sent to unknown station {}", addr);
                continue;
            };
            let size = sta.queues.get_mut(&sta_info.tid).and_then(|q| q.pop_front());
            tracing::info!("DL {} aid {} tid {} delivered {:?} bytes", addr, sta_info.aid, sta_info.tid, size);
        }
    }

    /// Dequeues a frame sent as a SU PPDU
    pub fn complete_su(&mut self, mpdu: &Mpdu) {
        let Some(sta) = self.stations.values_mut().find(|s| s.addr == mpdu.receiver) else {
            return;
        };
        if let Some(q) = sta.queues.get_mut(&mpdu.tid) {
            q.pop_front();
        }
        tracing::info!("SU {} tid {} delivered {} bytes", mpdu.receiver, mpdu.tid, mpdu.size);
    }

    /// Stations that sent an HE TB PPDU have flushed their bounded buffers
    pub fn complete_ul(&mut self, info: &UlOfdmaInfo) {
        for user in &info.trigger.users {
            if let Some(sta) = self.stations.get_mut(&user.aid12) {
                tracing::info!("UL aid {} sent {} in HE TB PPDU", user.aid12, info.duration);
                if sta.buffer_status < 254 {
                    sta.buffer_status = 0;
                }
            }
        }
    }

    /// HE TB PPDU duration of a given L-SIG length
    fn he_tb_duration(&self, length: u16) -> TxTime {
        let n_symbols = (length as i64 + 3 + LSIG_M + 2) / 3;
        LEGACY_PREAMBLE + TxTime::from_nanos(n_symbols * LEGACY_SYMBOL.as_nanos())
    }
}

impl StationDirectory for SimEnv {
    fn sta_list(&self) -> Vec<StaHandle> {
        self.stations.values().map(|s| s.handle()).collect()
    }

    fn max_buffer_status(&self, addr: MacAddr) -> u8 {
        self.station_by_addr(addr).map_or(0, |s| s.buffer_status)
    }

    fn addr_of(&self, aid: Aid) -> Option<MacAddr> {
        self.stations.get(&aid).map(|s| s.addr)
    }
}

impl MacQueues for SimEnv {
    fn ba_agreement_established(&self, addr: MacAddr, tid: Tid) -> bool {
        self.station_by_addr(addr).is_some_and(|s| s.has_ba(tid))
    }

    fn block_ack_req_type(&self, addr: MacAddr, _tid: Tid) -> BlockAckReqType {
        self.station_by_addr(addr).map_or(BlockAckReqType::Compressed, |s| s.bar_type)
    }

    fn block_ack_type(&self, addr: MacAddr, _tid: Tid) -> BlockAckType {
        self.station_by_addr(addr).map_or(BlockAckType::Compressed, |s| s.ba_type.clone())
    }

    fn peek_next_frame(&self, tid: Tid, addr: MacAddr) -> Option<Mpdu> {
        let sta = self.station_by_addr(addr)?;
        let size = *sta.queues.get(&tid)?.front()?;
        Some(Mpdu::new(addr, tid, size))
    }

    fn txop_limit(&self, ac: AcIndex) -> TxTime {
        self.txop_limit[ac.into_raw() as usize]
    }

    fn txop_remaining(&self, ac: AcIndex) -> TxTime {
        self.txop_remaining[ac.into_raw() as usize]
    }

    fn ack_sequence_for_dl_mu(&self, _ac: AcIndex) -> DlMuAckSequence {
        self.dl_ack_sequence
    }

    fn ack_sequence_for_ul_mu(&self, _ac: AcIndex) -> UlMuAckSequence {
        self.ul_ack_sequence
    }
}

impl RateControl for SimEnv {
    fn data_tx_vector(&self, mpdu: &Mpdu) -> TxVector {
        match self.station_by_addr(mpdu.receiver) {
            Some(sta) => TxVector::su(self.channel_width, sta.mcs, sta.nss),
            None => TxVector::su(self.channel_width, 0, 1),
        }
    }

    fn default_tx_power_level(&self) -> u8 {
        self.tx_power_level
    }

    fn channel_quality(&self, addr: MacAddr) -> f64 {
        self.station_by_addr(addr).map_or(0.0, |s| s.channel_quality)
    }

    fn target_rssi(&self, aid: Aid) -> i8 {
        self.stations.get(&aid).map_or(-70, |s| s.target_rssi)
    }
}

impl TimingOracle for SimEnv {
    fn is_within_size_and_time_limits(&self, mpdu: &Mpdu, tx_vector: &TxVector, duration_limit: Option<TxTime>) -> bool {
        if mpdu.size > MAX_PSDU_SIZE {
            return false;
        }
        let aid = tx_vector.aids().first().copied();
        let duration = self.tx_duration(mpdu.size, tx_vector, aid);
        duration <= PPDU_MAX_TIME && duration_limit.is_none_or(|limit| duration <= limit)
    }

    fn response_duration(&self, params: &TxParams, _tx_vector: &TxVector, trigger: Option<&TriggerFrame>) -> TxTime {
        let tb_duration = trigger.map_or(TxTime::ZERO, |t| self.he_tb_duration(t.ul_length));
        let mut response = TxTime::ZERO;

        match params.dl_mu_ack_sequence {
            Some(DlMuAckSequence::SuFormat) => {
                for i in 0..params.block_ack_requests.len() {
                    // The first BlockAck is sent right away, the others are requested with a BAR
                    if i > 0 {
                        response += SIFS + legacy_duration(BLOCK_ACK_REQ_SIZE);
                    }
                    response += SIFS + legacy_duration(BLOCK_ACK_SIZE);
                }
            }
            Some(DlMuAckSequence::MuBar) => {
                let trigger_time = trigger.map_or(TxTime::ZERO, |t| self.trigger_tx_duration(t));
                response += SIFS + trigger_time + SIFS + tb_duration;
            }
            Some(DlMuAckSequence::AggregateTf) => {
                response += SIFS + tb_duration;
            }
            None => {}
        }

        if params.ul_mu_ack_sequence == Some(UlMuAckSequence::MultiStaBlockAck) {
            let ba_size = MULTI_STA_BA_BASE_SIZE + MULTI_STA_BA_PER_STA_SIZE * params.block_acks.len() as u32;
            response += SIFS + tb_duration + SIFS + legacy_duration(ba_size);
        }
        response
    }

    fn tx_duration(&self, size: u32, tx_vector: &TxVector, aid: Option<Aid>) -> TxTime {
        let user = aid
            .and_then(|aid| tx_vector.user(aid))
            .or_else(|| tx_vector.he_mu_user_info.values().next());
        match (tx_vector.is_mu(), user) {
            (true, Some(u)) => he_duration(size, tx_vector.preamble, u.ru.ru_type, u.mcs, u.nss, tx_vector.guard_interval_ns),
            _ => he_duration(
                size,
                tx_vector.preamble,
                full_channel_ru(tx_vector.channel_width),
                tx_vector.mcs,
                tx_vector.nss,
                tx_vector.guard_interval_ns,
            ),
        }
    }

    fn trigger_tx_duration(&self, trigger: &TriggerFrame) -> TxTime {
        legacy_duration(TRIGGER_BASE_SIZE + TRIGGER_PER_USER_SIZE * trigger.users.len() as u32)
    }

    fn ppdu_max_time(&self, _preamble: PreambleType) -> TxTime {
        PPDU_MAX_TIME
    }

    fn he_tb_duration_to_lsig_length(&self, duration: TxTime) -> u16 {
        let data = (duration - LEGACY_PREAMBLE).as_nanos().max(0);
        let n_symbols = (data + LEGACY_SYMBOL.as_nanos() - 1) / LEGACY_SYMBOL.as_nanos();
        let length = (n_symbols * 3 - 3 - LSIG_M).max(0);
        length.min(LSIG_MAX_LENGTH as i64) as u16
    }

    fn lsig_length_to_he_tb_duration(&self, length: u16, _tx_vector: &TxVector) -> TxTime {
        self.he_tb_duration(length)
    }

    fn ul_length_for_block_acks(&self, trigger: &TriggerFrame, _params: &TxParams) -> u16 {
        let longest = trigger
            .users
            .iter()
            .map(|u| he_duration(BLOCK_ACK_SIZE, PreambleType::HeTb, u.ru.ru_type, u.mcs, u.nss, trigger.guard_interval_ns))
            .max()
            .unwrap_or(TxTime::ZERO);
        self.he_tb_duration_to_lsig_length(longest)
    }
}

impl PhyInfo for SimEnv {
    fn channel_width(&self) -> ChannelWidth {
        self.channel_width
    }

    fn guard_interval_ns(&self) -> u16 {
        self.guard_interval_ns
    }
}

#[cfg(test)]
mod tests {
    use ofdma_core::{HeMuUserInfo, RuSpec};

    use super::*;

    #[test]
    fn test_lsig_length_conversion() {
        let env = SimEnv::new(ChannelWidth::Mhz20);
        let len = env.he_tb_duration_to_lsig_length(TxTime::from_millis(1));
        // 980 us of data in 4 us symbols
        assert_eq!(len, 245 * 3 - 5);
        let back = env.he_tb_duration(len);
        assert_eq!(back, TxTime::from_millis(1));
        assert_eq!(env.he_tb_duration_to_lsig_length(PPDU_MAX_TIME), 4093);
    }

    #[test]
    fn test_narrower_ru_takes_longer() {
        let env = SimEnv::new(ChannelWidth::Mhz20);
        let mut v = TxVector::he_mu(ChannelWidth::Mhz20, 800, 0);
        v.set_he_mu_user_info(1, HeMuUserInfo { ru: RuSpec::new(true, RuType::Ru26, 1), mcs: 5, nss: 1 });
        v.set_he_mu_user_info(2, HeMuUserInfo { ru: RuSpec::new(true, RuType::Ru106, 1), mcs: 5, nss: 1 });
        assert!(env.tx_duration(1500, &v, Some(1)) > env.tx_duration(1500, &v, Some(2)));
        // An unbounded buffer saturates to a huge, but finite, duration
        assert!(env.tx_duration(u32::MAX, &v, Some(1)) > PPDU_MAX_TIME);
    }

    #[test]
    fn test_queues_and_agreements() {
        let mut env = SimEnv::with_stations(ChannelWidth::Mhz40, [SimStation::new(3).with_frame(5, 700).without_ba(0)]);
        let addr = MacAddr::local(3);
        assert_eq!(env.peek_next_frame(5, addr), Some(Mpdu::new(addr, 5, 700)));
        assert_eq!(env.peek_next_frame(0, addr), None);
        assert!(env.ba_agreement_established(addr, 5));
        assert!(!env.ba_agreement_established(addr, 0));
        assert!(!env.ba_agreement_established(MacAddr::local(9), 5));

        env.enqueue(3, 5, 100);
        assert_eq!(env.queued_frames(3), 2);
        assert!(env.remove_station(3).is_some());
        assert!(env.sta_list().is_empty());
    }

    #[test]
    fn test_su_format_response_grows_with_receivers() {
        let env = SimEnv::new(ChannelWidth::Mhz20);
        let mut params = TxParams::new();
        params.set_dl_mu_ack_sequence(DlMuAckSequence::SuFormat);
        params.enable_block_ack_request(MacAddr::local(1), BlockAckReqType::Compressed, BlockAckType::Compressed);
        let one = env.response_duration(&params, &TxVector::default(), None);
        params.enable_block_ack_request(MacAddr::local(2), BlockAckReqType::Compressed, BlockAckType::Compressed);
        let two = env.response_duration(&params, &TxVector::default(), None);
        assert!(two > one);
        assert_eq!(one, SIFS + legacy_duration(BLOCK_ACK_SIZE));
    }
}

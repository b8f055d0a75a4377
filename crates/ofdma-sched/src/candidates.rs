use ofdma_core::{AcIndex, Aid, HeMuUserInfo, MacAddr, Mpdu, QosClass, RuSpec, RuType, StaHandle, TID_FALLBACK_ORDER, Tid, TxTime, TxVector};

use crate::env::SchedEnv;

/// What the scheduler remembers about a station selected as DL MU receiver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DlPerStaInfo {
    pub aid: Aid,
    /// TID of the frame that made the station eligible
    pub tid: Tid,
}

/// Inputs of the priority cost recorded when a candidate is admitted
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostInput {
    /// Size of the head of line frame
    pub bytes: u32,
    pub class: QosClass,
    pub channel_quality: f64,
}

/// Receivers of the next DL MU PPDU, in selection order.
/// Built by the format selector, consumed by the DL info compute of the same opportunity.
#[derive(Debug, Default, Clone)]
pub struct Candidates {
    stations: Vec<(MacAddr, DlPerStaInfo)>,
    /// One entry per admitted station, same order as `stations`
    cost_inputs: Vec<CostInput>,
}

impl Candidates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.stations.clear();
        self.cost_inputs.clear();
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    pub fn contains(&self, addr: &MacAddr) -> bool {
        self.stations.iter().any(|(a, _)| a == addr)
    }

    pub fn stations(&self) -> &[(MacAddr, DlPerStaInfo)] {
        &self.stations
    }

    pub fn cost_inputs(&self) -> &[CostInput] {
        &self.cost_inputs
    }

    pub fn push(&mut self, addr: MacAddr, info: DlPerStaInfo, cost: CostInput) {
        assert!(!self.contains(&addr), "candidate {} admitted twice", addr);
        self.stations.push((addr, info));
        self.cost_inputs.push(cost);
    }
}

/// Index in `sta_list` where the round robin walk starts.
/// A cursor that no longer refers to an associated station restarts at the first one.
/// Returns None if no station is associated.
pub fn resolve_cursor(sta_list: &[StaHandle], cursor: Option<Aid>) -> Option<usize> {
    if sta_list.is_empty() {
        return None;
    }
    let idx = cursor.and_then(|aid| sta_list.iter().position(|s| s.aid == aid));
    if idx.is_none() {
        tracing::debug!("resolve_cursor: cursor {:?} not associated, restarting at AID {}", cursor, sta_list[0].aid);
    }
    Some(idx.unwrap_or(0))
}

/// Parameters of one round robin walk over the associated stations
pub struct CandidateWalk<'a> {
    pub sta_list: &'a [StaHandle],
    /// Index of the station where the walk starts
    pub start: usize,
    /// The frame the AP gained channel access for
    pub mpdu: &'a Mpdu,
    /// RU tentatively assigned to a candidate to check its frame against the limits
    pub ru_type: RuType,
    /// Time left for the DL MU PPDU, None if unlimited
    pub budget: Option<TxTime>,
    pub max_stations: usize,
}

impl CandidateWalk<'_> {
    /// Walks the associated stations from `start`, wrapping around at most once, and admits
    /// stations with a frame that fits the budget until `max_stations` are admitted.
    /// Returns the index of the station following the last one visited.
    pub fn run<E: SchedEnv + ?Sized>(&self, env: &E, out: &mut Candidates) -> usize {
        assert!(self.start < self.sta_list.len(), "candidate walk start out of range");

        out.clear();
        let curr_tid = self.mpdu.tid;
        let primary_ac = AcIndex::from_tid(curr_tid);

        let mut idx = self.start;
        loop {
            let sta = self.sta_list[idx];
            tracing::trace!("next candidate STA {}", sta);

            if let Some((tid, cost)) = self.find_eligible_frame(env, sta, curr_tid, primary_ac) {
                tracing::debug!("adding candidate STA {} TID={}", sta, tid);
                out.push(sta.addr, DlPerStaInfo { aid: sta.aid, tid }, cost);
            }

            idx = (idx + 1) % self.sta_list.len();
            if out.len() >= self.max_stations || idx == self.start {
                break;
            }
        }
        idx
    }

    /// Probes the TIDs of a station and returns the first one whose head of line frame
    /// meets the size and time limits
    fn find_eligible_frame<E: SchedEnv + ?Sized>(
        &self,
        env: &E,
        sta: StaHandle,
        curr_tid: Tid,
        primary_ac: AcIndex,
    ) -> Option<(Tid, CostInput)> {
        let tids = std::iter::once(curr_tid).chain(TID_FALLBACK_ORDER);
        for tid in tids {
            let ac = AcIndex::from_tid(tid);
            if ac < primary_ac || !env.ba_agreement_established(sta.addr, tid) {
                continue;
            }

            // Only the head of line frame is checked, the queue is not explored further
            let Some(frame) = env.peek_next_frame(tid, sta.addr) else {
                tracing::trace!("no frames to send to {} with TID={}", sta.addr, tid);
                continue;
            };

            let su = env.data_tx_vector(&frame);
            let mut mu = TxVector::he_mu(env.channel_width(), env.guard_interval_ns(), env.default_tx_power_level());
            mu.set_he_mu_user_info(
                sta.aid,
                HeMuUserInfo { ru: RuSpec::new(true, self.ru_type, 1), mcs: su.mcs, nss: su.nss },
            );

            if env.is_within_size_and_time_limits(&frame, &mu, self.budget) {
                let cost = CostInput {
                    bytes: frame.size,
                    class: QosClass::from_ac(ac),
                    channel_quality: env.channel_quality(sta.addr),
                };
                return Some((tid, cost));
            }
        }
        None
    }
}

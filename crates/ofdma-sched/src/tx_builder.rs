use ofdma_core::{
    BlockAckReqType, BlockAckType, ChannelWidth, DlMuAckSequence, HeMuUserInfo, MacAddr, Mpdu, RuSpec, RuType,
    TriggerFrame, TxParams, TxVector,
};

use crate::OfdmaScheduler;
use crate::candidates::DlPerStaInfo;
use crate::env::SchedEnv;
use crate::ru_table::num_rus_per_segment;

/// How the RUs of a DL MU PPDU are sized
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RuAssignment<'a> {
    /// Every station gets an RU of this type
    Uniform(RuType),
    /// Station i gets an RU of type rus[i]
    PerStation(&'a [RuType]),
}

/// RUs of `ru_type` in channel order: primary 80 MHz segment first, then the secondary one
pub fn uniform_rus(bw: ChannelWidth, ru_type: RuType) -> Vec<RuSpec> {
    if ru_type == RuType::Ru2x996 {
        return vec![RuSpec::new(true, RuType::Ru2x996, 1)];
    }
    let per_segment = num_rus_per_segment(bw, ru_type)
        .unwrap_or_else(|| panic!("uniform_rus: no {} in {}", ru_type, bw));
    let segments: &[bool] = if bw == ChannelWidth::Mhz160 { &[true, false] } else { &[true] };

    segments
        .iter()
        .flat_map(|&primary80| (1..=per_segment).map(move |idx| RuSpec::new(primary80, ru_type, idx)))
        .collect()
}

/// One RU per slot, indexed separately within each RU width, all in the primary segment
pub fn heterogeneous_rus(rus: &[RuType]) -> Vec<RuSpec> {
    let mut counters = [0usize; RuType::ALL.len()];
    rus.iter()
        .map(|&ru_type| {
            let counter = &mut counters[ru_type as usize];
            *counter += 1;
            RuSpec::new(true, ru_type, *counter)
        })
        .collect()
}

impl OfdmaScheduler {
    /// Rebuilds the held TX vector and TX params for a DL MU PPDU addressed to `stations`.
    /// The SU rate of each station is taken from rate control for a copy of `mpdu` sent to it.
    pub(crate) fn init_tx_vector_and_params<E: SchedEnv + ?Sized>(
        &mut self,
        env: &E,
        mpdu: &Mpdu,
        stations: &[(MacAddr, DlPerStaInfo)],
        assignment: RuAssignment<'_>,
        ack_sequence: DlMuAckSequence,
    ) {
        let bw = env.channel_width();
        self.tx_vector = TxVector::he_mu(bw, env.guard_interval_ns(), env.default_tx_power_level());
        self.tx_params = TxParams::new();
        self.tx_params.set_dl_mu_ack_sequence(ack_sequence);

        let rus = match assignment {
            RuAssignment::Uniform(ru_type) => uniform_rus(bw, ru_type),
            RuAssignment::PerStation(rus) => heterogeneous_rus(rus),
        };
        assert!(stations.len() <= rus.len(), "{} stations for {} RUs", stations.len(), rus.len());

        for ((addr, info), ru) in stations.iter().zip(rus) {
            let su = env.data_tx_vector(&mpdu.with_receiver(*addr));
            tracing::debug!("STA {} aid {} assigned {} mcs {} nss {}", addr, info.aid, ru, su.mcs, su.nss);
            self.tx_vector
                .set_he_mu_user_info(info.aid, HeMuUserInfo { ru, mcs: su.mcs, nss: su.nss });

            let (bar_type, ba_type) = if env.ba_agreement_established(*addr, info.tid) {
                (env.block_ack_req_type(*addr, info.tid), env.block_ack_type(*addr, info.tid))
            } else {
                (BlockAckReqType::Compressed, BlockAckType::Compressed)
            };

            match ack_sequence {
                // BAR/BA with each station in turn, or one MU-BAR for all of them
                DlMuAckSequence::SuFormat | DlMuAckSequence::MuBar => {
                    self.tx_params.enable_block_ack_request(*addr, bar_type, ba_type)
                }
                DlMuAckSequence::AggregateTf => self.tx_params.enable_block_ack(*addr, ba_type),
            }
        }
    }
}

/// Fills in the UL target RSSI of every user of the trigger
pub(crate) fn set_target_rssi<E: SchedEnv + ?Sized>(env: &E, trigger: &mut TriggerFrame) {
    for user in trigger.users.iter_mut() {
        user.target_rssi = Some(env.target_rssi(user.aid12));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_rus_20mhz() {
        let rus = uniform_rus(ChannelWidth::Mhz20, RuType::Ru52);
        assert_eq!(rus.len(), 4);
        assert_eq!(rus.iter().map(|r| r.index).collect::<Vec<_>>(), vec![1, 2, 3, 4]);
        assert!(rus.iter().all(|r| r.primary80));
    }

    #[test]
    fn test_uniform_rus_160mhz_covers_both_segments() {
        let rus = uniform_rus(ChannelWidth::Mhz160, RuType::Ru242);
        assert_eq!(rus.len(), 8);
        assert_eq!(rus[3], RuSpec::new(true, RuType::Ru242, 4));
        assert_eq!(rus[4], RuSpec::new(false, RuType::Ru242, 1));
        assert_eq!(rus[7], RuSpec::new(false, RuType::Ru242, 4));

        assert_eq!(uniform_rus(ChannelWidth::Mhz160, RuType::Ru2x996), vec![RuSpec::new(true, RuType::Ru2x996, 1)]);
    }

    #[test]
    fn test_heterogeneous_indices_per_width() {
        let rus = heterogeneous_rus(&[RuType::Ru106, RuType::Ru52, RuType::Ru52, RuType::Ru26]);
        assert_eq!(rus, vec![
            RuSpec::new(true, RuType::Ru106, 1),
            RuSpec::new(true, RuType::Ru52, 1),
            RuSpec::new(true, RuType::Ru52, 2),
            RuSpec::new(true, RuType::Ru26, 1),
        ]);
    }
}

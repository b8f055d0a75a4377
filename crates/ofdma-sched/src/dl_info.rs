use ofdma_config::CursorPolicy;
use ofdma_core::{MacAddr, Mcs, RuType, TriggerFrame, TriggerType, TxParams, TxVector};

use crate::candidates::DlPerStaInfo;
use crate::env::SchedEnv;
use crate::priority::{McsSource, largest_weighted_first};
use crate::ru_table::number_and_type_of_rus;
use crate::tx_builder::{RuAssignment, set_target_rssi};
use crate::{MU_BAR_MAX_MCS, OfdmaScheduler};

/// Everything needed to send a DL MU PPDU
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DlOfdmaInfo {
    /// Receivers, in the order RUs were handed out
    pub sta_info: Vec<(MacAddr, DlPerStaInfo)>,
    pub tx_vector: TxVector,
    pub params: TxParams,
    /// MU-BAR soliciting the BlockAcks, when the ack sequence needs one
    pub trigger: Option<TriggerFrame>,
}

/// Receivers granted an RU and how the RUs are sized
enum Grant {
    Uniform { ru_type: RuType, stations: Vec<(MacAddr, DlPerStaInfo)> },
    Priority { rus: Vec<RuType>, stations: Vec<(MacAddr, DlPerStaInfo)>, mcs: Vec<Mcs> },
}

impl Grant {
    fn stations(&self) -> &[(MacAddr, DlPerStaInfo)] {
        match self {
            Grant::Uniform { stations, .. } | Grant::Priority { stations, .. } => stations,
        }
    }
}

impl OfdmaScheduler {
    /// Builds the DL MU PPDU for the candidates picked by the last format selection.
    /// With no candidates the result holds no stations and no trigger.
    pub fn compute_dl_ofdma_info<E: SchedEnv + ?Sized>(&mut self, env: &E) -> DlOfdmaInfo {
        if self.candidates.is_empty() {
            return DlOfdmaInfo::default();
        }
        let Some(mpdu) = self.mpdu else {
            panic!("compute_dl_ofdma_info: candidates without a triggering MPDU");
        };

        let grant = self.grant_rus(env);
        let granted = grant.stations().len();
        let candidates = self.candidates.stations();
        tracing::debug!(op = self.op, "{} of {} candidates granted an RU", granted, candidates.len());

        // Next time, start from the first candidate that wasn't served
        if granted < candidates.len() {
            if let Some((_, info)) = candidates.iter().find(|(addr, _)| !grant.stations().iter().any(|(a, _)| a == addr)) {
                self.cursor = Some(info.aid);
            }
        }
        if self.cfg.cursor_policy == CursorPolicy::PinFirstCandidate {
            // FIXME this undoes the advance above, every decision restarts from the same station
            self.cursor = Some(candidates[0].1.aid);
        }
        tracing::debug!("next station to serve has AID {:?}", self.cursor);

        let (stations, mcs) = match grant {
            Grant::Uniform { ru_type, stations } => {
                self.init_tx_vector_and_params(env, &mpdu, &stations, RuAssignment::Uniform(ru_type), self.dl_ack_sequence);
                (stations, Vec::new())
            }
            Grant::Priority { rus, stations, mcs } => {
                self.init_tx_vector_and_params(env, &mpdu, &stations, RuAssignment::PerStation(&rus), self.dl_ack_sequence);
                (stations, mcs)
            }
        };

        let mut info = DlOfdmaInfo {
            sta_info: stations,
            tx_vector: self.tx_vector.clone(),
            params: self.tx_params.clone(),
            trigger: None,
        };

        if self.dl_ack_sequence.needs_trigger() {
            // Responses use the same RUs as the DL MU PPDU, at a rate no higher than MU_BAR_MAX_MCS
            let mut trigger = TriggerFrame::from_tx_vector_capped(TriggerType::MuBar, &info.tx_vector, MU_BAR_MAX_MCS);
            trigger.set_ul_length(env.ul_length_for_block_acks(&trigger, &info.params));
            set_target_rssi(env, &mut trigger);
            info.trigger = Some(trigger);
        }

        // Drawn MCS values replace rate control on the returned vector only
        if mcs.len() > 1 {
            for (aid, mcs) in info.tx_vector.aids().into_iter().zip(mcs) {
                info.tx_vector.set_mcs(mcs, aid);
            }
        }
        info
    }

    /// Decides which candidates get an RU, and of what size
    fn grant_rus<E: SchedEnv + ?Sized>(&mut self, env: &E) -> Grant {
        let bw = env.channel_width();
        let candidates = self.candidates.stations();
        let cost_inputs = self.candidates.cost_inputs();

        if self.cfg.priority_allocation && cost_inputs.len() > 1 {
            let mcs_source: Option<&mut dyn McsSource> = if self.cfg.randomize_mcs {
                Some(self.mcs_source.as_mut())
            } else {
                None
            };
            let alloc = largest_weighted_first(cost_inputs, mcs_source);
            let granted = alloc.granted();
            if granted > 0 {
                let stations = alloc.order[..granted].iter().map(|&i| candidates[i]).collect();
                let rus = alloc.rus[..granted].to_vec();
                return Grant::Priority { rus, stations, mcs: alloc.mcs };
            }
            tracing::debug!("no RU combination for {} candidates", candidates.len());
        }

        let (ru_type, count) = number_and_type_of_rus(bw, candidates.len());
        tracing::debug!("{} stations are being assigned a {}", count, ru_type);
        Grant::Uniform { ru_type, stations: candidates[..count].to_vec() }
    }
}

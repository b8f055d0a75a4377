use ofdma_core::{TriggerFrame, TriggerType, TxParams, TxTime, assert_warn};

use crate::OfdmaScheduler;
use crate::env::SchedEnv;
use crate::tx_builder::set_target_rssi;

/// Everything needed to solicit HE TB PPDUs
#[derive(Debug, Clone, PartialEq)]
pub struct UlOfdmaInfo {
    /// Basic trigger frame, one user per station of the previous DL MU PPDU
    pub trigger: TriggerFrame,
    pub params: TxParams,
    /// Granted HE TB PPDU duration
    pub duration: TxTime,
}

impl OfdmaScheduler {
    /// Builds the basic trigger for the UL exchange granted by the last format selection
    pub fn compute_ul_ofdma_info<E: SchedEnv + ?Sized>(&self, env: &E) -> UlOfdmaInfo {
        let mut trigger = TriggerFrame::from_tx_vector(TriggerType::Basic, &self.tx_vector);
        assert_warn!(!trigger.is_empty(), "compute_ul_ofdma_info: no station to trigger");
        trigger.set_ul_length(self.tx_vector.length);
        set_target_rssi(env, &mut trigger);

        UlOfdmaInfo {
            trigger,
            params: self.tx_params.clone(),
            duration: self.ul_duration,
        }
    }
}

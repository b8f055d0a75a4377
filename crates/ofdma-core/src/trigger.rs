use crate::{Aid, ChannelWidth, Mcs, Nss, RuSpec, TxVector};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerType {
    /// Solicits HE TB PPDUs carrying data
    Basic,
    /// Solicits BlockAcks for a preceding DL MU PPDU
    MuBar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerUserInfo {
    pub aid12: Aid,
    pub ru: RuSpec,
    pub mcs: Mcs,
    pub nss: Nss,
    /// Expected receive power at the AP, dBm. Filled in by the scheduler
    pub target_rssi: Option<i8>,
}

/// Trigger frame descriptor. The frame construction collaborator turns this into bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerFrame {
    pub trigger_type: TriggerType,
    pub channel_width: ChannelWidth,
    pub guard_interval_ns: u16,
    /// L-SIG length of the solicited HE TB PPDU
    pub ul_length: u16,
    /// Ordered by AID
    pub users: Vec<TriggerUserInfo>,
}

impl TriggerFrame {
    /// Builds a trigger soliciting responses on the same RUs used by `tx_vector`
    pub fn from_tx_vector(trigger_type: TriggerType, tx_vector: &TxVector) -> Self {
        let users = tx_vector
            .he_mu_user_info
            .iter()
            .map(|(aid, info)| TriggerUserInfo {
                aid12: aid & 0x0fff,
                ru: info.ru,
                mcs: info.mcs,
                nss: info.nss,
                target_rssi: None,
            })
            .collect();
        Self {
            trigger_type,
            channel_width: tx_vector.channel_width,
            guard_interval_ns: tx_vector.guard_interval_ns,
            ul_length: tx_vector.length,
            users,
        }
    }

    /// Same as from_tx_vector, with every user's MCS limited to `max_mcs`
    pub fn from_tx_vector_capped(trigger_type: TriggerType, tx_vector: &TxVector, max_mcs: Mcs) -> Self {
        let mut trigger = Self::from_tx_vector(trigger_type, tx_vector);
        for user in trigger.users.iter_mut() {
            user.mcs = user.mcs.min(max_mcs);
        }
        trigger
    }

    pub fn set_ul_length(&mut self, len: u16) {
        self.ul_length = len;
    }

    /// AID12 of the first user info field, if any
    pub fn first_aid(&self) -> Option<Aid> {
        self.users.first().map(|u| u.aid12)
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

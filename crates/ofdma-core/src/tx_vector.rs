use std::collections::BTreeMap;

use crate::{Aid, ChannelWidth, Mcs, Nss, RuSpec};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PreambleType {
    #[default]
    HeSu,
    HeMu,
    HeTb,
}

/// Per-user part of an HE MU TX vector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeMuUserInfo {
    pub ru: RuSpec,
    pub mcs: Mcs,
    pub nss: Nss,
}

/// Parameters handed to the PHY for one PPDU.
/// For MU PPDUs the per-user info map is keyed, and iterated, by AID.
#[derive(Debug, Clone, PartialEq)]
pub struct TxVector {
    pub preamble: PreambleType,
    pub channel_width: ChannelWidth,
    pub guard_interval_ns: u16,
    pub tx_power_level: u8,

    /// SU only
    pub mcs: Mcs,
    /// SU only
    pub nss: Nss,

    /// L-SIG length, set when the vector describes a solicited HE TB PPDU
    pub length: u16,

    pub he_mu_user_info: BTreeMap<Aid, HeMuUserInfo>,
}

impl Default for TxVector {
    fn default() -> Self {
        Self {
            preamble: PreambleType::HeSu,
            channel_width: ChannelWidth::Mhz20,
            guard_interval_ns: 800,
            tx_power_level: 0,
            mcs: 0,
            nss: 1,
            length: 0,
            he_mu_user_info: BTreeMap::new(),
        }
    }
}

impl TxVector {
    /// Single user vector, as returned by rate control
    pub fn su(channel_width: ChannelWidth, mcs: Mcs, nss: Nss) -> Self {
        Self {
            channel_width,
            mcs,
            nss,
            ..Default::default()
        }
    }

    /// Empty HE MU vector, users are added with set_he_mu_user_info
    pub fn he_mu(channel_width: ChannelWidth, guard_interval_ns: u16, tx_power_level: u8) -> Self {
        Self {
            preamble: PreambleType::HeMu,
            channel_width,
            guard_interval_ns,
            tx_power_level,
            ..Default::default()
        }
    }

    pub fn is_mu(&self) -> bool {
        self.preamble == PreambleType::HeMu || self.preamble == PreambleType::HeTb
    }

    pub fn set_he_mu_user_info(&mut self, aid: Aid, info: HeMuUserInfo) {
        self.he_mu_user_info.insert(aid, info);
    }

    /// Sets the MCS of an existing user
    pub fn set_mcs(&mut self, mcs: Mcs, aid: Aid) {
        let Some(info) = self.he_mu_user_info.get_mut(&aid) else {
            panic!("set_mcs: no user info for aid {}", aid);
        };
        info.mcs = mcs;
    }

    pub fn user(&self, aid: Aid) -> Option<&HeMuUserInfo> {
        self.he_mu_user_info.get(&aid)
    }

    /// AIDs of the users, ascending
    pub fn aids(&self) -> Vec<Aid> {
        self.he_mu_user_info.keys().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RuType;

    #[test]
    fn test_user_info_ordered_by_aid() {
        let mut v = TxVector::he_mu(ChannelWidth::Mhz20, 800, 0);
        let ru = RuSpec::new(true, RuType::Ru52, 1);
        v.set_he_mu_user_info(7, HeMuUserInfo { ru, mcs: 3, nss: 1 });
        v.set_he_mu_user_info(2, HeMuUserInfo { ru, mcs: 4, nss: 1 });
        assert_eq!(v.aids(), vec![2, 7]);
        assert!(v.is_mu());

        v.set_mcs(9, 2);
        assert_eq!(v.user(2).unwrap().mcs, 9);
        assert_eq!(v.user(7).unwrap().mcs, 3);
    }

    #[test]
    #[should_panic]
    fn test_set_mcs_unknown_user() {
        let mut v = TxVector::he_mu(ChannelWidth::Mhz20, 800, 0);
        v.set_mcs(5, 1);
    }
}

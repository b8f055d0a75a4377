use ofdma_config::CfgScheduler;
use ofdma_core::{Aid, MacAddr, Mcs, Mpdu, SchedErr, Tid};
use ofdma_sched::env::StationDirectory;
use ofdma_sched::sim_env::{SimEnv, SimStation};
use ofdma_sched::{DlOfdmaInfo, FixedMcs, OfdmaScheduler, TxFormat};

/// Creates a default scheduler config for testing. MCS randomization is off so that
/// TX vectors carry the rate control MCS. It can still be modified as needed.
pub fn default_test_config() -> CfgScheduler {
    CfgScheduler {
        randomize_mcs: false,
        ..Default::default()
    }
}

/// Stations with AIDs 1..=n, each holding `frames` best effort frames of `size` bytes
pub fn stations_with_traffic(n: u16, frames: usize, size: u32) -> Vec<SimStation> {
    (1..=n)
        .map(|aid| (0..frames).fold(SimStation::new(aid), |sta, _| sta.with_frame(0, size)))
        .collect()
}

/// AIDs of the DL receivers, in the order RUs were handed out
pub fn granted_aids(info: &DlOfdmaInfo) -> Vec<Aid> {
    info.sta_info.iter().map(|(_, i)| i.aid).collect()
}

/// Scheduler plus the simulated AP it runs against
pub struct SchedTest {
    pub env: SimEnv,
    pub sched: OfdmaScheduler,
}

impl SchedTest {
    pub fn new(cfg: CfgScheduler, env: SimEnv) -> Self {
        Self { env, sched: OfdmaScheduler::new(cfg) }
    }

    pub fn with_mcs(cfg: CfgScheduler, env: SimEnv, mcs: Vec<Mcs>) -> Self {
        Self { env, sched: OfdmaScheduler::with_mcs_source(cfg, Box::new(FixedMcs::new(mcs))) }
    }

    /// Frame the AP gained channel access for: a 1000 byte frame to the first station
    pub fn access(&self, tid: Tid) -> Mpdu {
        let receiver = self.env.sta_list().first().map_or(MacAddr::local(1), |s| s.addr);
        Mpdu::new(receiver, tid, 1000)
    }

    pub fn select(&mut self, tid: Tid) -> Result<TxFormat, SchedErr> {
        let mpdu = self.access(tid);
        self.sched.select_tx_format(&self.env, &mpdu)
    }

    /// One DL opportunity: format selection, and if DL OFDMA was picked the DL MU PPDU,
    /// which is then delivered
    pub fn dl_round(&mut self, tid: Tid) -> (TxFormat, DlOfdmaInfo) {
        let format = self.select(tid).unwrap();
        if format != TxFormat::DlOfdma {
            return (format, DlOfdmaInfo::default());
        }
        let info = self.sched.compute_dl_ofdma_info(&self.env);
        self.env.complete_dl(&info);
        (format, info)
    }
}

//! Round robin OFDMA scheduler for an 802.11ax access point
//!
//! On each channel access opportunity the scheduler decides whether to send a DL MU PPDU,
//! solicit HE TB PPDUs, or let the AP fall back to a SU transmission:
//! - `select_tx_format` picks the format and the DL candidates
//! - `compute_dl_ofdma_info` sizes and assigns the RUs and builds the DL MU TX vector
//! - `compute_ul_ofdma_info` builds the basic trigger for a granted UL opportunity
//!
//! Queues, timing and rate control are reached through the traits in `env`.

pub mod candidates;
pub mod dl_info;
pub mod env;
pub mod format_selector;
pub mod priority;
pub mod ru_alloc;
pub mod ru_table;
pub mod sim_env;
pub mod tx_builder;
pub mod ul_info;

use core::fmt;

use ofdma_config::{CfgScheduler, MAX_N_STATIONS};
use ofdma_core::{Aid, DlMuAckSequence, Mpdu, TxParams, TxTime, TxVector};

pub use candidates::{Candidates, DlPerStaInfo};
pub use dl_info::DlOfdmaInfo;
pub use env::SchedEnv;
pub use priority::{FixedMcs, McsSource, RandomMcs};
pub use ul_info::UlOfdmaInfo;

/// Maximum MCS the stations may use to answer a MU-BAR
pub const MU_BAR_MAX_MCS: u8 = 5;

/// Outcome of a format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxFormat {
    /// Send a DL MU PPDU to the selected candidates. The candidate set may be empty
    /// when DL OFDMA is forced, or while an UL exchange is being retried.
    DlOfdma,
    /// Send a basic trigger to the stations served by the previous DL MU PPDU
    UlOfdma,
    /// Fall back to a SU transmission of the frame
    NonOfdma,
}

impl fmt::Display for TxFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TxFormat::DlOfdma => write!(f, "DL_OFDMA"),
            TxFormat::UlOfdma => write!(f, "UL_OFDMA"),
            TxFormat::NonOfdma => write!(f, "NON_OFDMA"),
        }
    }
}

pub struct OfdmaScheduler {
    cfg: CfgScheduler,
    mcs_source: Box<dyn McsSource>,

    /// AID of the station where the next round robin walk starts
    cursor: Option<Aid>,
    /// Receivers picked by the last format selection
    candidates: Candidates,
    /// Frame the AP gained channel access for in the current opportunity
    mpdu: Option<Mpdu>,
    dl_ack_sequence: DlMuAckSequence,

    /// TX vector and params under construction. After a DL decision they describe the
    /// DL MU PPDU, and the UL follow-up reuses the same set of users.
    tx_vector: TxVector,
    tx_params: TxParams,
    /// HE TB PPDU duration granted by the last UL decision
    ul_duration: TxTime,

    last_format: Option<TxFormat>,
    /// Channel access opportunity counter, only used in logging
    op: u64,
}

impl OfdmaScheduler {
    /// Creates a scheduler drawing random MCS values from a `RandomMcs` seeded with `cfg.mcs_seed`
    pub fn new(cfg: CfgScheduler) -> Self {
        let mcs_source = Box::new(RandomMcs::new(cfg.mcs_seed));
        Self::with_mcs_source(cfg, mcs_source)
    }

    pub fn with_mcs_source(cfg: CfgScheduler, mcs_source: Box<dyn McsSource>) -> Self {
        assert!(
            cfg.n_stations >= 1 && cfg.n_stations <= MAX_N_STATIONS,
            "n_stations {} out of range 1..={}",
            cfg.n_stations,
            MAX_N_STATIONS
        );
        Self {
            cfg,
            mcs_source,
            cursor: None,
            candidates: Candidates::new(),
            mpdu: None,
            dl_ack_sequence: DlMuAckSequence::SuFormat,
            tx_vector: TxVector::default(),
            tx_params: TxParams::new(),
            ul_duration: TxTime::ZERO,
            last_format: None,
            op: 0,
        }
    }

    pub fn config(&self) -> &CfgScheduler {
        &self.cfg
    }

    /// AID of the station the next round robin walk starts from
    pub fn cursor(&self) -> Option<Aid> {
        self.cursor
    }

    /// Format returned by the last call to select_tx_format
    pub fn tx_format(&self) -> Option<TxFormat> {
        self.last_format
    }

    /// DL receivers picked by the last format selection
    pub fn candidates(&self) -> &Candidates {
        &self.candidates
    }

    /// Number of format selections run so far
    pub fn opportunities(&self) -> u64 {
        self.op
    }
}

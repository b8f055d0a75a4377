//! "Largest weighted first" ordering of DL candidates.
//! Each candidate is given a cost from its queued bytes and traffic class, and the
//! heterogeneous RU combination for the candidate count is handed out in descending cost order.

use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;

use ofdma_core::{Mcs, RuType};

use crate::candidates::CostInput;
use crate::ru_alloc::ru_combination;

const COST_SCALE: f64 = 5.0;
const COST_DIVISOR: f64 = 2.0;

/// Range of the MCS values drawn for stations served through the priority path
pub const RANDOM_MCS_MIN: Mcs = 1;
pub const RANDOM_MCS_MAX: Mcs = 11;

/// Source of the MCS values that overwrite rate control on the priority path
pub trait McsSource {
    fn draw(&mut self) -> Mcs;
}

/// Uniformly distributed MCS in RANDOM_MCS_MIN..=RANDOM_MCS_MAX
pub struct RandomMcs {
    rng: StdRng,
}

impl RandomMcs {
    /// Seeded from the OS if `seed` is None
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self { rng }
    }
}

impl McsSource for RandomMcs {
    fn draw(&mut self) -> Mcs {
        self.rng.random_range(RANDOM_MCS_MIN..=RANDOM_MCS_MAX)
    }
}

/// Hands out the given values in order, wrapping around
pub struct FixedMcs {
    values: Vec<Mcs>,
    next: usize,
}

impl FixedMcs {
    pub fn new(values: Vec<Mcs>) -> Self {
        assert!(!values.is_empty(), "FixedMcs needs at least one value");
        Self { values, next: 0 }
    }
}

impl McsSource for FixedMcs {
    fn draw(&mut self) -> Mcs {
        let mcs = self.values[self.next];
        self.next = (self.next + 1) % self.values.len();
        mcs
    }
}

/// Outcome of the priority ordering
#[derive(Debug, Clone, PartialEq)]
pub struct PriorityAllocation {
    /// Candidate indices, highest cost first
    pub order: Vec<usize>,
    /// RU size per rank
    pub rus: Vec<RuType>,
    /// One drawn MCS per candidate, empty when randomization is off
    pub mcs: Vec<Mcs>,
}

impl PriorityAllocation {
    /// Number of candidates that get an RU
    pub fn granted(&self) -> usize {
        self.rus.len().min(self.order.len())
    }
}

pub fn cost(input: &CostInput) -> f64 {
    input.bytes as f64 * input.class.weight() * COST_SCALE / COST_DIVISOR
}

/// Mean of the channel quality samples. Only logged, the cost uses a fixed divisor.
pub fn average_channel_quality(inputs: &[CostInput]) -> f64 {
    if inputs.is_empty() {
        return 0.0;
    }
    inputs.iter().map(|c| c.channel_quality).sum::<f64>() / inputs.len() as f64
}

/// Orders the candidates by descending cost (ties keep candidate order) and picks the RU
/// combination for the candidate count. If `mcs_source` is given, one MCS is drawn per candidate.
pub fn largest_weighted_first(inputs: &[CostInput], mcs_source: Option<&mut dyn McsSource>) -> PriorityAllocation {
    let mcs = match mcs_source {
        Some(src) => (0..inputs.len()).map(|_| src.draw()).collect(),
        None => Vec::new(),
    };

    let costs: Vec<f64> = inputs.iter().map(cost).collect();
    // TODO decide whether the average channel quality should replace COST_DIVISOR
    let avg_quality = average_channel_quality(inputs);
    tracing::trace!("largest_weighted_first: costs {:?} avg channel quality {:.2}", costs, avg_quality);

    let mut order: Vec<usize> = (0..inputs.len()).collect();
    // sort_by is stable
    order.sort_by(|&a, &b| costs[b].total_cmp(&costs[a]));

    let rus = ru_combination(inputs.len()).to_vec();
    tracing::debug!("largest_weighted_first: order {:?} rus {:?}", order, rus);

    PriorityAllocation { order, rus, mcs }
}

#[cfg(test)]
mod tests {
    use ofdma_core::QosClass;

    use super::*;

    fn input(bytes: u32, class: QosClass) -> CostInput {
        CostInput { bytes, class, channel_quality: 1.0 }
    }

    #[test]
    fn test_cost_formula() {
        assert_eq!(cost(&input(100, QosClass::Voice)), 4000.0);
        assert_eq!(cost(&input(100, QosClass::Background)), 500.0);
    }

    #[test]
    fn test_descending_cost_gets_widest_ru() {
        let inputs = [input(100, QosClass::BestEffort), input(50, QosClass::BestEffort), input(25, QosClass::BestEffort)];
        let alloc = largest_weighted_first(&inputs, None);
        assert_eq!(alloc.order, vec![0, 1, 2]);
        assert_eq!(alloc.rus, vec![RuType::Ru106, RuType::Ru106, RuType::Ru26]);
        assert_eq!(alloc.granted(), 3);
        assert!(alloc.mcs.is_empty());
    }

    #[test]
    fn test_weight_reorders_candidates() {
        // 100 BK bytes (cost 500) lose against 40 VO bytes (cost 1600)
        let inputs = [input(100, QosClass::Background), input(40, QosClass::Voice), input(60, QosClass::Video)];
        let alloc = largest_weighted_first(&inputs, None);
        assert_eq!(alloc.order, vec![1, 2, 0]);
    }

    #[test]
    fn test_ties_keep_candidate_order() {
        let inputs = [input(10, QosClass::BestEffort), input(80, QosClass::BestEffort), input(10, QosClass::BestEffort), input(80, QosClass::BestEffort)];
        let alloc = largest_weighted_first(&inputs, None);
        assert_eq!(alloc.order, vec![1, 3, 0, 2]);
    }

    #[test]
    fn test_more_candidates_than_combination() {
        let inputs: Vec<CostInput> = (0..12).map(|i| input(100 + i, QosClass::BestEffort)).collect();
        let alloc = largest_weighted_first(&inputs, None);
        assert_eq!(alloc.rus, vec![RuType::Ru26; 9]);
        assert_eq!(alloc.granted(), 9);
        assert_eq!(alloc.order[0], 11);
    }

    #[test]
    fn test_one_mcs_per_candidate() {
        let inputs = [input(1, QosClass::Voice), input(2, QosClass::Voice)];
        let mut src = FixedMcs::new(vec![3, 9, 4]);
        let alloc = largest_weighted_first(&inputs, Some(&mut src));
        assert_eq!(alloc.mcs, vec![3, 9]);

        let mut rnd = RandomMcs::new(Some(7));
        for _ in 0..200 {
            let mcs = rnd.draw();
            assert!((RANDOM_MCS_MIN..=RANDOM_MCS_MAX).contains(&mcs));
        }
    }

    #[test]
    fn test_seeded_draws_repeat() {
        let mut a = RandomMcs::new(Some(42));
        let mut b = RandomMcs::new(Some(42));
        let va: Vec<Mcs> = (0..16).map(|_| a.draw()).collect();
        let vb: Vec<Mcs> = (0..16).map(|_| b.draw()).collect();
        assert_eq!(va, vb);
    }

    #[test]
    fn test_average_channel_quality() {
        let mut inputs = vec![input(1, QosClass::Voice), input(1, QosClass::Voice)];
        inputs[1].channel_quality = 3.0;
        assert_eq!(average_channel_quality(&inputs), 2.0);
        assert_eq!(average_channel_quality(&[]), 0.0);
    }
}

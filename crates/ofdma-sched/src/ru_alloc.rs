use ofdma_core::RuType::{self, Ru26, Ru52, Ru106, Ru242};

/// Heterogeneous RU combinations for 1..=8 stations, widest RU first.
/// Entry i is the combination for i + 1 stations.
const RU_COMBINATIONS: [&[RuType]; 8] = [
    &[Ru242],
    &[Ru106, Ru106],
    &[Ru106, Ru106, Ru26],
    &[Ru106, Ru52, Ru52, Ru26],
    &[Ru106, Ru52, Ru26, Ru26, Ru26],
    &[Ru52, Ru52, Ru52, Ru26, Ru26, Ru26],
    &[Ru52, Ru52, Ru26, Ru26, Ru26, Ru26, Ru26],
    &[Ru52, Ru26, Ru26, Ru26, Ru26, Ru26, Ru26, Ru26],
];

/// Used for any station count without a dedicated combination
const RU_COMBINATION_FALLBACK: &[RuType] = &[Ru26; 9];

/// RU sizes handed out, in rank order, when `n_stations` stations are served with RUs of
/// different widths
pub fn ru_combination(n_stations: usize) -> &'static [RuType] {
    match n_stations {
        1..=8 => RU_COMBINATIONS[n_stations - 1],
        _ => RU_COMBINATION_FALLBACK,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tones(n: usize) -> Vec<u16> {
        ru_combination(n).iter().map(|r| r.tones()).collect()
    }

    #[test]
    fn test_combination_rows() {
        assert_eq!(tones(1), vec![242]);
        assert_eq!(tones(2), vec![106, 106]);
        assert_eq!(tones(3), vec![106, 106, 26]);
        assert_eq!(tones(4), vec![106, 52, 52, 26]);
        assert_eq!(tones(5), vec![106, 52, 26, 26, 26]);
        assert_eq!(tones(6), vec![52, 52, 52, 26, 26, 26]);
        assert_eq!(tones(7), vec![52, 52, 26, 26, 26, 26, 26]);
        assert_eq!(tones(8), vec![52, 26, 26, 26, 26, 26, 26, 26]);
    }

    #[test]
    fn test_one_ru_per_station_widest_first() {
        for n in 1..=8 {
            let row = ru_combination(n);
            assert_eq!(row.len(), n);
            assert!(row.windows(2).all(|w| w[0] >= w[1]));
        }
    }

    #[test]
    fn test_fallback() {
        for n in [0, 9, 10, 74] {
            assert_eq!(tones(n), vec![26; 9]);
        }
    }
}

use ofdma_core::{ChannelWidth, RuType};

/// Number of RUs of each type that fit in one channel of the given width
/// (802.11ax subcarrier groups), in increasing tone count.
const RUS_20MHZ: [(RuType, usize); 4] = [(RuType::Ru26, 9), (RuType::Ru52, 4), (RuType::Ru106, 2), (RuType::Ru242, 1)];

const RUS_40MHZ: [(RuType, usize); 5] = [
    (RuType::Ru26, 18),
    (RuType::Ru52, 8),
    (RuType::Ru106, 4),
    (RuType::Ru242, 2),
    (RuType::Ru484, 1),
];

const RUS_80MHZ: [(RuType, usize); 6] = [
    (RuType::Ru26, 37),
    (RuType::Ru52, 16),
    (RuType::Ru106, 8),
    (RuType::Ru242, 4),
    (RuType::Ru484, 2),
    (RuType::Ru996, 1),
];

/// RU multiplicities of a single 80 MHz or narrower segment. 160 MHz is two 80 MHz segments.
fn segment_table(bw: ChannelWidth) -> &'static [(RuType, usize)] {
    match bw {
        ChannelWidth::Mhz20 => &RUS_20MHZ,
        ChannelWidth::Mhz40 => &RUS_40MHZ,
        ChannelWidth::Mhz80 | ChannelWidth::Mhz160 => &RUS_80MHZ,
    }
}

/// Number of RUs of type `ru` in the whole channel, or None if the type doesn't exist at this width
pub fn num_rus(bw: ChannelWidth, ru: RuType) -> Option<usize> {
    if ru == RuType::Ru2x996 {
        return if bw == ChannelWidth::Mhz160 { Some(1) } else { None };
    }
    let per_segment = segment_table(bw).iter().find(|(t, _)| *t == ru).map(|(_, n)| *n)?;
    Some(if bw == ChannelWidth::Mhz160 { 2 * per_segment } else { per_segment })
}

/// Number of RUs of type `ru` within one 80 MHz segment (or the whole channel below 160 MHz)
pub fn num_rus_per_segment(bw: ChannelWidth, ru: RuType) -> Option<usize> {
    if ru == RuType::Ru2x996 {
        return None;
    }
    segment_table(bw).iter().find(|(t, _)| *t == ru).map(|(_, n)| *n)
}

/// Given the channel width and the number of candidate stations, returns the narrowest RU type
/// such that every granted station gets an RU of that same size, together with the number of
/// stations granted. The granted count is in 1..=n_candidates.
pub fn number_and_type_of_rus(bw: ChannelWidth, n_candidates: usize) -> (RuType, usize) {
    assert!(n_candidates >= 1, "number_and_type_of_rus: no candidates");

    let factor = if bw == ChannelWidth::Mhz160 { 2 } else { 1 };
    for &(ru, per_segment) in segment_table(bw) {
        let n_rus = factor * per_segment;
        if n_rus <= n_candidates {
            tracing::trace!("number_and_type_of_rus: {} {} candidates -> {} x {}", bw, n_candidates, n_rus, ru);
            return (ru, n_rus);
        }
    }

    // Only a single station on 160 MHz gets here
    assert!(
        bw == ChannelWidth::Mhz160 && n_candidates == 1,
        "number_and_type_of_rus: nothing fits {} with {} candidates",
        bw,
        n_candidates
    );
    (RuType::Ru2x996, 1)
}

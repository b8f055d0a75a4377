use ofdma_core::{
    AcIndex, BlockAckType, Mpdu, SchedErr, TriggerFrame, TriggerType, TxParams, TxTime, UlMuAckSequence,
};

use crate::candidates::{CandidateWalk, DlPerStaInfo, resolve_cursor};
use crate::env::SchedEnv;
use crate::ru_table::number_and_type_of_rus;
use crate::tx_builder::RuAssignment;
use crate::{MU_BAR_MAX_MCS, OfdmaScheduler, TxFormat};

/// Buffer status values with a special meaning
const BUFFER_STATUS_UNKNOWN: u8 = 255;
const BUFFER_STATUS_UNBOUNDED: u8 = 254;
/// Unit of the buffer status, bytes
const BUFFER_STATUS_UNIT: u32 = 256;

/// Bitmap length of the per-station info of a Multi-STA BlockAck
const MULTI_STA_BA_BITMAP_LEN: u16 = 32;

/// HE TB PPDU duration assumed when computing the response time of an UL exchange.
/// It is subtracted again from the result.
const UL_ASSUMED_DURATION: TxTime = TxTime::from_millis(1);

impl OfdmaScheduler {
    /// Selects the format of the next transmission, given that the AP gained channel access
    /// to send `mpdu`. On DL_OFDMA the candidates are ready for compute_dl_ofdma_info; on
    /// UL_OFDMA the trigger is ready for compute_ul_ofdma_info.
    pub fn select_tx_format<E: SchedEnv + ?Sized>(&mut self, env: &E, mpdu: &Mpdu) -> Result<TxFormat, SchedErr> {
        self.op += 1;
        if mpdu.tid > 7 {
            return Err(SchedErr::InvalidMpdu { tid: mpdu.tid });
        }
        self.mpdu = Some(*mpdu);

        let format = self.decide(env, mpdu)?;
        tracing::debug!(op = self.op, "-> {} ({} candidates, cursor {:?})", format, self.candidates.len(), self.cursor);
        self.last_format = Some(format);
        Ok(format)
    }

    fn decide<E: SchedEnv + ?Sized>(&mut self, env: &E, mpdu: &Mpdu) -> Result<TxFormat, SchedErr> {
        if self.cfg.enable_ul_ofdma && self.last_format == Some(TxFormat::DlOfdma) {
            if let Some(format) = self.try_ul_ofdma(env, mpdu)? {
                return Ok(format);
            }
        }
        Ok(self.try_dl_ofdma(env, mpdu))
    }

    /// Format returned when no DL MU PPDU can be built. Nobody is served, so the held
    /// vector is emptied and no UL follow-up is solicited at the next opportunity.
    fn dl_fallback(&mut self) -> TxFormat {
        self.tx_vector.he_mu_user_info.clear();
        if self.cfg.force_dl_ofdma {
            TxFormat::DlOfdma
        } else {
            TxFormat::NonOfdma
        }
    }

    ///////// UPLINK FOLLOW-UP /////////

    /// Tries to solicit HE TB PPDUs from the stations served by the previous DL MU PPDU.
    /// Returns None if the stations have nothing to send and DL OFDMA should be tried instead.
    fn try_ul_ofdma<E: SchedEnv + ?Sized>(&mut self, env: &E, mpdu: &Mpdu) -> Result<Option<TxFormat>, SchedErr> {
        if self.cfg.ul_psdu_size == 0 {
            return Err(SchedErr::InvalidConfig {
                field: "ul_psdu_size",
                reason: "must be non-zero when UL OFDMA is enabled",
            });
        }

        let ac = AcIndex::from_tid(mpdu.tid);
        let ul_ack_sequence = env.ack_sequence_for_ul_mu(ac);
        if ul_ack_sequence != UlMuAckSequence::MultiStaBlockAck {
            return Err(SchedErr::UnsupportedUlAckSequence(ul_ack_sequence));
        }

        if self.tx_vector.he_mu_user_info.is_empty() {
            tracing::debug!("previous DL MU PPDU served no station, trying DL OFDMA");
            return Ok(None);
        }

        let mut params = TxParams::new();
        params.set_ul_mu_ack_sequence(ul_ack_sequence);
        for aid in self.tx_vector.aids() {
            match env.addr_of(aid) {
                Some(addr) => params.enable_block_ack(
                    addr,
                    BlockAckType::MultiSta { bitmap_lens: vec![MULTI_STA_BA_BITMAP_LEN] },
                ),
                None => tracing::warn!("station with AID {} left the BSS since the last DL MU PPDU?", aid),
            }
        }

        let mut trigger = TriggerFrame::from_tx_vector(TriggerType::Basic, &self.tx_vector);

        // Limited by the max PPDU duration
        let mut max_duration = env.ppdu_max_time(self.tx_vector.preamble);

        let max_buffer_size = self.max_buffer_size(env);
        if max_buffer_size == 0 {
            tracing::debug!("no buffered UL data, trying DL OFDMA");
            return Ok(None);
        }

        if env.txop_limit(ac).is_strictly_positive() {
            let assumed_length = env.he_tb_duration_to_lsig_length(UL_ASSUMED_DURATION);
            trigger.set_ul_length(assumed_length);

            let response = env.response_duration(&params, &self.tx_vector, Some(&trigger))
                + env.trigger_tx_duration(&trigger)
                - env.lsig_length_to_he_tb_duration(assumed_length, &self.tx_vector);

            let remaining = env.txop_remaining(ac);
            if response > remaining {
                // Nothing is sent now, the UL exchange is retried next time
                tracing::debug!("remaining TXOP {} too short for UL MU exchange ({})", remaining, response);
                self.candidates.clear();
                return Ok(Some(TxFormat::DlOfdma));
            }
            max_duration = max_duration.min(remaining - response);
        }

        let first_aid = trigger.first_aid();
        let buffer_tx_time = env.tx_duration(max_buffer_size, &self.tx_vector, first_aid);
        if buffer_tx_time < max_duration {
            max_duration = buffer_tx_time;
        } else {
            // Give up for now if not even ul_psdu_size bytes fit
            let min_duration = env.tx_duration(self.cfg.ul_psdu_size, &self.tx_vector, first_aid);
            if max_duration < min_duration {
                tracing::debug!("available time {} is too short, need {}", max_duration, min_duration);
                self.candidates.clear();
                return Ok(Some(TxFormat::DlOfdma));
            }
        }

        tracing::debug!("HE TB PPDU duration {}", max_duration);
        self.tx_vector.length = env.he_tb_duration_to_lsig_length(max_duration);
        self.tx_params = params;
        self.ul_duration = max_duration;
        Ok(Some(TxFormat::UlOfdma))
    }

    /// Largest amount of data, in bytes, the stations of the held TX vector reported as buffered
    fn max_buffer_size<E: SchedEnv + ?Sized>(&self, env: &E) -> u32 {
        let mut max_buffer_size = 0u32;
        for aid in self.tx_vector.aids() {
            let Some(addr) = env.addr_of(aid) else {
                tracing::warn!("station with AID {} left the BSS since the last DL MU PPDU?", aid);
                continue;
            };
            match env.max_buffer_status(addr) {
                BUFFER_STATUS_UNKNOWN => {
                    tracing::debug!("buffer status of {} is unknown", addr);
                    max_buffer_size = max_buffer_size.max(self.cfg.ul_psdu_size);
                }
                BUFFER_STATUS_UNBOUNDED => {
                    tracing::debug!("buffer status of {} is not limited", addr);
                    return u32::MAX;
                }
                queue_size => {
                    tracing::debug!("buffer status of {} is {}", addr, queue_size);
                    max_buffer_size = max_buffer_size.max(queue_size as u32 * BUFFER_STATUS_UNIT);
                }
            }
        }
        max_buffer_size
    }

    ///////// DOWNLINK /////////

    fn try_dl_ofdma<E: SchedEnv + ?Sized>(&mut self, env: &E, mpdu: &Mpdu) -> TxFormat {
        self.candidates.clear();

        let sta_list = env.sta_list();
        let Some(start) = resolve_cursor(&sta_list, self.cursor) else {
            tracing::debug!("no associated stations");
            return self.dl_fallback();
        };
        self.cursor = Some(sta_list[start].aid);

        let primary_ac = AcIndex::from_tid(mpdu.tid);
        let n_stations = self.cfg.n_stations as usize;
        let (ru_type, count) = number_and_type_of_rus(env.channel_width(), n_stations);

        // Best guess before the walk: the AP has frames for the starting station and those following it
        let guess: Vec<_> = (0..count.min(sta_list.len()))
            .map(|i| sta_list[(start + i) % sta_list.len()])
            .map(|sta| (sta.addr, DlPerStaInfo { aid: sta.aid, tid: mpdu.tid }))
            .collect();

        self.dl_ack_sequence = env.ack_sequence_for_dl_mu(primary_ac);
        self.init_tx_vector_and_params(env, mpdu, &guess, RuAssignment::Uniform(ru_type), self.dl_ack_sequence);

        // If the AC holds a TXOP, frames must fit in what is left of it after the ack sequence
        let budget = if env.txop_limit(primary_ac).is_strictly_positive() {
            let trigger = if self.dl_ack_sequence.needs_trigger() {
                let mut t = TriggerFrame::from_tx_vector_capped(TriggerType::MuBar, &self.tx_vector, MU_BAR_MAX_MCS);
                t.set_ul_length(env.ul_length_for_block_acks(&t, &self.tx_params));
                Some(t)
            } else {
                None
            };
            let budget = env.txop_remaining(primary_ac)
                - env.response_duration(&self.tx_params, &self.tx_vector, trigger.as_ref());
            if budget.is_negative() {
                tracing::debug!("not enough TXOP remaining time");
                return self.dl_fallback();
            }
            Some(budget)
        } else {
            None
        };

        let walk = CandidateWalk {
            sta_list: &sta_list,
            start,
            mpdu,
            ru_type,
            budget,
            max_stations: n_stations,
        };
        let next = walk.run(env, &mut self.candidates);

        if self.candidates.is_empty() {
            tracing::debug!("no suitable frames to transmit");
            return self.dl_fallback();
        }

        self.cursor = Some(sta_list[next].aid);
        TxFormat::DlOfdma
    }
}

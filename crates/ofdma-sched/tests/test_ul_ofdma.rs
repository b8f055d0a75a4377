mod common;

use common::{SchedTest, default_test_config, stations_with_traffic};
use ofdma_core::{
    AcIndex, BlockAckType, ChannelWidth, MacAddr, SchedErr, TriggerType, TxTime, UlMuAckSequence, debug,
};
use ofdma_sched::TxFormat;
use ofdma_sched::env::TimingOracle;
use ofdma_sched::sim_env::{PPDU_MAX_TIME, SimEnv, SimStation};

/// Stations 1..=n with DL traffic, all reporting the same buffer status
fn reporting_stations(n: u16, buffer_status: u8) -> Vec<SimStation> {
    stations_with_traffic(n, 2, 1000).into_iter().map(|s| s.with_buffer_status(buffer_status)).collect()
}

#[test]
fn test_unbounded_buffers_get_max_ppdu_time() {
    debug::setup_logging_verbose();
    let env = SimEnv::with_stations(ChannelWidth::Mhz20, reporting_stations(4, 254));
    let mut test = SchedTest::new(default_test_config(), env);

    let (format, _) = test.dl_round(0);
    assert_eq!(format, TxFormat::DlOfdma);

    assert_eq!(test.select(0), Ok(TxFormat::UlOfdma));
    let ul = test.sched.compute_ul_ofdma_info(&test.env);
    assert_eq!(ul.duration, PPDU_MAX_TIME);
    assert_eq!(ul.trigger.trigger_type, TriggerType::Basic);
    assert_eq!(ul.trigger.ul_length, test.env.he_tb_duration_to_lsig_length(PPDU_MAX_TIME));
    assert_eq!(ul.trigger.users.len(), 4);
    assert!(ul.trigger.users.iter().all(|u| u.target_rssi == Some(-70)));

    assert_eq!(ul.params.ul_mu_ack_sequence, Some(UlMuAckSequence::MultiStaBlockAck));
    assert_eq!(ul.params.block_acks.len(), 4);
    assert!(
        ul.params
            .block_acks
            .iter()
            .all(|(_, ba)| *ba == BlockAckType::MultiSta { bitmap_lens: vec![32] })
    );

    // UL and DL alternate
    test.env.complete_ul(&ul);
    assert_eq!(test.select(0), Ok(TxFormat::DlOfdma));
}

#[test]
fn test_bounded_buffer_sets_duration() {
    debug::setup_logging_verbose();
    // 4 units of 256 bytes
    let env = SimEnv::with_stations(ChannelWidth::Mhz20, reporting_stations(4, 4));
    let mut test = SchedTest::new(default_test_config(), env);

    let (_, dl) = test.dl_round(0);
    assert_eq!(test.select(0), Ok(TxFormat::UlOfdma));
    let ul = test.sched.compute_ul_ofdma_info(&test.env);

    let expected = test.env.tx_duration(1024, &dl.tx_vector, Some(1));
    assert_eq!(ul.duration, expected);
    assert!(ul.duration < PPDU_MAX_TIME);
    assert_eq!(ul.trigger.ul_length, test.env.he_tb_duration_to_lsig_length(expected));
}

#[test]
fn test_unknown_buffer_uses_ul_psdu_size() {
    debug::setup_logging_verbose();
    let env = SimEnv::with_stations(ChannelWidth::Mhz20, reporting_stations(2, 255));
    let mut test = SchedTest::new(default_test_config(), env);

    let (_, dl) = test.dl_round(0);
    assert_eq!(test.select(0), Ok(TxFormat::UlOfdma));
    let ul = test.sched.compute_ul_ofdma_info(&test.env);
    assert_eq!(ul.duration, test.env.tx_duration(500, &dl.tx_vector, Some(1)));
}

#[test]
fn test_no_buffered_data_goes_back_to_dl() {
    debug::setup_logging_verbose();
    let env = SimEnv::with_stations(ChannelWidth::Mhz20, reporting_stations(4, 0));
    let mut test = SchedTest::new(default_test_config(), env);

    test.dl_round(0);
    let (format, info) = test.dl_round(0);
    assert_eq!(format, TxFormat::DlOfdma);
    assert_eq!(info.sta_info.len(), 4);
}

#[test]
fn test_ul_disabled() {
    debug::setup_logging_verbose();
    let env = SimEnv::with_stations(ChannelWidth::Mhz20, reporting_stations(4, 254));
    let cfg = ofdma_config::CfgScheduler { enable_ul_ofdma: false, ..default_test_config() };
    let mut test = SchedTest::new(cfg, env);

    test.dl_round(0);
    assert_eq!(test.select(0), Ok(TxFormat::DlOfdma));
}

#[test]
fn test_departed_station_not_acknowledged() {
    debug::setup_logging_verbose();
    let env = SimEnv::with_stations(ChannelWidth::Mhz20, reporting_stations(4, 254));
    let mut test = SchedTest::new(default_test_config(), env);

    test.dl_round(0);
    test.env.remove_station(2);

    assert_eq!(test.select(0), Ok(TxFormat::UlOfdma));
    let ul = test.sched.compute_ul_ofdma_info(&test.env);
    assert_eq!(ul.params.block_acks.len(), 3);
    assert!(!ul.params.expects_block_ack(&MacAddr::local(2)));
    assert!(ul.params.expects_block_ack(&MacAddr::local(3)));
}

#[test]
fn test_zero_ul_psdu_size_is_rejected() {
    debug::setup_logging_verbose();
    let env = SimEnv::with_stations(ChannelWidth::Mhz20, reporting_stations(2, 254));
    let cfg = ofdma_config::CfgScheduler { ul_psdu_size: 0, ..default_test_config() };
    let mut test = SchedTest::new(cfg, env);

    test.dl_round(0);
    let err = test.select(0).unwrap_err();
    assert!(matches!(err, SchedErr::InvalidConfig { field: "ul_psdu_size", .. }));
}

#[test]
fn test_unsupported_ul_ack_sequence() {
    debug::setup_logging_verbose();
    let mut env = SimEnv::with_stations(ChannelWidth::Mhz20, reporting_stations(2, 254));
    env.ul_ack_sequence = UlMuAckSequence::DlMuBlockAck;
    let mut test = SchedTest::new(default_test_config(), env);

    test.dl_round(0);
    assert_eq!(
        test.select(0),
        Err(SchedErr::UnsupportedUlAckSequence(UlMuAckSequence::DlMuBlockAck))
    );
}

#[test]
fn test_short_txop_retries_ul() {
    debug::setup_logging_verbose();
    let mut env = SimEnv::with_stations(ChannelWidth::Mhz20, reporting_stations(4, 254));
    env.set_txop(AcIndex::Be, TxTime::from_millis(5), TxTime::from_millis(5));
    let mut test = SchedTest::new(default_test_config(), env);
    test.dl_round(0);

    // Not even the trigger and the Multi-STA BlockAck fit
    test.env.set_txop(AcIndex::Be, TxTime::from_millis(5), TxTime::from_micros(50));
    assert_eq!(test.select(0), Ok(TxFormat::DlOfdma));
    assert!(test.sched.candidates().is_empty());
    assert!(test.sched.compute_dl_ofdma_info(&test.env).sta_info.is_empty());

    // Next opportunity tries UL again, and the HE TB PPDU must fit the TXOP
    test.env.set_txop(AcIndex::Be, TxTime::from_millis(5), TxTime::from_millis(5));
    assert_eq!(test.select(0), Ok(TxFormat::UlOfdma));
    let ul = test.sched.compute_ul_ofdma_info(&test.env);
    assert!(ul.duration < TxTime::from_millis(5));
    assert!(ul.duration > TxTime::from_millis(4));
}

#[test]
fn test_forced_empty_dl_solicits_no_ul() {
    debug::setup_logging_verbose();
    // Stations report UL data but the AP has nothing queued for them
    let env = SimEnv::with_stations(ChannelWidth::Mhz20, (1..=4).map(|aid| SimStation::new(aid).with_buffer_status(254)));
    let cfg = ofdma_config::CfgScheduler { force_dl_ofdma: true, ..default_test_config() };
    let mut test = SchedTest::new(cfg, env);

    assert_eq!(test.select(0), Ok(TxFormat::DlOfdma));
    assert!(test.sched.candidates().is_empty());
    assert!(test.sched.compute_dl_ofdma_info(&test.env).sta_info.is_empty());

    // Nobody was served, so nobody is triggered
    assert_eq!(test.select(0), Ok(TxFormat::DlOfdma));
    assert!(test.sched.candidates().is_empty());
}

#[test]
fn test_ul_follow_up_only_after_served_dl() {
    debug::setup_logging_verbose();
    let env = SimEnv::with_stations(ChannelWidth::Mhz20, reporting_stations(4, 0));
    let cfg = ofdma_config::CfgScheduler { force_dl_ofdma: true, ..default_test_config() };
    let mut test = SchedTest::new(cfg, env);

    // Drain the DL queues
    while !test.dl_round(0).1.sta_info.is_empty() {}

    for aid in 1..=4 {
        test.env.station_mut(aid).unwrap().buffer_status = 254;
    }
    assert_eq!(test.select(0), Ok(TxFormat::DlOfdma));
    assert!(test.sched.candidates().is_empty());

    // A served DL MU PPDU brings the UL follow-up back
    for aid in 1..=4 {
        test.env.enqueue(aid, 0, 1000);
    }
    let (_, info) = test.dl_round(0);
    assert_eq!(info.sta_info.len(), 4);
    assert_eq!(test.select(0), Ok(TxFormat::UlOfdma));
    assert_eq!(test.sched.compute_ul_ofdma_info(&test.env).trigger.users.len(), 4);
}

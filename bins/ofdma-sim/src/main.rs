use clap::Parser;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use ofdma_config::{OfdmaConfig, toml_config};
use ofdma_core::{Aid, Mpdu, Tid, debug};
use ofdma_sched::env::{MacQueues, StationDirectory};
use ofdma_sched::sim_env::{SimEnv, SimStation};
use ofdma_sched::{OfdmaScheduler, TxFormat};

/// TIDs the traffic generator draws from, best effort weighted heaviest
const TRAFFIC_TIDS: [Tid; 6] = [0, 0, 0, 1, 5, 6];

/// Load configuration file
fn load_config_from_toml(cfg_path: &str) -> OfdmaConfig {
    match toml_config::from_file(cfg_path) {
        Ok(c) => c,
        Err(e) => {
            println!("Failed to load configuration from {}: {}", cfg_path, e);
            std::process::exit(1);
        }
    }
}

/// Associates `n` stations with random link conditions and a few queued frames each
fn build_bss(cfg: &OfdmaConfig, n: u16, rng: &mut StdRng) -> SimEnv {
    let mut env = SimEnv::from_config(cfg);
    for aid in 1..=n {
        let mut sta = SimStation::new(aid)
            .with_mcs(rng.random_range(0..=11))
            .with_channel_quality(rng.random_range(0.1..1.0));
        sta.target_rssi = rng.random_range(-80..=-50);
        for _ in 0..rng.random_range(0..4) {
            sta = sta.with_frame(TRAFFIC_TIDS[rng.random_range(0..TRAFFIC_TIDS.len())], rng.random_range(100..=1500));
        }
        env.add_station(sta);
    }
    env
}

/// New DL arrivals and fresh buffer status reports
fn generate_traffic(env: &mut SimEnv, rng: &mut StdRng) {
    for sta in env.sta_list() {
        if rng.random_bool(0.5) {
            let tid = TRAFFIC_TIDS[rng.random_range(0..TRAFFIC_TIDS.len())];
            env.enqueue(sta.aid, tid, rng.random_range(100..=1500));
        }
        if let Some(s) = env.station_mut(sta.aid) {
            s.buffer_status = if rng.random_bool(0.1) { 254 } else { rng.random_range(0..8) };
        }
    }
}

/// Frame the AP contends for: the first queued frame, starting the search at station `offset`
fn next_access(env: &SimEnv, offset: usize) -> Option<Mpdu> {
    let stas = env.sta_list();
    (0..stas.len())
        .map(|i| stas[(offset + i) % stas.len()])
        .find_map(|sta| (0..8).find_map(|tid| env.peek_next_frame(tid, sta.addr)))
}

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "802.11ax OFDMA scheduler simulator",
    long_about = "Runs the round robin OFDMA scheduler against a simulated BSS and prints every decision"
)]
struct Args {
    /// Config file, defaults are used if omitted
    #[arg(help = "TOML config with scheduler/PHY parameters")]
    config: Option<String>,

    /// Number of associated stations
    #[arg(short, long, default_value_t = 8)]
    stations: u16,

    /// Number of channel access opportunities to simulate
    #[arg(short, long, default_value_t = 20)]
    opportunities: u64,

    /// Seed of the traffic generator
    #[arg(long, default_value_t = 1)]
    seed: u64,
}

fn main() {
    let args = Args::parse();
    let cfg = match args.config {
        Some(ref path) => load_config_from_toml(path),
        None => OfdmaConfig::default(),
    };
    let _log_guard = debug::setup_logging_default(cfg.debug_log.clone());

    eprintln!(" -> {} stations, {} MHz, {} opportunities", args.stations, cfg.phy.channel_width.mhz(), args.opportunities);

    let mut rng = StdRng::seed_from_u64(args.seed);
    let mut env = build_bss(&cfg, args.stations, &mut rng);
    let mut sched = OfdmaScheduler::new(cfg.sched.clone());
    let mut counts = [0u64; 3];

    for op in 0..args.opportunities {
        generate_traffic(&mut env, &mut rng);
        let Some(mpdu) = next_access(&env, op as usize) else {
            println!("op {:>4}  idle", op);
            continue;
        };

        let format = match sched.select_tx_format(&env, &mpdu) {
            Ok(f) => f,
            Err(e) => {
                println!("Scheduler error: {}", e);
                std::process::exit(1);
            }
        };

        match format {
            TxFormat::DlOfdma => {
                counts[0] += 1;
                let info = sched.compute_dl_ofdma_info(&env);
                let users: Vec<String> = info
                    .sta_info
                    .iter()
                    .filter_map(|(_, i)| info.tx_vector.user(i.aid).map(|u| format!("{}:{}/mcs{}", i.aid, u.ru, u.mcs)))
                    .collect();
                println!("op {:>4}  {:<9} [{}] next {:?}", op, format, users.join(" "), sched.cursor());
                env.complete_dl(&info);
            }
            TxFormat::UlOfdma => {
                counts[1] += 1;
                let info = sched.compute_ul_ofdma_info(&env);
                let aids: Vec<Aid> = info.trigger.users.iter().map(|u| u.aid12).collect();
                println!("op {:>4}  {:<9} {:?} for {}", op, format, aids, info.duration);
                env.complete_ul(&info);
            }
            TxFormat::NonOfdma => {
                counts[2] += 1;
                println!("op {:>4}  {:<9} {} tid {} {} bytes", op, format, mpdu.receiver, mpdu.tid, mpdu.size);
                env.complete_su(&mpdu);
            }
        }
    }

    println!("DL_OFDMA {} UL_OFDMA {} NON_OFDMA {}", counts[0], counts[1], counts[2]);
}

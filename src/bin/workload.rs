//! CLI workload driver, ported from `testpf_workload.c`.
//!
//! `workload <lru|mru> <write_mix>` runs a fixed-size random-access
//! workload against a 100-page file through a 20-frame buffer pool and
//! prints one CSV row: `strategy,write_mix,logical,physical_reads,
//! physical_writes,total_physical,hit_rate`.

use std::env;
use std::process::ExitCode;

use pflayer::buffer::Strategy;
use pflayer::common::logging::init_tracing;
use pflayer::PagedFileManager;
use rand::Rng;

const FILE_PAGES: i32 = 100;
const BUFFER_SIZE: usize = 20;
const ACCESSES: usize = 10_000;

fn parse_args() -> Option<(Strategy, f64)> {
    let mut args = env::args().skip(1);
    let strategy = match args.next()?.as_str() {
        "lru" => Strategy::Lru,
        "mru" => Strategy::Mru,
        _ => return None,
    };
    let write_mix: f64 = args.next()?.parse().ok()?;
    if !(0.0..=1.0).contains(&write_mix) {
        return None;
    }
    Some((strategy, write_mix))
}

fn main() -> ExitCode {
    init_tracing();

    let Some((strategy, write_mix)) = parse_args() else {
        eprintln!("usage: workload <lru|mru> <write_mix in [0,1]>");
        return ExitCode::FAILURE;
    };

    let path = env::temp_dir().join(format!("pflayer_workload_{}.db", std::process::id()));
    let _ = std::fs::remove_file(&path);

    let mut pf = PagedFileManager::new();
    pf.set_buffer_size(BUFFER_SIZE);
    pf.set_strategy(strategy);
    pf.create(&path).expect("create scratch file");
    let fd = pf.open(&path).expect("open scratch file");

    for _ in 0..FILE_PAGES {
        let (page_num, _frame) = pf.alloc(fd).expect("alloc page");
        pf.unfix(fd, page_num, false).expect("unfix freshly allocated page");
    }

    pf.reset_stats();

    let mut rng = rand::thread_rng();
    for _ in 0..ACCESSES {
        let page_num = rng.gen_range(0..FILE_PAGES);
        let frame = pf.fix_this(fd, page_num).expect("fix page");
        let dirty = rng.gen_bool(write_mix);
        if dirty {
            let byte = frame.get_data()[0];
            frame.get_data_mut()[0] = byte.wrapping_add(1);
        }
        pf.unfix(fd, page_num, dirty).expect("unfix page");
    }

    let (logical, physical_reads, physical_writes) = pf.get_stats();
    pf.close(fd).expect("close scratch file");
    let _ = pf.destroy(&path);

    let total_physical = physical_reads + physical_writes;
    let hit_rate = if logical > 0 {
        (logical - physical_reads) as f64 / logical as f64
    } else {
        0.0
    };

    let strategy_name = match strategy {
        Strategy::Lru => "lru",
        Strategy::Mru => "mru",
    };
    println!(
        "{strategy_name},{write_mix},{logical},{physical_reads},{physical_writes},{total_physical},{hit_rate:.4}"
    );

    ExitCode::SUCCESS
}

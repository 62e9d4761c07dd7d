use anyhow::{bail, Context};
use cachesim::cache::{HierarchyConfig, LevelConfig};
use cachesim::sim::config::{Config, SimConfig};
use cachesim::sim::report::write_summary_json;
use cachesim::sim::top::Sim;
use cachesim::sim::trace::TraceReader;
use cachesim::traffic::{PatternEngine, TrafficConfig};
use clap::Parser;
use log::info;
use std::convert::Infallible;
use std::fs;
use std::path::PathBuf;
use toml::Table;

#[derive(Parser)]
#[command(version, about)]
struct CachesimArgs {
    #[arg(help = "Path to config.toml")]
    config_path: Option<PathBuf>,
    #[arg(long, help = "Override trace path (- reads stdin)")]
    trace: Option<PathBuf>,
    #[arg(long, help = "Override I$ as sets:assoc:hit_time")]
    icache: Option<LevelConfig>,
    #[arg(long, help = "Override D$ as sets:assoc:hit_time")]
    dcache: Option<LevelConfig>,
    #[arg(long, help = "Override L2$ as sets:assoc:hit_time")]
    l2cache: Option<LevelConfig>,
    #[arg(long, help = "Override whether L2 is inclusive of the L1s")]
    inclusive: Option<bool>,
    #[arg(long, help = "Override block size in bytes")]
    blocksize: Option<u64>,
    #[arg(long, help = "Override main memory latency in cycles")]
    memspeed: Option<u64>,
    #[arg(long, help = "Write the final statistics as JSON")]
    stats_json: Option<PathBuf>,
    #[arg(long, help = "Enable log at level (0:none, 1:info, 2:debug)")]
    log: Option<u64>,
    #[arg(long, help = "Suppress the text report")]
    quiet: Option<bool>,
}

fn init_logger(level: u64) {
    let filter = match level {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();
}

fn load_table(path: Option<&PathBuf>) -> anyhow::Result<Table> {
    let Some(path) = path else {
        return Ok(Table::new());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("cannot parse config toml {}", path.display()))
}

pub fn main() -> anyhow::Result<()> {
    let argv = CachesimArgs::parse();
    let config_table = load_table(argv.config_path.as_ref())?;

    // logger first so section fallbacks are reported
    let log_level = argv
        .log
        .or_else(|| SimConfig::peek_log_level(&config_table))
        .unwrap_or_default();
    init_logger(log_level);

    let mut sim_config = SimConfig::load(&config_table).context("[sim]")?;
    sim_config.log_level = log_level;
    let mut cache_config = HierarchyConfig::load(&config_table).context("[cache]")?;
    let traffic_config = TrafficConfig::load(&config_table).context("[traffic]")?;

    // override toml configs with argv
    sim_config.trace = argv.trace.or(sim_config.trace);
    sim_config.stats_json = argv.stats_json.or(sim_config.stats_json);
    sim_config.quiet = argv.quiet.unwrap_or(sim_config.quiet);
    cache_config.icache = argv.icache.unwrap_or(cache_config.icache);
    cache_config.dcache = argv.dcache.unwrap_or(cache_config.dcache);
    cache_config.l2cache = argv.l2cache.unwrap_or(cache_config.l2cache);
    cache_config.inclusive = argv.inclusive.unwrap_or(cache_config.inclusive);
    cache_config.block_size = argv.blocksize.unwrap_or(cache_config.block_size);
    cache_config.mem_speed = argv.memspeed.unwrap_or(cache_config.mem_speed);

    let mut sim = Sim::new(&cache_config)?;
    let summary = if let Some(path) = &sim_config.trace {
        info!("replaying trace {}", path.display());
        let reader = TraceReader::open(path)
            .with_context(|| format!("cannot open trace {}", path.display()))?;
        sim.run(reader)
            .with_context(|| format!("bad trace {}", path.display()))?
    } else if traffic_config.enabled {
        let engine = PatternEngine::new(&traffic_config)?;
        info!("replaying {} synthetic traffic patterns", engine.len());
        sim.run(engine.records().map(Ok::<_, Infallible>))?
    } else {
        bail!("no trace given: pass --trace or enable [traffic] in the config");
    };

    if !sim_config.quiet {
        println!("{summary}");
    }
    if let Some(path) = &sim_config.stats_json {
        write_summary_json(path, &summary)?;
    }
    Ok(())
}

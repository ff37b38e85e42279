// Quickesc CLI
// Replays key event traces through the quick-escape engine

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};

use quickesc_core::output::RecordingHost;
use quickesc_core::{parse_trace, replay, Config, ProcessResult, Tick, TraceEvent};

/// Quick-escape key simulator
#[derive(Parser, Debug)]
#[command(name = "quickesc")]
#[command(version)]
#[command(about = "Replay key traces through the quick-escape tap/hold engine", long_about = None)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Event trace to replay ("-" reads stdin)
    #[arg(short, long, value_name = "TRACE")]
    trace: Option<PathBuf>,

    /// Width of the simulated millisecond counter
    #[arg(long, value_enum, default_value_t = TimerBits::Bits32)]
    timer_bits: TimerBits,

    /// Also print the low-level key reports
    #[arg(short, long)]
    reports: bool,

    /// Validate config and exit
    #[arg(long)]
    check_config: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum TimerBits {
    #[value(name = "16")]
    Bits16,
    #[value(name = "32")]
    Bits32,
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .try_init();
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::from_toml_path(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(Config::default()),
    }
}

fn read_trace(path: &Path) -> Result<Vec<TraceEvent>> {
    let input = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read trace from stdin")?;
        buf
    } else {
        fs::read_to_string(path)
            .with_context(|| format!("failed to read trace {}", path.display()))?
    };
    let events = parse_trace(&input).with_context(|| format!("in trace {}", path.display()))?;
    Ok(events)
}

fn print_config(config: &Config) {
    println!("Configuration is valid");
    println!("  trigger:    {}", config.trigger);
    println!("  timeout:    {}ms", config.tap.timeout_ms);
    println!("  policy:     {:?}", config.tap.policy);
    println!("  single tap: {}", config.tap.single_tap);
    println!("  repeat tap: {}", config.tap.repeat_tap);
    if config.overrides.is_empty() {
        println!("  overrides:  disabled");
    } else {
        println!("  overrides:");
        for rule in config.overrides.rules() {
            println!("    {}", rule);
        }
    }
}

fn format_result(result: &ProcessResult) -> String {
    match result {
        ProcessResult::Passthrough => "passthrough".to_string(),
        ProcessResult::Handled(None) => "handled".to_string(),
        ProcessResult::Handled(Some(emission)) => emission.to_string(),
    }
}

fn run<T: Tick>(config: &Config, events: &[TraceEvent], show_reports: bool) {
    let mut engine = config.build_engine::<T>();
    let mut host = RecordingHost::new();

    for step in replay(&mut engine, events, &mut host) {
        println!("{:<36} -> {}", step.event.to_string(), format_result(&step.result));
    }
    println!("final mode: {}", engine.mode());

    if show_reports {
        println!("reports:");
        for (key, action) in host.reports() {
            println!("  {} {}", action, key);
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = load_config(args.config.as_deref())?;

    if args.check_config {
        print_config(&config);
        return Ok(());
    }

    let Some(trace_path) = args.trace.as_deref() else {
        bail!("--trace is required unless --check-config is given");
    };
    let events = read_trace(trace_path)?;
    log::debug!("replaying {} events", events.len());

    match args.timer_bits {
        TimerBits::Bits16 => run::<u16>(&config, &events, args.reports),
        TimerBits::Bits32 => run::<u32>(&config, &events, args.reports),
    }
    Ok(())
}

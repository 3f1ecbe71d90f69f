use anyhow::{Context, Result, bail};
use callsched_core::{
    CallScheduler, Clock, FixedClock, LocalTimeKind, SystemClock, WallClockInput,
    Tz, classify_local_time, input_to_instant, instant_to_local, is_curated, offset_label,
    offset_minutes_at, parse_instant,
};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{Level, warn};

mod config;
mod state;

use config::{Config, load_config};

#[derive(Parser, Debug)]
#[command(
    name = "callsched",
    version,
    about = "Timezone-correct scheduling for outbound calls"
)]
struct Cli {
    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Freeze "now" at this epoch-millisecond value (reproducible output)
    #[arg(long, global = true)]
    now_ms: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert a local date/time in a zone to epoch milliseconds (UTC)
    ToUtc {
        #[arg(long)]
        date: String,
        #[arg(long)]
        time: String,
        /// IANA zone (default: config schedule.default_timezone)
        #[arg(long)]
        tz: Option<String>,
    },

    /// Render epoch milliseconds as local date/time in a zone
    ToLocal {
        #[arg(long)]
        ms: String,
        #[arg(long)]
        tz: Option<String>,
    },

    /// Check whether a local date/time is in the future and how DST treats it
    Check {
        #[arg(long)]
        date: String,
        #[arg(long)]
        time: String,
        #[arg(long)]
        tz: Option<String>,
    },

    /// Earliest selectable date (and time, if today)
    Min {
        #[arg(long)]
        tz: Option<String>,
    },

    /// Suggested default slot
    Default {
        #[arg(long)]
        tz: Option<String>,
    },

    /// Curated timezone list with current offsets
    Zones,

    /// Validate a call time and print the outbound record as JSON
    Draft {
        #[arg(long)]
        phone: String,
        #[arg(long)]
        date: String,
        #[arg(long)]
        time: String,
        #[arg(long)]
        tz: Option<String>,
    },

    /// Config file management
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write ~/.callsched/config.toml with defaults (no-op if present)
    Init,
    /// Print the effective config
    Show,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .with_writer(std::io::stderr)
        .init();

    let cfg = load_config()?;

    match cli.now_ms.as_deref() {
        Some(ms) => {
            let now = parse_instant(ms).context("--now-ms")?;
            run(cli.command, cli.json, &cfg, FixedClock(now))
        }
        None => run(cli.command, cli.json, &cfg, SystemClock),
    }
}

fn run<C: Clock>(command: Command, json: bool, cfg: &Config, clock: C) -> Result<()> {
    let scheduler = CallScheduler::with_policy(clock, cfg.policy());

    match command {
        Command::ToUtc { date, time, tz } => {
            let input = parse_input(cfg, &date, &time, tz.as_deref())?;
            let instant = input_to_instant(&input);
            if json {
                print_json(&serde_json::json!({
                    "scheduled_for": instant,
                    "utc": instant.to_string(),
                }))?;
            } else {
                println!("{} ({})", instant.as_millis(), instant);
            }
        }

        Command::ToLocal { ms, tz } => {
            let zone = cfg.zone(tz.as_deref())?;
            let instant = parse_instant(&ms).context("--ms")?;
            let local = instant_to_local(instant, zone)?;
            let offset = offset_minutes_at(zone, instant)?;
            if json {
                print_json(&serde_json::json!({
                    "date": local.date,
                    "time": local.time,
                    "zone": zone.name(),
                    "offset_minutes": offset,
                }))?;
            } else {
                println!("{} {} ({})", local, zone, offset_label(offset));
            }
        }

        Command::Check { date, time, tz } => {
            let input = parse_input(cfg, &date, &time, tz.as_deref())?;
            let future = scheduler.is_future_local(&input);
            let kind = classify_local_time(input.date, input.time, input.zone);
            let instant = input_to_instant(&input);
            if json {
                print_json(&serde_json::json!({
                    "future": future,
                    "local_time": kind,
                    "scheduled_for": instant,
                }))?;
            } else {
                println!("{} {} -> {}", input.wall_clock(), input.zone, instant);
                println!("future: {}", if future { "yes" } else { "no" });
                match kind {
                    LocalTimeKind::Unique => {}
                    LocalTimeKind::Ambiguous => println!(
                        "warning: this time occurs twice (DST fall-back); the earlier one was used"
                    ),
                    LocalTimeKind::Nonexistent => println!(
                        "warning: this time does not exist (DST spring-forward); it renders as {}",
                        instant_to_local(instant, input.zone)?
                    ),
                }
            }
        }

        Command::Min { tz } => {
            let zone = cfg.zone(tz.as_deref())?;
            let m = scheduler.minimum_schedulable(zone)?;
            if json {
                print_json(&m)?;
            } else {
                match m.min_time {
                    Some(t) => println!("{} from {} ({})", m.min_date, t, zone),
                    None => println!("{} any time ({})", m.min_date, zone),
                }
            }
        }

        Command::Default { tz } => {
            let zone = cfg.zone(tz.as_deref())?;
            let slot = scheduler.default_schedulable(zone)?;
            if json {
                print_json(&slot)?;
            } else {
                println!("{} ({}) = {}", slot.local, zone, slot.instant);
            }
        }

        Command::Zones => {
            let opts = scheduler.timezone_options()?;
            if json {
                print_json(&opts)?;
            } else {
                for o in &opts {
                    println!("{:<32} {}", o.zone, o.display_label());
                }
            }
        }

        Command::Draft { phone, date, time, tz } => {
            let zone = tz.unwrap_or_else(|| cfg.schedule.default_timezone.clone());
            if phone.trim().is_empty() {
                bail!("--phone must not be empty");
            }
            let draft = scheduler
                .validate_call_time(phone.trim(), &date, &time, &zone)
                .with_context(|| format!("scheduling {date} {time} in {zone}"))?;
            warn_if_uncurated(cfg.zone(Some(draft.timezone.as_str()))?);
            print_json(&draft)?;
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => {
                if json {
                    print_json(scheduler.policy())?;
                } else {
                    println!("# {}", config::config_path()?.display());
                    print!("{}", toml::to_string_pretty(cfg).context("serialize config")?);
                }
            }
        },
    }

    Ok(())
}

fn parse_input(cfg: &Config, date: &str, time: &str, tz: Option<&str>) -> Result<WallClockInput> {
    let zone = tz.unwrap_or(&cfg.schedule.default_timezone);
    let input = WallClockInput::parse(date, time, zone)
        .with_context(|| format!("parsing {date} {time} {zone}"))?;
    warn_if_uncurated(input.zone);
    Ok(input)
}

/// Valid IANA zones outside the picker list still convert; the dashboard just can't offer them.
fn warn_if_uncurated(zone: Tz) {
    if !is_curated(zone) {
        warn!(%zone, "timezone is not in the curated picker list");
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

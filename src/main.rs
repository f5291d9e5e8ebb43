#[cfg(unix)]
mod host;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

use scope_link::config::Config;
use scope_link::telescope;

#[derive(Parser)]
#[command(name = "scope-link")]
#[command(about = "Telescope position tracking client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check telescope definitions without connecting
    Validate { definitions: Vec<String> },
    /// Track telescopes and print their positions
    Watch {
        /// YAML configuration file
        #[arg(long)]
        config: Option<String>,
        /// Print one JSON object per telescope and report
        #[arg(long)]
        json: bool,
        /// Send every telescope to RA,DEC (degrees) once connected
        #[arg(long, value_parser = parse_goto, allow_hyphen_values = true)]
        goto: Option<GotoTarget>,
        /// Stop after this long (e.g. "30s"); runs until interrupted otherwise
        #[arg(long, value_parser = humantime::parse_duration)]
        duration: Option<std::time::Duration>,
        /// Additional telescope definitions, `name:type[:params]`
        definitions: Vec<String>,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { definitions } => validate(&definitions),
        Commands::Watch {
            config,
            json,
            goto,
            duration,
            definitions,
        } => {
            let mut config = match config {
                Some(path) => match Config::from_file(&path) {
                    Ok(c) => c,
                    Err(e) => {
                        eprintln!("Error reading config {}: {}", path, e);
                        return ExitCode::FAILURE;
                    }
                },
                None => Config::default(),
            };
            config.telescopes.extend(definitions);
            watch(&config, json, goto, duration)
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct GotoTarget {
    ra_deg: f64,
    dec_deg: f64,
}

fn parse_goto(s: &str) -> Result<GotoTarget, String> {
    let (ra, dec) = s
        .split_once(',')
        .ok_or_else(|| format!("expected RA,DEC in degrees, got {:?}", s))?;
    let ra: f64 = ra.trim().parse().map_err(|e| format!("bad RA: {}", e))?;
    let dec: f64 = dec.trim().parse().map_err(|e| format!("bad DEC: {}", e))?;
    if !(-90.0..=90.0).contains(&dec) {
        return Err(format!("DEC {} outside [-90, 90]", dec));
    }
    Ok(GotoTarget {
        ra_deg: ra,
        dec_deg: dec,
    })
}

fn validate(definitions: &[String]) -> ExitCode {
    let mut ok = true;
    for definition in definitions {
        match telescope::create(definition) {
            Ok(t) => println!("{}: valid {} telescope", definition, t.kind()),
            Err(e) => {
                println!("{}: {}", definition, e);
                ok = false;
            }
        }
    }
    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

#[cfg(unix)]
fn watch(
    config: &Config,
    json: bool,
    goto: Option<GotoTarget>,
    duration: Option<std::time::Duration>,
) -> ExitCode {
    use scope_link::report::TelescopeReport;
    use scope_link::{Clock, SystemClock, Telescope, Vec3};

    let mut telescopes: Vec<_> = config
        .telescopes
        .iter()
        .filter_map(|definition| telescope::create(definition).ok())
        .collect();
    if telescopes.is_empty() {
        eprintln!("No usable telescope definitions");
        return ExitCode::FAILURE;
    }

    let clock = SystemClock::new();
    let start = clock.now_micros();
    let stop_at = duration.map(|d| start.saturating_add(d.as_micros() as i64));
    let report_every = config.report_interval.as_micros() as i64;
    let target = goto.map(|g| Vec3::from_ra_dec(g.ra_deg.to_radians(), g.dec_deg.to_radians()));
    let mut goto_sent = vec![false; telescopes.len()];
    let mut next_report = start;

    log::info!("Watching {} telescope(s)", telescopes.len());

    loop {
        let now = clock.now_micros();
        if stop_at.is_some_and(|stop| now >= stop) {
            break;
        }

        let requests: Vec<_> = telescopes
            .iter_mut()
            .map(|t| t.prepare_readiness(now))
            .collect();
        let ready = host::wait(&requests, host::next_timeout(&requests, config.tick));
        for (telescope, result) in telescopes.iter_mut().zip(ready) {
            telescope.handle_readiness(result);
        }

        if let Some(target) = target {
            for (telescope, sent) in telescopes.iter_mut().zip(goto_sent.iter_mut()) {
                if !*sent && telescope.is_connected() {
                    telescope.go_to(target);
                    *sent = true;
                }
            }
        }

        let now = clock.now_micros();
        if now >= next_report {
            for telescope in &telescopes {
                let report = TelescopeReport::capture(telescope, now);
                if json {
                    match serde_json::to_string(&report) {
                        Ok(line) => println!("{}", line),
                        Err(e) => log::error!("Failed to serialize report: {}", e),
                    }
                } else {
                    println!("{}", report);
                }
            }
            next_report = now + report_every;
        }
    }

    ExitCode::SUCCESS
}

#[cfg(not(unix))]
fn watch(
    _config: &Config,
    _json: bool,
    _goto: Option<GotoTarget>,
    _duration: Option<std::time::Duration>,
) -> ExitCode {
    eprintln!("watch is only available on unix platforms");
    ExitCode::FAILURE
}

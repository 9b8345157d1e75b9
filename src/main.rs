use clap::{Parser, Subcommand, ValueEnum};
use std::process::ExitCode;
use std::time::Duration;

use leo_flyby::stream::{spawn_stream, StreamOptions, DEFAULT_CAPACITY};
use leo_flyby::{FlybyConfig, FlybyRecord, FlybySummary, OrbitConfig, Propagator};

#[derive(Parser)]
#[command(name = "leo-flyby")]
#[command(about = "Simulate a LEO satellite pass over a ground station")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a flyby configuration file
    Validate { config: String },
    /// Simulate a pass and print the timeline
    Run {
        config: String,
        /// Overrides simulation.duration_sec, e.g. "10m"
        #[arg(long, value_parser = humantime::parse_duration)]
        duration: Option<Duration>,
        /// Overrides simulation.time_step_sec, e.g. "1s" or "500ms"
        #[arg(long, value_parser = humantime::parse_duration)]
        step: Option<Duration>,
        #[arg(long, value_enum, default_value_t = Format::Jsonl)]
        format: Format,
    },
    /// Simulate a pass through the bounded record stream
    Stream {
        config: String,
        #[arg(long, value_parser = humantime::parse_duration)]
        duration: Option<Duration>,
        #[arg(long, value_parser = humantime::parse_duration)]
        step: Option<Duration>,
        #[arg(long, default_value_t = DEFAULT_CAPACITY)]
        capacity: usize,
        /// Emit one record per simulated step of wall-clock time
        #[arg(long)]
        realtime: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Jsonl,
    Summary,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { config } => validate(&config),
        Commands::Run {
            config,
            duration,
            step,
            format,
        } => run(&config, duration, step, format),
        Commands::Stream {
            config,
            duration,
            step,
            capacity,
            realtime,
        } => stream(&config, duration, step, capacity, realtime),
    }
}

fn load(path: &str) -> Option<FlybyConfig> {
    match FlybyConfig::from_file(path) {
        Ok(c) => Some(c),
        Err(e) => {
            eprintln!("Error loading {}: {}", path, e);
            None
        }
    }
}

fn grid(config: &FlybyConfig, duration: Option<Duration>, step: Option<Duration>) -> (f64, f64) {
    (
        duration.map_or(config.simulation.duration_sec, |d| d.as_secs_f64()),
        step.map_or(config.simulation.time_step_sec, |d| d.as_secs_f64()),
    )
}

fn validate(path: &str) -> ExitCode {
    let Some(config) = load(path) else {
        return ExitCode::FAILURE;
    };
    let driver = match config.build_driver() {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = config.simulation.validate() {
        eprintln!("Invalid configuration: {}", e);
        return ExitCode::FAILURE;
    }

    let station = match config.ground_station.station() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let model = match &config.orbit {
        OrbitConfig::Circular(_) => "circular",
        OrbitConfig::Tle(_) => "tle",
    };
    println!("Configuration is valid");
    println!(
        "  station: {:.4}, {:.4} at {} m",
        station.latitude_deg, station.longitude_deg, station.elevation_m
    );
    println!("  orbit: {} ({})", driver.propagator().describe(), model);
    println!(
        "  radio: {} Hz, {} dBm, SNR threshold {} dB",
        config.radio.frequency_hz, config.radio.tx_power_dbm, config.radio.snr_threshold_db
    );
    println!(
        "  antenna: {} deg beam, {} deg/s",
        config.antenna.beamwidth_deg, config.antenna.slew_rate_deg_s
    );
    println!(
        "  simulation: {} s every {} s",
        config.simulation.duration_sec, config.simulation.time_step_sec
    );
    ExitCode::SUCCESS
}

fn run(path: &str, duration: Option<Duration>, step: Option<Duration>, format: Format) -> ExitCode {
    let Some(config) = load(path) else {
        return ExitCode::FAILURE;
    };
    let driver = match config.build_driver() {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let (duration_sec, step_sec) = grid(&config, duration, step);

    let (records, failure) = match driver.run(duration_sec, step_sec) {
        Ok(records) => (records, None),
        Err(failure) => (failure.records, Some(failure.error)),
    };

    match format {
        Format::Jsonl => {
            for record in &records {
                if !print_record(record) {
                    return ExitCode::FAILURE;
                }
            }
        }
        Format::Summary => {
            let summary = FlybySummary::from_records(&records);
            match serde_json::to_string_pretty(&summary) {
                Ok(json) => println!("{}", json),
                Err(e) => {
                    eprintln!("Error encoding summary: {}", e);
                    return ExitCode::FAILURE;
                }
            }
        }
    }

    match failure {
        Some(e) => {
            eprintln!("Run aborted after {} records: {}", records.len(), e);
            ExitCode::FAILURE
        }
        None => ExitCode::SUCCESS,
    }
}

fn stream(
    path: &str,
    duration: Option<Duration>,
    step: Option<Duration>,
    capacity: usize,
    realtime: bool,
) -> ExitCode {
    let Some(config) = load(path) else {
        return ExitCode::FAILURE;
    };
    let driver = match config.build_driver() {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let (duration_sec, step_sec) = grid(&config, duration, step);
    let options = StreamOptions {
        capacity,
        pace: if realtime {
            StreamOptions::realtime(step_sec).pace
        } else {
            None
        },
    };

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error starting runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    runtime.block_on(async move {
        let mut stream = match spawn_stream(driver, duration_sec, step_sec, options) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Invalid configuration: {}", e);
                return ExitCode::FAILURE;
            }
        };

        while let Some(record) = stream.recv().await {
            if !print_record(&record) {
                let _ = stream.stop().await;
                return ExitCode::FAILURE;
            }
        }

        match stream.finish().await {
            Ok(count) => {
                log::info!("streamed {} records", count);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Stream failed: {}", e);
                ExitCode::FAILURE
            }
        }
    })
}

fn print_record(record: &FlybyRecord) -> bool {
    match serde_json::to_string(record) {
        Ok(line) => {
            println!("{}", line);
            true
        }
        Err(e) => {
            eprintln!("Error encoding record: {}", e);
            false
        }
    }
}

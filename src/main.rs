use albumen::build::{build_gallery, rng};
use albumen::config::{Config, CONFIG_FILE};
use clap::{crate_version, App, Arg};
use std::path::Path;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

fn main() {
    let matches = App::new("albumen")
        .version(crate_version!())
        .about("Builds a static photo gallery from a directory of albums")
        .arg(
            Arg::with_name("config")
                .long("config")
                .short("c")
                .takes_value(true)
                .default_value(CONFIG_FILE)
                .help("The configuration file"),
        )
        .arg(
            Arg::with_name("seed")
                .long("seed")
                .takes_value(true)
                .help("Seeds random choices for a reproducible build"),
        )
        .arg(
            Arg::with_name("log-level")
                .long("log-level")
                .takes_value(true)
                .default_value("info")
                .possible_values(&["trace", "debug", "info", "warn", "error"]),
        )
        .get_matches();

    let level = match matches.value_of("log-level") {
        Some("trace") => Level::TRACE,
        Some("debug") => Level::DEBUG,
        Some("warn") => Level::WARN,
        Some("error") => Level::ERROR,
        _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("installing logger: {}", e);
    }

    let config_path = Path::new(matches.value_of("config").unwrap_or(CONFIG_FILE));
    let seed = match matches.value_of("seed").map(str::parse::<u64>) {
        Some(Ok(seed)) => Some(seed),
        Some(Err(e)) => {
            error!("invalid --seed: {}", e);
            std::process::exit(1);
        }
        None => None,
    };

    let config = match Config::from_file(config_path) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    match build_gallery(&config, rng(seed.or(config.seed))) {
        Ok(summary) => {
            for skipped in summary.skipped.iter() {
                info!("skipped `{}`: {}", skipped.path.display(), skipped.reason);
            }
            info!("Gallery generation complete!");
        }
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    }
}

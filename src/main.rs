//! playback: print archived copies of the given pages.

use std::collections::HashSet;
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use tracing::warn;

use playback::{Address, PlaybackConfig, Provider, Resolver};

#[derive(Parser)]
#[command(
    name = "playback",
    about = "Search archived copies of web pages",
    disable_version_flag = true
)]
struct Cli {
    /// Show version
    #[arg(short = 'v', long = "version")]
    version: bool,

    /// Provider to query (ia, is, ga, ip, ph, tt, gc); repeatable
    #[arg(short, long = "provider", value_name = "NAME")]
    providers: Vec<Provider>,

    /// Pages to look up
    #[arg(value_name = "URL")]
    urls: Vec<String>,
}

/// Accept the single-dash `-version` spelling alongside `-v`/`--version`
fn normalize_arg(arg: String) -> String {
    if arg == "-version" {
        "--version".to_string()
    } else {
        arg
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse_from(std::env::args().map(normalize_arg));

    if cli.version {
        println!("{}", playback::VERSION);
        return ExitCode::SUCCESS;
    }

    if cli.urls.is_empty() {
        let _ = Cli::command().print_help();
        let bin = std::env::args().next().unwrap_or_else(|| "playback".to_string());
        println!("\n  {} url [url]\n", bin);
        println!("example:\n  {} https://example.com https://example.org\n", bin);
        return ExitCode::from(1);
    }

    let config = match PlaybackConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::from(1);
        }
    };
    playback::init_logging(config.debug);

    let resolver = match Resolver::new(&config) {
        Ok(resolver) => resolver,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::from(1);
        }
    };

    let providers = if cli.providers.is_empty() {
        Provider::DEFAULT.to_vec()
    } else {
        cli.providers
    };

    for (provider, result) in resolver.resolve_all(&providers, &cli.urls).await {
        let results = match result {
            Ok(results) => results,
            Err(e) => {
                warn!(provider = %provider, error = %e, "no results");
                continue;
            }
        };

        println!("[{}]", provider);
        let mut printed = HashSet::new();
        for url in &cli.urls {
            let Ok(address) = Address::parse(url) else {
                continue;
            };
            if !printed.insert(url) {
                continue;
            }
            if let Some(dst) = results.get(&address) {
                println!("{} => {}", url, dst);
            }
        }
        println!();
    }

    ExitCode::SUCCESS
}

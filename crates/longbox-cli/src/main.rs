// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod prefs;
mod runtime;

use anyhow::{Context, Result, bail};
use longbox_app::AppState;
use std::env;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Mutex;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::runtime::{DemoRuntime, HttpRuntime};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: Option<PathBuf>,
    print_config_path: bool,
    print_example_config: bool,
    check: bool,
    demo: bool,
    help: bool,
}

fn parse_cli_args<I, S>(args: I) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut options = CliOptions::default();
    let mut iter = args.into_iter().map(Into::into);

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                let Some(path) = iter.next() else {
                    bail!("--config requires a file path argument");
                };
                options.config_path = Some(PathBuf::from(path));
            }
            "--print-config-path" => options.print_config_path = true,
            "--print-example-config" => options.print_example_config = true,
            "--check" => options.check = true,
            "--demo" => options.demo = true,
            "--help" | "-h" => options.help = true,
            other => bail!("unknown argument {other:?}; run with --help for usage"),
        }
    }

    Ok(options)
}

fn print_help() {
    println!(
        "longbox - terminal client for a comic volume library server\n\
         \n\
         Usage: longbox [OPTIONS]\n\
         \n\
         Options:\n\
         \x20 --config <PATH>          Use a specific config file\n\
         \x20 --print-config-path      Print the resolved config path and exit\n\
         \x20 --print-example-config   Print an annotated example config and exit\n\
         \x20 --check                  Validate config and server connectivity, then exit\n\
         \x20 --demo                   Browse a built-in sample library, no server needed\n\
         \x20 -h, --help               Show this help"
    );
}

/// Logs go to a file because the terminal belongs to the UI. RUST_LOG
/// overrides the configured level when set.
fn init_logging(config: &Config) -> Result<()> {
    let path = config.log_path()?;
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("open log file {}", path.display()))?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1))?;

    if options.help {
        print_help();
        return Ok(());
    }

    let config_path = match &options.config_path {
        Some(path) => path.clone(),
        None => Config::default_path()?,
    };

    if options.print_config_path {
        println!("{}", config_path.display());
        return Ok(());
    }
    if options.print_example_config {
        print!("{}", Config::example_config(&config_path));
        return Ok(());
    }

    let config = Config::load(&config_path)
        .with_context(|| format!("load config from {}", config_path.display()))?;
    init_logging(&config)?;

    let prefs_path = prefs::default_path()?;
    let mut state = AppState::default();

    if options.demo {
        info!("starting in demo mode");
        let mut runtime = DemoRuntime::new(prefs_path);
        if options.check {
            println!("config ok: {}", config_path.display());
            return Ok(());
        }
        return longbox_tui::run_app(&mut state, &mut runtime);
    }

    let Some(api_key) = config.api_key() else {
        bail!(
            "no API key configured. Set server.api_key in {} (see --print-example-config), or try --demo",
            config_path.display()
        );
    };

    let client = longbox_api::Client::new(config.base_url(), api_key, config.timeout()?)?;

    if options.check {
        let volumes = client.list_volumes()?;
        println!(
            "config ok: {} ({} volumes at {})",
            config_path.display(),
            volumes.len(),
            client.base_url()
        );
        return Ok(());
    }

    info!(base_url = client.base_url(), "starting");
    let mut runtime = HttpRuntime::new(client, prefs_path);
    longbox_tui::run_app(&mut state, &mut runtime)
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("longbox: {error:#}");
            ExitCode::FAILURE
        }
    }
}

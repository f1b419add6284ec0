mod collectors;
mod config;
mod menu;
mod report;
mod size;
mod snapshot;

use clap::Parser;
use collectors::{CollectError, Collector};
use config::Config;
use report::{Renderer, Section};
use snapshot::Snapshot;
use std::io;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG_PATH: &str = "./sysreport.yaml";

#[derive(Parser, Debug)]
#[command(name = "sysreport")]
#[command(version)]
#[command(about = "Prints platform, CPU, memory, disk and network information.")]
#[command(after_help = "If no section is selected, an interactive menu is shown.")]
struct Cli {
    /// Print every section.
    #[arg(short, long)]
    all: bool,
    #[arg(short, long)]
    platform: bool,
    #[arg(short, long)]
    boot_time: bool,
    #[arg(short, long)]
    cpu: bool,
    #[arg(short, long)]
    memory: bool,
    #[arg(short, long)]
    disk: bool,
    #[arg(short, long)]
    network: bool,
    /// Print the software license.
    #[arg(short, long)]
    license: bool,
    /// Print the selected sections as JSON; every section when none is selected.
    #[arg(long)]
    json: bool,
    #[arg(long)]
    config: Option<String>,
    #[arg(long)]
    print_default_config: bool,
}

impl Cli {
    fn sections(&self) -> Vec<Section> {
        let flags = [
            (self.platform, Section::Platform),
            (self.boot_time, Section::BootTime),
            (self.cpu, Section::Cpu),
            (self.memory, Section::Memory),
            (self.disk, Section::Disk),
            (self.network, Section::Network),
        ];
        let chosen: Vec<Section> = flags
            .into_iter()
            .filter_map(|(on, section)| on.then_some(section))
            .collect();
        // A bare `--json` selects every section.
        if self.all || (self.json && chosen.is_empty()) {
            return Section::ALL.to_vec();
        }
        chosen
    }
}

#[derive(Debug, Error)]
enum RunError {
    #[error(transparent)]
    Collect(#[from] CollectError),
    #[error("сбор данных не завершился за {0}")]
    Timeout(humantime::Duration),
    #[error("задача сбора данных аварийно завершилась: {0}")]
    Join(#[from] tokio::task::JoinError),
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();
    if cli.print_default_config {
        println!("{}", Config::example_yaml());
        return;
    }
    if cli.license {
        print!("{}", report::LONG_LICENSE);
        return;
    }

    let loaded = match &cli.config {
        Some(path) => Config::load_from_file(path),
        None => Config::load_or_default(DEFAULT_CONFIG_PATH),
    };
    let cfg = match loaded {
        Ok(cfg) => cfg,
        Err(err) => {
            error!(error = %err, "не удалось загрузить конфигурацию");
            std::process::exit(1);
        }
    };
    let (collector, timeout) = match (cfg.collect_options(), cfg.collect_timeout()) {
        (Ok(options), Ok(timeout)) => (Collector::new(options), timeout),
        (Err(err), _) | (_, Err(err)) => {
            error!(error = %err, "некорректная конфигурация");
            std::process::exit(1);
        }
    };

    let sections = cli.sections();
    if sections.is_empty() {
        print!("{}", report::short_license());
        let handle = tokio::runtime::Handle::current();
        let suffix = cfg.size_suffix.clone();
        let result = tokio::task::spawn_blocking(move || {
            menu::run(io::stdin().lock(), io::stdout(), |chosen| {
                match handle.block_on(collect_with_timeout(collector, timeout)) {
                    Ok(snapshot) => Renderer::new(&snapshot).with_suffix(&suffix).text(chosen),
                    Err(err) => {
                        error!(error = %err, "не удалось собрать сведения о системе");
                        String::new()
                    }
                }
            })
        })
        .await;
        match result {
            Ok(Ok(())) => {}
            Ok(Err(err)) => error!(error = %err, "ошибка ввода-вывода в меню"),
            Err(err) => error!(error = %err, "задача меню аварийно завершилась"),
        }
        return;
    }

    let snapshot = match collect_with_timeout(collector, timeout).await {
        Ok(snapshot) => snapshot,
        Err(err) => {
            error!(error = %err, "не удалось собрать сведения о системе");
            std::process::exit(1);
        }
    };

    let renderer = Renderer::new(&snapshot).with_suffix(&cfg.size_suffix);
    if cli.json {
        match renderer.json(&sections) {
            Ok(value) => println!("{value:#}"),
            Err(err) => {
                error!(error = %err, "не удалось сериализовать снимок в JSON");
                std::process::exit(1);
            }
        }
    } else {
        print!("{}", renderer.text(&sections));
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Runs one collection off the async runtime, bounded by `timeout`.
async fn collect_with_timeout(
    collector: Collector,
    timeout: Duration,
) -> Result<Snapshot, RunError> {
    let task = tokio::task::spawn_blocking(move || collector.collect());
    match tokio::time::timeout(timeout, task).await {
        Ok(joined) => {
            let snapshot = joined??;
            debug!("сбор данных завершён");
            Ok(snapshot)
        }
        Err(_elapsed) => Err(RunError::Timeout(timeout.into())),
    }
}

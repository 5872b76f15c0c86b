use anyhow::Result;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use paramprobe::{
    config::Config,
    model::{ProbeState, ScanReport},
    output::{format_report_to_string, print_list, print_report, OutputFormat},
    session::PageSession,
    store::SiteStore,
};
use std::process::ExitCode;
use std::str::FromStr;
use std::time::Duration;
use tokio::sync::oneshot;
use url::Url;

/// Exit codes for CI integration
mod exit_codes {
    pub const SUCCESS: u8 = 0;
    pub const ERROR: u8 = 1;
    pub const REFLECTION_FOUND: u8 = 2;
}

#[derive(Parser)]
#[command(name = "paramprobe")]
#[command(
    author,
    version,
    about = "Discover candidate input parameters on a page and probe them for reflection"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a page for candidate parameters
    Scan {
        /// Page URL to scan
        url: String,

        /// Also probe the discovered parameters for reflection
        #[arg(long)]
        check: bool,

        /// Output format (table, json)
        #[arg(short, long)]
        format: Option<String>,

        /// Write output to file
        #[arg(short, long)]
        output: Option<String>,

        /// Exit with an error code if any parameter reflects its marker
        #[arg(long)]
        fail_on_reflection: bool,
    },

    /// Show stored parameters or reflections for a hostname
    Show {
        /// Hostname to look up
        host: String,

        /// Show reflections instead of the full parameter list
        #[arg(long)]
        refs: bool,
    },

    /// Show or change per-hostname settings
    Settings {
        /// Hostname the settings apply to
        host: String,

        /// Enable or disable probing automatically after every scan
        #[arg(long)]
        autocheck: Option<bool>,

        /// Store only parameters matching this regex
        #[arg(long)]
        filter: Option<String>,

        /// Disable the regex filter
        #[arg(long, conflicts_with = "filter")]
        no_filter: bool,

        /// Enable or disable the passive parameter log
        #[arg(long)]
        log: Option<bool>,
    },

    /// Export the passive parameter log for a hostname as pretty JSON
    Export {
        /// Hostname to export
        host: String,

        /// Write to file instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Remove a hostname's stored parameters and reflections
    Clear {
        /// Hostname to clear
        host: String,
    },

    /// Show or create config file
    Config {
        /// Generate default config file
        #[arg(long)]
        init: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run().await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(exit_codes::ERROR)
        }
    }
}

async fn run() -> Result<u8> {
    let cli = Cli::parse();
    let config = Config::load().unwrap_or_default();

    match cli.command {
        Commands::Scan {
            url,
            check,
            format,
            output,
            fail_on_reflection,
        } => {
            let format_str = format.unwrap_or(config.default_format.clone());
            run_scan(&config, &url, check, &format_str, output, fail_on_reflection).await
        }
        Commands::Show { host, refs } => {
            let store = SiteStore::new();
            let entries = if refs {
                store.load_reflections(&host)
            } else {
                store.load_params(&host)
            };
            print_list(&entries);
            Ok(exit_codes::SUCCESS)
        }
        Commands::Settings {
            host,
            autocheck,
            filter,
            no_filter,
            log,
        } => {
            handle_settings(&host, autocheck, filter, no_filter, log)?;
            Ok(exit_codes::SUCCESS)
        }
        Commands::Export { host, output } => {
            let store = SiteStore::new();
            let logged = store.logged_params(&host);
            let json = serde_json::to_string_pretty(&logged)?;
            match output {
                Some(path) => {
                    std::fs::write(&path, json)?;
                    println!("Exported {} logged parameters to: {}", logged.len(), path);
                }
                None => println!("{}", json),
            }
            Ok(exit_codes::SUCCESS)
        }
        Commands::Clear { host } => {
            let store = SiteStore::new();
            store.clear_site(&host)?;
            println!("Cleared stored parameters and reflections for {}.", host);
            Ok(exit_codes::SUCCESS)
        }
        Commands::Config { init, path } => {
            handle_config(init, path)?;
            Ok(exit_codes::SUCCESS)
        }
    }
}

async fn run_scan(
    config: &Config,
    url: &str,
    check: bool,
    format: &str,
    output_file: Option<String>,
    fail_on_reflection: bool,
) -> Result<u8> {
    let format = OutputFormat::from_str(format).map_err(|e| anyhow::anyhow!(e))?;
    let is_interactive = format == OutputFormat::Table && output_file.is_none();

    let url = Url::parse(url)?;
    let store = SiteStore::new();
    let mut session = PageSession::new(url.clone(), store, config)?;

    let scan_progress = spinner(is_interactive, "Discovering parameters...");
    session.load().await?;
    if let Some(pb) = scan_progress {
        pb.finish_with_message(format!("Found {} parameters", session.params().len()));
    }

    // Autocheck may already have probed during load.
    if check && !session.checked() {
        let (tx, rx) = oneshot::channel();
        session.notify_on_checked(tx);

        let probe_progress = spinner(is_interactive, "Checking reflections...");
        session.check().await?;

        if let (Some(pb), Ok(ProbeState::Checked)) = (probe_progress, rx.await) {
            pb.finish_with_message("Reflection check complete");
        }
    }

    let reflections = session
        .checked()
        .then(|| session.store().load_reflections(session.hostname()));
    let reflection_count = reflections.as_ref().map(Vec::len).unwrap_or(0);

    let mut report = ScanReport::new(
        session.hostname(),
        session.url().as_str(),
        session.params().to_vec(),
    );
    if let Some(reflections) = reflections {
        report = report.with_reflections(reflections);
    }

    if let Some(path) = output_file {
        let content = format_report_to_string(&report, format)?;
        std::fs::write(&path, content)?;
        println!("Results written to: {}", path);
    } else {
        print_report(&report, format)?;
    }

    if fail_on_reflection && reflection_count > 0 {
        return Ok(exit_codes::REFLECTION_FOUND);
    }
    Ok(exit_codes::SUCCESS)
}

fn spinner(is_interactive: bool, message: &'static str) -> Option<ProgressBar> {
    if !is_interactive {
        return None;
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(message);
    Some(pb)
}

fn handle_settings(
    host: &str,
    autocheck: Option<bool>,
    filter: Option<String>,
    no_filter: bool,
    log: Option<bool>,
) -> Result<()> {
    let store = SiteStore::new();

    if let Some(enabled) = autocheck {
        store.set_autocheck(host, enabled)?;
    }
    if let Some(pattern) = &filter {
        regex::Regex::new(pattern)
            .map_err(|e| anyhow::anyhow!("invalid filter pattern: {}", e))?;
        store.set_regex_filter(host, Some(pattern.as_str()))?;
    }
    if no_filter {
        store.set_regex_filter(host, None)?;
    }
    if let Some(enabled) = log {
        store.set_logging(host, enabled)?;
    }

    println!("Settings for {}:", host);
    println!("  autocheck: {}", store.autocheck_enabled(host));
    match store.regex_filter(host) {
        Some(pattern) => println!("  filter:    {}", pattern.as_str()),
        None => println!("  filter:    off"),
    }
    println!("  log:       {}", store.logging_enabled(host));
    println!(
        "  logged:    {} parameters",
        store.logged_params(host).len()
    );

    Ok(())
}

fn handle_config(init: bool, show_path: bool) -> Result<()> {
    let config_path = Config::config_path();

    if show_path {
        println!("{}", config_path.display());
        return Ok(());
    }

    if init {
        if config_path.exists() {
            println!("Config file already exists at: {}", config_path.display());
            return Ok(());
        }

        let config = Config::default();
        config.save()?;
        println!("Created config file at: {}", config_path.display());
        println!();
        println!("Default configuration:");
        println!("{}", Config::generate_default_config());
        return Ok(());
    }

    // Show current config
    if config_path.exists() {
        let content = std::fs::read_to_string(&config_path)?;
        println!("Config file: {}", config_path.display());
        println!();
        println!("{}", content);
    } else {
        println!("No config file found.");
        println!("Run 'paramprobe config --init' to create one.");
        println!();
        println!("Config path: {}", config_path.display());
    }

    Ok(())
}

use clap::Parser;
use env_logger::Env;
use log::{debug, info};
use std::io;
use std::path::{Path, PathBuf};

use kitmerge::config::Config;
use kitmerge::orchestrator::BundleOrchestrator;
use kitmerge::scanner::ScanMode;
use kitmerge::sink::WriterSink;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Modules to merge, in order (overrides the configured module list)
    modules: Vec<String>,

    /// Named bundle profile from the configuration
    #[arg(short, long)]
    profile: Option<String>,

    /// List configured profiles and exit
    #[arg(long)]
    list_profiles: bool,

    /// Output bundle file
    #[arg(short, long, conflicts_with = "stdout")]
    output: Option<PathBuf>,

    /// Output bundled code to stdout instead of a file
    #[arg(long, conflicts_with = "output")]
    stdout: bool,

    /// Directory module names are resolved against
    #[arg(short, long)]
    base_dir: Option<PathBuf>,

    /// Header line written once at the top of the bundle (can be repeated)
    #[arg(long = "header", value_name = "LINE")]
    header: Vec<String>,

    /// Leave the output file writable instead of marking it read-only
    #[arg(long)]
    writable: bool,

    /// Stop stripping imports at the first non-import line
    #[arg(long)]
    strict_imports: bool,

    /// Increase verbosity (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    debug!(
        "Verbosity level: {} (log level: {})",
        cli.verbose, log_level
    );
    info!("Starting kitmerge");

    let config = Config::load(cli.config.as_deref())?;
    debug!("Configuration: {:?}", config);

    if cli.list_profiles {
        list_profiles(&config);
        return Ok(());
    }

    let mut plan = config.resolve(cli.profile.as_deref())?;

    // Command line values take precedence over every configuration layer
    if !cli.modules.is_empty() {
        plan.modules = cli.modules;
    }
    if let Some(base_dir) = cli.base_dir {
        plan.base_dir = base_dir;
    }
    if !cli.header.is_empty() {
        plan.header = cli.header;
    }
    if cli.writable {
        plan.read_only = false;
    }
    if cli.strict_imports {
        plan.scan_mode = ScanMode::Strict;
    }
    if cli.output.is_some() {
        plan.output = cli.output;
    }
    debug!("Bundle plan: {:?}", plan);

    if !cli.stdout && plan.output.is_none() {
        return Err(anyhow::anyhow!(
            "Either --output or --stdout must be specified (or configure `output`)"
        ));
    }

    let orchestrator = BundleOrchestrator::new(plan);

    if cli.stdout {
        let mut sink = WriterSink::new(io::stdout().lock());
        orchestrator.bundle_into(&mut sink, Path::new("<stdout>"))?;
        info!("Bundle output to stdout");
    } else {
        orchestrator.bundle(None)?;
        info!("Bundle created successfully");
    }

    Ok(())
}

fn list_profiles(config: &Config) {
    if config.profiles.is_empty() {
        println!("No profiles configured");
        return;
    }
    for (name, profile) in &config.profiles {
        let marker = if config.default_profile.as_deref() == Some(name.as_str()) {
            " (default)"
        } else {
            ""
        };
        println!("{name}{marker}: {} modules", profile.modules.len());
    }
}

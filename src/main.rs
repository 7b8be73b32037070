use std::{
    fs::File,
    io::{self, Write},
    path::PathBuf,
    process::ExitCode,
    sync::Mutex,
};

use anyhow::{Context, bail};
use clap::Parser;
use is_terminal::IsTerminal;
use steam_menu::{
    app::App,
    data::{AppId, Catalog},
    launch::{GameLauncher, SteamLauncher},
    menu::TerminalFrontend,
    settings::{Settings, SettingsStore},
    steam::{detect_install_roots, scan_with_libraries},
};
use tracing::{debug, warn};
use tracing_subscriber::{
    EnvFilter, fmt, fmt::writer::BoxMakeWriter, layer::SubscriberExt, util::SubscriberInitExt,
};

/// Lists locally installed Steam games in a numbered menu and launches the one you pick
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Steam install root, overriding the saved one
    #[arg(long, value_name = "PATH")]
    root: Option<PathBuf>,

    /// Settings file to use instead of the default location
    #[arg(long, value_name = "PATH")]
    settings: Option<PathBuf>,

    /// Write logs to this file. Without it, logs are only printed in non-interactive modes.
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace). `RUST_LOG` takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Print the installed games and exit
    #[arg(long, conflicts_with = "launch")]
    list: bool,

    /// With --list, print the catalog as JSON
    #[arg(long, requires = "list")]
    json: bool,

    /// Launch the game with this app id and exit
    #[arg(long, value_name = "ID")]
    launch: Option<String>,
}

impl Args {
    fn is_interactive(&self) -> bool {
        !self.list && self.launch.is_none()
    }
}

fn init_tracing(args: &Args) -> anyhow::Result<()> {
    let level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let (writer, ansi) = match &args.log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Could not create log file {path:?}"))?;
            (BoxMakeWriter::new(Mutex::new(file)), false)
        }
        // Log lines would be drawn over the menu
        None if args.is_interactive() => (BoxMakeWriter::new(io::sink), false),
        None => (BoxMakeWriter::new(io::stderr), io::stderr().is_terminal()),
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .without_time()
                .with_line_number(true)
                .with_ansi(ansi)
                .with_writer(writer),
        )
        .with(filter)
        .init();

    Ok(())
}

fn print_catalog(catalog: &Catalog, json: bool) -> anyhow::Result<()> {
    let mut out = io::stdout().lock();

    if json {
        serde_json::to_writer_pretty(&mut out, catalog)?;
        writeln!(out)?;
        return Ok(());
    }

    if catalog.is_empty() {
        writeln!(out, "No games found in {:?}", catalog.install_root())?;
        return Ok(());
    }

    let number_width = catalog.len().to_string().len();
    for (index, title) in catalog.iter().enumerate() {
        writeln!(
            out,
            "{:>number_width$}. {} [{}]",
            index + 1,
            title.name,
            title.id
        )?;
    }

    Ok(())
}

/// Non-interactive modes: `--list` and `--launch`
fn run_once(args: &Args, settings: Settings) -> anyhow::Result<()> {
    let install_root = args
        .root
        .clone()
        .or(settings.install_root)
        .or_else(|| detect_install_roots().into_iter().next())
        .context("No Steam installation found, pass one with --root")?;
    debug!("Using install root {install_root:?}");

    let catalog = scan_with_libraries(&install_root, &settings.extra_libraries)?;

    match &args.launch {
        Some(id) => SteamLauncher
            .launch(&catalog, &AppId::from(id.as_str()), settings.last_account.as_deref())
            .map_err(Into::into),
        None => print_catalog(&catalog, args.json),
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let store = args
        .settings
        .clone()
        .or_else(SettingsStore::default_path)
        .map(SettingsStore::new);
    if store.is_none() {
        warn!("No config directory found, settings will not be saved");
    }

    if !args.is_interactive() {
        let settings = store
            .as_ref()
            .and_then(SettingsStore::load)
            .unwrap_or_default();
        return run_once(&args, settings);
    }

    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        bail!("The menu needs an interactive terminal, use --list or --launch instead");
    }

    let frontend = TerminalFrontend::new().context("Could not set up the terminal")?;
    let mut app = App::new(frontend, SteamLauncher, store);
    if let Some(root) = args.root {
        app = app.with_install_root(root);
    }

    app.run().context("Terminal error")
}

fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = init_tracing(&args) {
        eprintln!("Error: {e:?}");
        return ExitCode::FAILURE;
    }

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:?}");
            ExitCode::FAILURE
        }
    }
}

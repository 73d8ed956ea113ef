mod config;
mod prompt;
mod reporter;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use sit_lib::game::installer::core::traits::{FirstMirrorSelector, MirrorSelector};
use sit_lib::game::installer::SupportLibrary;
use sit_lib::game::{read_version, ArtifactKind};
use sit_lib::{InstallError, InstallReport, Installer, ManagerConfig, Release};
use std::path::PathBuf;
use std::sync::Arc;

use config::{get_app_config_dir, JsonConfigStore};
use prompt::StdinMirrorSelector;
use reporter::ConsoleReporter;

#[derive(Parser)]
#[command(name = "sit-manager")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOpts,
}

/// Options available to all commands
#[derive(Args, Debug)]
struct GlobalOpts {
    /// Override config directory
    #[arg(long, global = true, env = "SIT_MANAGER_CONFIG_DIR")]
    config_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the configured paths and the installed game and SIT versions
    Versions,
    /// List available releases
    List {
        #[arg(value_enum, default_value = "mod")]
        catalog: Catalog,
    },
    /// Change stored settings
    Config {
        /// Game install directory
        #[arg(long)]
        install_path: Option<PathBuf>,
        /// SPT-AKI server directory
        #[arg(long)]
        server_path: Option<PathBuf>,
    },
    /// Install or update the SIT client, patching the game when needed
    Install(InstallArgs),
    /// Install the SIT server next to the game directory
    InstallServer(InstallArgs),
}

#[derive(Args, Debug)]
struct InstallArgs {
    /// Release tag or name to install (defaults to the newest)
    #[arg(long)]
    release: Option<String>,

    /// Take the first download mirror instead of asking
    #[arg(long)]
    auto_mirror: bool,

    /// Directory holding Aki.Common.dll and Aki.Reflection.dll
    #[arg(long, env = "SIT_MANAGER_RESOURCES")]
    resources: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Catalog {
    Mod,
    Server,
    Patches,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.global.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let config_dir = match cli.global.config_dir.clone() {
        Some(dir) => dir,
        None => get_app_config_dir()?,
    };
    let store = Arc::new(JsonConfigStore::in_dir(&config_dir));
    let config = store.load()?;
    log::debug!("Using config {:?}", store.path());

    match cli.command {
        Commands::Versions => {
            show_versions(&config);
            Ok(())
        }
        Commands::List { catalog } => list_releases(config, store, catalog).await,
        Commands::Config {
            install_path,
            server_path,
        } => {
            let mut config = config;
            if let Some(path) = install_path {
                config.install_path = Some(path);
                config.tarkov_version = None;
                config.sit_version = None;
            }
            if let Some(path) = server_path {
                config.aki_server_path = Some(path);
            }
            sit_lib::ConfigStore::save(store.as_ref(), &config);
            show_versions(&config);
            Ok(())
        }
        Commands::Install(args) => install(config, store, args, false).await,
        Commands::InstallServer(args) => install(config, store, args, true).await,
    }
}

fn show_versions(config: &ManagerConfig) {
    let Some(install_path) = config.install_path() else {
        println!("Install path is not set. Use `sit-manager config --install-path <dir>`.");
        return;
    };
    println!("Install path: {}", install_path.display());
    if let Some(server) = &config.aki_server_path {
        println!("Server path:  {}", server.display());
    }
    for kind in [ArtifactKind::GameBinary, ArtifactKind::ModPlugin] {
        match read_version(kind, install_path) {
            Some(version) if !version.is_empty() => println!("{}: {}", kind.label(), version),
            Some(_) => println!("{}: unknown version", kind.label()),
            None => println!("{}: not installed", kind.label()),
        }
    }
}

async fn list_releases(
    config: ManagerConfig,
    store: Arc<JsonConfigStore>,
    catalog: Catalog,
) -> Result<()> {
    let installer = Installer::new(
        config,
        store,
        Arc::new(FirstMirrorSelector),
        Arc::new(ConsoleReporter::new()),
    )?;
    let releases = match catalog {
        Catalog::Mod => installer.fetch_mod_releases().await,
        Catalog::Server => installer.fetch_server_releases().await,
        Catalog::Patches => installer.fetch_patch_releases().await,
    };
    if releases.is_empty() {
        println!("No releases available.");
    }
    for release in &releases {
        match release.target_game_version() {
            "" => println!("{}", release.display_name()),
            target => println!("{}  (EFT {})", release.display_name(), target),
        }
    }
    Ok(())
}

fn pick_release(releases: Vec<Release>, wanted: Option<&str>) -> Result<Release> {
    match wanted {
        Some(wanted) => releases
            .into_iter()
            .find(|r| r.tag_name.as_deref() == Some(wanted) || r.name == wanted)
            .with_context(|| format!("No release named '{}'", wanted)),
        None => releases
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!(InstallError::CatalogEmpty)),
    }
}

fn resources_dir(explicit: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = explicit {
        return Ok(dir);
    }
    let exe = std::env::current_exe().context("Locate sit-manager executable")?;
    let dir = exe
        .parent()
        .map(|p| p.join("resources"))
        .context("Executable has no parent directory")?;
    Ok(dir)
}

async fn install(
    config: ManagerConfig,
    store: Arc<JsonConfigStore>,
    args: InstallArgs,
    server: bool,
) -> Result<()> {
    let mirrors: Arc<dyn MirrorSelector> = if args.auto_mirror {
        Arc::new(FirstMirrorSelector)
    } else {
        Arc::new(StdinMirrorSelector)
    };
    let mut installer = Installer::new(config, store, mirrors, Arc::new(ConsoleReporter::new()))?;

    let releases = if server {
        installer.fetch_server_releases().await
    } else {
        installer.fetch_mod_releases().await
    };
    let release = pick_release(releases, args.release.as_deref())?;
    println!("Installing {}", release.display_name());

    let result = if server {
        installer.install_server(&release).await
    } else {
        let libraries = SupportLibrary::load_bundled(&resources_dir(args.resources)?)?;
        installer = installer.with_support_libraries(libraries);
        installer.install_mod(&release).await
    };

    match result {
        Ok(report) => {
            print_report(&report);
            Ok(())
        }
        Err(e) if e.is_cancellation() => {
            log::info!("{}", e);
            Ok(())
        }
        Err(e) => {
            if e.wants_log() {
                eprintln!("Encountered an error during installation. Run with -v for details.");
            }
            Err(e.into())
        }
    }
}

fn print_report(report: &InstallReport) {
    for step in &report.patches_applied {
        println!("Patched {} -> {}", step.from_build, step.to_build);
    }
    if let Some(version) = &report.game_version {
        println!("EFT version is now: {}", version);
    }
    if let Some(version) = &report.mod_version {
        println!("SIT version is now: {}", version);
    }
    if let Some(path) = &report.server_path {
        println!("Server installation path set to '{}'", path.display());
    }
}

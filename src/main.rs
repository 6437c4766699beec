//! Story farmer binary: wires screen capture and synthetic input to the
//! farming engine and runs it until interrupted.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use legends_core::{Config, Engine, RuntimeState, Watchdog};
use legends_cv::Catalog;

mod input;
mod screen;
mod status;

#[derive(Parser)]
#[command(name = "legends-farmer", version, about = "Screen-driven story farmer")]
struct Cli {
    /// Path to the JSON config file (created with defaults if absent).
    #[arg(short, long, default_value = "config.json", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the farming loop (the default).
    Run,
    /// List capturable windows and their geometry.
    ListWindows,
    /// Verify every reference image is present and loadable.
    CheckAssets,
    /// Save one capture of the target window, for cropping new templates.
    Capture {
        #[arg(short, long, default_value = "capture.png")]
        output: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command.unwrap_or(Command::Run) {
        Command::Run => run(&cli.config),
        Command::ListWindows => screen::list_windows(),
        Command::CheckAssets => check_assets(&cli.config),
        Command::Capture { output } => capture(&cli.config, &output),
    }
}

fn run(config_path: &Path) -> anyhow::Result<()> {
    let cfg = Config::load_or_create(config_path)?;
    let catalog = Catalog::load(&cfg.asset_dir)?;
    let missing = catalog.missing();
    if !missing.is_empty() {
        log::warn!("templates missing (those anchors will never match): {missing:?}");
    }

    screen::wait_for_window(&cfg.window_title)?;

    let state = Arc::new(RuntimeState::new());

    {
        let state = Arc::clone(&state);
        ctrlc::set_handler(move || {
            let snap = state.snapshot();
            println!();
            println!("session summary");
            println!("  battles completed  : {}", snap.loops);
            println!("  cinematics skipped : {}", snap.cinematics);
            println!("  levels total       : {}", snap.completed);
            println!("  stuck fixes        : {}", snap.stuck_fixed);
            println!("  recoveries         : {}", snap.recoveries);
            std::process::exit(0);
        })
        .context("installing the interrupt handler")?;
    }

    // The watchdog gets its own perception and controls, built on its own
    // thread: captures stay concurrent and the input handle never crosses
    // threads.
    {
        let state = Arc::clone(&state);
        let cfg = cfg.clone();
        let catalog = catalog.clone();
        let _watchdog = thread::spawn(move || {
            let eyes =
                screen::ScreenPerception::new(cfg.window_title.clone(), catalog, cfg.confidence);
            let hands = match input::EnigoControls::new(cfg.settle_delay()) {
                Ok(hands) => hands,
                Err(e) => {
                    log::error!("watchdog disabled, input backend unavailable: {e}");
                    return;
                }
            };
            Watchdog::new(eyes, hands, state, cfg.watchdog_interval()).run();
        });
    }

    if cfg.overlay_enabled {
        let _status = status::spawn(Arc::clone(&state), Duration::from_secs(2));
    }

    let eyes = screen::ScreenPerception::new(cfg.window_title.clone(), catalog, cfg.confidence);
    let hands = input::EnigoControls::new(cfg.settle_delay())?;
    let mut engine = Engine::new(eyes, hands, cfg, state);

    engine.setup();
    engine.run()?;
    Ok(())
}

fn check_assets(config_path: &Path) -> anyhow::Result<()> {
    let cfg = Config::load_or_create(config_path)?;
    let catalog = Catalog::load_complete(&cfg.asset_dir)?;
    println!(
        "all {} templates present in {}",
        catalog.len(),
        cfg.asset_dir.display()
    );
    Ok(())
}

fn capture(config_path: &Path, output: &Path) -> anyhow::Result<()> {
    let cfg = Config::load_or_create(config_path)?;
    let image = screen::capture_window(&cfg.window_title)?;
    image
        .save(output)
        .with_context(|| format!("saving {}", output.display()))?;
    println!(
        "saved {}x{} capture to {}",
        image.width(),
        image.height(),
        output.display()
    );
    Ok(())
}

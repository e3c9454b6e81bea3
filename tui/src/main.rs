//! Halo TUI
//!
//! Terminal surface for the Halo companion scene.
//!
//! # Usage
//!
//! ```bash
//! # Connect to a companion on the default address
//! halo-tui
//!
//! # Dungeon scene, no companion, reproducible animation
//! halo-tui --scene dungeon --offline --seed 7
//!
//! # Log to a file (the terminal is busy drawing)
//! HALO_LOG_FILE=/tmp/halo.log RUST_LOG=debug halo-tui
//! ```

use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Context;
use clap::Parser;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use halo_conductor::{load_config_from_path, ConfigOverrides, SceneVariant};
use halo_tui::App;

/// Terminal surface for the Halo companion scene
#[derive(Debug, Parser)]
#[command(name = "halo-tui", version, about)]
struct Args {
    /// Configuration file (defaults to the XDG config path)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Scene variant: orb-circle or dungeon
    #[arg(long)]
    scene: Option<SceneVariant>,

    /// Companion WebSocket address
    #[arg(long)]
    url: Option<String>,

    /// Run without a companion
    #[arg(long)]
    offline: bool,

    /// Animation seed
    #[arg(long)]
    seed: Option<u64>,

    /// Target frames per second
    #[arg(long)]
    fps: Option<u32>,

    /// Your display name in the conversation
    #[arg(long)]
    name: Option<String>,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        let mut overrides = ConfigOverrides::new().with_offline(self.offline);
        if let Some(variant) = self.scene {
            overrides = overrides.with_scene_variant(variant);
        }
        if let Some(url) = &self.url {
            overrides = overrides.with_companion_url(url.clone());
        }
        if let Some(seed) = self.seed {
            overrides = overrides.with_seed(seed);
        }
        if let Some(fps) = self.fps {
            overrides = overrides.with_target_fps(fps);
        }
        if let Some(name) = &self.name {
            overrides = overrides.with_username(name.clone());
        }
        overrides
    }
}

/// Send logs to `HALO_LOG_FILE`; without it, logs are discarded
fn init_logging() -> anyhow::Result<()> {
    let Some(path) = std::env::var_os("HALO_LOG_FILE") else {
        return Ok(());
    };
    let file = File::create(&path)
        .with_context(|| format!("Failed to create log file {}", PathBuf::from(&path).display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("halo_tui=info".parse()?)
                .add_directive("halo_conductor=info".parse()?),
        )
        .with_target(true)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging()?;

    let mut config = load_config_from_path(args.config.clone()).context("Failed to load configuration")?;
    args.overrides().apply(&mut config);
    config.validate().context("Invalid configuration")?;
    tracing::info!(source = %config.source(), "Configuration loaded");

    // Leave the terminal usable if anything panics mid-frame
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = restore_terminal();
        default_hook(info);
    }));

    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let size = terminal.size()?;
    let mut app = App::new(config, size.width, size.height);
    let result = app.run(&mut terminal).await;

    restore_terminal()?;
    terminal.show_cursor()?;

    if let Err(e) = &result {
        tracing::error!(error = %e, "Surface stopped with an error");
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_map_to_overrides() {
        let args = Args::parse_from([
            "halo-tui", "--scene", "dungeon", "--offline", "--seed", "3", "--name", "Kai",
        ]);
        let overrides = args.overrides();
        assert_eq!(overrides.scene_variant, Some(SceneVariant::Dungeon));
        assert!(overrides.offline);
        assert_eq!(overrides.seed, Some(3));
        assert_eq!(overrides.username.as_deref(), Some("Kai"));
        assert_eq!(overrides.target_fps, None);
    }
}

// What you SEE:
// • A borderless sprite window playing your GIF, parked on top of whichever
//   window has focus and following it around.
// • Magenta (or your --key-color) pixels are see-through.
// • Right-click the sprite to quit.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context as _;
use clap::{ArgGroup, Parser};
use tracing_subscriber::EnvFilter;

use gif_overlay::config::{DEFAULT_FPS, DEFAULT_LAUNCH_TOLERANCE, Preset};
use gif_overlay::{OverlayConfig, TransparencyKey, session};

#[derive(Parser, Debug)]
#[command(name = "gif-overlay", version, about = "Animated GIF overlay that follows the focused window")]
#[command(group(ArgGroup::new("input").required(true).args(["path", "preset"])))]
struct Cli {
    /// GIF file to play.
    path: Option<PathBuf>,

    /// Play one of the bundled sprites instead of a file.
    #[arg(long, value_enum)]
    preset: Option<Preset>,

    /// Side of the square box the sprite is fitted into, in pixels.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    size: u32,

    /// Frames per second.
    #[arg(long, default_value_t = DEFAULT_FPS, value_parser = clap::value_parser!(u32).range(1..=1000))]
    fps: u32,

    /// Strip the GIF's backdrop first (writes <name>_transparent.gif next to it).
    #[arg(long)]
    remove_background: bool,

    /// Per-channel tolerance for background removal.
    #[arg(long, default_value_t = DEFAULT_LAUNCH_TOLERANCE)]
    tolerance: u8,

    /// Window color key as hex (rrggbb).
    #[arg(long, default_value = "ff00ff")]
    key_color: TransparencyKey,

    /// Minimum milliseconds between focused-window lookups (0 = every frame).
    #[arg(long, default_value_t = 0)]
    poll_ms: u64,

    /// Debug logging (overridden by RUST_LOG).
    #[arg(long, short)]
    verbose: bool,
}

impl Cli {
    fn into_config(self) -> gif_overlay::Result<OverlayConfig> {
        let source = match (self.path, self.preset) {
            (Some(path), _) => path,
            (None, Some(preset)) => PathBuf::from(preset.file_name()),
            (None, None) => PathBuf::new(), // rejected by validation
        };

        let mut config = OverlayConfig::new(source, self.size, self.fps)?
            .with_key(self.key_color)
            .with_poll_interval(Duration::from_millis(self.poll_ms));
        if self.remove_background {
            config = config.with_background_removal(self.tolerance);
        }
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    /* --- Settings are validated before any window exists --- */
    let config = cli.into_config().context("invalid settings")?;
    tracing::info!(source = %config.source.display(), size = config.size, fps = config.fps, "starting overlay");

    /* --- Load, prepare, open the window and loop until right-click --- */
    let summary = session::launch(&config)
        .with_context(|| format!("overlay for {}", config.source.display()))?;
    tracing::info!(frames = summary.frames_presented, "bye");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn preset_resolves_to_bundled_file() {
        let cli = Cli::try_parse_from(["gif-overlay", "--preset", "fox2", "--size", "64"]).unwrap();
        let config = cli.into_config().unwrap();
        assert_eq!(config.source, PathBuf::from("fox2.gif"));
        assert_eq!(config.fps, DEFAULT_FPS);
        assert!(!config.remove_background);
    }

    #[test]
    fn remove_background_carries_tolerance() {
        let cli = Cli::try_parse_from([
            "gif-overlay",
            "art/cat.gif",
            "--size",
            "100",
            "--remove-background",
            "--tolerance",
            "25",
            "--key-color",
            "#00ff00",
        ])
        .unwrap();
        let config = cli.into_config().unwrap();
        assert!(config.remove_background);
        assert_eq!(config.tolerance, 25);
        assert_eq!(config.key.rgb(), [0, 255, 0]);
    }

    #[test]
    fn bad_numbers_are_rejected_up_front() {
        assert!(Cli::try_parse_from(["gif-overlay", "a.gif", "--size", "big"]).is_err());
        assert!(Cli::try_parse_from(["gif-overlay", "a.gif", "--size", "0"]).is_err());
        assert!(Cli::try_parse_from(["gif-overlay", "a.gif", "--size", "10", "--fps", "0"]).is_err());
        assert!(Cli::try_parse_from(["gif-overlay", "--size", "10"]).is_err());
    }
}

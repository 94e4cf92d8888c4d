//! # glTF Viewer
//!
//! Opens a window, loads the first model and offers a panel to switch
//! models, recolor the surface and pick an embedded animation.
//!
//! ## Controls
//!
//! - Drag to orbit, scroll to zoom, Shift+drag to pan
//! - Shift+C returns to the framed view
//! - Escape quits
//!
//! ## Usage
//!
//! Run with: `cargo run --example viewer -- [--base-dir DIR] [MODEL...]`
//!
//! Without models the default set under `models/` is used.

use clap::Parser;
use glimmer::{GlimmerApp, ViewerConfig};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "viewer", version, about = "Interactive glTF model viewer")]
struct Args {
    /// Directory model paths are resolved against
    #[arg(long)]
    base_dir: Option<PathBuf>,
    /// Model files to offer in the picker; the first one is shown on start
    models: Vec<String>,
}

impl Args {
    fn into_config(self) -> ViewerConfig {
        let config = if self.models.is_empty() {
            ViewerConfig::default()
        } else {
            ViewerConfig::new(self.models)
        };
        match self.base_dir {
            Some(dir) => config.with_base_dir(dir),
            None => config,
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Args::parse().into_config();

    log::info!(
        "Starting viewer with {} model(s) from {}",
        config.asset_urls.len(),
        config.base_dir.display()
    );

    GlimmerApp::new(config)?.with_title("Glimmer glTF Viewer").run()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_models_and_base_dir_build_config() {
        let args =
            Args::try_parse_from(["viewer", "--base-dir", "assets", "duck.glb", "fox.glb"]).unwrap();
        let config = args.into_config();

        assert_eq!(config.asset_urls, vec!["duck.glb".to_string(), "fox.glb".to_string()]);
        assert_eq!(config.base_dir, PathBuf::from("assets"));
    }

    #[test]
    fn test_no_models_falls_back_to_default_set() {
        let config = Args::try_parse_from(["viewer"]).unwrap().into_config();
        assert_eq!(config, ViewerConfig::default());
    }

    #[test]
    fn test_unknown_flag_is_rejected() {
        assert!(Args::try_parse_from(["viewer", "--frobnicate"]).is_err());
    }
}

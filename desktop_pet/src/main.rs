//! desktop_pet entry point.

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use desktop_pet::app::run;
use desktop_pet::config::{Cli, PetConfig};
use pet_camera::{default_backend, open_camera, CameraOpener};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║          Desktop Pet: it wants to play a game                ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    #[cfg(feature = "camera")]
    println!("  Camera: OpenCV capture");
    #[cfg(not(feature = "camera"))]
    println!("  Camera: none  (hand game uses SPACE; build with --features camera)");
    println!("  Press H in the pet window for the key map, Esc to quit.");
    println!();

    let mut config = PetConfig::load(cli.config.as_deref())?;
    config.apply_env(|name| std::env::var(name).ok());
    config.apply_cli(&cli);

    let preferred = i32::try_from(config.camera.preferred_index).unwrap_or(0);
    let opener: CameraOpener = Arc::new(move || open_camera(default_backend().as_ref(), preferred));
    info!(
        camera = preferred,
        voice = config.voice.usable_key().is_some(),
        seed = ?config.seed,
        "starting"
    );

    run(config, opener).context("pet window")?;
    Ok(())
}

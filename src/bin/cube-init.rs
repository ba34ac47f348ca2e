//! Initializes window, graphics context, GUI root and renderer, then exits
//! without building a scene or rendering.

use anyhow::Context;
use flow_cube::{config::Config, flow, logging};

fn main() -> anyhow::Result<()> {
    let config = Config::from_env_or_exit();

    logging::init(&config);
    log::info!("Initializing {}", config.title);

    let app = flow::init(&config).context("initialization failed")?;
    log::debug!("{:?}", app.renderer);
    Ok(())
}

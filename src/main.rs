use flow_cube::{config::Config, flow, logging};

fn main() -> anyhow::Result<()> {
    let config = Config::from_env_or_exit();

    logging::init(&config);
    log::info!("Initializing {}", config.title);

    flow::run(&config)
}

use anyhow::Context;
use vista::domain::config::{ApiConfig, LoggingConfig};
use vista::kernel::config::load_config;
use vista_logger::Logger;
use vista_server::Server;

fn init_logger(cfg: &LoggingConfig) -> anyhow::Result<Logger> {
    let mut builder = Logger::builder()
        .name(env!("CARGO_PKG_NAME"))
        .level(cfg.level.clone())
        .console(cfg.console)
        .json(cfg.json);

    if let Some(directives) = &cfg.directives {
        builder = builder.directives(directives.clone());
    }
    if let Some(directory) = &cfg.directory {
        builder = builder.directory(directory);
    }

    Ok(builder.init()?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg: ApiConfig =
        load_config(Some("server")).context("Critical: Configuration is malformed")?;

    let _log = init_logger(&cfg.logging)?;

    Server::builder().config(cfg).build().await?.run().await
}

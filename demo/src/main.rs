use kit_demo::{config::DemoConfig, AppState};
use kit_http::Server;

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for Ctrl-C: {}", err);
        std::future::pending::<()>().await;
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = DemoConfig::load(kit_demo::config::ENV_FILE)?;
    config.logger()?.init()?;

    log::info!("Starting kit demo...");

    let state = AppState::new(&config)?;
    let server = config.configure_server(Server::new(move |cfg| state.configure(cfg)));

    server.serve(shutdown_signal()).await?;
    log::info!("Bye");
    Ok(())
}

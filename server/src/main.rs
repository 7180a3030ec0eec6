use clap::Parser;
use tokio::net::TcpListener;
use todo_server::{Config, TodoStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::parse();
    let store = TodoStore::connect(&config.database_url)
        .await
        .inspect_err(|e| log::error!("cannot open {}: {e}", config.database_url))?;

    let addr = config.listen_addr();
    let listener = TcpListener::bind(&addr).await?;
    log::info!("listening on http://{addr}");
    todo_server::run(listener, store).await?;
    Ok(())
}

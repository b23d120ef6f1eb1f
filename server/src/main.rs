use anyhow::Context;
use tokio::net::TcpListener;
use todo_server::{logging, Config, Database, SqliteStore};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("reading configuration")?;
    logging::init(config.mode).context("installing log subscriber")?;

    let store = match &config.database {
        Database::File(path) => SqliteStore::open(path)
            .with_context(|| format!("opening database {}", path.display()))?,
        Database::InMemory => SqliteStore::open_in_memory().context("opening in-memory database")?,
    };

    let listener = TcpListener::bind(config.listen_address)
        .await
        .with_context(|| format!("binding {}", config.listen_address))?;
    info!(address = %config.listen_address, mode = ?config.mode, "listening");

    todo_server::run(listener, store, config.mode)
        .await
        .context("serving http")
}

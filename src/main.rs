use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use fountaincast::{BlockStore, Cli, Server, UdpTransport};
use log::info;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    // The file must be readable before we bind anything.
    let store = BlockStore::open(&cli.file, cli.blocksize)
        .await
        .with_context(|| format!("cannot serve {}", cli.file.display()))?;
    info!(
        "serving {} ({} bytes, {} blocks of {} bytes)",
        store.metadata().filename,
        store.metadata().file_size,
        store.block_count(),
        store.block_size(),
    );

    let transport = UdpTransport::bind(&cli.listen_addr())
        .await
        .with_context(|| format!("unable to bind {}", cli.listen_addr()))?;
    println!("Listening on {} ...", cli.listen_addr());

    let mut server = Server::new(transport, Arc::new(store));
    server.run().await?;
    Ok(())
}

use std::io;

use anyhow::{Context, Result};
use chathub::http::reqwest::default_dyn_transport;
use chathub::repl::Repl;
use chathub::{ClientSettings, ModelRegistry, logging};

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    logging::init();

    let settings = ClientSettings::from_env().context("invalid client settings")?;
    let transport = default_dyn_transport(&settings).context("failed to build HTTP client")?;

    let stdin = io::stdin();
    let mut repl = Repl::new(
        stdin.lock(),
        io::stdout(),
        ModelRegistry::builtin(),
        transport,
        settings,
    );
    repl.run().await.context("terminal I/O failed")?;
    Ok(())
}

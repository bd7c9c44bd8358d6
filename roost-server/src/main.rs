use anyhow::Result;
use roost_server::{build, Settings};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let settings = Settings::from_env()?;
    let ax = build(&settings)?;

    let addr = settings.addr();
    tracing::info!(%addr, "Roost listening");

    ax.listen(addr).await?;

    Ok(())
}

//! Ping command - checks a provider is reachable

use tokio_util::sync::CancellationToken;

use super::{ProviderArgs, bootstrap};

pub async fn run(args: ProviderArgs) -> anyhow::Result<()> {
    let provider = bootstrap(&args)?;

    provider.ping(&CancellationToken::new()).await?;
    println!("{}: ok", provider.name());

    Ok(())
}

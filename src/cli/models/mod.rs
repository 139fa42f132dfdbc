//! Models command - lists the active models of a provider

use tokio_util::sync::CancellationToken;
use tracing::info;

use super::{ProviderArgs, bootstrap};

/// Print one model name per line
pub async fn run(args: ProviderArgs) -> anyhow::Result<()> {
    let provider = bootstrap(&args)?;
    let cancel = CancellationToken::new();

    let models = provider.models(&cancel).await?;
    info!(provider = %provider.name(), count = models.len(), "Listed models");

    for model in models {
        println!("{}", model.name);
    }

    Ok(())
}

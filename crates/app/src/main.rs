use anyhow::Context;
use storefront_app::{AppContext, HttpShopApi, StorefrontConfig};

/// Headless session: load the catalog through the configured backend and log
/// every event the coordinator publishes.
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    storefront_observability::init();

    let config = StorefrontConfig::from_env().context("invalid storefront configuration")?;
    let api = HttpShopApi::new(&config).context("failed to build HTTP client")?;
    tracing::info!(api_origin = %api.api_origin(), "starting storefront");

    let ctx = AppContext::start(config, api);
    ctx.bus().on_all(|env| {
        tracing::info!(
            event = env.name(),
            seq = env.sequence_number(),
            at = %env.emitted_at(),
            kind = env.payload().kind(),
            "event"
        );
        Ok(())
    });

    let count = ctx
        .coordinator()
        .load_catalog()
        .await
        .context("failed to load catalog")?;

    for entry in ctx.coordinator().catalog_entries() {
        tracing::info!(
            product_id = %entry.product.id_typed(),
            title = entry.product.title(),
            category = %entry.product.category(),
            purchasable = entry.purchasable,
            "catalog entry"
        );
    }
    tracing::info!(products = count, "catalog ready");

    ctx.shutdown();
    Ok(())
}

use anyhow::Context;

use folio_kernel::settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load Folio settings")?;

    folio_telemetry::init(&settings.telemetry)?;

    tracing::info!(
        env = ?settings.environment,
        base_url = %settings.store.base_url,
        "folio-app bootstrap starting"
    );

    let registry = folio_app::compose(&settings).await?;

    folio_http::start_server(&registry, &settings).await?;

    registry.stop_all().await?;

    Ok(())
}

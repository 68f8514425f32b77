use sail::prelude::*;

mod products;

use products::ProductModule;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    sail::logging::init()?;

    tracing::info!("Starting hello-server...");

    let mut app = Application::new();
    app.use_middleware(request_id())
        .use_middleware(request_logging());
    app.register_entry(
        ModuleEntry::new(ProductModule::default())
            .with_bootstrap()
            .with_shutdown(),
    )?;

    app.run().await?;

    tracing::info!("Server stopped");
    Ok(())
}

use eventflyer_core::Config;

// Use mimalloc as the global allocator for lower fragmentation under image workloads
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize the application (tracing, database, storage, routes)
    let (_state, router) = eventflyer_api::setup::initialize_app(config.clone()).await?;

    // Start the server
    eventflyer_api::setup::server::start_server(&config, router).await?;

    Ok(())
}

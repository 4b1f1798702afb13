use migration::{Migrator, MigratorTrait};

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;
    let mut tasks = tokio::task::JoinSet::new();

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "financas={level},server={level},engine={level},assistant={level}",
            level = settings.app.level
        ))
        .init();

    let db = connect(&settings.database.url).await?;
    let engine = engine::Engine::builder()
        .database(db)
        .session_ttl(chrono::Duration::days(settings.auth.session_ttl_days))
        .build()
        .await?;

    let assistant = assistant::Assistant::from_config(settings.ai.client_config())?;
    if !assistant.is_enabled() {
        tracing::info!("no ai.api_key configured, text parsing uses the local extractor");
    }

    let listener = tokio::net::TcpListener::bind(settings.server.addr()).await?;
    tasks.spawn(async move {
        if let Err(err) = server::run_with_listener(engine, assistant, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    while tasks.join_next().await.is_some() {
        tasks.shutdown().await;
    }

    Ok(())
}

async fn connect(
    url: &str,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    tracing::info!("database ready");
    Ok(database)
}

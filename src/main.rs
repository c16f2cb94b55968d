use clap::Parser;
use cookmate::{
    api::{handlers::AppState, routes},
    cli::{commands, Cli, Commands},
    config::Settings,
    corpus::CorpusStore,
    search::SearchService,
    Error, Result,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file if it exists
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,cookmate=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let mut settings = Settings::from_env()?;
    if let Some(corpus) = cli.corpus {
        settings.corpus.path = corpus;
    }
    settings.validate()?;

    match cli.command {
        Commands::Serve { port, host } => serve(settings, port, host).await?,
        Commands::Search { query, filters } => {
            commands::search(&build_service(&settings)?, &query, &filters)?
        }
        Commands::Recommend {
            ingredients,
            recipe,
            filters,
        } => commands::recommend(
            &build_service(&settings)?,
            ingredients.as_deref(),
            recipe.as_deref(),
            &filters,
        )?,
        Commands::Show { recipe_id } => commands::show(&build_service(&settings)?, recipe_id)?,
        Commands::Options => commands::options(&build_service(&settings)?)?,
        Commands::Suggest { text } => commands::suggest(&build_service(&settings)?, &text)?,
        Commands::Vocab { output } => {
            commands::export_vocab(&build_service(&settings)?, &output)?;
        }
    }

    Ok(())
}

/// Load the filter tables and the corpus
fn build_service(settings: &Settings) -> Result<SearchService> {
    let rules = settings.filter_rules()?;
    info!(
        "Loaded filter tables: {} dietary labels, {} allergy labels, {} cuisines",
        rules.dietary.len(),
        rules.allergies.len(),
        rules.cuisines.len()
    );

    let store = CorpusStore::open(&settings.corpus.path)?;

    let service = SearchService::new(
        Arc::new(store),
        Arc::new(rules),
        settings.search.clone(),
        settings.corpus.fallback_image_url.clone(),
    );

    match settings.suggestion_dictionary()? {
        Some(dictionary) => {
            info!("Loaded suggestion dictionary: {} terms", dictionary.len());
            Ok(service.with_dictionary(dictionary))
        }
        None => Ok(service),
    }
}

async fn serve(mut settings: Settings, port: Option<u16>, host: Option<String>) -> Result<()> {
    if let Some(port) = port {
        settings.server.port = port;
    }
    if let Some(host) = host {
        settings.server.host = host;
    }

    info!("Starting Cookmate server");
    info!("Corpus: {}", settings.corpus.path.display());
    info!("Server: {}:{}", settings.server.host, settings.server.port);

    let service = build_service(&settings)?;
    let recipes = service.store().current().len();

    let state = AppState {
        service: Arc::new(service),
        settings: settings.clone(),
    };

    let app = routes::create_router(state, &settings);

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| Error::Internal(format!("Failed to bind to {addr}: {e}")))?;

    println!("\n========================================");
    println!("Cookmate Server");
    println!("========================================");
    println!("Status: Running");
    println!("Address: http://{addr}");
    println!("Corpus: {} recipes", recipes);
    println!("\nAPI Endpoints:");
    println!("  GET  /api/search");
    println!("  GET  /api/recommend/by_ingredients");
    println!("  GET  /api/recommend/by_recipe");
    println!("  GET  /api/recipes/:id");
    println!("  GET  /api/dietary-options");
    println!("  GET  /api/suggest");
    println!("\nPress Ctrl+C to stop");
    println!("========================================\n");

    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| Error::Internal(format!("Server error: {e}")))?;

    info!("Shutting down...");
    Ok(())
}

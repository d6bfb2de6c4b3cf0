//! mylook - command-line front for the MyLook wardrobe engine
//!
//! Wires the core end to end: open the local cache, reconcile against the
//! remote store when one is configured, resolve the ambient context, and
//! print one outfit suggestion. There is no positioning hardware on the
//! command line, so context resolution starts at the IP fallback path.

use anyhow::Result;
use mylook_core::ai::StylistClient;
use mylook_core::providers::geo::GeoClient;
use mylook_core::providers::weather::WeatherClient;
use mylook_core::remote::SupabaseStore;
use mylook_core::suggest::SuggestionParams;
use mylook_core::AppState;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing; RUST_LOG overrides the config file directive
    let config_path = mylook_common::config::default_config_path()?;
    let config = mylook_common::config::load_config(&config_path)?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(config.log_filter.clone().unwrap_or_else(|| "info".to_string()))
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting mylook {}", env!("CARGO_PKG_VERSION"));

    // Local cache
    let cache_path = config
        .cache_path
        .clone()
        .unwrap_or_else(mylook_common::config::default_cache_path);
    info!("Cache database: {}", cache_path.display());
    let db = mylook_core::cache::open_cache(&cache_path).await?;

    // Remote store, if configured
    let remote = match (&config.supabase_url, &config.supabase_key) {
        (Some(url), Some(key)) => {
            info!("Remote store configured: {}", url);
            Some(Arc::new(SupabaseStore::new(
                url.clone(),
                key.clone(),
                config.bucket().to_string(),
            )) as Arc<dyn mylook_core::remote::RemoteStore>)
        }
        _ => {
            info!("Remote store not configured, using local cache only");
            None
        }
    };

    let mut state = AppState::load(db, remote).await?;

    // Startup reconciliation
    if let Some(report) = state.reconcile().await? {
        info!(
            wardrobe = %report.wardrobe.status,
            history = %report.history.status,
            "Reconciliation finished"
        );
    }

    if state.wardrobe.is_empty() {
        println!("Wardrobe is empty. Add items before generating a look.");
        return Ok(());
    }

    // Ambient context (IP path only on the command line)
    let geo = GeoClient::new();
    let weather = WeatherClient::new();
    let context = mylook_core::context::resolve_context(None, &geo, &weather).await;
    println!("Context: {}", context.summary());
    state.context = Some(context.clone());

    // Stylist, when a credential resolves
    let stylist = mylook_core::config::resolve_api_key(&state.settings, &config).map(|key| {
        StylistClient::new(key, mylook_core::config::resolve_model(&state.settings, &config))
    });

    let look_type = mylook_common::models::PREDEFINED_LOOKS[0];
    let suggestion = mylook_core::suggest::generate_suggestion(
        &state.wardrobe,
        look_type,
        &context,
        stylist.as_ref(),
        &SuggestionParams::default(),
    )
    .await?;

    println!("Look: {} (source: {:?})", suggestion.look_type, suggestion.source);
    for item in &suggestion.outfit {
        println!("  - {}: {}", item.category, item.name);
    }
    if suggestion.outfit.is_empty() {
        println!("  (no valid outfit for the current season)");
    }
    println!("Why: {}", suggestion.rationale);

    Ok(())
}

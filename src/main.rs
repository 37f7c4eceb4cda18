use spotbook::auth;
use spotbook::config::AppConfig;
use spotbook::db::{init_pool, migrate, seed_default_spots};
use spotbook::error::AppError;
use spotbook::routes::create_router;
use spotbook::services::sweeper::run_sweeper;
use spotbook::state::AppState;
use tokio::net::TcpListener;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_logging();

    let config = AppConfig::from_env()?;
    let db = init_pool(&config.database_url).await?;
    migrate(&db).await?;
    seed_default_spots(&db).await?;

    let state = AppState::new(config.clone(), db.clone());

    if let Some((username, password)) = &config.bootstrap_user {
        match auth::register_user(&state, username, password).await {
            Ok(user) => info!(user_id = user.id, "bootstrap user created"),
            Err(AppError::BadRequest(reason)) => warn!("bootstrap user skipped: {reason}"),
            Err(err) => return Err(err),
        }
    }

    if config.sweep_interval.is_zero() {
        info!("stale reservation sweeper disabled");
    } else {
        tokio::spawn(run_sweeper(state.booking.clone(), config.sweep_interval));
    }

    let app = create_router(state.clone());

    let listener = TcpListener::bind(config.listen_addr).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);
    let filter_layer = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,spotbook=debug,tower_http=info".into());

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}

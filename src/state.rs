use crate::{
    auth::TokenService,
    config::AppConfig,
    db::DbPool,
    services::{availability::AvailabilityView, booking::BookingEngine, notifier::Notifier},
};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub db: DbPool,
    pub booking: BookingEngine,
    pub availability: AvailabilityView,
    pub tokens: TokenService,
}

impl AppState {
    pub fn new(config: AppConfig, db: DbPool) -> Self {
        let notifier = Notifier::new(config.notify_url.clone(), config.notify_timeout);
        let tokens = TokenService::new(&config.jwt_secret, config.token_ttl);
        Self {
            booking: BookingEngine::new(db.clone(), notifier),
            availability: AvailabilityView::new(db.clone()),
            tokens,
            config,
            db,
        }
    }
}

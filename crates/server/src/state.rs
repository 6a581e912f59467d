use crate::{config::AppConfig, media::MediaStorage};
use database::services::account::AccountPolicy;
use models::render::RenderContext;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// Shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Arc<AppConfig>,
    pub media: MediaStorage,
}

impl AppState {
    pub fn new(db: DatabaseConnection, config: AppConfig) -> Self {
        let media = MediaStorage::new(config.media_root.clone());
        Self {
            db,
            config: Arc::new(config),
            media,
        }
    }

    pub fn render_context(&self) -> RenderContext {
        RenderContext::new(self.config.media_url.clone())
    }

    pub fn account_policy(&self) -> AccountPolicy {
        AccountPolicy {
            unique_email: self.config.enforce_unique_email,
        }
    }
}

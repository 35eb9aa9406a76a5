use std::sync::Arc;

use crate::{
    config::Config,
    infrastructure::{
        database::SocialDatabase,
        identity::{IdentityProvider, SqliteIdentityProvider},
        media_storage::MediaStorage,
        middleware::HasIdentityProvider,
    },
    services::{EngagementService, PostQueryService, ProfileQueryService, SocialGraphService},
};

#[derive(Clone)]
pub struct AppState {
    pub db: SocialDatabase,
    pub identity_provider: Arc<dyn IdentityProvider>,
    pub media: MediaStorage,
    pub social_graph: SocialGraphService,
    pub engagement: EngagementService,
    pub profile_queries: ProfileQueryService,
    pub post_queries: PostQueryService,
    pub config: Config,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let db = SocialDatabase::connect(&config.database).await?;
        Ok(Self::with_database(db, config))
    }

    /// Wire services over an already initialized database.
    pub fn with_database(db: SocialDatabase, config: Config) -> Self {
        Self {
            identity_provider: Arc::new(SqliteIdentityProvider::new(db.clone())),
            media: MediaStorage::new(&config.media),
            social_graph: SocialGraphService::new(db.clone()),
            engagement: EngagementService::new(db.clone()),
            profile_queries: ProfileQueryService::new(db.clone()),
            post_queries: PostQueryService::new(db.clone()),
            db,
            config,
        }
    }
}

impl HasIdentityProvider for AppState {
    fn identity_provider(&self) -> &Arc<dyn IdentityProvider> {
        &self.identity_provider
    }
}

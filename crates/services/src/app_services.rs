use std::sync::Arc;

use storage::repository::Storage;

use crate::Clock;
use crate::error::AppServicesError;
use crate::progress_service::ProgressService;
use crate::progress_source::{HttpProgressSource, ProgressApiConfig, ProgressSource};

/// Assembles app-facing services over a chosen progress source.
#[derive(Clone)]
pub struct AppServices {
    progress: Arc<ProgressService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage and the given source.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        source: Arc<dyn ProgressSource>,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::with_storage(&storage, clock, source))
    }

    /// Build services that fetch from the progress API described by `config`.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_http(
        db_url: &str,
        clock: Clock,
        config: ProgressApiConfig,
    ) -> Result<Self, AppServicesError> {
        let source: Arc<dyn ProgressSource> = Arc::new(HttpProgressSource::new(config));
        Self::new_sqlite(db_url, clock, source).await
    }

    #[must_use]
    pub fn with_storage(storage: &Storage, clock: Clock, source: Arc<dyn ProgressSource>) -> Self {
        let progress = Arc::new(ProgressService::new(
            clock,
            source,
            Arc::clone(&storage.last_viewed),
        ));
        Self { progress }
    }

    #[must_use]
    pub fn progress(&self) -> Arc<ProgressService> {
        Arc::clone(&self.progress)
    }
}

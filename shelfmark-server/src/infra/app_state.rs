use std::sync::Arc;

use shelfmark_core::{BookRepository, CoverStore};

use crate::infra::config::Config;

/// Shared per-process handles: configuration, the repository and the
/// cover store. Cloning is cheap; everything request-scoped lives in the
/// handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    books: Arc<dyn BookRepository>,
    covers: CoverStore,
}

impl AppState {
    pub fn new(config: Config, books: Arc<dyn BookRepository>, covers: CoverStore) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                books,
                covers,
            }),
        }
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    pub fn books(&self) -> &dyn BookRepository {
        self.inner.books.as_ref()
    }

    pub fn covers(&self) -> &CoverStore {
        &self.inner.covers
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

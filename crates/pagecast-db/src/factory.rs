//! Composition utilities for wiring `SQLite` repositories.
//!
//! Construction only, no domain logic.

use sqlx::SqlitePool;
use std::sync::Arc;

use pagecast_core::Repos;

use crate::repositories::{SqliteDocumentRepository, SqliteSettingsRepository};

/// Factory for creating repository instances with `SQLite` backends.
pub struct RepoFactory;

impl RepoFactory {
    /// Build all `SQLite` repositories from a pool.
    ///
    /// The pool should come from [`setup_database`](crate::setup_database)
    /// so the schema exists.
    pub fn build_repos(pool: SqlitePool) -> Repos {
        Repos::new(
            Arc::new(SqliteDocumentRepository::new(pool.clone())),
            Arc::new(SqliteSettingsRepository::new(pool)),
        )
    }
}

// Copyright (c) 2026 agent-progress contributors
// SPDX-License-Identifier: AGPL-3.0

//! # PostgreSQL Connection Pool
//!
//! Wraps `sqlx::postgres::PgPool` in a thin `Database` newtype that can be
//! injected into all PostgreSQL repository implementations. The pool is
//! the only shared mutable resource in the tracker; it is opened by the
//! process entry point and passed down explicitly.

use anyhow::Result;
use sqlx::postgres::{PgPool, PgPoolOptions};

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect with the default pool size.
    ///
    /// Sized for the concurrent-agent fan-out of a single workflow: dozens
    /// of agents can report near-simultaneously during a burst of parallel
    /// work.
    pub async fn new(connection_string: &str) -> Result<Self> {
        Self::with_max_connections(connection_string, 16).await
    }

    pub async fn with_max_connections(connection_string: &str, max: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max)
            .connect(connection_string)
            .await?;

        Ok(Self { pool })
    }

    pub fn get_pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

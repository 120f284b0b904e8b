//! Embedded PostgreSQL for adapter tests.
//!
//! Each test gets its own temporary database on a shared
//! `pg-embed-setup-unpriv` cluster, migrated before use. Setup failures fail
//! the test unless `SKIP_TEST_CLUSTER` is truthy, in which case the test
//! prints a skip marker and returns early.

use std::time::Duration;

use pg_embedded_setup_unpriv::test_support::shared_cluster_handle;
use pg_embedded_setup_unpriv::{ClusterHandle, TemporaryDatabase};
use tokio::runtime::Runtime;

use snippetbox::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};

const SKIP_ENV: &str = "SKIP_TEST_CLUSTER";
const CLUSTER_RETRIES: usize = 5;
const CLUSTER_RETRY_DELAY: Duration = Duration::from_millis(500);

/// A migrated temporary database with a pool and a runtime to drive it.
///
/// Tests stay synchronous and `block_on` the runtime, since cluster
/// bootstrap must not run inside an async context.
pub struct TestDatabase {
    pub pool: DbPool,
    pub runtime: Runtime,
    _database: TemporaryDatabase,
}

/// Returns true when `SKIP_TEST_CLUSTER` is `1`, `true` or `yes`.
pub fn should_skip_test_cluster() -> bool {
    std::env::var(SKIP_ENV)
        .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

fn cluster() -> Result<&'static ClusterHandle, String> {
    let mut attempt = 1;
    loop {
        match shared_cluster_handle() {
            Ok(handle) => return Ok(handle),
            Err(error) if attempt < CLUSTER_RETRIES => {
                eprintln!("pg-embed: cluster attempt {attempt}/{CLUSTER_RETRIES} failed: {error:?}");
                std::thread::sleep(CLUSTER_RETRY_DELAY);
                attempt += 1;
            }
            Err(error) => return Err(format!("{error:?}")),
        }
    }
}

fn provision() -> Result<TestDatabase, String> {
    let database = cluster()?
        .temporary_database(format!("test_{}", uuid::Uuid::new_v4()))
        .map_err(|err| format!("create temporary database: {err:?}"))?;
    let url = database.url().to_owned();
    run_pending_migrations(&url).map_err(|err| err.to_string())?;

    let runtime = Runtime::new().map_err(|err| err.to_string())?;
    let pool = runtime
        .block_on(DbPool::new(PoolConfig::new(url).with_max_size(2)))
        .map_err(|err| err.into_message())?;

    Ok(TestDatabase {
        pool,
        runtime,
        _database: database,
    })
}

/// Provision a fresh database, or `None` when the cluster is unavailable
/// and `SKIP_TEST_CLUSTER` allows skipping.
///
/// # Panics
///
/// When setup fails and skipping is not enabled, so CI breakage is visible.
pub fn test_database() -> Option<TestDatabase> {
    match provision() {
        Ok(database) => Some(database),
        Err(reason) if should_skip_test_cluster() => {
            eprintln!("SKIP-TEST-CLUSTER: {reason}");
            None
        }
        Err(reason) => {
            panic!("test cluster setup failed: {reason}. Set {SKIP_ENV}=1 to skip.")
        }
    }
}

//! PostgreSQL-backed [`SnippetRepository`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{NewSnippetRecord, SnippetRepository, SnippetRepositoryError};
use crate::domain::{Snippet, SnippetId};

use super::error_mapping::{DieselFailure, classify};
use super::models::{NewSnippetRow, SnippetRow};
use super::pool::{DbPool, PoolError};
use super::schema::snippets;

/// Diesel implementation of the snippet repository port.
#[derive(Clone)]
pub struct DieselSnippetRepository {
    pool: DbPool,
}

impl DieselSnippetRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> SnippetRepositoryError {
    SnippetRepositoryError::connection(error.into_message())
}

fn map_diesel_error(error: diesel::result::Error, operation: &str) -> SnippetRepositoryError {
    match classify(error, operation) {
        DieselFailure::Connection(message) => SnippetRepositoryError::connection(message),
        DieselFailure::UniqueViolation { constraint } => SnippetRepositoryError::query(format!(
            "{operation}: unique constraint {} violated",
            constraint.as_deref().unwrap_or("unknown")
        )),
        DieselFailure::Query(message) => SnippetRepositoryError::query(message),
    }
}

fn row_to_snippet(row: SnippetRow) -> Result<Snippet, SnippetRepositoryError> {
    let id = SnippetId::new(row.id).map_err(|err| SnippetRepositoryError::query(err.to_string()))?;
    Ok(Snippet {
        id,
        title: row.title,
        content: row.content,
        created: row.created,
        expires: row.expires,
    })
}

#[async_trait]
impl SnippetRepository for DieselSnippetRepository {
    async fn insert(&self, record: &NewSnippetRecord) -> Result<SnippetId, SnippetRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewSnippetRow {
            title: &record.title,
            content: &record.content,
            created: record.created,
            expires: record.expires,
        };
        let id: i64 = diesel::insert_into(snippets::table)
            .values(&row)
            .returning(snippets::id)
            .get_result(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "insert snippet"))?;
        SnippetId::new(id).map_err(|err| SnippetRepositoryError::query(err.to_string()))
    }

    async fn find_unexpired(
        &self,
        id: SnippetId,
        now: DateTime<Utc>,
    ) -> Result<Option<Snippet>, SnippetRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = snippets::table
            .filter(snippets::id.eq(id.get()))
            .filter(snippets::expires.gt(now))
            .select(SnippetRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, "load snippet"))?;
        row.map(row_to_snippet).transpose()
    }

    async fn latest_unexpired(
        &self,
        now: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<Snippet>, SnippetRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows: Vec<SnippetRow> = snippets::table
            .filter(snippets::expires.gt(now))
            .order((snippets::created.desc(), snippets::id.desc()))
            .limit(limit)
            .select(SnippetRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "list latest snippets"))?;
        rows.into_iter().map(row_to_snippet).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    fn row(id: i64) -> SnippetRow {
        let created = Utc
            .with_ymd_and_hms(2024, 1, 2, 3, 4, 5)
            .single()
            .expect("valid timestamp");
        SnippetRow {
            id,
            title: "An old silent pond".to_owned(),
            content: "A frog jumps into the pond".to_owned(),
            created,
            expires: created + chrono::TimeDelta::days(7),
        }
    }

    #[rstest]
    fn row_converts_into_snippet() {
        let snippet = row_to_snippet(row(3)).expect("valid row");
        assert_eq!(snippet.id.get(), 3);
        assert_eq!(snippet.title, "An old silent pond");
    }

    #[rstest]
    fn non_positive_row_id_is_a_query_error() {
        let err = row_to_snippet(row(0)).expect_err("id 0 rejected");
        assert!(matches!(err, SnippetRepositoryError::Query { .. }));
    }

    #[rstest]
    fn pool_failures_map_to_connection_errors() {
        let err = map_pool_error(PoolError::checkout("timed out"));
        assert_eq!(err, SnippetRepositoryError::connection("timed out"));
    }
}

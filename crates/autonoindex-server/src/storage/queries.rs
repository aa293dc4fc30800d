//! Database queries for the token registry.

use autonoindex_core::db::{DatabaseError, unix_timestamp};

use super::db::TokenDatabase;
use super::models::{TokenRecord, TokenRegistration};

impl TokenDatabase {
    /// Look up a token record by its token string.
    pub async fn get_token(&self, token: &str) -> Result<Option<TokenRecord>, DatabaseError> {
        let record = sqlx::query_as::<_, TokenRecord>("SELECT * FROM tokens WHERE token = ?")
            .bind(token)
            .fetch_optional(self.pool())
            .await?;

        Ok(record)
    }

    /// Create or replace a token record. The registration is sanitized
    /// before it hits the table.
    pub async fn upsert_token(
        &self,
        token: &str,
        registration: &TokenRegistration,
    ) -> Result<TokenRecord, DatabaseError> {
        let reg = registration.sanitized();
        let now = unix_timestamp();

        sqlx::query(
            "INSERT INTO tokens (token, status, expires_at, grace_until, sites, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(token) DO UPDATE SET
               status = excluded.status,
               expires_at = excluded.expires_at,
               grace_until = excluded.grace_until,
               sites = excluded.sites,
               updated_at = excluded.updated_at",
        )
        .bind(token)
        .bind(&reg.status)
        .bind(reg.expires_at)
        .bind(reg.grace_until)
        .bind(reg.sites_column())
        .bind(now)
        .bind(now)
        .execute(self.pool())
        .await?;

        self.get_token(token)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("Token {token}")))
    }

    /// List all token records, oldest first.
    pub async fn list_tokens(&self) -> Result<Vec<TokenRecord>, DatabaseError> {
        let records =
            sqlx::query_as::<_, TokenRecord>("SELECT * FROM tokens ORDER BY created_at ASC")
                .fetch_all(self.pool())
                .await?;

        Ok(records)
    }

    /// Delete a token record. Returns `true` when a row was removed.
    pub async fn delete_token(&self, token: &str) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM tokens WHERE token = ?")
            .bind(token)
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

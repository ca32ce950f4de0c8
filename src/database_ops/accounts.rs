use crate::error::{LibraryError, LibraryResult};
use crate::library::{Account, AccountStore};
use crate::steam::SteamId;
use crate::util::db::Db;
use async_trait::async_trait;
use tracing::instrument;

const ACCOUNT_COLUMNS: &str = "id, email, steam_id, created_at";

#[async_trait]
impl AccountStore for Db {
    #[instrument(skip(self))]
    async fn create_account(&self, email: &str) -> LibraryResult<Account> {
        let sql = format!("INSERT INTO accounts (email) VALUES ($1) RETURNING {ACCOUNT_COLUMNS}");
        sqlx::query_as::<_, Account>(&sql)
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .map_err(|err| match &err {
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    LibraryError::EmailTaken(email.to_string())
                }
                _ => LibraryError::Database(err),
            })
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, account_id: i64) -> LibraryResult<Option<Account>> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1");
        Ok(sqlx::query_as::<_, Account>(&sql)
            .bind(account_id)
            .fetch_optional(&self.pool)
            .await?)
    }

    #[instrument(skip(self))]
    async fn update_steam_id(&self, account_id: i64, steam_id: &SteamId) -> LibraryResult<bool> {
        let result = sqlx::query("UPDATE accounts SET steam_id = $1 WHERE id = $2")
            .bind(steam_id.as_str())
            .bind(account_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }
}

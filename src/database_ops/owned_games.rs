use crate::error::LibraryResult;
use crate::library::model::{OwnedItem, SyncedItem, DEFAULT_STATUS};
use crate::library::query::{ListQuery, SortDir, SortKey};
use crate::library::LibraryStore;
use crate::util::db::Db;
use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};
use tracing::{debug, instrument};

const ITEM_COLUMNS: &str = "appid, name, playtime_minutes, status, completion, tags";

// A resync never overwrites status or tags.
const UPSERT_SQL: &str = "INSERT INTO owned_games
        (account_id, appid, name, playtime_minutes, status, completion, synced_at)
     VALUES ($1, $2, $3, $4, $5, $6, now())
     ON CONFLICT (account_id, appid) DO UPDATE
     SET name = EXCLUDED.name,
         playtime_minutes = EXCLUDED.playtime_minutes,
         completion = EXCLUDED.completion,
         synced_at = EXCLUDED.synced_at
     RETURNING appid, name, playtime_minutes, status, completion, tags";

/// Fixed ORDER BY fragment for every sort/direction pair; `appid` breaks ties.
pub(crate) fn order_clause(sort: SortKey, order: SortDir) -> &'static str {
    match (sort, order) {
        (SortKey::Name, SortDir::Asc) => " ORDER BY name ASC, appid ASC",
        (SortKey::Name, SortDir::Desc) => " ORDER BY name DESC, appid ASC",
        (SortKey::Playtime, SortDir::Asc) => " ORDER BY playtime_minutes ASC, appid ASC",
        (SortKey::Playtime, SortDir::Desc) => " ORDER BY playtime_minutes DESC, appid ASC",
        (SortKey::Completion, SortDir::Asc) => " ORDER BY completion ASC, appid ASC",
        (SortKey::Completion, SortDir::Desc) => " ORDER BY completion DESC, appid ASC",
    }
}

fn push_filter<'a>(qb: &mut QueryBuilder<'a, Postgres>, account_id: i64, tag: Option<&'a str>) {
    qb.push(" WHERE account_id = ").push_bind(account_id);
    if let Some(tag) = tag {
        qb.push(" AND ").push_bind(tag).push(" = ANY(tags)");
    }
}

#[async_trait]
impl LibraryStore for Db {
    #[instrument(skip(self, items), fields(items = items.len()))]
    async fn upsert_items(
        &self,
        account_id: i64,
        items: &[SyncedItem],
    ) -> LibraryResult<Vec<OwnedItem>> {
        // Rolled back on drop if any statement fails.
        let mut tx = self.pool.begin().await?;
        let mut stored = Vec::with_capacity(items.len());
        for item in items {
            let row = sqlx::query_as::<_, OwnedItem>(UPSERT_SQL)
                .bind(account_id)
                .bind(item.appid)
                .bind(&item.name)
                .bind(item.playtime_minutes)
                .bind(DEFAULT_STATUS)
                .bind(item.completion)
                .fetch_one(&mut *tx)
                .await?;
            stored.push(row);
        }
        tx.commit().await?;
        debug!(account_id, rows = stored.len(), "owned games upserted");
        Ok(stored)
    }

    #[instrument(skip(self))]
    async fn list_items(
        &self,
        account_id: i64,
        query: &ListQuery,
    ) -> LibraryResult<(Vec<OwnedItem>, i64)> {
        let tag = query.tag.as_deref();

        let mut count_qb: QueryBuilder<'_, Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM owned_games");
        push_filter(&mut count_qb, account_id, tag);
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut qb: QueryBuilder<'_, Postgres> =
            QueryBuilder::new(format!("SELECT {ITEM_COLUMNS} FROM owned_games"));
        push_filter(&mut qb, account_id, tag);
        qb.push(order_clause(query.sort, query.order));
        qb.push(" LIMIT ")
            .push_bind(query.limit())
            .push(" OFFSET ")
            .push_bind(query.offset());
        let items = qb
            .build_query_as::<OwnedItem>()
            .fetch_all(&self.pool)
            .await?;

        Ok((items, total))
    }

    #[instrument(skip(self))]
    async fn update_status(
        &self,
        account_id: i64,
        appid: i64,
        status: &str,
    ) -> LibraryResult<Option<OwnedItem>> {
        let sql = format!(
            "UPDATE owned_games SET status = $1 WHERE account_id = $2 AND appid = $3 RETURNING {ITEM_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, OwnedItem>(&sql)
            .bind(status)
            .bind(account_id)
            .bind(appid)
            .fetch_optional(&self.pool)
            .await?)
    }

    #[instrument(skip(self))]
    async fn set_tags(
        &self,
        account_id: i64,
        appid: i64,
        tags: &[String],
    ) -> LibraryResult<Option<OwnedItem>> {
        let sql = format!(
            "UPDATE owned_games SET tags = $1 WHERE account_id = $2 AND appid = $3 RETURNING {ITEM_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, OwnedItem>(&sql)
            .bind(tags)
            .bind(account_id)
            .bind(appid)
            .fetch_optional(&self.pool)
            .await?)
    }
}

use crate::config::QueryLimits;
use crate::error::LibraryResult;
use crate::library::model::OwnedItem;
use crate::library::store::LibraryStore;
use serde::Serialize;
use std::sync::Arc;
use tracing::instrument;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Name,
    Playtime,
    Completion,
}

impl SortKey {
    /// Unrecognized keys fall back to [`SortKey::Name`].
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("playtime") | Some("usage") => SortKey::Playtime,
            Some("completion") => SortKey::Completion,
            _ => SortKey::Name,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDir {
    #[default]
    Asc,
    Desc,
}

impl SortDir {
    /// Anything other than `desc` sorts ascending.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("desc") => SortDir::Desc,
            _ => SortDir::Asc,
        }
    }
}

/// Normalized list parameters. Construct through [`ListQuery::new`] so page
/// bounds are always valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListQuery {
    pub page: u32,
    pub per_page: u32,
    pub sort: SortKey,
    pub order: SortDir,
    pub tag: Option<String>,
}

impl ListQuery {
    pub fn new(
        limits: QueryLimits,
        page: Option<u32>,
        per_page: Option<u32>,
        sort: Option<&str>,
        order: Option<&str>,
        tag: Option<&str>,
    ) -> Self {
        let max = limits.max_per_page.max(1);
        Self {
            page: page.unwrap_or(1).max(1),
            per_page: per_page.unwrap_or(limits.default_per_page).clamp(1, max),
            sort: SortKey::parse(sort),
            order: SortDir::parse(order),
            tag: tag
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string),
        }
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.per_page)
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.per_page)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    pub items: Vec<OwnedItem>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
    pub total_pages: i64,
}

pub fn total_pages(total: i64, per_page: u32) -> i64 {
    let per_page = i64::from(per_page.max(1));
    (total.max(0) + per_page - 1) / per_page
}

/// Read side of the library.
#[derive(Clone)]
pub struct QueryService {
    store: Arc<dyn LibraryStore>,
}

impl QueryService {
    pub fn new(store: Arc<dyn LibraryStore>) -> Self {
        Self { store }
    }

    #[instrument(skip(self))]
    pub async fn list(&self, account_id: i64, query: &ListQuery) -> LibraryResult<Page> {
        let (items, total) = self.store.list_items(account_id, query).await?;
        Ok(Page {
            items,
            page: query.page,
            per_page: query.per_page,
            total,
            total_pages: total_pages(total, query.per_page),
        })
    }
}

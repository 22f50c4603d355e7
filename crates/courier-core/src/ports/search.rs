//! SearchProvider port - 外部コンテンツ検索
//!
//! 認証やページングはアダプタの責務です。コアは 1 interest につき
//! 1 回、上限付きの検索を発行するだけです。

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{Interest, Item, Scope};

/// Provider's recommended maximum page size.
pub const MAX_PAGE_SIZE: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Newest first.
    New,
}

/// Recency window the provider restricts results to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeWindow {
    Hour,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuerySyntax {
    /// Query string is matched as plain text.
    Plain,
}

/// One bounded search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub scope: Scope,
    pub query: String,
    pub sort: SortOrder,
    pub window: TimeWindow,
    pub limit: usize,
    pub syntax: QuerySyntax,
}

impl SearchRequest {
    /// Newest items of the last hour matching `interest`.
    pub fn recent(interest: &Interest, limit: usize) -> Self {
        Self {
            scope: interest.scope.clone(),
            query: interest.query.clone(),
            sort: SortOrder::New,
            window: TimeWindow::Hour,
            limit: limit.clamp(1, MAX_PAGE_SIZE),
            syntax: QuerySyntax::Plain,
        }
    }
}

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("provider unavailable: {0}")]
    Unavailable(String),
}

/// SearchProvider は interest ごとの検索を実行
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Items in the order the provider returned them.
    async fn search(&self, request: &SearchRequest) -> Result<Vec<Item>, SearchError>;
}

//! ScriptedSearchProvider - 事前に用意した応答を返す検索プロバイダ
//!
//! デモとテスト用。`(scope, query)` ごとに応答キューを持ち、
//! 検索のたびに先頭を取り出します。キューが空なら空の結果を返します。

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{Interest, Item};
use crate::ports::{SearchError, SearchProvider, SearchRequest};

enum Scripted {
    Items(Vec<Item>),
    Failure(String),
}

#[derive(Default)]
pub struct ScriptedSearchProvider {
    responses: Mutex<HashMap<Interest, VecDeque<Scripted>>>,
    requests: Mutex<Vec<SearchRequest>>,
}

impl ScriptedSearchProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful response for the next search of `interest`.
    pub async fn push_items(&self, interest: &Interest, items: Vec<Item>) {
        self.push(interest, Scripted::Items(items)).await;
    }

    /// Queue a failure for the next search of `interest`.
    pub async fn push_failure(&self, interest: &Interest, message: impl Into<String>) {
        self.push(interest, Scripted::Failure(message.into())).await;
    }

    /// Every request received so far, in order.
    pub async fn requests(&self) -> Vec<SearchRequest> {
        self.requests.lock().await.clone()
    }

    async fn push(&self, interest: &Interest, response: Scripted) {
        self.responses
            .lock()
            .await
            .entry(interest.clone())
            .or_default()
            .push_back(response);
    }
}

#[async_trait]
impl SearchProvider for ScriptedSearchProvider {
    async fn search(&self, request: &SearchRequest) -> Result<Vec<Item>, SearchError> {
        self.requests.lock().await.push(request.clone());

        let key = Interest::new(request.query.clone(), request.scope.clone());
        let next = self
            .responses
            .lock()
            .await
            .get_mut(&key)
            .and_then(VecDeque::pop_front);

        match next {
            Some(Scripted::Items(items)) => Ok(items),
            Some(Scripted::Failure(message)) => Err(SearchError::Unavailable(message)),
            None => Ok(Vec::new()),
        }
    }
}

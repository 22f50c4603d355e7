//! Errors - エラー型と分類
//!
//! 外部呼び出しの失敗はポート側のエラー型（`SearchError`, `DeliveryError`,
//! `StoreError`）で表し、app 層では `RelayError` にまとめます。
//! どのエラーもプロセスにとって致命的ではありません。

use thiserror::Error;

use super::ids::DestinationId;
use crate::ports::{DeliveryError, SearchError, StoreError};

/// ErrorKind は実行エラーの分類
///
/// - Transient: 一時的なエラー（次のサイクルで回復しうる）
/// - Permanent: 恒久的なエラー（入力や設定が誤っている）
/// - Infrastructure: ストレージ層の障害
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transient,
    Permanent,
    Infrastructure,
}

/// RelayError はコア操作のエラー
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("destination not registered: {0}")]
    DestinationNotFound(DestinationId),

    #[error("search failed: {0}")]
    Search(#[from] SearchError),

    #[error("delivery failed: {0}")]
    Delivery(#[from] DeliveryError),

    #[error("store failed: {0}")]
    Store(#[from] StoreError),

    #[error("invalid config: {0}")]
    Config(String),
}

impl RelayError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RelayError::DestinationNotFound(_) | RelayError::Config(_) => ErrorKind::Permanent,
            RelayError::Search(_) | RelayError::Delivery(_) => ErrorKind::Transient,
            RelayError::Store(_) => ErrorKind::Infrastructure,
        }
    }
}

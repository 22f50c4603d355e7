//! courier-core
//!
//! Core building blocks for the courier notification relay.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, destination, item, payload, outcome, state, errors）
//! - **ports**: 抽象化レイヤー（SearchProvider, DeliveryPlatform, RegistryStore, DedupStore, Clock）
//! - **app**: アプリケーションロジック（coordinator, poller, fanout, worker, lifecycle, sweeper）
//! - **impls**: 実装（InMemoryRegistryStore などの開発用）
//! - **config**: RelayConfig

pub mod app;
pub mod config;
pub mod domain;
pub mod impls;
pub mod ports;

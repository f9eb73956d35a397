//! UseCase 層
//!
//! ドメインのコンポーネントを組み合わせ、外部からのイベントを処理します。

pub mod relay_service;

pub use relay_service::{ConnectOutcome, MessageOutcome, RelayService};

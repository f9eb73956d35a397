//! Infrastructure 層
//!
//! ドメイン層が定義するインターフェース（`ConnectionSink`）の具体的な実装と、
//! ワイヤーフォーマット（DTO）を提供します。

pub mod dto;
pub mod sink;

use thiserror::Error;

/// 核心层的统一错误类型
///
/// `InvalidTransition` 与 `NotFound` 原样回给调用方，不自动重试；
/// `ResourceBusy` 表示房间锁竞争，调用方可以稍后重试；
/// `InvariantViolation` 表示状态机走进了理论上不可达的分支，属于内部缺陷，
/// 必须上抛暴露而不是悄悄修补。
/// 所有校验都发生在任何状态修改之前，出错时不会留下半成品状态。
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PokerError {
    #[error("invalid transition: {0}")]
    InvalidTransition(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("resource busy: {0}")]
    ResourceBusy(String),
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
    #[error("corrupt snapshot: {0}")]
    Corrupt(String),
}

//! # error 模块说明
//!
//! ## 角色定位（Why）
//! - 集中定义导航核心的错误语义：查找失败、簿记冲突、并发拒绝与原生转场失败；
//! - 布尔结果的对外接口（`push`/`pop` 等）由 `try_*` 方法的错误降级而来，错误本身保留完整上下文供日志使用。
//!
//! ## 设计要求（What）
//! - `NotFound`、`OperationRejected`、`NativeTransitionFailed`、`NothingToPop` 属于可预期、可恢复的导航失败；
//! - `DuplicateKey` 代表簿记缺陷，[`NavError::is_fatal`] 为真，调试构建下会触发断言。

use thiserror::Error;

use crate::{
    entry::{PageIndex, RouteKey},
    native::TransitionKind,
};

/// 操作被拒绝的原因。
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum RejectReason {
    /// 已有操作在途或推入排队中，终结操作不排队。
    #[error("another operation is pending on the stack")]
    Busy,
    /// 推入会使栈深超过配置上限。
    #[error("stack depth limit {max} reached")]
    DepthLimit { max: usize },
    /// 该 URL 的序号已耗尽。
    #[error("page index space exhausted")]
    IndexExhausted,
}

/// 导航核心错误域。
///
/// # 教案式说明
/// - **意图 (Why)**：在控制器内部以 `Result` 传播失败，并在布尔接口处统一记录日志后降级为 `false`；
/// - **契约 (What)**：所有变体均为 `Send + Sync + 'static`，可跨线程传递；
/// - **风险 (Trade-offs)**：`url` 以 `String` 保存，换取错误信息的独立生命周期。
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum NavError {
    /// 没有条目命中 `url`（及可选序号）。
    #[error("no page matches `{url}`{}", .index.map(|i| format!("#{i}")).unwrap_or_default())]
    NotFound {
        url: String,
        index: Option<PageIndex>,
    },

    /// `(url, index)` 已在栈上；单调序号分配下不应出现。
    #[error("page `{key}` is already on the stack")]
    DuplicateKey { key: RouteKey },

    /// 并发策略或配置限制拒绝了本次操作，栈未被修改。
    #[error("`{op}` rejected: {reason}")]
    OperationRejected {
        op: TransitionKind,
        reason: RejectReason,
    },

    /// 原生协作者报告转场失败，栈未被修改。
    #[error("native `{op}` transition for `{key}` failed: {reason}")]
    NativeTransitionFailed {
        op: TransitionKind,
        key: RouteKey,
        reason: String,
    },

    /// 根页面不可弹出，唯一的根页面不可移除。
    #[error("`{op}` has nothing to discard")]
    NothingToPop { op: TransitionKind },
}

impl NavError {
    pub fn not_found(url: &str, index: Option<PageIndex>) -> Self {
        NavError::NotFound {
            url: url.to_owned(),
            index,
        }
    }

    pub fn busy(op: TransitionKind) -> Self {
        NavError::OperationRejected {
            op,
            reason: RejectReason::Busy,
        }
    }

    /// 是否为簿记不变量被破坏。
    pub fn is_fatal(&self) -> bool {
        matches!(self, NavError::DuplicateKey { .. })
    }
}

//! # 原生容器协作者契约
//!
//! ## 定位（Why）
//! - 各平台的原生导航容器（视图控制器栈、Activity 栈等）各自实现一次 [`NativeContainer`]，
//!   控制器只依赖此统一能力，无需继承层级；
//! - 转场动画如何实现、视图如何嵌入均属于协作者内部细节，核心层只关心“请求 → 确认”。
//!
//! ## 契约（What）
//! - [`NativeContainer::request_transition`] 异步返回 [`TransitionAck`]，推入成功时可附带视图句柄；
//! - 已受理的转场不可中途取消，控制器只会在受理前拒绝；
//! - [`NativeContainer::currently_visible_entry`] 为同步查询，不得阻塞 UI 线程。

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::entry::{RouteEntry, RouteKey, ViewHandle};

/// 向原生侧请求的转场种类。
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TransitionKind {
    Push,
    Pop,
    PopTo,
    Remove,
}

impl TransitionKind {
    /// 是否为收缩栈的终结操作（pop/popTo/remove）。
    pub fn is_terminal(self) -> bool {
        !matches!(self, TransitionKind::Push)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TransitionKind::Push => "push",
            TransitionKind::Pop => "pop",
            TransitionKind::PopTo => "popTo",
            TransitionKind::Remove => "remove",
        }
    }
}

impl fmt::Display for TransitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 一次原生转场请求。
///
/// - `target`：推入时为待实现的新条目；pop/remove 时为被移除条目；popTo 时为目标条目；
/// - `discarded`：仅 popTo 填充，按自顶向下顺序列出将被丢弃的条目；
/// - `animated`：非栈顶 remove 恒为 `false`。
#[derive(Clone, Debug, PartialEq)]
pub struct TransitionRequest {
    pub kind: TransitionKind,
    pub target: RouteEntry,
    pub discarded: Vec<RouteKey>,
    pub animated: bool,
}

impl TransitionRequest {
    pub fn new(kind: TransitionKind, target: RouteEntry, animated: bool) -> Self {
        Self {
            kind,
            target,
            discarded: Vec::new(),
            animated,
        }
    }

    pub fn with_discarded(mut self, discarded: Vec<RouteKey>) -> Self {
        self.discarded = discarded;
        self
    }
}

/// 原生侧对转场请求的确认。
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TransitionAck {
    /// 转场完成；推入时 `view` 携带已实现视图的句柄。
    Completed { view: Option<ViewHandle> },
    /// 原生侧未能完成转场，栈保持不变。
    Failed { reason: String },
}

impl TransitionAck {
    pub fn completed() -> Self {
        TransitionAck::Completed { view: None }
    }

    pub fn with_view(view: ViewHandle) -> Self {
        TransitionAck::Completed { view: Some(view) }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        TransitionAck::Failed {
            reason: reason.into(),
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, TransitionAck::Completed { .. })
    }
}

/// 平台原生导航容器的适配能力。
///
/// # 教案式注释
/// - **意图 (Why)**：以单一 trait 取代按平台的子类化扩展，每类原生容器提供一个适配器即可；
/// - **契约 (What)**：
///   - 实现必须满足 `Send + Sync + 'static`，控制器以 `Arc<dyn NativeContainer>` 持有；
///   - `request_transition` 的 Future 可在任意执行器上驱动，完成时即视为原生侧已确认；
///   - 确认返回前，控制器不会修改页面栈；
/// - **风险 (Trade-offs)**：若实现永不返回，控制器将一直停留在非 `Idle` 状态，后续终结操作都会被拒绝。
#[async_trait]
pub trait NativeContainer: Send + Sync + 'static {
    /// 请求原生侧执行转场并等待确认。
    async fn request_transition(&self, request: TransitionRequest) -> TransitionAck;

    /// 原生侧当前可见的页面。
    fn currently_visible_entry(&self) -> Option<RouteEntry>;
}

//! # Notification Router：页面生命周期事件分发
//!
//! ## 核心意图（Why）
//! - 将 `didPush`/`didPop`/`didPopTo`/`didRemove`、具名通知与可见性事件扇出给零到多个监听者；
//! - 监听者可按精确的 `(url, index)`、仅按 URL（全部序号）或不加限定地订阅。
//!
//! ## 行为契约（What）
//! - 同一事件按注册顺序同步投递，分发在触发操作返回前完成；
//! - 单个监听者返回错误或发生 panic 时被隔离并记录 `warn` 日志，后续监听者照常收到事件，
//!   失败永远不会回流到页面栈的修改路径；
//! - 分发前先在读锁内复制匹配的监听者列表，监听者内部可以安全地再次订阅或退订。
//!
//! ## 风险提示（Trade-offs）
//! - 精确 Key 订阅会在条目销毁时由控制器调用 [`NotificationRouter::retire`] 清理，
//!   防止序号复用后旧监听者误收新页面的事件。

use std::{
    any::Any,
    fmt,
    panic::{AssertUnwindSafe, catch_unwind},
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use parking_lot::RwLock;
use serde::Serialize;
use thiserror::Error;

use crate::{
    entry::RouteKey,
    params::Params,
};

/// 事件种类。
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PageEventKind {
    DidPush,
    DidPop,
    DidPopTo,
    DidRemove,
    /// 页面间的具名通知，不伴随任何栈修改。
    Notify { name: String },
    /// 可见性切换：`Will*` 先于同一次切换的 `Did*` 分发。
    WillAppear { animated: bool },
    DidAppear { animated: bool },
    WillDisappear { animated: bool },
    DidDisappear { animated: bool },
}

/// 投递给监听者的一次事件。
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PageEvent {
    pub kind: PageEventKind,
    pub route: RouteKey,
    pub params: Params,
}

impl PageEvent {
    pub fn new(kind: PageEventKind, route: RouteKey, params: Params) -> Self {
        Self {
            kind,
            route,
            params,
        }
    }

    /// 无参数事件的便捷构造。
    pub fn bare(kind: PageEventKind, route: RouteKey) -> Self {
        Self::new(kind, route, Params::new())
    }
}

/// 监听者返回的失败。
#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[error("{0}")]
pub struct ObserverError(String);

impl ObserverError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// 页面事件监听者。
///
/// 闭包 `Fn(&PageEvent) -> Result<(), ObserverError>` 自动实现该 trait。
pub trait PageObserver: Send + Sync + 'static {
    fn on_event(&self, event: &PageEvent) -> Result<(), ObserverError>;
}

impl<F> PageObserver for F
where
    F: Fn(&PageEvent) -> Result<(), ObserverError> + Send + Sync + 'static,
{
    fn on_event(&self, event: &PageEvent) -> Result<(), ObserverError> {
        self(event)
    }
}

/// 订阅范围。
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ListenerScope {
    /// 仅某个具体页面实例。
    Route(RouteKey),
    /// 某 URL 的全部实例。
    Url(Arc<str>),
    /// 栈上的全部页面。
    Any,
}

impl ListenerScope {
    pub fn url(url: impl Into<Arc<str>>) -> Self {
        ListenerScope::Url(url.into())
    }

    pub fn matches(&self, route: &RouteKey) -> bool {
        match self {
            ListenerScope::Route(key) => key == route,
            ListenerScope::Url(url) => *url == route.url,
            ListenerScope::Any => true,
        }
    }
}

/// 订阅句柄，用于退订。
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct ListenerId(u64);

/// 单次分发的结果统计。
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct DeliveryReport {
    pub delivered: usize,
    pub failed: usize,
}

struct Registration {
    id: ListenerId,
    scope: ListenerScope,
    observer: Arc<dyn PageObserver>,
}

/// 按注册顺序同步扇出事件的路由器。
#[derive(Default)]
pub struct NotificationRouter {
    registrations: RwLock<Vec<Registration>>,
    next_id: AtomicU64,
}

impl fmt::Debug for NotificationRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationRouter")
            .field("listeners", &self.registrations.read().len())
            .finish()
    }
}

impl NotificationRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册监听者并返回退订句柄。
    pub fn subscribe(&self, scope: ListenerScope, observer: impl PageObserver) -> ListenerId {
        self.subscribe_arc(scope, Arc::new(observer))
    }

    /// 以共享实例注册监听者，同一实例可挂载到多个栈。
    pub fn subscribe_arc(&self, scope: ListenerScope, observer: Arc<dyn PageObserver>) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.registrations.write().push(Registration {
            id,
            scope,
            observer,
        });
        id
    }

    /// 退订；句柄未知时返回 `false`。
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut registrations = self.registrations.write();
        let before = registrations.len();
        registrations.retain(|registration| registration.id != id);
        registrations.len() != before
    }

    /// 清理绑定在已销毁页面上的精确订阅。
    pub fn retire(&self, route: &RouteKey) {
        self.registrations
            .write()
            .retain(|registration| registration.scope != ListenerScope::Route(route.clone()));
    }

    pub fn len(&self) -> usize {
        self.registrations.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.read().is_empty()
    }

    /// 向匹配的监听者同步投递事件。
    ///
    /// # 教案式注释
    /// - **执行 (How)**：读锁内复制匹配列表后立即释放锁，再逐个调用；错误与 panic 均被捕获；
    /// - **契约 (What)**：返回值统计成功与失败的投递数，调用方无需据此做任何补偿。
    pub fn dispatch(&self, event: &PageEvent) -> DeliveryReport {
        let targets: Vec<Arc<dyn PageObserver>> = self
            .registrations
            .read()
            .iter()
            .filter(|registration| registration.scope.matches(&event.route))
            .map(|registration| Arc::clone(&registration.observer))
            .collect();

        let mut report = DeliveryReport::default();
        for observer in targets {
            match catch_unwind(AssertUnwindSafe(|| observer.on_event(event))) {
                Ok(Ok(())) => report.delivered += 1,
                Ok(Err(err)) => {
                    report.failed += 1;
                    tracing::warn!(
                        route = %event.route,
                        kind = ?event.kind,
                        error = %err,
                        "page observer failed"
                    );
                }
                Err(payload) => {
                    report.failed += 1;
                    tracing::warn!(
                        route = %event.route,
                        kind = ?event.kind,
                        panic = panic_message(payload.as_ref()),
                        "page observer panicked"
                    );
                }
            }
        }
        report
    }
}

/// 运行一次用户回调并隔离 panic；返回回调是否正常结束。
pub(crate) fn run_isolated(label: &'static str, route: &RouteKey, callback: impl FnOnce()) -> bool {
    match catch_unwind(AssertUnwindSafe(callback)) {
        Ok(()) => true,
        Err(payload) => {
            tracing::warn!(
                route = %route,
                callback = label,
                panic = panic_message(payload.as_ref()),
                "page callback panicked"
            );
            false
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&'static str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("<non-string panic payload>")
}

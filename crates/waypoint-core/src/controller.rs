//! # StackController：单栈导航编排
//!
//! ## 核心意图（Why）
//! - 在页面栈与原生容器之间串行化 push/pop/popTo/remove：先校验，再请求原生转场，
//!   待原生确认后才修改页面栈并分发事件，页面栈从不被投机修改；
//! - 调用方以 Future 形式等待结果，UI 线程不会因转场动画而阻塞。
//!
//! ## 状态机约束（What）
//! - 状态：`Idle → {Pushing | Popping | PoppingTo | Removing} → Idle`；
//! - 推入在任何在途操作之后 FIFO 排队，序号在出队时分配；
//! - 终结操作（pop/popTo/remove）只在 `Idle` 且无排队推入时受理，否则立即以
//!   [`RejectReason::Busy`] 拒绝，不排队；
//! - 同一栈上的完成回调按受理顺序返回；不同栈之间互不影响。
//!
//! ## 并发模型（How）
//! - `gate`：公平的 `tokio::sync::Mutex<()>`，推入 `lock().await` 排队，终结操作只 `try_lock`；
//! - `state`：`parking_lot::Mutex<Bookkeeping>`，只在同步代码块内持有，绝不跨越 `.await`；
//! - 事件分发总在释放 `state` 之后进行，监听者可以安全地回调查询接口。
//!
//! ## 风险提示（Trade-offs）
//! - 已受理的原生转场不可取消。若调用方在等待确认时丢弃 Future，页面栈不会被修改，
//!   需由原生侧随后的 `on_did_*` 入站通知完成对齐。

use std::{collections::HashMap, fmt, sync::Arc};

use parking_lot::Mutex;
use tokio::sync::{Mutex as Gate, MutexGuard as GatePermit};

use crate::{
    entry::{PageIndex, RouteEntry, RouteKey, ViewHandle},
    error::{NavError, RejectReason},
    native::{NativeContainer, TransitionAck, TransitionKind, TransitionRequest},
    notification::{NotificationRouter, PageEvent, PageEventKind, run_isolated},
    params::Params,
    stack::PageStack,
};

/// 控制器状态。
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Phase {
    Idle,
    Pushing,
    Popping,
    PoppingTo,
    Removing,
}

impl Phase {
    /// 当前在途的是否为终结操作。
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Popping | Phase::PoppingTo | Phase::Removing)
    }
}

/// 控制器级配置。
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct StackOptions {
    /// 栈深上限；超过时推入以 [`RejectReason::DepthLimit`] 拒绝。
    pub max_depth: Option<usize>,
}

/// 页面被 pop 时接收 pop 参数的一次性回调。
pub type PoppedCallback = Box<dyn FnOnce(&Params) + Send + 'static>;

/// 推入时的附加选项。
#[derive(Default)]
pub struct PushOptions {
    hides_navigation_bar: Option<bool>,
    on_popped: Option<PoppedCallback>,
}

impl PushOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hides_navigation_bar(mut self, hides: bool) -> Self {
        self.hides_navigation_bar = Some(hides);
        self
    }

    /// 页面被 pop 时以 pop 参数调用 `callback`；被 popTo 丢弃或非栈顶 remove 时不调用。
    pub fn on_popped(mut self, callback: impl FnOnce(&Params) + Send + 'static) -> Self {
        self.on_popped = Some(Box::new(callback));
        self
    }
}

impl fmt::Debug for PushOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PushOptions")
            .field("hides_navigation_bar", &self.hides_navigation_bar)
            .field("on_popped", &self.on_popped.is_some())
            .finish()
    }
}

struct Bookkeeping {
    stack: PageStack,
    phase: Phase,
    queued_pushes: usize,
    popped: HashMap<RouteKey, PoppedCallback>,
    shown: Option<RouteKey>,
    /// 已分发 `Will*`、尚待 `Did*` 的可见性切换目标。
    showing: Option<RouteKey>,
}

impl Bookkeeping {
    fn is_idle(&self) -> bool {
        self.phase == Phase::Idle && self.queued_pushes == 0
    }

    /// 移除条目后的收尾：丢弃（或交出）其 pop 回调。
    fn forget(&mut self, key: &RouteKey) -> Option<PoppedCallback> {
        if self.shown.as_ref() == Some(key) {
            self.shown = None;
        }
        if self.showing.as_ref() == Some(key) {
            self.showing = None;
        }
        self.popped.remove(key)
    }
}

/// 在途操作的凭据：持有执行门，析构时把状态复位为 `Idle`。
struct Ticket<'a> {
    state: &'a Mutex<Bookkeeping>,
    _permit: GatePermit<'a, ()>,
}

impl Drop for Ticket<'_> {
    fn drop(&mut self) {
        self.state.lock().phase = Phase::Idle;
    }
}

/// 推入排队计数；出队或 Future 被丢弃时递减。
struct QueueSlot<'a> {
    state: &'a Mutex<Bookkeeping>,
}

impl<'a> QueueSlot<'a> {
    fn enter(state: &'a Mutex<Bookkeeping>) -> Self {
        state.lock().queued_pushes += 1;
        Self { state }
    }
}

impl Drop for QueueSlot<'_> {
    fn drop(&mut self) {
        self.state.lock().queued_pushes -= 1;
    }
}

/// 单个导航容器的控制器。
///
/// # 教案式说明
/// - **意图 (Why)**：每个原生容器实例配一个控制器，统一对外暴露导航操作集合；
/// - **契约 (What)**：
///   - `try_*` 方法返回携带上下文的 [`NavError`]；同名的布尔方法记录日志后降级为 `false`；
///   - 页面栈只在原生确认后由本控制器修改；
///   - `on_did_*` 入站通知用于同步原生侧自行完成的转场，仅在 `Idle` 时生效且幂等；
/// - **风险 (Trade-offs)**：查询接口返回克隆快照，跨栈读取无需持有任何锁。
pub struct StackController {
    id: Arc<str>,
    native: Arc<dyn NativeContainer>,
    observers: NotificationRouter,
    options: StackOptions,
    gate: Gate<()>,
    state: Mutex<Bookkeeping>,
}

impl fmt::Debug for StackController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("StackController")
            .field("id", &self.id)
            .field("phase", &state.phase)
            .field("depth", &state.stack.len())
            .field("queued_pushes", &state.queued_pushes)
            .finish()
    }
}

impl StackController {
    pub fn new(id: impl Into<Arc<str>>, native: Arc<dyn NativeContainer>) -> Self {
        Self::with_options(id, native, StackOptions::default())
    }

    pub fn with_options(
        id: impl Into<Arc<str>>,
        native: Arc<dyn NativeContainer>,
        options: StackOptions,
    ) -> Self {
        Self {
            id: id.into(),
            native,
            observers: NotificationRouter::new(),
            options,
            gate: Gate::new(()),
            state: Mutex::new(Bookkeeping {
                stack: PageStack::new(),
                phase: Phase::Idle,
                queued_pushes: 0,
                popped: HashMap::new(),
                shown: None,
                showing: None,
            }),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn id_arc(&self) -> &Arc<str> {
        &self.id
    }

    /// 本栈的事件路由器。
    pub fn observers(&self) -> &NotificationRouter {
        &self.observers
    }

    pub fn phase(&self) -> Phase {
        self.state.lock().phase
    }

    pub fn queued_pushes(&self) -> usize {
        self.state.lock().queued_pushes
    }

    // ---------------------------------------------------------------------
    // 导航操作
    // ---------------------------------------------------------------------

    /// 推入页面；原生确认后返回 `true`。
    pub async fn push(&self, url: impl Into<Arc<str>>, params: Params, animated: bool) -> bool {
        let result = self.try_push(url, params, animated, PushOptions::new()).await;
        self.settle(TransitionKind::Push, result)
    }

    /// 推入页面并返回分配的序号。
    ///
    /// # 教案式注释
    /// - **执行 (How)**：
    ///   1. 登记排队并等待执行门（FIFO）；
    ///   2. 出队后检查栈深上限，按 `last_index_for(url) + 1` 分配序号，状态切到 `Pushing`；
    ///   3. 请求原生转场；确认成功后插入条目、登记 pop 回调、分发 `DidPush`；
    /// - **契约 (What)**：原生失败返回 [`NavError::NativeTransitionFailed`]，栈不变；
    ///   `DidPush` 监听者全部执行完毕后本方法才返回。
    pub async fn try_push(
        &self,
        url: impl Into<Arc<str>>,
        params: Params,
        animated: bool,
        options: PushOptions,
    ) -> Result<PageIndex, NavError> {
        let url: Arc<str> = url.into();
        let permit = {
            let _slot = QueueSlot::enter(&self.state);
            self.gate.lock().await
        };

        let (ticket, target) = {
            let mut state = self.state.lock();
            if let Some(max) = self.options.max_depth.filter(|max| state.stack.len() >= *max) {
                return Err(NavError::OperationRejected {
                    op: TransitionKind::Push,
                    reason: RejectReason::DepthLimit { max },
                });
            }
            let index = state.stack.next_index_for(&url).ok_or(NavError::OperationRejected {
                op: TransitionKind::Push,
                reason: RejectReason::IndexExhausted,
            })?;
            state.phase = Phase::Pushing;
            let target = RouteEntry::new(Arc::clone(&url), index, params)
                .with_hides_navigation_bar(options.hides_navigation_bar);
            (Ticket { state: &self.state, _permit: permit }, target)
        };

        tracing::debug!(stack = %self.id, route = %target.key(), animated, "requesting native push");
        let ack = self
            .native
            .request_transition(TransitionRequest::new(TransitionKind::Push, target.clone(), animated))
            .await;
        let view = self.expect_completed(TransitionKind::Push, target.key(), ack)?;

        let entry = target.with_view(view);
        let key = entry.key().clone();
        let params = entry.params().clone();
        {
            let mut state = self.state.lock();
            state.stack.push(entry)?;
            if let Some(callback) = options.on_popped {
                state.popped.insert(key.clone(), callback);
            }
        }
        self.observers
            .dispatch(&PageEvent::new(PageEventKind::DidPush, key.clone(), params));
        drop(ticket);
        Ok(key.index)
    }

    /// 弹出栈顶页面；根页面（栈深 ≤ 1）不会被弹出。
    pub async fn pop(&self, animated: bool) -> bool {
        let result = self.try_pop(Params::new(), animated).await;
        self.settle(TransitionKind::Pop, result)
    }

    /// 携带 pop 参数弹出栈顶页面。
    pub async fn pop_with(&self, params: Params, animated: bool) -> bool {
        let result = self.try_pop(params, animated).await;
        self.settle(TransitionKind::Pop, result)
    }

    /// 弹出栈顶并返回被弹出页面的 Key。
    ///
    /// - **契约 (What)**：`params` 随 `DidPop` 事件分发，并交给推入时登记的 `on_popped` 回调。
    pub async fn try_pop(&self, params: Params, animated: bool) -> Result<RouteKey, NavError> {
        let (ticket, target) = self.begin_terminal(TransitionKind::Pop, |state| {
            if state.stack.len() <= 1 {
                return Err(NavError::NothingToPop {
                    op: TransitionKind::Pop,
                });
            }
            let top = state.stack.top().cloned().ok_or(NavError::NothingToPop {
                op: TransitionKind::Pop,
            })?;
            Ok((Phase::Popping, top))
        })?;

        let ack = self
            .native
            .request_transition(TransitionRequest::new(TransitionKind::Pop, target.clone(), animated))
            .await;
        self.expect_completed(TransitionKind::Pop, target.key(), ack)?;

        let key = target.key().clone();
        let callback = {
            let mut state = self.state.lock();
            state.stack.remove_at(&key.url, key.index)?;
            state.forget(&key)
        };
        self.finish_pop(key.clone(), params, callback);
        drop(ticket);
        Ok(key)
    }

    /// 弹出到最近匹配的页面，匹配页面保留为新栈顶。
    pub async fn pop_to(&self, url: &str, index: Option<PageIndex>, animated: bool) -> bool {
        let result = self.try_pop_to(url, index, animated).await;
        self.settle(TransitionKind::PopTo, result)
    }

    /// 弹出到目标页面并返回其 Key。
    ///
    /// # 教案式注释
    /// - **执行 (How)**：受理时计算目标与其上方的全部条目，随请求一并交给原生侧；
    ///   确认后自顶向下逐个分发 `DidRemove`，最后分发目标页面的 `DidPopTo`；
    /// - **契约 (What)**：无匹配返回 [`NavError::NotFound`]，不发起原生请求；
    ///   目标已在栈顶时照常请求原生 `PopTo`（`discarded` 为空），确认后只分发 `DidPopTo`。
    pub async fn try_pop_to(
        &self,
        url: &str,
        index: Option<PageIndex>,
        animated: bool,
    ) -> Result<RouteKey, NavError> {
        let (ticket, (destination, discarded)) =
            self.begin_terminal(TransitionKind::PopTo, |state| {
                let position = state
                    .stack
                    .position(url, index)
                    .ok_or_else(|| NavError::not_found(url, index))?;
                let entries = state.stack.entries();
                let discarded: Vec<RouteKey> = entries[position + 1..]
                    .iter()
                    .rev()
                    .map(|entry| entry.key().clone())
                    .collect();
                Ok((Phase::PoppingTo, (entries[position].clone(), discarded)))
            })?;

        let request = TransitionRequest::new(TransitionKind::PopTo, destination.clone(), animated)
            .with_discarded(discarded);
        let ack = self.native.request_transition(request).await;
        self.expect_completed(TransitionKind::PopTo, destination.key(), ack)?;

        let key = destination.key().clone();
        let discarded = {
            let mut state = self.state.lock();
            let discarded = state.stack.pop_toward(&key.url, Some(key.index))?;
            for entry in &discarded {
                state.forget(entry.key());
            }
            discarded
        };
        self.finish_pop_to(key.clone(), discarded);
        drop(ticket);
        Ok(key)
    }

    /// 移除任意位置的页面。
    pub async fn remove(&self, url: &str, index: Option<PageIndex>, animated: bool) -> bool {
        let result = self.try_remove(url, index, animated).await;
        self.settle(TransitionKind::Remove, result)
    }

    /// 移除页面并返回其 Key。
    ///
    /// - 目标为栈顶时等同 pop：请求原生 `Pop` 转场、分发 `DidPop`、调用 `on_popped`；
    ///   唯一的根页面不可移除；
    /// - 目标不在栈顶时请求原生 `Remove`（忽略 `animated`），只分发 `DidRemove`，栈顶不变。
    pub async fn try_remove(
        &self,
        url: &str,
        index: Option<PageIndex>,
        animated: bool,
    ) -> Result<RouteKey, NavError> {
        let (ticket, (target, is_top)) = self.begin_terminal(TransitionKind::Remove, |state| {
            let position = state
                .stack
                .position(url, index)
                .ok_or_else(|| NavError::not_found(url, index))?;
            let depth = state.stack.len();
            let is_top = position + 1 == depth;
            if is_top && depth <= 1 {
                return Err(NavError::NothingToPop {
                    op: TransitionKind::Remove,
                });
            }
            let phase = if is_top { Phase::Popping } else { Phase::Removing };
            Ok((phase, (state.stack.entries()[position].clone(), is_top)))
        })?;

        let (kind, animated) = if is_top {
            (TransitionKind::Pop, animated)
        } else {
            (TransitionKind::Remove, false)
        };
        let ack = self
            .native
            .request_transition(TransitionRequest::new(kind, target.clone(), animated))
            .await;
        self.expect_completed(kind, target.key(), ack)?;

        let key = target.key().clone();
        let callback = {
            let mut state = self.state.lock();
            state.stack.remove_at(&key.url, key.index)?;
            state.forget(&key)
        };
        if is_top {
            self.finish_pop(key.clone(), Params::new(), callback);
        } else {
            self.finish_remove(key.clone());
        }
        drop(ticket);
        Ok(key)
    }

    /// 向匹配页面投递具名通知，不修改栈；无匹配时返回 `false`。
    pub fn notify(&self, url: &str, index: Option<PageIndex>, name: &str, params: Params) -> bool {
        match self.try_notify(url, index, name, params) {
            Ok(_) => true,
            Err(err) => {
                tracing::debug!(stack = %self.id, error = %err, "notify not delivered");
                false
            }
        }
    }

    /// 投递具名通知并返回命中的页面数；未给出序号时命中该 URL 的全部页面。
    pub fn try_notify(
        &self,
        url: &str,
        index: Option<PageIndex>,
        name: &str,
        params: Params,
    ) -> Result<usize, NavError> {
        let targets: Vec<RouteKey> = {
            let state = self.state.lock();
            state
                .stack
                .iter()
                .filter(|entry| entry.matches(url, index))
                .map(|entry| entry.key().clone())
                .collect()
        };
        if targets.is_empty() {
            return Err(NavError::not_found(url, index));
        }
        for key in &targets {
            let kind = PageEventKind::Notify {
                name: name.to_owned(),
            };
            self.observers
                .dispatch(&PageEvent::new(kind, key.clone(), params.clone()));
        }
        Ok(targets.len())
    }

    // ---------------------------------------------------------------------
    // 查询
    // ---------------------------------------------------------------------

    pub fn last_index_for(&self, url: &str) -> Option<PageIndex> {
        self.state.lock().stack.last_index_for(url)
    }

    /// 栈顶页面的序号。
    pub fn last_index(&self) -> Option<PageIndex> {
        self.state.lock().stack.top().map(RouteEntry::index)
    }

    pub fn all_indexes_for(&self, url: &str) -> Vec<PageIndex> {
        self.state.lock().stack.all_indexes_for(url)
    }

    pub fn contains(&self, url: &str, index: Option<PageIndex>) -> bool {
        self.state.lock().stack.contains(url, index)
    }

    pub fn top(&self) -> Option<RouteEntry> {
        self.state.lock().stack.top().cloned()
    }

    pub fn bottom(&self) -> Option<RouteEntry> {
        self.state.lock().stack.bottom().cloned()
    }

    pub fn find(&self, url: &str, index: Option<PageIndex>) -> Option<RouteEntry> {
        self.state.lock().stack.find(url, index).cloned()
    }

    pub fn len(&self) -> usize {
        self.state.lock().stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().stack.is_empty()
    }

    /// 自底向上的条目快照。
    pub fn snapshot(&self) -> Vec<RouteEntry> {
        self.state.lock().stack.entries().to_vec()
    }

    /// 原生侧当前可见的页面。
    pub fn currently_visible_entry(&self) -> Option<RouteEntry> {
        self.native.currently_visible_entry()
    }

    /// 修改页面的导航栏隐藏标记；无匹配时返回 `false`。
    pub fn set_hides_navigation_bar(
        &self,
        url: &str,
        index: Option<PageIndex>,
        hides: Option<bool>,
    ) -> bool {
        match self.state.lock().stack.find_mut(url, index) {
            Some(entry) => {
                entry.set_hides_navigation_bar(hides);
                true
            }
            None => false,
        }
    }

    // ---------------------------------------------------------------------
    // 原生侧入站通知
    // ---------------------------------------------------------------------

    /// 原生侧自行推入了页面。
    pub fn on_did_push(&self, url: &str, index: PageIndex) -> bool {
        let key = {
            let mut state = self.state.lock();
            if !self.accepts_inbound(&state, "didPush") || state.stack.contains(url, Some(index)) {
                return false;
            }
            let entry = RouteEntry::new(url, index, Params::new());
            let key = entry.key().clone();
            if state.stack.push(entry).is_err() {
                return false;
            }
            key
        };
        self.observers
            .dispatch(&PageEvent::bare(PageEventKind::DidPush, key));
        true
    }

    /// 原生侧自行弹出了栈顶页面（例如返回手势）。
    pub fn on_did_pop(&self, url: &str, index: PageIndex) -> bool {
        let (key, callback) = {
            let mut state = self.state.lock();
            if !self.accepts_inbound(&state, "didPop") {
                return false;
            }
            let is_top = state
                .stack
                .top()
                .is_some_and(|top| top.matches(url, Some(index)));
            if !is_top {
                return false;
            }
            let Some(removed) = state.stack.pop_top() else {
                return false;
            };
            let key = removed.key().clone();
            let callback = state.forget(&key);
            (key, callback)
        };
        self.finish_pop(key, Params::new(), callback);
        true
    }

    /// 原生侧自行弹出到了某页面。
    pub fn on_did_pop_to(&self, url: &str, index: PageIndex) -> bool {
        let (key, discarded) = {
            let mut state = self.state.lock();
            if !self.accepts_inbound(&state, "didPopTo") {
                return false;
            }
            let Ok(discarded) = state.stack.pop_toward(url, Some(index)) else {
                return false;
            };
            if discarded.is_empty() {
                return false;
            }
            for entry in &discarded {
                state.forget(entry.key());
            }
            (RouteKey::new(url, index), discarded)
        };
        self.finish_pop_to(key, discarded);
        true
    }

    /// 原生侧自行移除了某页面。
    pub fn on_did_remove(&self, url: &str, index: PageIndex) -> bool {
        let key = {
            let mut state = self.state.lock();
            if !self.accepts_inbound(&state, "didRemove") {
                return false;
            }
            let Ok(removed) = state.stack.remove_at(url, index) else {
                return false;
            };
            let key = removed.key().clone();
            state.forget(&key);
            key
        };
        self.finish_remove(key);
        true
    }

    /// 原生容器即将展示某个视图。
    ///
    /// - 按视图句柄定位页面，找不到时回落到栈顶；
    /// - 可见页面将要变化时依次分发旧页面的 `WillDisappear` 与新页面的 `WillAppear`，
    ///   随后的 [`on_container_did_show`](Self::on_container_did_show) 不再重复分发。
    pub fn on_container_will_show(&self, view: ViewHandle, animated: bool) -> bool {
        let (previous, target) = {
            let mut state = self.state.lock();
            let Some(target) = Self::resolve_view(&state, view) else {
                return false;
            };
            if state.shown.as_ref() == Some(target.key())
                || state.showing.as_ref() == Some(target.key())
            {
                return true;
            }
            state.showing = Some(target.key().clone());
            (Self::shown_entry(&state), target)
        };
        self.announce_visibility(previous.as_ref(), &target, animated, false);
        true
    }

    /// 原生容器展示了某个视图。
    ///
    /// # 教案式注释
    /// - **执行 (How)**：按推入确认回传的视图句柄定位页面，找不到时回落到栈顶；
    /// - **契约 (What)**：可见页面变化时分发旧页面的 `DidDisappear` 与新页面的 `DidAppear`；
    ///   若此前没有对应的 `on_container_will_show`，先补发 `WillDisappear`/`WillAppear`，
    ///   保证一次切换的四个事件按 will → did 顺序出现。
    pub fn on_container_did_show(&self, view: ViewHandle, animated: bool) -> bool {
        let (previous, shown, announced) = {
            let mut state = self.state.lock();
            let Some(entry) = Self::resolve_view(&state, view) else {
                return false;
            };
            if state.shown.as_ref() == Some(entry.key()) {
                return true;
            }
            let announced = state.showing.take().as_ref() == Some(entry.key());
            let previous = Self::shown_entry(&state);
            state.shown = Some(entry.key().clone());
            (previous, entry, announced)
        };
        if !announced {
            self.announce_visibility(previous.as_ref(), &shown, animated, false);
        }
        self.announce_visibility(previous.as_ref(), &shown, animated, true);
        true
    }

    // ---------------------------------------------------------------------
    // 内部流程
    // ---------------------------------------------------------------------

    /// 受理终结操作：抢占执行门、确认空闲，并在同一把锁内完成规划与状态切换。
    fn begin_terminal<T>(
        &self,
        op: TransitionKind,
        plan: impl FnOnce(&Bookkeeping) -> Result<(Phase, T), NavError>,
    ) -> Result<(Ticket<'_>, T), NavError> {
        let permit = self.gate.try_lock().map_err(|_| NavError::busy(op))?;
        let mut state = self.state.lock();
        if !state.is_idle() {
            return Err(NavError::busy(op));
        }
        let (phase, planned) = plan(&*state)?;
        state.phase = phase;
        drop(state);
        tracing::debug!(stack = %self.id, %op, "terminal operation accepted");
        Ok((
            Ticket {
                state: &self.state,
                _permit: permit,
            },
            planned,
        ))
    }

    fn resolve_view(state: &Bookkeeping, view: ViewHandle) -> Option<RouteEntry> {
        state
            .stack
            .find_by_view(view)
            .or_else(|| state.stack.top())
            .cloned()
    }

    /// 当前可见且仍在栈上的页面。
    fn shown_entry(state: &Bookkeeping) -> Option<RouteEntry> {
        let key = state.shown.as_ref()?;
        state.stack.find(&key.url, Some(key.index)).cloned()
    }

    /// 分发一次可见性切换的 `Will*`（`done == false`）或 `Did*` 事件对，旧页面在前。
    fn announce_visibility(
        &self,
        previous: Option<&RouteEntry>,
        next: &RouteEntry,
        animated: bool,
        done: bool,
    ) {
        let (disappear, appear) = if done {
            (
                PageEventKind::DidDisappear { animated },
                PageEventKind::DidAppear { animated },
            )
        } else {
            (
                PageEventKind::WillDisappear { animated },
                PageEventKind::WillAppear { animated },
            )
        };
        if let Some(previous) = previous {
            self.observers.dispatch(&PageEvent::new(
                disappear,
                previous.key().clone(),
                previous.params().clone(),
            ));
        }
        self.observers.dispatch(&PageEvent::new(
            appear,
            next.key().clone(),
            next.params().clone(),
        ));
    }

    fn expect_completed(
        &self,
        op: TransitionKind,
        key: &RouteKey,
        ack: TransitionAck,
    ) -> Result<Option<ViewHandle>, NavError> {
        match ack {
            TransitionAck::Completed { view } => Ok(view),
            TransitionAck::Failed { reason } => Err(NavError::NativeTransitionFailed {
                op,
                key: key.clone(),
                reason,
            }),
        }
    }

    fn accepts_inbound(&self, state: &Bookkeeping, event: &'static str) -> bool {
        if state.phase == Phase::Idle {
            return true;
        }
        tracing::debug!(stack = %self.id, event, phase = ?state.phase, "inbound notification ignored while busy");
        false
    }

    fn finish_pop(&self, key: RouteKey, params: Params, callback: Option<PoppedCallback>) {
        self.observers
            .dispatch(&PageEvent::new(PageEventKind::DidPop, key.clone(), params.clone()));
        if let Some(callback) = callback {
            run_isolated("on_popped", &key, || callback(&params));
        }
        self.observers.retire(&key);
    }

    fn finish_pop_to(&self, destination: RouteKey, discarded: Vec<RouteEntry>) {
        for entry in discarded {
            self.finish_remove(entry.key().clone());
        }
        self.observers
            .dispatch(&PageEvent::bare(PageEventKind::DidPopTo, destination));
    }

    fn finish_remove(&self, key: RouteKey) {
        self.observers
            .dispatch(&PageEvent::bare(PageEventKind::DidRemove, key.clone()));
        self.observers.retire(&key);
    }

    /// 把 `try_*` 的结果降级为布尔值，并按错误等级记录日志。
    fn settle<T>(&self, op: TransitionKind, result: Result<T, NavError>) -> bool {
        match result {
            Ok(_) => true,
            Err(err) if err.is_fatal() => {
                tracing::error!(stack = %self.id, %op, error = %err, "page stack invariant violated");
                debug_assert!(!err.is_fatal(), "page stack invariant violated: {err}");
                false
            }
            Err(err @ NavError::NativeTransitionFailed { .. }) => {
                tracing::warn!(stack = %self.id, %op, error = %err, "native transition failed");
                false
            }
            Err(err) => {
                tracing::debug!(stack = %self.id, %op, error = %err, "navigation declined");
                false
            }
        }
    }
}

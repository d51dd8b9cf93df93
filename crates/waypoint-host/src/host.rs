//! # NavigatorHost：进程级页面栈注册表
//!
//! ## 核心意图（Why）
//! - 一个宿主应用可以同时存在多个导航容器（例如嵌套容器、多窗口），每个容器一个
//!   [`StackController`]；桥接层需要按标识寻址，也需要在未指定时落到“当前活动栈”；
//! - 跨栈查询（“是否有任意栈包含某 URL”）必须逐栈快照，不能跨栈持锁。
//!
//! ## 并发模型（How）
//! - 注册表为 `DashMap<Arc<str>, Arc<StackController>>`，读取时克隆 `Arc` 后立即释放分片锁；
//! - 活动栈保存在 `ArcSwapOption<StackController>` 中，桥接读取无锁；
//! - 每个注册的栈自动挂载 [`EventForwarder`]，框架侧通过 [`NavigatorHost::events`] 订阅。
//!
//! ## 风险提示（Trade-offs）
//! - `unregister` 只解除寻址；已被调用方持有的控制器 `Arc` 仍可继续使用，
//!   其在途操作照常完成，但事件不再转发。

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use dashmap::{DashMap, mapref::entry::Entry};
use serde::Serialize;
use waypoint_core::{ListenerId, NativeContainer, PageIndex, RouteEntry, StackController};

use crate::{
    config::NavigatorConfig,
    error::HostError,
    forward::{EventForwarder, ForwardedEventReceiver},
};

struct Registered {
    controller: Arc<StackController>,
    forwarding: ListenerId,
}

/// 单个栈在某一时刻的只读快照。
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StackSnapshot {
    pub id: Arc<str>,
    pub active: bool,
    /// 自底向上的条目。
    pub entries: Vec<RouteEntry>,
}

/// 多栈宿主。
///
/// # 教案式说明
/// - **意图 (Why)**：集中管理栈的生命周期与活动栈切换，对桥接层隐藏注册表细节；
/// - **契约 (What)**：
///   - 栈标识唯一，重复注册返回 [`HostError::StackAlreadyRegistered`]；
///   - 最近注册的栈成为活动栈，[`activate`](Self::activate) 可显式切换；
///   - 注销活动栈后不再有活动栈，直到下一次注册或激活。
pub struct NavigatorHost {
    config: NavigatorConfig,
    stacks: DashMap<Arc<str>, Registered>,
    active: ArcSwapOption<StackController>,
    forwarder: EventForwarder,
}

impl Default for NavigatorHost {
    fn default() -> Self {
        Self::new(NavigatorConfig::default())
    }
}

impl std::fmt::Debug for NavigatorHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NavigatorHost")
            .field("config", &self.config)
            .field("stacks", &self.stack_ids())
            .field("active", &self.active_id())
            .finish()
    }
}

impl NavigatorHost {
    pub fn new(config: NavigatorConfig) -> Self {
        let forwarder = EventForwarder::new(config.event_capacity);
        Self {
            config,
            stacks: DashMap::new(),
            active: ArcSwapOption::empty(),
            forwarder,
        }
    }

    pub fn config(&self) -> &NavigatorConfig {
        &self.config
    }

    /// 订阅全部栈的页面事件。
    pub fn events(&self) -> ForwardedEventReceiver {
        self.forwarder.subscribe()
    }

    /// 为原生容器创建并注册控制器，新栈成为活动栈。
    pub fn register(
        &self,
        stack_id: impl Into<Arc<str>>,
        native: Arc<dyn NativeContainer>,
    ) -> Result<Arc<StackController>, HostError> {
        let stack_id: Arc<str> = stack_id.into();
        let controller = match self.stacks.entry(Arc::clone(&stack_id)) {
            Entry::Occupied(_) => {
                return Err(HostError::StackAlreadyRegistered {
                    stack: stack_id.as_ref().to_owned(),
                });
            }
            Entry::Vacant(vacant) => {
                let controller = Arc::new(StackController::with_options(
                    Arc::clone(&stack_id),
                    native,
                    self.config.stack_options(),
                ));
                let forwarding = self.forwarder.attach(&controller);
                vacant.insert(Registered {
                    controller: Arc::clone(&controller),
                    forwarding,
                });
                controller
            }
        };
        self.active.store(Some(Arc::clone(&controller)));
        tracing::info!(stack = %stack_id, "navigation stack registered");
        Ok(controller)
    }

    /// 注销栈并停止转发其事件；若它是活动栈，则清空活动栈。
    pub fn unregister(&self, stack_id: &str) -> Result<Arc<StackController>, HostError> {
        let (_, registered) = self
            .stacks
            .remove(stack_id)
            .ok_or_else(|| HostError::not_found(stack_id))?;
        let controller = registered.controller;
        self.forwarder.detach(&controller, registered.forwarding);
        self.active.rcu(|current| match current {
            Some(active) if Arc::ptr_eq(active, &controller) => None,
            other => other.clone(),
        });
        tracing::info!(stack = %stack_id, depth = controller.len(), "navigation stack unregistered");
        Ok(controller)
    }

    /// 切换活动栈。
    pub fn activate(&self, stack_id: &str) -> Result<(), HostError> {
        let controller = self.get(stack_id).ok_or_else(|| HostError::not_found(stack_id))?;
        self.active.store(Some(controller));
        tracing::debug!(stack = %stack_id, "navigation stack activated");
        Ok(())
    }

    pub fn get(&self, stack_id: &str) -> Option<Arc<StackController>> {
        self.stacks
            .get(stack_id)
            .map(|registered| Arc::clone(&registered.controller))
    }

    pub fn active(&self) -> Option<Arc<StackController>> {
        self.active.load_full()
    }

    pub fn active_id(&self) -> Option<Arc<str>> {
        self.active
            .load_full()
            .map(|controller| Arc::clone(controller.id_arc()))
    }

    /// 按标识寻址；未指定时回落到活动栈。
    pub fn resolve(&self, stack_id: Option<&str>) -> Result<Arc<StackController>, HostError> {
        match stack_id {
            Some(id) => self.get(id).ok_or_else(|| HostError::not_found(id)),
            None => self.active().ok_or(HostError::NoActiveStack),
        }
    }

    pub fn len(&self) -> usize {
        self.stacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stacks.is_empty()
    }

    /// 已注册的栈标识，按字典序排列。
    pub fn stack_ids(&self) -> Vec<Arc<str>> {
        let mut ids: Vec<Arc<str>> = self.stacks.iter().map(|item| Arc::clone(item.key())).collect();
        ids.sort();
        ids
    }

    // ---------------------------------------------------------------------
    // 跨栈查询：先克隆控制器列表释放注册表，再逐栈读取
    // ---------------------------------------------------------------------

    fn controllers(&self) -> Vec<Arc<StackController>> {
        let mut controllers: Vec<Arc<StackController>> = self
            .stacks
            .iter()
            .map(|item| Arc::clone(&item.controller))
            .collect();
        controllers.sort_by(|a, b| a.id().cmp(b.id()));
        controllers
    }

    /// 是否有任意栈包含匹配页面。
    pub fn contains_anywhere(&self, url: &str, index: Option<PageIndex>) -> bool {
        self.controllers()
            .iter()
            .any(|controller| controller.contains(url, index))
    }

    /// 包含该 URL 的栈标识。
    pub fn stacks_containing(&self, url: &str) -> Vec<Arc<str>> {
        self.controllers()
            .into_iter()
            .filter(|controller| controller.contains(url, None))
            .map(|controller| Arc::clone(controller.id_arc()))
            .collect()
    }

    /// 全部栈的快照，按标识排序。
    pub fn snapshot(&self) -> Vec<StackSnapshot> {
        let active = self.active_id();
        self.controllers()
            .into_iter()
            .map(|controller| StackSnapshot {
                active: active.as_deref() == Some(controller.id()),
                id: Arc::clone(controller.id_arc()),
                entries: controller.snapshot(),
            })
            .collect()
    }
}

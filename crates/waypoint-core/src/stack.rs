//! # PageStack：单个导航容器的页面簿记
//!
//! ## 核心意图（Why）
//! - 以自底向上的有序序列记录导航顺序，最后一个元素即当前可见页面；
//! - 所有查找均为 O(n) 线性扫描：页面栈通常只有数十层，不维护二级索引即可避免一致性负担。
//!
//! ## 行为契约（What）
//! - [`PageStack::push`]：追加条目，`(url, index)` 冲突返回 [`NavError::DuplicateKey`]；
//! - [`PageStack::remove_at`]：按精确 Key 移除任意位置的条目；
//! - [`PageStack::pop_toward`]：自顶向下寻找最近的匹配，移除其上方全部条目（不含匹配本身）；
//! - `last_index_for`/`all_indexes_for`/`contains`/`top`/`bottom`：只读查询。
//!
//! ## 风险提示（Trade-offs）
//! - 页面栈本身不做并发控制，由 [`StackController`](crate::controller::StackController) 独占持有并在锁内修改。

use crate::{
    entry::{PageIndex, RouteEntry, RouteKey, ViewHandle},
    error::NavError,
};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PageStack {
    entries: Vec<RouteEntry>,
}

impl PageStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 自底向上的条目切片。
    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &RouteEntry> {
        self.entries.iter()
    }

    pub fn top(&self) -> Option<&RouteEntry> {
        self.entries.last()
    }

    pub fn bottom(&self) -> Option<&RouteEntry> {
        self.entries.first()
    }

    /// 追加条目到栈顶。
    ///
    /// - **前置条件**：`entry.key()` 不在栈上；
    /// - **后置条件**：成功时 `entry` 成为新的栈顶。
    pub fn push(&mut self, entry: RouteEntry) -> Result<(), NavError> {
        if self.contains(entry.url(), Some(entry.index())) {
            return Err(NavError::DuplicateKey {
                key: entry.key().clone(),
            });
        }
        self.entries.push(entry);
        Ok(())
    }

    /// 移除精确匹配 `(url, index)` 的条目并返回。
    pub fn remove_at(&mut self, url: &str, index: PageIndex) -> Result<RouteEntry, NavError> {
        let position = self
            .position(url, Some(index))
            .ok_or_else(|| NavError::not_found(url, Some(index)))?;
        Ok(self.entries.remove(position))
    }

    /// 弹出栈顶条目。
    pub fn pop_top(&mut self) -> Option<RouteEntry> {
        self.entries.pop()
    }

    /// 移除最近匹配条目上方的全部条目，匹配条目保留为新栈顶。
    ///
    /// # 教案式注释
    /// - **契约 (What)**：`index` 为 `None` 时命中最近推入的同 URL 条目；
    ///   返回被移除的条目，顺序为自顶向下（与推入顺序相反）；
    /// - **错误**：无匹配时返回 [`NavError::NotFound`]，栈保持不变。
    pub fn pop_toward(
        &mut self,
        url: &str,
        index: Option<PageIndex>,
    ) -> Result<Vec<RouteEntry>, NavError> {
        let position = self
            .position(url, index)
            .ok_or_else(|| NavError::not_found(url, index))?;
        let mut discarded = self.entries.split_off(position + 1);
        discarded.reverse();
        Ok(discarded)
    }

    /// 自顶向下最近匹配的下标（自底计数）。
    pub fn position(&self, url: &str, index: Option<PageIndex>) -> Option<usize> {
        self.entries
            .iter()
            .rposition(|entry| entry.matches(url, index))
    }

    pub fn find(&self, url: &str, index: Option<PageIndex>) -> Option<&RouteEntry> {
        self.position(url, index).map(|pos| &self.entries[pos])
    }

    pub fn find_mut(&mut self, url: &str, index: Option<PageIndex>) -> Option<&mut RouteEntry> {
        let position = self.position(url, index)?;
        self.entries.get_mut(position)
    }

    /// 按推入确认中回传的视图句柄查找条目。
    pub fn find_by_view(&self, view: ViewHandle) -> Option<&RouteEntry> {
        self.entries
            .iter()
            .rev()
            .find(|entry| entry.view() == Some(view))
    }

    /// 栈上该 URL 的最大序号。
    pub fn last_index_for(&self, url: &str) -> Option<PageIndex> {
        self.entries
            .iter()
            .filter(|entry| entry.url() == url)
            .map(RouteEntry::index)
            .max()
    }

    /// 该 URL 的全部序号，按推入顺序排列。
    pub fn all_indexes_for(&self, url: &str) -> Vec<PageIndex> {
        self.entries
            .iter()
            .filter(|entry| entry.url() == url)
            .map(RouteEntry::index)
            .collect()
    }

    /// 为 `url` 分配下一个序号：当前最大序号加一，未出现过时为 1。
    pub fn next_index_for(&self, url: &str) -> Option<PageIndex> {
        match self.last_index_for(url) {
            Some(last) => last.next(),
            None => Some(PageIndex::FIRST),
        }
    }

    pub fn contains(&self, url: &str, index: Option<PageIndex>) -> bool {
        self.position(url, index).is_some()
    }

    /// 自底向上的 Key 列表。
    pub fn keys(&self) -> Vec<RouteKey> {
        self.entries.iter().map(|entry| entry.key().clone()).collect()
    }
}

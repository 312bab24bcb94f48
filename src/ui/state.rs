//! App 状态定义 (Model)
//!
//! 包含应用状态结构体及相关枚举

use std::time::{Duration, Instant};

use crate::models::Entry;
use crate::storage::{EntryStore, FileSlot, Slot};

/// 应用状态
pub struct App<S: Slot = FileSlot> {
    pub store: EntryStore<S>,
    pub selected_index: usize,
    pub display_list: Vec<String>, // 可见条目的 ID，最新的在前
    pub query: String,             // 当前生效的搜索词
    pub mode: AppMode,
    pub input_buffer: String, // 搜索框输入
    pub draft: Draft,
    pub pending: Vec<PendingAdd>,
    pub next_ticket: u64,
    pub status: Option<Status>,
    pub status_timeout: Duration,
}

/// 应用模式
#[derive(Debug, Clone, PartialEq)]
pub enum AppMode {
    Normal,
    Composing,
    Searching,
    Confirm(ConfirmAction),
    Alert(String), // 关闭后回到编辑表单
}

/// 确认操作类型
#[derive(Debug, Clone, PartialEq)]
pub enum ConfirmAction {
    Delete(String),
}

/// 输入字段类型
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputField {
    Text,
    Image,
}

/// 新条目表单
#[derive(Debug, Clone, PartialEq)]
pub struct Draft {
    pub text: String,
    pub image_path: String,
    pub field: InputField,
}

impl Default for Draft {
    fn default() -> Self {
        Self {
            text: String::new(),
            image_path: String::new(),
            field: InputField::Text,
        }
    }
}

impl Draft {
    pub fn active_buffer(&mut self) -> &mut String {
        match self.field {
            InputField::Text => &mut self.text,
            InputField::Image => &mut self.image_path,
        }
    }
}

/// 等待图片读取完成的添加操作
#[derive(Debug, Clone, PartialEq)]
pub struct PendingAdd {
    pub ticket: u64,
    pub text: String,
    pub date: String,
}

/// 底部状态提示，expires_at 为 None 时一直显示到下一次操作
#[derive(Debug, Clone, PartialEq)]
pub struct Status {
    pub text: String,
    pub expires_at: Option<Instant>,
}

/// 列表区域的三种状态，空日记与无搜索结果不能混为一谈
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ListView {
    Empty,
    NoResults,
    Entries,
}

impl<S: Slot> App<S> {
    /// 创建新的应用实例
    pub fn new(store: EntryStore<S>, status_timeout: Duration) -> Self {
        let mut app = Self {
            store,
            selected_index: 0,
            display_list: Vec::new(),
            query: String::new(),
            mode: AppMode::Normal,
            input_buffer: String::new(),
            draft: Draft::default(),
            pending: Vec::new(),
            next_ticket: 0,
            status: None,
            status_timeout,
        };
        app.refresh_display_list();
        app
    }

    /// 根据当前条目和搜索词重新计算显示列表
    pub fn refresh_display_list(&mut self) {
        self.display_list = self
            .store
            .search(&self.query)
            .into_iter()
            .map(|entry| entry.id)
            .collect();

        // 确保选中索引有效
        if self.display_list.is_empty() {
            self.selected_index = 0;
        } else if self.selected_index >= self.display_list.len() {
            self.selected_index = self.display_list.len() - 1;
        }
    }

    pub fn list_view(&self) -> ListView {
        if self.store.is_empty() {
            ListView::Empty
        } else if self.display_list.is_empty() {
            ListView::NoResults
        } else {
            ListView::Entries
        }
    }

    /// 当前可见的条目
    pub fn visible_entries(&self) -> Vec<&Entry> {
        self.display_list
            .iter()
            .filter_map(|id| self.store.get(id))
            .collect()
    }

    /// 获取当前选中的条目
    pub fn selected_entry(&self) -> Option<&Entry> {
        self.display_list
            .get(self.selected_index)
            .and_then(|id| self.store.get(id))
    }

    /// 显示会自动隐藏的提示，超时过大时不再隐藏
    pub fn flash(&mut self, text: impl Into<String>) {
        self.status = Some(Status {
            text: text.into(),
            expires_at: Instant::now().checked_add(self.status_timeout),
        });
    }

    /// 显示常驻提示 (警告等)
    pub fn notify(&mut self, text: impl Into<String>) {
        self.status = Some(Status {
            text: text.into(),
            expires_at: None,
        });
    }

    pub fn status_text(&self) -> Option<&str> {
        self.status.as_ref().map(|status| status.text.as_str())
    }
}

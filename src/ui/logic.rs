//! 业务逻辑处理 (Update/Dispatch)
//!
//! 包含核心的 dispatch 逻辑和各种业务处理方法

use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{info, warn};

use super::actions::{Action, ImageRequest, Outcome};
use super::state::{App, AppMode, ConfirmAction, Draft, InputField, PendingAdd};
use crate::error::{JournalError, Result};
use crate::image::file_name;
use crate::storage::Slot;

impl<S: Slot> App<S> {
    /// 核心逻辑分发
    pub fn dispatch(&mut self, action: Action) -> Outcome {
        match action {
            Action::Quit => return Outcome::Quit,
            Action::MoveSelectionUp => self.move_up(),
            Action::MoveSelectionDown => self.move_down(),

            Action::StartCompose => self.start_compose(),
            Action::StartSearch => self.start_search(),
            Action::StartDelete => self.start_delete(),
            Action::ClearSearch => self.clear_search(),

            Action::NextField => {
                if self.mode == AppMode::Composing {
                    return self.next_field();
                }
            }

            Action::Cancel => self.cancel(),

            Action::Submit => match &self.mode {
                AppMode::Composing => return self.submit_draft(),
                AppMode::Searching => self.apply_search(),
                AppMode::Confirm(_) => self.execute_confirm(),
                AppMode::Normal | AppMode::Alert(_) => {}
            },

            Action::Input(c) => match self.mode {
                AppMode::Composing => self.draft.active_buffer().push(c),
                AppMode::Searching => self.input_buffer.push(c),
                _ => {}
            },

            Action::DeleteChar => match self.mode {
                AppMode::Composing => {
                    self.draft.active_buffer().pop();
                }
                AppMode::Searching => {
                    self.input_buffer.pop();
                }
                _ => {}
            },

            Action::Tick => self.expire_status(Instant::now()),
        }
        Outcome::Continue
    }

    // ============ 导航相关 ============

    /// 向上移动选择
    pub fn move_up(&mut self) {
        if self.selected_index > 0 {
            self.selected_index -= 1;
        }
    }

    /// 向下移动选择
    pub fn move_down(&mut self) {
        if self.selected_index + 1 < self.display_list.len() {
            self.selected_index += 1;
        }
    }

    // ============ 添加条目相关 ============

    /// 打开新条目表单
    pub fn start_compose(&mut self) {
        self.mode = AppMode::Composing;
        self.draft = Draft::default();
    }

    /// 在正文和图片路径之间切换；离开图片字段时请求检查文件
    pub fn next_field(&mut self) -> Outcome {
        let leaving = self.draft.field;
        self.draft.field = leaving.next();

        let path = self.draft.image_path.trim();
        if leaving == InputField::Image && !path.is_empty() {
            return Outcome::InspectImage(PathBuf::from(path));
        }
        Outcome::Continue
    }

    /// 文件检查完成后的提示，一段时间后自动隐藏
    pub fn announce_image(&mut self, path: &Path, is_file: bool) {
        if is_file {
            self.flash(format!("File \"{}\" uploaded successfully!", file_name(path)));
        } else {
            self.flash(format!("File \"{}\" not found", path.display()));
        }
    }

    /// 提交表单；带图片时先返回读取请求，条目在读取完成后才出现
    pub fn submit_draft(&mut self) -> Outcome {
        let text = self.draft.text.trim().to_string();
        if text.is_empty() {
            self.mode = AppMode::Alert(JournalError::EmptyText.user_message());
            return Outcome::Continue;
        }

        let image_path = self.draft.image_path.trim().to_string();
        self.draft = Draft::default();
        self.mode = AppMode::Normal;
        self.status = None;

        if image_path.is_empty() {
            self.apply_add(&text, None, None);
            return Outcome::Continue;
        }

        let ticket = self.next_ticket;
        self.next_ticket += 1;
        // 日期在提交时确定，与读取何时完成无关
        let date = self.store.today();
        self.pending.push(PendingAdd { ticket, text, date });
        self.notify("Reading image...");
        info!(ticket, path = %image_path, "image read started");

        Outcome::LoadImage(ImageRequest {
            ticket,
            path: PathBuf::from(image_path),
        })
    }

    /// 图片读取完成后执行真正的添加；读取失败时仍保存不带图片的条目
    pub fn finish_image_add(&mut self, ticket: u64, result: Result<String>) {
        let Some(pos) = self.pending.iter().position(|p| p.ticket == ticket) else {
            warn!(ticket, "image result for unknown request");
            return;
        };
        let pending = self.pending.remove(pos);

        match result {
            Ok(payload) => {
                self.apply_add(&pending.text, Some(payload), Some(pending.date));
            }
            Err(e) => {
                warn!(ticket, error = %e, "saving entry without image");
                if self.apply_add(&pending.text, None, Some(pending.date)) {
                    self.notify(e.user_message());
                }
            }
        }
    }

    /// 写入存储并刷新视图，返回是否成功
    fn apply_add(&mut self, text: &str, image: Option<String>, date: Option<String>) -> bool {
        let added = match date {
            Some(date) => self.store.add_dated(text, image, date),
            None => self.store.add(text, image),
        };
        match added {
            Ok(entry) => {
                self.refresh_display_list();
                if let Some(pos) = self.display_list.iter().position(|id| *id == entry.id) {
                    self.selected_index = pos;
                }
                self.flash("Entry added");
                true
            }
            Err(e) => {
                self.notify(e.user_message());
                false
            }
        }
    }

    // ============ 搜索相关 ============

    /// 打开搜索框
    pub fn start_search(&mut self) {
        self.input_buffer = self.query.clone();
        self.mode = AppMode::Searching;
    }

    /// 应用搜索词
    pub fn apply_search(&mut self) {
        self.query = self.input_buffer.trim().to_string();
        self.input_buffer.clear();
        self.mode = AppMode::Normal;
        self.selected_index = 0;
        self.refresh_display_list();
    }

    /// 清除搜索，显示全部条目
    pub fn clear_search(&mut self) {
        if self.query.is_empty() {
            return;
        }
        self.query.clear();
        self.selected_index = 0;
        self.refresh_display_list();
    }

    // ============ 删除相关 ============

    /// 开始删除条目
    pub fn start_delete(&mut self) {
        if let Some(entry) = self.selected_entry() {
            self.mode = AppMode::Confirm(ConfirmAction::Delete(entry.id.clone()));
        }
    }

    /// 执行确认操作
    pub fn execute_confirm(&mut self) {
        if let AppMode::Confirm(ConfirmAction::Delete(id)) = &self.mode {
            let id = id.clone();
            match self.store.delete(&id) {
                Ok(true) => self.flash("Entry deleted"),
                Ok(false) => {}
                Err(e) => self.notify(e.user_message()),
            }
        }
        self.refresh_display_list();
        self.mode = AppMode::Normal;
    }

    // ============ 通用操作 ============

    /// 取消当前操作
    pub fn cancel(&mut self) {
        match self.mode {
            // 提示框关闭后保留草稿
            AppMode::Alert(_) => self.mode = AppMode::Composing,
            AppMode::Composing => {
                self.draft = Draft::default();
                self.mode = AppMode::Normal;
            }
            _ => {
                self.input_buffer.clear();
                self.mode = AppMode::Normal;
            }
        }
    }

    /// 隐藏过期的提示
    pub fn expire_status(&mut self, now: Instant) {
        let expired = self
            .status
            .as_ref()
            .and_then(|status| status.expires_at)
            .is_some_and(|at| now >= at);
        if expired {
            self.status = None;
        }
    }
}

impl InputField {
    fn next(self) -> Self {
        match self {
            InputField::Text => InputField::Image,
            InputField::Image => InputField::Text,
        }
    }
}

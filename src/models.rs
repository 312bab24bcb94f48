use std::fmt::Write as _;

use chrono::Local;
use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{JournalError, Result};

/// 默认日期格式 (例如 10/16/2026)
pub const DEFAULT_DATE_FORMAT: &str = "%-m/%-d/%Y";

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// 日记条目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    #[serde(default = "new_id")]
    pub id: String,
    pub date: String,
    pub text: String,
    #[serde(default)]
    pub image: Option<String>, // data URL
}

impl Entry {
    /// 创建新条目，文本去除首尾空白后不能为空
    pub fn new(text: &str, image: Option<String>, date_format: &str) -> Result<Self> {
        Self::with_date(text, image, today(date_format))
    }

    /// 使用给定日期创建条目 (日期在提交时就已确定)
    pub fn with_date(text: &str, image: Option<String>, date: String) -> Result<Self> {
        let text = text.trim();
        if text.is_empty() {
            return Err(JournalError::EmptyText);
        }

        Ok(Self {
            id: new_id(),
            date,
            text: text.to_string(),
            image,
        })
    }

    /// 大小写不敏感地匹配日期或正文，空查询匹配所有条目
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        self.date.to_lowercase().contains(&query) || self.text.to_lowercase().contains(&query)
    }

    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }
}

/// 日期格式中不能有无法识别的格式符
pub fn is_valid_date_format(date_format: &str) -> bool {
    !date_format.trim().is_empty()
        && !StrftimeItems::new(date_format).any(|item| matches!(item, Item::Error))
}

/// 按给定格式输出今天的日期，格式无效时退回默认格式
pub fn today(date_format: &str) -> String {
    let now = Local::now();
    let mut date = String::new();
    if write!(date, "{}", now.format(date_format)).is_err() {
        date = now.format(DEFAULT_DATE_FORMAT).to_string();
    }
    date
}

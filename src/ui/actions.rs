//! Action 枚举定义 (Intent)
//!
//! 用户交互转化为明确的语义化 Action

use std::path::PathBuf;

/// 用户操作枚举
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Quit,
    MoveSelectionUp,
    MoveSelectionDown,

    // 触发特定功能
    StartCompose,
    StartSearch,
    StartDelete,
    ClearSearch,

    // 表单/通用交互
    NextField,   // Tab
    Cancel,      // Esc / n
    Submit,      // Enter / y
    Input(char), // 输入字符
    DeleteChar,  // Backspace

    Tick, // 定时器
}

/// dispatch 的结果，由事件循环执行副作用
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Continue,
    Quit,
    LoadImage(ImageRequest),
    InspectImage(PathBuf),
}

/// 异步读取图片的请求
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRequest {
    pub ticket: u64,
    pub path: PathBuf,
}

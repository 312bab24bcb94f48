//! 图片读取
//!
//! 把用户选择的图片文件异步读成可直接内嵌的 data URL

use std::path::{Path, PathBuf};

use base64::{Engine as _, engine::general_purpose::STANDARD};
use tracing::{debug, warn};

use crate::error::{JournalError, Result};

/// 根据扩展名推断 MIME 类型
fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

/// 异步读取文件并编码为 data URL
pub async fn load_image(path: PathBuf) -> Result<String> {
    let bytes = tokio::fs::read(&path).await.map_err(|source| {
        warn!(path = %path.display(), error = %source, "image read failed");
        JournalError::ImageRead {
            path: path.clone(),
            source,
        }
    })?;

    debug!(path = %path.display(), bytes = bytes.len(), "image loaded");
    Ok(format!("data:{};base64,{}", mime_for(&path), STANDARD.encode(&bytes)))
}

/// 异步检查路径是否为普通文件
pub async fn is_image_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|meta| meta.is_file())
        .unwrap_or(false)
}

/// 文件名 (用于状态提示)
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// data URL 摘要，例如 "image/png, 1.2 KB"
pub fn describe_payload(payload: &str) -> Option<String> {
    let rest = payload.strip_prefix("data:")?;
    let (meta, data) = rest.split_once(',')?;
    let mime = meta.split(';').next().filter(|m| !m.is_empty()).unwrap_or("unknown");

    let padding = data.bytes().rev().take_while(|b| *b == b'=').count();
    let size = (data.len() / 4 * 3).saturating_sub(padding);

    Some(format!("{}, {}", mime, human_size(size)))
}

fn human_size(bytes: usize) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

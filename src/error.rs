//! 错误类型定义

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// 日记应用的统一错误类型
#[derive(Debug, Error)]
pub enum JournalError {
    #[error("entry text is empty")]
    EmptyText,

    #[error("could not read journal data: {0}")]
    PersistenceRead(String),

    #[error("could not save journal data: {0}")]
    PersistenceWrite(#[source] io::Error),

    #[error("could not read image {}: {source}", path.display())]
    ImageRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl JournalError {
    /// 面向用户的提示文本
    pub fn user_message(&self) -> String {
        match self {
            JournalError::EmptyText => "Please write something before adding an entry!".to_string(),
            JournalError::PersistenceWrite(e) => {
                format!("Warning: entry list could not be saved ({e})")
            }
            JournalError::ImageRead { path, .. } => format!(
                "Warning: image {} could not be read, entry saved without it",
                path.display()
            ),
            _ => self.to_string(),
        }
    }
}

/// 使用 JournalError 的 Result
pub type Result<T> = std::result::Result<T, JournalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text_message() {
        let err = JournalError::EmptyText;
        assert_eq!(
            err.user_message(),
            "Please write something before adding an entry!"
        );
    }

    #[test]
    fn test_write_error_is_warning() {
        let err = JournalError::PersistenceWrite(io::Error::other("quota exceeded"));
        let msg = err.user_message();
        assert!(msg.starts_with("Warning"));
        assert!(msg.contains("quota exceeded"));
    }

    #[test]
    fn test_image_error_mentions_path() {
        let err = JournalError::ImageRead {
            path: PathBuf::from("/tmp/missing.png"),
            source: io::Error::new(io::ErrorKind::NotFound, "not found"),
        };
        assert!(err.user_message().contains("/tmp/missing.png"));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_config_error_falls_back_to_display() {
        let err = JournalError::Config("bad key".to_string());
        assert_eq!(err.user_message(), "configuration error: bad key");
    }
}

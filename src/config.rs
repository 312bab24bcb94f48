//! 配置管理
//!
//! 配置文件位于 ~/.config/daybook/config.toml，所有字段均可省略

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{JournalError, Result};
use crate::models::{DEFAULT_DATE_FORMAT, is_valid_date_format};

const APP_DIR: &str = "daybook";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 日记数据文件，缺省为数据目录下的 journal.json
    pub data_file: Option<PathBuf>,
    pub date_format: String,
    pub status_timeout_secs: u64,
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: None,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            status_timeout_secs: 3,
            log_filter: "daybook=info".to_string(),
        }
    }
}

impl Config {
    /// 从默认位置加载配置
    pub fn load() -> Result<Self> {
        match dirs::config_dir() {
            Some(dir) => Self::load_from(&dir.join(APP_DIR).join("config.toml")),
            None => Ok(Self::default()),
        }
    }

    /// 从指定文件加载，文件不存在时使用默认值
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(JournalError::Io(e)),
        };

        let config: Config = toml::from_str(&content).map_err(|e| {
            JournalError::Config(format!("failed to parse {}: {}", path.display(), e))
        })?;

        if !is_valid_date_format(&config.date_format) {
            return Err(JournalError::Config(format!(
                "invalid date_format: {:?}",
                config.date_format
            )));
        }
        Ok(config)
    }

    pub fn status_timeout(&self) -> Duration {
        Duration::from_secs(self.status_timeout_secs)
    }

    /// 数据文件路径
    pub fn data_file(&self, data_dir: &Path) -> PathBuf {
        self.data_file
            .clone()
            .unwrap_or_else(|| data_dir.join("journal.json"))
    }
}

/// 获取数据目录路径 (~/.local/share/daybook/)
pub fn data_dir() -> io::Result<PathBuf> {
    let data_dir = dirs::data_dir()
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "cannot locate user data directory"))?
        .join(APP_DIR);

    fs::create_dir_all(&data_dir)?;

    Ok(data_dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.status_timeout(), Duration::from_secs(3));
    }

    #[test]
    fn test_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "date_format = \"%Y-%m-%d\"\nstatus_timeout_secs = 5\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.date_format, "%Y-%m-%d");
        assert_eq!(config.status_timeout_secs, 5);
        assert_eq!(config.log_filter, "daybook=info");
        assert_eq!(
            config.data_file(Path::new("/data")),
            PathBuf::from("/data/journal.json")
        );
    }

    #[test]
    fn test_explicit_data_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "data_file = \"/srv/journal.json\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(
            config.data_file(Path::new("/data")),
            PathBuf::from("/srv/journal.json")
        );
    }

    #[test]
    fn test_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "status_timeout_secs = \"soon\"").unwrap();
        assert!(matches!(Config::load_from(&path), Err(JournalError::Config(_))));

        fs::write(&path, "date_format = \"  \"").unwrap();
        assert!(matches!(Config::load_from(&path), Err(JournalError::Config(_))));

        fs::write(&path, "date_format = \"%Q\"").unwrap();
        assert!(matches!(Config::load_from(&path), Err(JournalError::Config(_))));

        fs::write(&path, "date_format = \"%Y-%\"").unwrap();
        assert!(matches!(Config::load_from(&path), Err(JournalError::Config(_))));
    }
}

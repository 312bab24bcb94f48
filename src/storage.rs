//! 持久化层
//!
//! - Slot: 一个可替换的持久化槽位，每次写入都是整体快照替换
//! - EntryStore: 条目列表的唯一内存镜像，也是唯一的写入者

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{JournalError, Result};
use crate::models::{Entry, today};

/// 持久化槽位
pub trait Slot {
    /// 读取完整内容，槽位不存在时返回 None
    fn read(&self) -> io::Result<Option<String>>;

    /// 用新内容整体替换槽位
    fn write(&mut self, contents: &str) -> io::Result<()>;
}

/// 基于 JSON 文件的槽位
#[derive(Debug, Clone)]
pub struct FileSlot {
    path: PathBuf,
}

impl FileSlot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Slot for FileSlot {
    fn read(&self) -> io::Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write(&mut self, contents: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        // 先写临时文件再重命名，避免留下半个快照
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, contents)?;
        fs::rename(&tmp, &self.path)
    }
}

/// 内存槽位 (测试替身)
#[cfg(test)]
#[derive(Debug, Default, Clone)]
pub struct MemorySlot {
    pub contents: Option<String>,
    pub fail_writes: bool,
    pub writes: usize,
}

#[cfg(test)]
impl MemorySlot {
    pub fn with_contents(contents: &str) -> Self {
        Self {
            contents: Some(contents.to_string()),
            ..Self::default()
        }
    }
}

#[cfg(test)]
impl Slot for MemorySlot {
    fn read(&self) -> io::Result<Option<String>> {
        Ok(self.contents.clone())
    }

    fn write(&mut self, contents: &str) -> io::Result<()> {
        if self.fail_writes {
            return Err(io::Error::other("storage quota exceeded"));
        }
        self.contents = Some(contents.to_string());
        self.writes += 1;
        Ok(())
    }
}

/// 条目存储，最新的条目总在下标 0
#[derive(Debug)]
pub struct EntryStore<S: Slot> {
    slot: S,
    entries: Vec<Entry>,
    date_format: String,
}

impl<S: Slot> EntryStore<S> {
    /// 打开存储并加载已有条目
    pub fn open(slot: S, date_format: impl Into<String>) -> Self {
        let mut store = Self {
            slot,
            entries: Vec::new(),
            date_format: date_format.into(),
        };
        store.entries = store.load();
        info!(count = store.entries.len(), "journal loaded");
        store
    }

    /// 从槽位读取条目；缺失或损坏的数据视为空列表
    pub fn load(&self) -> Vec<Entry> {
        let content = match self.slot.read() {
            Ok(Some(content)) => content,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(error = %JournalError::PersistenceRead(e.to_string()), "treating journal as empty");
                return Vec::new();
            }
        };

        // 与浏览器版本一致: "null" 也视为空列表
        match serde_json::from_str::<Option<Vec<Entry>>>(&content) {
            Ok(entries) => entries
                .unwrap_or_default()
                .into_iter()
                .filter(|entry| {
                    let keep = !entry.text.trim().is_empty();
                    if !keep {
                        warn!(id = %entry.id, "dropping stored entry with empty text");
                    }
                    keep
                })
                .collect(),
            Err(e) => {
                warn!(error = %JournalError::PersistenceRead(e.to_string()), "treating journal as empty");
                Vec::new()
            }
        }
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Entry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    #[cfg(test)]
    pub fn slot(&self) -> &S {
        &self.slot
    }

    /// 按配置的格式输出今天的日期
    pub fn today(&self) -> String {
        today(&self.date_format)
    }

    /// 添加条目 (插入到最前面) 并写回完整快照
    pub fn add(&mut self, text: &str, image: Option<String>) -> Result<Entry> {
        self.add_dated(text, image, self.today())
    }

    /// 使用提交时确定的日期添加条目
    pub fn add_dated(&mut self, text: &str, image: Option<String>, date: String) -> Result<Entry> {
        let entry = Entry::with_date(text, image, date)?;
        self.entries.insert(0, entry.clone());

        if let Err(e) = self.persist() {
            // 写入失败时回滚，保持内存与槽位一致
            self.entries.remove(0);
            return Err(e);
        }

        info!(id = %entry.id, image = entry.has_image(), "entry added");
        Ok(entry)
    }

    /// 按 ID 删除条目，找不到时不做任何写入
    pub fn delete(&mut self, id: &str) -> Result<bool> {
        let Some(pos) = self.entries.iter().position(|entry| entry.id == id) else {
            return Ok(false);
        };

        let removed = self.entries.remove(pos);
        if let Err(e) = self.persist() {
            self.entries.insert(pos, removed);
            return Err(e);
        }

        info!(id = %id, "entry deleted");
        Ok(true)
    }

    /// 按 (日期, 正文) 删除所有完全匹配的条目，返回删除数量
    // 界面按 ID 删除，这里保留按值删除的接口
    #[allow(dead_code)]
    pub fn delete_matching(&mut self, date: &str, text: &str) -> Result<usize> {
        let before = self.entries.clone();
        self.entries
            .retain(|entry| !(entry.date == date && entry.text == text));

        let removed = before.len() - self.entries.len();
        if removed == 0 {
            return Ok(0);
        }

        if let Err(e) = self.persist() {
            self.entries = before;
            return Err(e);
        }

        info!(removed, "entries deleted by date and text");
        Ok(removed)
    }

    /// 搜索条目，不修改存储
    pub fn search(&self, query: &str) -> Vec<Entry> {
        let results: Vec<Entry> = self
            .entries
            .iter()
            .filter(|entry| entry.matches(query))
            .cloned()
            .collect();
        debug!(query, hits = results.len(), "search");
        results
    }

    /// 整体写回快照
    fn persist(&mut self) -> Result<()> {
        let content = serde_json::to_string(&self.entries)
            .map_err(|e| JournalError::PersistenceWrite(io::Error::other(e)))?;

        self.slot.write(&content).map_err(|e| {
            warn!(error = %e, "failed to save journal");
            JournalError::PersistenceWrite(e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DEFAULT_DATE_FORMAT;

    fn empty_store() -> EntryStore<MemorySlot> {
        EntryStore::open(MemorySlot::default(), DEFAULT_DATE_FORMAT)
    }

    fn reopen(store: &EntryStore<MemorySlot>) -> Vec<Entry> {
        EntryStore::open(store.slot().clone(), DEFAULT_DATE_FORMAT).load()
    }

    #[test]
    fn test_add_then_load() {
        let mut store = empty_store();
        store.add("first", None).unwrap();
        store.add("Hello world", None).unwrap();

        let loaded = reopen(&store);
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].text, "Hello world");
        assert_eq!(loaded[0].date, today(DEFAULT_DATE_FORMAT));
        assert_eq!(loaded[0].image, None);
        assert_eq!(loaded[1].text, "first");
        assert_eq!(store.slot().writes, 2);
    }

    #[test]
    fn test_add_dated_keeps_submit_date() {
        let mut store = empty_store();
        let entry = store
            .add_dated("crossed midnight", None, "1/1/2000".to_string())
            .unwrap();
        assert_eq!(entry.date, "1/1/2000");
        assert_eq!(reopen(&store)[0].date, "1/1/2000");
    }

    #[test]
    fn test_add_empty_text_writes_nothing() {
        let mut store = empty_store();
        let result = store.add("   ", None);
        assert!(matches!(result, Err(JournalError::EmptyText)));
        assert!(store.is_empty());
        assert_eq!(store.slot().writes, 0);
        assert!(store.slot().contents.is_none());
    }

    #[test]
    fn test_load_absent_or_corrupt_is_empty() {
        assert!(empty_store().load().is_empty());

        let store = EntryStore::open(MemorySlot::with_contents("{not json"), DEFAULT_DATE_FORMAT);
        assert!(store.is_empty());

        let store = EntryStore::open(MemorySlot::with_contents("null"), DEFAULT_DATE_FORMAT);
        assert!(store.is_empty());

        let store = EntryStore::open(
            MemorySlot::with_contents(r#"{"date":"x","text":"y"}"#),
            DEFAULT_DATE_FORMAT,
        );
        assert!(store.is_empty());
    }

    #[test]
    fn test_load_drops_blank_records() {
        let json = r#"[
            {"date":"1/1/2025","text":"kept","image":null},
            {"date":"1/1/2025","text":"  ","image":null}
        ]"#;
        let store = EntryStore::open(MemorySlot::with_contents(json), DEFAULT_DATE_FORMAT);
        assert_eq!(store.len(), 1);
        assert_eq!(store.entries()[0].text, "kept");
    }

    #[test]
    fn test_delete_by_id() {
        let mut store = empty_store();
        let a = store.add("same", None).unwrap();
        let b = store.add("same", None).unwrap();

        assert!(store.delete(&a.id).unwrap());
        assert_eq!(store.len(), 1);
        assert_eq!(store.entries()[0].id, b.id);

        let loaded = reopen(&store);
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, b.id);
    }

    #[test]
    fn test_delete_unknown_id_is_noop() {
        let mut store = empty_store();
        store.add("keep me", None).unwrap();
        let writes = store.slot().writes;

        assert!(!store.delete("no-such-id").unwrap());
        assert_eq!(store.len(), 1);
        assert_eq!(store.slot().writes, writes);
    }

    #[test]
    fn test_delete_matching_pair() {
        let mut store = empty_store();
        store.add("one", None).unwrap();
        store.add("two", None).unwrap();
        let date = today(DEFAULT_DATE_FORMAT);

        assert_eq!(store.delete_matching(&date, "one").unwrap(), 1);
        assert_eq!(store.len(), 1);
        assert_eq!(reopen(&store)[0].text, "two");

        assert_eq!(store.delete_matching("1/1/1999", "two").unwrap(), 0);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_search() {
        let json = r#"[
            {"id":"c","date":"2/1/2025","text":"Coffee with Ana","image":null},
            {"id":"b","date":"1/15/2025","text":"Rainy day","image":null},
            {"id":"a","date":"1/1/2025","text":"New year, new COFFEE","image":null}
        ]"#;
        let store = EntryStore::open(MemorySlot::with_contents(json), DEFAULT_DATE_FORMAT);

        let all = store.search("");
        assert_eq!(all, store.entries());

        let ids: Vec<_> = store.search("coffee").into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec!["c", "a"]);

        let ids: Vec<_> = store.search("1/15").into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec!["b"]);

        assert!(store.search("tea").is_empty());
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_write_failure_rolls_back() {
        let mut store = empty_store();
        let kept = store.add("kept", None).unwrap();
        store.slot.fail_writes = true;

        let result = store.add("lost", None);
        assert!(matches!(result, Err(JournalError::PersistenceWrite(_))));
        assert_eq!(store.len(), 1);

        let result = store.delete(&kept.id);
        assert!(matches!(result, Err(JournalError::PersistenceWrite(_))));
        assert_eq!(store.entries()[0].id, kept.id);
    }

    #[test]
    fn test_round_trip_after_mixed_operations() {
        let mut store = empty_store();
        let a = store.add("a", None).unwrap();
        store.add("b", None).unwrap();
        let c = store.add("c", Some("data:image/png;base64,AAAA".to_string())).unwrap();
        store.add("d", None).unwrap();
        store.delete(&a.id).unwrap();
        store.delete(&c.id).unwrap();

        let texts: Vec<_> = reopen(&store).into_iter().map(|e| e.text).collect();
        assert_eq!(texts, vec!["d", "b"]);
    }

    #[test]
    fn test_file_slot_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("journal.json");

        let mut store = EntryStore::open(FileSlot::new(&path), DEFAULT_DATE_FORMAT);
        assert!(store.is_empty());
        store.add("on disk", None).unwrap();

        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());

        let store = EntryStore::open(FileSlot::new(&path), DEFAULT_DATE_FORMAT);
        assert_eq!(store.len(), 1);
        assert_eq!(store.entries()[0].text, "on disk");
    }

    #[test]
    fn test_file_slot_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("journal.json");
        fs::write(&path, "garbage").unwrap();

        let store = EntryStore::open(FileSlot::new(&path), DEFAULT_DATE_FORMAT);
        assert!(store.is_empty());
    }
}

//! Persistence for intake submissions and the latest analysis result.
//!
//! Both stores are traits so handlers never touch files directly. The JSON
//! file backends are the default; the in-memory backends keep the same
//! read semantics and are selected with `STORAGE=memory`.
//!
//! Reads never fail on a missing or unparsable document: the intake log is
//! then empty and the result slot holds `{}`. Only real I/O failures (for
//! example permission errors) reach the caller.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Value};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::{Mutex, RwLock};

use crate::models::{AnalysisResult, SubmittedRecord};
use crate::Result;

/// Append-only log of intake submissions.
#[async_trait]
pub trait IntakeStore: Send + Sync {
    /// Append a record and return the number of records now stored.
    async fn append(&self, record: SubmittedRecord) -> Result<usize>;

    /// Most recently appended record, if any.
    async fn latest(&self) -> Result<Option<Value>>;
}

/// Single, unkeyed slot holding the analyzer's latest answer.
#[async_trait]
pub trait ResultSlot: Send + Sync {
    async fn clear(&self) -> Result<()>;

    /// Replace the slot content wholesale.
    async fn set(&self, result: Value) -> Result<()>;

    /// Raw slot content, `{}` when nothing usable is stored.
    async fn get(&self) -> Result<Value>;

    async fn get_formatted(&self) -> Result<Option<AnalysisResult>> {
        let raw = self.get().await?;
        Ok(AnalysisResult::from_raw(&raw))
    }
}

// ============================================================================
// JSON file backends
// ============================================================================

async fn read_json(path: &Path) -> Result<Option<Value>> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::warn!("{} not found, treating as empty", path.display());
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };

    match serde_json::from_slice(&bytes) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            tracing::error!("Invalid JSON in {}: {}", path.display(), e);
            Ok(None)
        }
    }
}

async fn write_json(path: &Path, value: &Value) -> Result<()> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;

    tokio::fs::write(path, buf).await?;
    Ok(())
}

async fn write_if_missing(path: &Path, initial: &Value) -> Result<bool> {
    if tokio::fs::try_exists(path).await? {
        return Ok(false);
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    write_json(path, initial).await?;
    Ok(true)
}

/// Intake log kept as a single JSON array on disk.
///
/// Every append rewrites the whole file. The mutex serializes the
/// read-modify-write cycle within this process; other processes writing the
/// same file can still lose updates.
pub struct JsonFileIntakeStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileIntakeStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the file with an empty list if it does not exist yet.
    pub async fn initialize(&self) -> Result<bool> {
        write_if_missing(&self.path, &json!([])).await
    }

    async fn load(&self) -> Result<Vec<Value>> {
        match read_json(&self.path).await? {
            Some(Value::Array(records)) => Ok(records),
            Some(_) => {
                tracing::warn!(
                    "{} does not hold a list, treating as empty",
                    self.path.display()
                );
                Ok(Vec::new())
            }
            None => Ok(Vec::new()),
        }
    }
}

#[async_trait]
impl IntakeStore for JsonFileIntakeStore {
    async fn append(&self, record: SubmittedRecord) -> Result<usize> {
        let _guard = self.lock.lock().await;

        let mut records = self.load().await?;
        records.push(record.into_value());
        let count = records.len();
        write_json(&self.path, &Value::Array(records)).await?;

        Ok(count)
    }

    async fn latest(&self) -> Result<Option<Value>> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.pop())
    }
}

/// Analysis slot kept as a single JSON document on disk.
pub struct JsonFileResultSlot {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileResultSlot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the file with an empty mapping if it does not exist yet.
    pub async fn initialize(&self) -> Result<bool> {
        write_if_missing(&self.path, &json!({})).await
    }
}

#[async_trait]
impl ResultSlot for JsonFileResultSlot {
    async fn clear(&self) -> Result<()> {
        let _guard = self.lock.lock().await;
        write_json(&self.path, &json!({})).await
    }

    async fn set(&self, result: Value) -> Result<()> {
        let _guard = self.lock.lock().await;
        write_json(&self.path, &result).await
    }

    async fn get(&self) -> Result<Value> {
        let _guard = self.lock.lock().await;
        Ok(read_json(&self.path).await?.unwrap_or_else(|| json!({})))
    }
}

// ============================================================================
// In-memory backends
// ============================================================================

#[derive(Default)]
pub struct MemoryIntakeStore {
    records: RwLock<Vec<Value>>,
}

impl MemoryIntakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub async fn records(&self) -> Vec<Value> {
        self.records.read().await.clone()
    }
}

#[async_trait]
impl IntakeStore for MemoryIntakeStore {
    async fn append(&self, record: SubmittedRecord) -> Result<usize> {
        let mut records = self.records.write().await;
        records.push(record.into_value());
        Ok(records.len())
    }

    async fn latest(&self) -> Result<Option<Value>> {
        Ok(self.records.read().await.last().cloned())
    }
}

pub struct MemoryResultSlot {
    value: RwLock<Value>,
}

impl MemoryResultSlot {
    pub fn new() -> Self {
        Self {
            value: RwLock::new(json!({})),
        }
    }
}

impl Default for MemoryResultSlot {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResultSlot for MemoryResultSlot {
    async fn clear(&self) -> Result<()> {
        *self.value.write().await = json!({});
        Ok(())
    }

    async fn set(&self, result: Value) -> Result<()> {
        *self.value.write().await = result;
        Ok(())
    }

    async fn get(&self) -> Result<Value> {
        Ok(self.value.read().await.clone())
    }
}

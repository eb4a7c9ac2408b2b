use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
    sync::Mutex,
};

use tracing::debug;

use crate::domain::{UserFields, UserId, UserRecord};

use super::{RemoteStore, StoreError};

const DOCUMENT_EXTENSION: &str = "json";
const TMP_SUFFIX: &str = "tmp";

/// Filesystem-backed document store: one JSON document per user.
#[derive(Debug)]
pub struct JsonDocumentStore {
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonDocumentStore {
    pub fn new(root: PathBuf) -> Result<Self, StoreError> {
        fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            write_lock: Mutex::new(()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn document_path(&self, user_id: &UserId) -> PathBuf {
        self.root.join(format!(
            "{}.{}",
            canonical_name(user_id.as_str()),
            DOCUMENT_EXTENSION
        ))
    }

    fn read_document(&self, user_id: &UserId) -> Result<UserRecord, StoreError> {
        let path = self.document_path(user_id);
        if !path.exists() {
            return Err(StoreError::NotFound(user_id.clone()));
        }
        let data = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&data)?)
    }

    fn write_document(&self, user_id: &UserId, record: &UserRecord) -> Result<(), StoreError> {
        let path = self.document_path(user_id);
        let json = serde_json::to_string_pretty(record)?;
        write_atomic(&path, &json)?;
        Ok(())
    }
}

impl RemoteStore for JsonDocumentStore {
    fn fetch(&self, user_id: &UserId) -> Result<UserRecord, StoreError> {
        self.read_document(user_id)
    }

    fn write_fields(&self, user_id: &UserId, fields: &UserFields) -> Result<(), StoreError> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| StoreError::Unavailable("write lock poisoned".into()))?;
        let mut record = self.read_document(user_id)?;
        if fields.is_empty() {
            debug!(user = %user_id, "empty update skipped");
            return Ok(());
        }
        fields.apply_to(&mut record);
        self.write_document(user_id, &record)?;
        debug!(user = %user_id, fields = ?fields.field_names(), "document updated");
        Ok(())
    }

    fn create(&self, user_id: &UserId, record: &UserRecord) -> Result<(), StoreError> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| StoreError::Unavailable("write lock poisoned".into()))?;
        self.write_document(user_id, record)
    }
}

fn canonical_name(raw: &str) -> String {
    let sanitized: String = raw
        .trim()
        .chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' => c,
            _ => '_',
        })
        .collect();
    if sanitized.trim_matches('_').is_empty() {
        "user".into()
    } else {
        sanitized
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

/// Writes `data` to a sibling temp file and renames it over `path`, so readers
/// see either the old contents or the new ones.
pub(crate) fn write_atomic(path: &Path, data: &str) -> Result<(), std::io::Error> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = tmp_path(path);
    let result = File::create(&tmp).and_then(|mut file| {
        file.write_all(data.as_bytes())?;
        file.sync_all()
    });
    if let Err(err) = result {
        let _ = fs::remove_file(&tmp);
        return Err(err);
    }
    fs::rename(&tmp, path)
}

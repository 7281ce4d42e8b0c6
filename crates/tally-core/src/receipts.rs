//! Receipt image storage
//!
//! Receipts are plain files in one directory. Ownership is encoded in the
//! filename (`receipt-<user_id>-<millis>-<hash>.<ext>`), so no table is needed
//! to decide who may read or delete a file.

use std::path::{Path, PathBuf};

use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Maximum receipt upload size (5MB)
pub const MAX_RECEIPT_SIZE: usize = 5 * 1024 * 1024;

/// Accepted image extensions (lowercase, without the dot)
pub const ALLOWED_EXTENSIONS: &[&str] = &["jpeg", "jpg", "png", "gif", "webp"];

/// URL prefix under which stored receipts are served
pub const PUBLIC_PREFIX: &str = "/uploads/";

/// A receipt written to disk
#[derive(Debug, Clone, Serialize)]
pub struct StoredReceipt {
    /// Public path, stored on transactions as `receipt_path`
    pub path: String,
    pub filename: String,
    #[serde(rename = "originalName")]
    pub original_name: String,
}

/// Receipt files for all users
#[derive(Debug, Clone)]
pub struct ReceiptStore {
    dir: PathBuf,
}

impl ReceiptStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Public URL path for a stored filename
    pub fn public_path(filename: &str) -> String {
        format!("{}{}", PUBLIC_PREFIX, filename)
    }

    /// Check the file name, MIME type, and size of an upload
    ///
    /// Returns the normalized extension.
    pub fn validate(original_name: &str, content_type: Option<&str>, len: usize) -> Result<String> {
        let extension = Path::new(original_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .filter(|e| ALLOWED_EXTENSIONS.contains(&e.as_str()))
            .ok_or_else(|| Error::invalid("Only image files are allowed"))?;

        let mime_ok = content_type
            .and_then(|ct| ct.strip_prefix("image/"))
            .map(|subtype| ALLOWED_EXTENSIONS.contains(&subtype.to_ascii_lowercase().as_str()))
            .unwrap_or(false);
        if !mime_ok {
            return Err(Error::invalid("Only image files are allowed"));
        }

        if len == 0 {
            return Err(Error::invalid("No file uploaded"));
        }
        if len > MAX_RECEIPT_SIZE {
            return Err(Error::invalid("File too large (max 5MB)"));
        }

        Ok(extension)
    }

    /// Validate and write an upload for `user_id`
    pub fn save(
        &self,
        user_id: i64,
        original_name: &str,
        content_type: Option<&str>,
        bytes: &[u8],
    ) -> Result<StoredReceipt> {
        let extension = Self::validate(original_name, content_type, bytes.len())?;

        if !self.dir.exists() {
            std::fs::create_dir_all(&self.dir)?;
        }

        let mut hasher = Sha256::new();
        hasher.update(bytes);
        let hash = hex::encode(hasher.finalize());

        let millis = chrono::Utc::now().timestamp_millis();
        let filename = format!(
            "{}{}-{}.{}",
            Self::owner_prefix(user_id),
            millis,
            &hash[..12],
            extension
        );

        std::fs::write(self.dir.join(&filename), bytes)?;
        info!("Stored receipt {} ({} bytes)", filename, bytes.len());

        Ok(StoredReceipt {
            path: Self::public_path(&filename),
            filename,
            original_name: original_name.to_string(),
        })
    }

    /// Resolve a filename the user owns to its path on disk
    ///
    /// Fails with `Forbidden` when the name belongs to someone else,
    /// `InvalidData` when it could escape the directory, and `NotFound`
    /// when no such file exists.
    pub fn owned_file(&self, user_id: i64, filename: &str) -> Result<PathBuf> {
        if filename.contains('/') || filename.contains('\\') || filename.contains("..") {
            return Err(Error::invalid("Invalid filename"));
        }
        if !filename.starts_with(&Self::owner_prefix(user_id)) {
            return Err(Error::Forbidden("Unauthorized".to_string()));
        }

        let path = self.dir.join(filename);
        if !path.is_file() {
            return Err(Error::NotFound("File not found".to_string()));
        }
        Ok(path)
    }

    /// Delete a receipt the user owns
    pub fn delete(&self, user_id: i64, filename: &str) -> Result<()> {
        let path = self.owned_file(user_id, filename)?;
        std::fs::remove_file(&path)?;
        debug!("Deleted receipt {}", filename);
        Ok(())
    }

    /// MIME type for a stored receipt, from its extension
    pub fn content_type(filename: &str) -> &'static str {
        let ext = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("png") => "image/png",
            Some("gif") => "image/gif",
            Some("webp") => "image/webp",
            _ => "image/jpeg",
        }
    }

    fn owner_prefix(user_id: i64) -> String {
        format!("receipt-{}-", user_id)
    }
}

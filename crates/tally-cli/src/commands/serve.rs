//! Server command implementation

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tally_server::{ServerConfig, API_KEYS_ENV, UPLOAD_DIR_ENV};

use super::open_db;

/// Receipt directory used when neither the flag nor the env var is set
const DEFAULT_UPLOAD_DIR: &str = "uploads";

/// Pick the receipt directory: flag, then environment, then the default
pub fn resolve_upload_dir(flag: Option<PathBuf>, env_value: Option<String>) -> PathBuf {
    flag.or_else(|| env_value.filter(|s| !s.trim().is_empty()).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_UPLOAD_DIR))
}

pub async fn cmd_serve(
    db_path: &Path,
    host: &str,
    port: u16,
    no_auth: bool,
    no_encrypt: bool,
    static_dir: Option<&Path>,
    upload_dir: Option<PathBuf>,
) -> Result<()> {
    let upload_dir = resolve_upload_dir(upload_dir, std::env::var(UPLOAD_DIR_ENV).ok());

    println!("🚀 Starting Tally web server...");
    println!("   Database: {}", db_path.display());
    println!("   Listening: http://{}:{}", host, port);
    println!("   Receipts: {}", upload_dir.display());
    if let Some(dir) = static_dir {
        println!("   Static files: {}", dir.display());
    }

    // Parse API keys from environment (email=key, comma-separated)
    let api_keys = tally_server::parse_api_keys(&std::env::var(API_KEYS_ENV).unwrap_or_default());

    if no_auth {
        println!();
        println!("   ⚠️  Authentication DISABLED - requests without identity act as local-dev");
    } else {
        println!("   🔒 Authentication: Cloudflare Access header");
        if !api_keys.is_empty() {
            println!(
                "   🔑 API keys: {} configured ({})",
                api_keys.len(),
                API_KEYS_ENV
            );
        }
    }
    if no_encrypt {
        println!("   ⚠️  Encryption DISABLED (--no-encrypt)");
    }
    println!();
    println!("   Press Ctrl+C to stop");

    let db = open_db(db_path, no_encrypt)?;

    std::fs::create_dir_all(&upload_dir).with_context(|| {
        format!(
            "Failed to create upload directory {}",
            upload_dir.display()
        )
    })?;

    let config = ServerConfig {
        require_auth: !no_auth,
        allowed_origins: vec![],
        api_keys,
        upload_dir,
    };

    let static_dir_str = match static_dir {
        Some(p) => Some(
            p.to_str()
                .with_context(|| format!("Static dir is not valid UTF-8: {}", p.display()))?,
        ),
        None => None,
    };
    tally_server::serve_with_config(db, host, port, static_dir_str, config).await?;

    Ok(())
}

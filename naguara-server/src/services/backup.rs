//! Database backup files
//!
//! Backups are plain `pg_dump` SQL files named `naguara_backup_<timestamp>.sql`
//! inside the configured backup directory. Every operation that takes a
//! file name validates it first, so requests can never reach outside the
//! directory.

use std::path::PathBuf;
use std::process::Stdio;

use chrono::{DateTime, TimeDelta, Utc};
use shared::error::{AppError, ErrorCode};
use shared::models::BackupInfo;
use tokio::fs;
use tokio::process::Command;

use crate::config::Config;
use crate::error::ServiceResult;

pub const BACKUP_PREFIX: &str = "naguara_backup_";
pub const BACKUP_EXTENSION: &str = ".sql";

/// Names tried per backup before giving up on a free one
const RESERVE_ATTEMPTS: i64 = 50;

/// Backup file name for a point in time, to the millisecond
pub fn backup_filename(at: DateTime<Utc>) -> String {
    format!("{BACKUP_PREFIX}{}{BACKUP_EXTENSION}", at.format("%Y-%m-%dT%H-%M-%S-%3f"))
}

/// Accept only `naguara_backup_<stamp>.sql` with a `[A-Za-z0-9_-]` stamp.
pub fn validate_filename(filename: &str) -> Result<(), AppError> {
    let stamp = filename
        .strip_prefix(BACKUP_PREFIX)
        .and_then(|rest| rest.strip_suffix(BACKUP_EXTENSION));
    let valid = matches!(stamp, Some(s) if !s.is_empty()
        && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    if valid {
        Ok(())
    } else {
        Err(AppError::new(ErrorCode::BackupInvalidName).with_detail("filename", filename))
    }
}

/// Backup directory manager
#[derive(Debug, Clone)]
pub struct BackupService {
    dir: PathBuf,
    pg_dump: String,
    database_url: String,
}

impl BackupService {
    pub fn new(
        dir: impl Into<PathBuf>,
        pg_dump: impl Into<String>,
        database_url: impl Into<String>,
    ) -> Self {
        Self {
            dir: dir.into(),
            pg_dump: pg_dump.into(),
            database_url: database_url.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.backup_dir, &config.pg_dump_path, &config.database_url)
    }

    /// Backup files, newest first. A missing directory lists as empty.
    pub async fn list(&self) -> ServiceResult<Vec<BackupInfo>> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut backups = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let Some(filename) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if validate_filename(&filename).is_err() {
                continue;
            }
            let metadata = entry.metadata().await?;
            if metadata.is_file() {
                backups.push(info(filename, &metadata));
            }
        }

        backups.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.filename.cmp(&a.filename))
        });
        Ok(backups)
    }

    /// Dump the database into a new backup file.
    pub async fn create(&self) -> ServiceResult<BackupInfo> {
        let (filename, path) = self.reserve(Utc::now()).await?;

        let output = Command::new(&self.pg_dump)
            .arg("--dbname")
            .arg(&self.database_url)
            .arg("--no-owner")
            .arg("--file")
            .arg(&path)
            .stdin(Stdio::null())
            .output()
            .await;

        let motivo = match output {
            Ok(output) if output.status.success() => None,
            Ok(output) => {
                let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
                tracing::error!(status = %output.status, stderr = %stderr, "pg_dump failed");
                Some(stderr)
            }
            Err(e) => {
                tracing::error!(pg_dump = %self.pg_dump, error = %e, "Failed to run pg_dump");
                Some(e.to_string())
            }
        };
        if let Some(motivo) = motivo {
            if let Err(e) = fs::remove_file(&path).await {
                tracing::debug!(error = %e, "No partial backup to remove");
            }
            return Err(AppError::new(ErrorCode::BackupFailed)
                .with_detail("motivo", motivo)
                .into());
        }

        let metadata = fs::metadata(&path).await?;
        tracing::info!(filename = %filename, size = metadata.len(), "Backup created");
        Ok(info(filename, &metadata))
    }

    /// Create an empty file under a name no other backup holds.
    ///
    /// Names collide only within the same millisecond; the next free
    /// millisecond is taken and existing files are never reopened.
    async fn reserve(&self, at: DateTime<Utc>) -> ServiceResult<(String, PathBuf)> {
        fs::create_dir_all(&self.dir).await?;
        for step in 0..RESERVE_ATTEMPTS {
            let filename = backup_filename(at + TimeDelta::milliseconds(step));
            let path = self.dir.join(&filename);
            match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(_) => return Ok((filename, path)),
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Err(AppError::new(ErrorCode::BackupFailed)
            .with_detail("motivo", "No hay nombre de backup disponible")
            .into())
    }

    /// Path of an existing backup file
    pub async fn path(&self, filename: &str) -> ServiceResult<PathBuf> {
        validate_filename(filename)?;
        let path = self.dir.join(filename);
        match fs::metadata(&path).await {
            Ok(metadata) if metadata.is_file() => Ok(path),
            Ok(_) => Err(AppError::new(ErrorCode::BackupNotFound).into()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(AppError::new(ErrorCode::BackupNotFound).into())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn delete(&self, filename: &str) -> ServiceResult<()> {
        let path = self.path(filename).await?;
        fs::remove_file(&path).await?;
        tracing::info!(filename = %filename, "Backup deleted");
        Ok(())
    }
}

fn info(filename: String, metadata: &std::fs::Metadata) -> BackupInfo {
    let created_at = metadata
        .modified()
        .map(DateTime::<Utc>::from)
        .unwrap_or_else(|_| Utc::now());
    BackupInfo {
        filename,
        size: metadata.len(),
        created_at,
    }
}

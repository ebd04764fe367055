//! Backup file listing

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One backup file in the backup directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupInfo {
    pub filename: String,
    pub size: u64,
    pub created_at: DateTime<Utc>,
}

/// `POST /api/backup/create` response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupCreado {
    pub message: String,
    pub backup: BackupInfo,
}

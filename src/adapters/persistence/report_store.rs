//! Persists bulk message reports as JSON files under `<data_dir>/reports`.
//!
//! One file per send: `bulk_<UTC timestamp>.json`. Written with the
//! temp-file + fsync + rename pattern so a crash never leaves half a report.

use crate::domain::{BulkMessageReport, DomainError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::info;

/// A report together with the request that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredReport {
    pub created_at: DateTime<Utc>,
    pub recipient_groups: Vec<String>,
    pub message_template: String,
    pub report: BulkMessageReport,
}

/// Directory of saved reports.
pub struct ReportStore {
    dir: PathBuf,
}

impl ReportStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Save a report. Returns the written path.
    pub async fn save(&self, stored: &StoredReport) -> Result<PathBuf, DomainError> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| DomainError::Repo(format!("create reports dir: {}", e)))?;

        let filename = format!(
            "bulk_{}.json",
            stored.created_at.format("%Y%m%dT%H%M%S%.3fZ")
        );
        let path = self.dir.join(filename);
        let json =
            serde_json::to_string_pretty(stored).map_err(|e| DomainError::Repo(e.to_string()))?;

        let temp_path = path.with_extension("json.tmp");
        let mut f = fs::File::create(&temp_path)
            .await
            .map_err(|e| DomainError::Repo(format!("create temp file: {}", e)))?;
        f.write_all(json.as_bytes())
            .await
            .map_err(|e| DomainError::Repo(format!("write temp file: {}", e)))?;
        f.sync_all()
            .await
            .map_err(|e| DomainError::Repo(format!("sync temp file: {}", e)))?;
        drop(f);

        fs::rename(&temp_path, &path)
            .await
            .map_err(|e| DomainError::Repo(format!("atomic rename failed: {}", e)))?;

        info!(path = %path.display(), "bulk message report saved");
        Ok(path)
    }

    /// Most recent saved report, if any. File names sort chronologically.
    pub async fn latest(&self) -> Result<Option<StoredReport>, DomainError> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(DomainError::Repo(e.to_string())),
        };

        let mut newest: Option<PathBuf> = None;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| DomainError::Repo(e.to_string()))?
        {
            let path = entry.path();
            let is_report = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("bulk_") && n.ends_with(".json"));
            if is_report && newest.as_ref().is_none_or(|cur| path > *cur) {
                newest = Some(path);
            }
        }

        let Some(path) = newest else {
            return Ok(None);
        };
        let data = fs::read_to_string(&path)
            .await
            .map_err(|e| DomainError::Repo(format!("read {}: {}", path.display(), e)))?;
        serde_json::from_str(&data)
            .map(Some)
            .map_err(|e| DomainError::Repo(format!("parse {}: {}", path.display(), e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn stored(secs: i64, failed_user: &str) -> StoredReport {
        let mut report = BulkMessageReport::new();
        report.record_sent("1", "Alice");
        report.record_recipient_failure(failed_user, "Bob", "provider down");
        StoredReport {
            created_at: Utc.timestamp_opt(secs, 0).unwrap(),
            recipient_groups: vec!["all".into()],
            message_template: "Hi {{name}}".into(),
            report,
        }
    }

    #[tokio::test]
    async fn test_save_and_latest() {
        let dir = tempfile::tempdir().unwrap();
        let store = ReportStore::new(dir.path().join("reports"));
        assert!(store.latest().await.unwrap().is_none());

        let older = store.save(&stored(1_700_000_000, "2")).await.unwrap();
        let newer = store.save(&stored(1_700_000_100, "3")).await.unwrap();
        assert!(older.exists());
        assert!(newer.exists());
        assert!(!newer.with_extension("json.tmp").exists());

        let latest = store.latest().await.unwrap().unwrap();
        assert_eq!(latest, stored(1_700_000_100, "3"));
        assert_eq!(latest.report.retry_groups(), vec!["user:3"]);
    }
}

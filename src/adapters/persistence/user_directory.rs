//! Implements UserService over a users export (JSON array or CSV).
//!
//! The file is loaded once into an in-memory cache; `reload` picks up edits.
//! CSV header: `_id,name,phone,email,team,join_date` (empty cells = absent).

use crate::domain::{DomainError, User};
use crate::ports::UserService;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::RwLock;
use tracing::info;

/// File-backed, read-only user directory.
pub struct UserDirectory {
    path: Option<PathBuf>,
    cache: RwLock<Vec<User>>,
}

impl UserDirectory {
    /// In-memory directory with a fixed user list.
    pub fn from_users(users: Vec<User>) -> Self {
        Self {
            path: None,
            cache: RwLock::new(users),
        }
    }

    /// Open and load a users file. `.csv` is parsed as CSV, anything else as JSON.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, DomainError> {
        let dir = Self {
            path: Some(path.as_ref().to_path_buf()),
            cache: RwLock::new(Vec::new()),
        };
        dir.reload().await?;
        Ok(dir)
    }

    /// Re-read the backing file. No-op for in-memory directories.
    pub async fn reload(&self) -> Result<(), DomainError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let bytes = fs::read(path)
            .await
            .map_err(|e| DomainError::UserLookup(format!("read {}: {}", path.display(), e)))?;

        let is_csv = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        let users = if is_csv {
            parse_csv(&bytes)?
        } else {
            serde_json::from_slice::<Vec<User>>(&bytes)
                .map_err(|e| DomainError::UserLookup(format!("parse {}: {}", path.display(), e)))?
        };

        info!(path = %path.display(), users = users.len(), "user directory loaded");
        *self.cache.write().await = users;
        Ok(())
    }

    /// Distinct team names, sorted. Used to offer `team:<name>` groups.
    pub async fn teams(&self) -> Vec<String> {
        let cache = self.cache.read().await;
        let mut teams: BTreeMap<String, &str> = BTreeMap::new();
        for team in cache
            .iter()
            .filter_map(|u| u.team.as_deref())
            .map(str::trim)
            .filter(|t| !t.is_empty())
        {
            // team:<name> matches case-insensitively; keep the first spelling seen
            teams.entry(team.to_ascii_lowercase()).or_insert(team);
        }
        teams.into_values().map(str::to_string).collect()
    }
}

/// Parse a CSV users export using the `csv` crate.
pub fn parse_csv(bytes: &[u8]) -> Result<Vec<User>, DomainError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);
    rdr.deserialize::<User>()
        .enumerate()
        .map(|(i, row)| {
            row.map_err(|e| DomainError::UserLookup(format!("CSV row {}: {}", i + 1, e)))
        })
        .collect()
}

#[async_trait::async_trait]
impl UserService for UserDirectory {
    async fn all_users(&self) -> Result<Vec<User>, DomainError> {
        Ok(self.cache.read().await.clone())
    }

    async fn users_in_team(&self, team: &str) -> Result<Vec<User>, DomainError> {
        let team = team.trim();
        let cache = self.cache.read().await;
        Ok(cache
            .iter()
            .filter(|u| {
                u.team
                    .as_deref()
                    .is_some_and(|t| t.trim().eq_ignore_ascii_case(team))
            })
            .cloned()
            .collect())
    }

    async fn find_user(&self, id: &str) -> Result<Option<User>, DomainError> {
        let cache = self.cache.read().await;
        Ok(cache.iter().find(|u| u.id == id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const CSV: &str = "\
_id,name,phone,email,team,join_date
1,Alice Njeri,+254700000001,alice@example.com,Ops,2021-05-01
2,Bob Kamau,+254700000002,,ops,
3,Carol Akinyi,+254700000003,,Finance,2019-11-20
";

    #[test]
    fn test_parse_csv() {
        let users = parse_csv(CSV.as_bytes()).unwrap();
        assert_eq!(users.len(), 3);
        assert_eq!(users[0].id, "1");
        assert_eq!(users[0].join_date, NaiveDate::from_ymd_opt(2021, 5, 1));
        assert_eq!(users[1].email, None);
        assert_eq!(users[1].join_date, None);
    }

    #[test]
    fn test_parse_csv_bad_date() {
        let bad = "_id,name,phone,email,team,join_date\n1,A,+2547,,Ops,yesterday\n";
        assert!(matches!(
            parse_csv(bad.as_bytes()),
            Err(DomainError::UserLookup(_))
        ));
    }

    #[tokio::test]
    async fn test_open_csv_and_lookup() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.csv");
        tokio::fs::write(&path, CSV).await.unwrap();

        let users = UserDirectory::open(&path).await.unwrap();
        assert_eq!(users.all_users().await.unwrap().len(), 3);
        assert_eq!(users.users_in_team("OPS").await.unwrap().len(), 2);
        assert_eq!(users.teams().await, vec!["Finance", "Ops"]);
        assert_eq!(
            users.find_user("3").await.unwrap().map(|u| u.name),
            Some("Carol Akinyi".to_string())
        );
        assert!(users.find_user("42").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_open_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.json");
        let json = r#"[{"_id":"a1","name":"Dan","phone":"+254700000004","team":"Ops"}]"#;
        tokio::fs::write(&path, json).await.unwrap();

        let users = UserDirectory::open(&path).await.unwrap();
        let all = users.all_users().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, "a1");
        assert_eq!(all[0].email, None);
    }

    #[tokio::test]
    async fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let res = UserDirectory::open(dir.path().join("nope.json")).await;
        assert!(matches!(res, Err(DomainError::UserLookup(_))));
    }
}

//! Default recipient resolver: maps group names onto `UserService` lookups.
//!
//! Supported groups:
//! - `all`            every user
//! - `team:<name>`    users of one team (case-insensitive)
//! - `user:<id>`      a single user by `_id`; used to retry failed recipients

use crate::domain::{DomainError, User};
use crate::ports::{RecipientResolver, UserService};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GroupSelector<'a> {
    All,
    Team(&'a str),
    User(&'a str),
}

impl<'a> GroupSelector<'a> {
    fn parse(group: &'a str) -> Option<Self> {
        let group = group.trim();
        if group.eq_ignore_ascii_case("all") {
            return Some(Self::All);
        }
        let (kind, value) = group.split_once(':')?;
        let value = value.trim();
        if value.is_empty() {
            return None;
        }
        match kind.trim().to_ascii_lowercase().as_str() {
            "team" => Some(Self::Team(value)),
            "user" => Some(Self::User(value)),
            _ => None,
        }
    }
}

/// Resolves `all` / `team:<name>` / `user:<id>` through a [`UserService`].
pub struct UserGroupResolver {
    users: Arc<dyn UserService>,
}

impl UserGroupResolver {
    pub fn new(users: Arc<dyn UserService>) -> Self {
        Self { users }
    }
}

#[async_trait::async_trait]
impl RecipientResolver for UserGroupResolver {
    fn can_resolve(&self, group: &str) -> bool {
        GroupSelector::parse(group).is_some()
    }

    async fn resolve(&self, group: &str) -> Result<Vec<User>, DomainError> {
        let resolution_error = |reason: String| DomainError::Resolution {
            group: group.to_string(),
            reason,
        };

        let selector = GroupSelector::parse(group)
            .ok_or_else(|| resolution_error("unknown recipient group".into()))?;

        let users = match selector {
            GroupSelector::All => self.users.all_users().await,
            GroupSelector::Team(team) => self.users.users_in_team(team).await,
            GroupSelector::User(id) => match self.users.find_user(id).await {
                Ok(Some(user)) => Ok(vec![user]),
                Ok(None) => return Err(resolution_error(format!("no user with id '{}'", id))),
                Err(e) => Err(e),
            },
        }
        .map_err(|e| resolution_error(e.to_string()))?;

        let mut seen = HashSet::new();
        let users: Vec<User> = users
            .into_iter()
            .filter(|u| seen.insert(u.id.clone()))
            .collect();

        debug!(group, count = users.len(), "recipient group resolved");
        Ok(users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::persistence::UserDirectory;

    fn user(id: &str, name: &str, team: Option<&str>) -> User {
        User {
            id: id.into(),
            name: name.into(),
            phone: format!("+2547000000{}", id),
            email: None,
            team: team.map(str::to_string),
            join_date: None,
        }
    }

    fn resolver() -> UserGroupResolver {
        let directory = UserDirectory::from_users(vec![
            user("1", "Alice", Some("Ops")),
            user("2", "Bob", Some("ops")),
            user("3", "Carol", Some("Finance")),
            user("4", "Dan", None),
        ]);
        UserGroupResolver::new(Arc::new(directory))
    }

    #[test]
    fn test_can_resolve() {
        let r = resolver();
        assert!(r.can_resolve("all"));
        assert!(r.can_resolve(" ALL "));
        assert!(r.can_resolve("team:Ops"));
        assert!(r.can_resolve("user:42"));
        assert!(!r.can_resolve("team:"));
        assert!(!r.can_resolve("nonexistent-group"));
        assert!(!r.can_resolve("region:north"));
        assert!(!r.can_resolve(""));
    }

    #[tokio::test]
    async fn test_resolve_all_and_team() {
        let r = resolver();
        assert_eq!(r.resolve("all").await.unwrap().len(), 4);

        let ops: Vec<String> = r
            .resolve("team:OPS")
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.id)
            .collect();
        assert_eq!(ops, vec!["1", "2"]);
    }

    #[tokio::test]
    async fn test_empty_team_is_not_an_error() {
        let r = resolver();
        assert!(r.resolve("team:Marketing").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_user_group() {
        let r = resolver();
        let found = r.resolve("user:3").await.unwrap();
        assert_eq!(found[0].name, "Carol");

        let missing = r.resolve("user:99").await;
        assert!(matches!(missing, Err(DomainError::Resolution { .. })));
    }

    #[tokio::test]
    async fn test_unknown_group_fails() {
        let r = resolver();
        let err = r.resolve("nonexistent-group").await.unwrap_err();
        match err {
            DomainError::Resolution { group, .. } => assert_eq!(group, "nonexistent-group"),
            other => panic!("unexpected error: {other}"),
        }
    }
}

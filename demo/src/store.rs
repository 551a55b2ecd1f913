use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use uuid::Uuid;

use crate::error::{DemoError, Result};

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub age: u8,
    pub created_at: DateTime<Utc>,
    #[serde(skip)]
    password_hash: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub token: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// In-memory users and sessions.
#[derive(Clone)]
pub struct UserStore {
    // username -> user
    users: Arc<DashMap<String, User>>,
    // token -> session
    sessions: Arc<DashMap<String, Session>>,
    bcrypt_cost: u32,
}

impl UserStore {
    pub fn new(bcrypt_cost: u32) -> Self {
        Self {
            users: Arc::new(DashMap::new()),
            sessions: Arc::new(DashMap::new()),
            bcrypt_cost,
        }
    }

    pub fn create(&self, username: &str, email: &str, age: u8, password: &str) -> Result<User> {
        let password_hash = bcrypt::hash(password, self.bcrypt_cost)?;

        let entry = match self.users.entry(username.to_string()) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                return Err(DemoError::UsernameTaken(username.to_string()));
            }
            dashmap::mapref::entry::Entry::Vacant(entry) => entry,
        };

        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: email.to_string(),
            age,
            created_at: Utc::now(),
            password_hash,
        };
        entry.insert(user.clone());

        log::info!(user_id = user.id.to_string().as_str(); "Created user {}", user.username);
        Ok(user)
    }

    /// Users whose username contains `query`, ordered by username.
    pub fn search(&self, query: &str, limit: usize) -> Vec<User> {
        let query = query.to_lowercase();
        let mut found: Vec<User> = self
            .users
            .iter()
            .filter(|entry| entry.key().to_lowercase().contains(&query))
            .map(|entry| entry.value().clone())
            .collect();

        found.sort_by(|a, b| a.username.cmp(&b.username));
        found.truncate(limit);
        found
    }

    pub fn login(&self, username: &str, password: &str) -> Result<Session> {
        let password_hash = self
            .users
            .get(username)
            .map(|user| (user.id, user.password_hash.clone()));

        let Some((user_id, password_hash)) = password_hash else {
            log::warn!("Failed login attempt for unknown user: {}", username);
            return Err(DemoError::InvalidCredentials);
        };

        if !bcrypt::verify(password, &password_hash)? {
            log::warn!("Failed login attempt for user: {}", username);
            return Err(DemoError::InvalidCredentials);
        }

        let session = Session {
            token: Uuid::new_v4().to_string(),
            user_id,
            created_at: Utc::now(),
        };
        self.sessions.insert(session.token.clone(), session.clone());
        Ok(session)
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> UserStore {
        UserStore::new(4)
    }

    #[test]
    fn test_create_and_duplicate() {
        let store = store();
        let user = store.create("ada", "ada@example.com", 36, "correct-horse").unwrap();
        assert_eq!(user.username, "ada");
        assert_eq!(store.user_count(), 1);

        let err = store.create("ada", "other@example.com", 40, "battery-staple").unwrap_err();
        assert!(matches!(err, DemoError::UsernameTaken(name) if name == "ada"));
        assert_eq!(store.user_count(), 1);
    }

    #[test]
    fn test_password_hash_is_not_serialized() {
        let user = store().create("ada", "ada@example.com", 36, "correct-horse").unwrap();
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["email"], "ada@example.com");
    }

    #[test]
    fn test_search_is_sorted_and_limited() {
        let store = store();
        for name in ["carol", "alice", "bob", "alina"] {
            store.create(name, &format!("{name}@example.com"), 30, "password1").unwrap();
        }

        let names: Vec<String> = store.search("AL", 10).into_iter().map(|u| u.username).collect();
        assert_eq!(names, ["alice", "alina"]);

        assert_eq!(store.search("", 2).len(), 2);
    }

    #[test]
    fn test_login() {
        let store = store();
        store.create("ada", "ada@example.com", 36, "correct-horse").unwrap();

        let session = store.login("ada", "correct-horse").unwrap();
        assert!(!session.token.is_empty());
        assert_eq!(store.session_count(), 1);

        assert!(matches!(store.login("ada", "wrong"), Err(DemoError::InvalidCredentials)));
        assert!(matches!(store.login("bob", "whatever"), Err(DemoError::InvalidCredentials)));
    }
}

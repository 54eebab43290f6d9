use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{NewUser, StoreError, User, UserStore};

/// Process-local store for tests and `--in-memory` runs.
///
/// Uniqueness is checked and the row appended under one write lock, so
/// concurrent sign-ups with the same email cannot both succeed.
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: RwLock<Vec<User>>,
}

impl MemoryUserStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|user| user.email == email).cloned())
    }

    async fn insert(&self, user: NewUser) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        if users.iter().any(|existing| existing.email == user.email) {
            return Err(StoreError::EmailInUse);
        }

        let user = User {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn list_all(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.users.read().await.clone())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn new_user(name: &str, email: &str) -> NewUser {
        NewUser {
            name: name.to_string(),
            email: email.to_string(),
            password_hash: "$argon2id$stub".to_string(),
        }
    }

    #[tokio::test]
    async fn insert_then_find() -> Result<(), StoreError> {
        let store = MemoryUserStore::new();
        let inserted = store.insert(new_user("Bob", "bob@mail.com")).await?;

        let found = store.find_by_email("bob@mail.com").await?;
        assert_eq!(found, Some(inserted));
        assert_eq!(store.find_by_email("rob@mail.com").await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn duplicate_email_rejected() -> Result<(), StoreError> {
        let store = MemoryUserStore::new();
        store.insert(new_user("Bob", "bob@mail.com")).await?;

        let result = store.insert(new_user("Robert", "bob@mail.com")).await;
        assert!(matches!(result, Err(StoreError::EmailInUse)));
        assert_eq!(store.list_all().await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn list_keeps_insertion_order() -> Result<(), StoreError> {
        let store = MemoryUserStore::new();
        for (name, email) in [
            ("Bob", "bob@mail.com"),
            ("Rob", "rob@mail.com"),
            ("Sam", "sam@mail.com"),
        ] {
            store.insert(new_user(name, email)).await?;
        }

        let names: Vec<String> = store.list_all().await?.into_iter().map(|u| u.name).collect();
        assert_eq!(names, ["Bob", "Rob", "Sam"]);
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_inserts_of_same_email_admit_one() -> Result<(), StoreError> {
        let store = Arc::new(MemoryUserStore::new());
        let mut handles = Vec::new();
        for i in 0..16 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.insert(new_user(&format!("user-{i}"), "race@mail.com")).await
            }));
        }

        let mut admitted = 0;
        for handle in handles {
            match handle.await {
                Ok(Ok(_)) => admitted += 1,
                Ok(Err(StoreError::EmailInUse)) => {}
                Ok(Err(err)) => return Err(err),
                Err(err) => panic!("insert task panicked: {err}"),
            }
        }
        assert_eq!(admitted, 1);
        Ok(())
    }

    #[tokio::test]
    async fn ping_is_ok() {
        assert!(MemoryUserStore::new().ping().await.is_ok());
    }
}

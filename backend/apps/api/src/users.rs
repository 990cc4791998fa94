//! In-memory user list

use std::sync::Arc;

use kernel::error::app_error::{AppError, AppResult};
use kernel::error::category::ErrorCategory;
use tokio::sync::RwLock;

const MAX_NAME_CHARS: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Default)]
struct Inner {
    next_id: u64,
    users: Vec<User>,
}

#[derive(Debug, Clone, Default)]
pub struct UserStore {
    inner: Arc<RwLock<Inner>>,
}

impl UserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn list(&self) -> Vec<User> {
        self.inner.read().await.users.clone()
    }

    pub async fn create(&self, name: &str) -> AppResult<User> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::unprocessable("name is required")
                .with_category(ErrorCategory::Validation)
                .with_action("Enter a name and submit again"));
        }
        if name.chars().count() > MAX_NAME_CHARS {
            return Err(AppError::unprocessable(format!(
                "name must be at most {MAX_NAME_CHARS} characters"
            ))
            .with_category(ErrorCategory::Validation));
        }

        let mut inner = self.inner.write().await;
        inner.next_id += 1;
        let user = User {
            id: inner.next_id,
            name: name.to_string(),
        };
        inner.users.push(user.clone());
        Ok(user)
    }

    pub async fn delete(&self, id: u64) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        let before = inner.users.len();
        inner.users.retain(|u| u.id != id);
        if inner.users.len() == before {
            return Err(AppError::not_found(format!("user {id} not found")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kernel::error::kind::ErrorKind;

    #[tokio::test]
    async fn test_create_list_delete() {
        let store = UserStore::new();
        let alice = store.create("  alice ").await.unwrap();
        let bob = store.create("bob").await.unwrap();

        assert_eq!(alice.name, "alice");
        assert_ne!(alice.id, bob.id);
        assert_eq!(store.list().await.len(), 2);

        store.delete(alice.id).await.unwrap();
        assert_eq!(store.list().await, vec![bob]);

        let err = store.delete(alice.id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_rejects_invalid_names() {
        let store = UserStore::new();

        let err = store.create("   ").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnprocessableEntity);
        assert_eq!(err.category(), ErrorCategory::Validation);

        assert!(store.create(&"x".repeat(65)).await.is_err());
        assert!(store.list().await.is_empty());
    }
}

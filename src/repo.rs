use async_trait::async_trait;

use crate::models::UserRecord;

#[derive(thiserror::Error, Debug)]
pub enum RepoError {
    #[error("not found")] NotFound,
    #[error("conflict")] Conflict,
}

pub type RepoResult<T> = Result<T, RepoError>;

/// Credential store. Usernames are unique and immutable once inserted;
/// records are never removed.
#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn create_user(&self, user: UserRecord) -> RepoResult<UserRecord>;
    async fn get_user(&self, username: &str) -> Option<UserRecord>;
    async fn set_notion_token(&self, username: &str, token: String) -> RepoResult<()>;
}

/// Process-lifetime store. Nothing survives a restart.
pub mod inmem {
    use super::*;
    use dashmap::mapref::entry::Entry;
    use dashmap::DashMap;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    pub struct InMemUserRepo {
        users: Arc<DashMap<String, UserRecord>>,
    }

    impl InMemUserRepo {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn len(&self) -> usize {
            self.users.len()
        }

        pub fn is_empty(&self) -> bool {
            self.users.is_empty()
        }
    }

    #[async_trait]
    impl UserRepo for InMemUserRepo {
        async fn create_user(&self, user: UserRecord) -> RepoResult<UserRecord> {
            // entry() holds the shard lock, so check-and-insert is atomic per key
            match self.users.entry(user.username.clone()) {
                Entry::Occupied(_) => Err(RepoError::Conflict),
                Entry::Vacant(slot) => {
                    slot.insert(user.clone());
                    Ok(user)
                }
            }
        }

        async fn get_user(&self, username: &str) -> Option<UserRecord> {
            self.users.get(username).map(|r| r.value().clone())
        }

        async fn set_notion_token(&self, username: &str, token: String) -> RepoResult<()> {
            let mut rec = self.users.get_mut(username).ok_or(RepoError::NotFound)?;
            rec.notion_api_token = Some(token);
            Ok(())
        }
    }

}

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::errors::TransientError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserInfo {
    pub id: String,
    pub is_bot: bool,
}

/// Resolves a user id to the user's profile. May be slow and may fail.
#[async_trait]
pub trait UserInfoFinder: Send + Sync {
    async fn get_user_info(&self, user_id: &str) -> Result<UserInfo, TransientError>;
}

/// User profiles learned from the event stream.
///
/// Slack marks bot-authored events with a `bot_id`, so every event the host sees teaches the
/// directory whether its author is a bot. Unknown users are reported as lookup failures.
#[derive(Default)]
pub struct InMemoryUserDirectory {
    users: RwLock<HashMap<String, UserInfo>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn record(&self, user: UserInfo) {
        let mut users = self.users.write().await;
        match users.get_mut(&user.id) {
            // once seen as a bot, stay a bot
            Some(existing) => existing.is_bot |= user.is_bot,
            None => {
                users.insert(user.id.clone(), user);
            }
        }
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl UserInfoFinder for InMemoryUserDirectory {
    async fn get_user_info(&self, user_id: &str) -> Result<UserInfo, TransientError> {
        self.users.read().await.get(user_id).cloned().ok_or_else(|| TransientError::UserLookup {
            user_id: user_id.to_owned(),
            reason: "user has not been seen yet".to_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::errors::TransientError;
    use crate::users::{InMemoryUserDirectory, UserInfo, UserInfoFinder};

    #[tokio::test]
    async fn unknown_user_is_a_lookup_failure() {
        let directory = InMemoryUserDirectory::new();

        let error = directory.get_user_info("U404").await.expect_err("lookup should fail");
        assert!(matches!(
            error,
            TransientError::UserLookup { ref user_id, .. } if user_id == "U404"
        ));
    }

    #[tokio::test]
    async fn recorded_users_are_returned() {
        let directory = InMemoryUserDirectory::new();
        directory.record(UserInfo { id: "U1".to_owned(), is_bot: false }).await;
        directory.record(UserInfo { id: "B1".to_owned(), is_bot: true }).await;

        assert!(!directory.get_user_info("U1").await.expect("known user").is_bot);
        assert!(directory.get_user_info("B1").await.expect("known bot").is_bot);
        assert_eq!(directory.len().await, 2);
    }

    #[tokio::test]
    async fn bot_flag_is_sticky() {
        let directory = InMemoryUserDirectory::new();
        directory.record(UserInfo { id: "B1".to_owned(), is_bot: true }).await;
        directory.record(UserInfo { id: "B1".to_owned(), is_bot: false }).await;

        assert!(directory.get_user_info("B1").await.expect("known bot").is_bot);
    }
}

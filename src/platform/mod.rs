pub mod telegram;

use anyhow::Result;
use async_trait::async_trait;
use teloxide::types::{ChatId, UserId};

/// A text message received from the platform
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    pub chat_id: ChatId,
    /// Absent for channel posts
    pub user_id: Option<UserId>,
    /// `@username` if set, otherwise the first name
    pub user_name: String,
    pub text: String,
}

/// A change to some user's membership in a chat
#[derive(Debug, Clone)]
pub struct MembershipChange {
    pub chat_id: ChatId,
    pub user_id: UserId,
    pub role: MemberRole,
}

/// A user's membership role in a chat, as reported by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberRole {
    Creator,
    Administrator,
    Member,
    Restricted,
    Left,
    Kicked,
}

impl MemberRole {
    pub fn is_admin(self) -> bool {
        matches!(self, MemberRole::Creator | MemberRole::Administrator)
    }

    /// Whether this role means the user is no longer in the chat
    pub fn is_gone(self) -> bool {
        matches!(self, MemberRole::Left | MemberRole::Kicked)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MemberRole::Creator => "creator",
            MemberRole::Administrator => "administrator",
            MemberRole::Member => "member",
            MemberRole::Restricted => "restricted",
            MemberRole::Left => "left",
            MemberRole::Kicked => "kicked",
        }
    }
}

impl std::fmt::Display for MemberRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The outbound calls the bot makes against the messaging platform
#[async_trait]
pub trait ChatPlatform: Send + Sync {
    async fn send_message(&self, chat_id: ChatId, text: &str) -> Result<()>;

    /// Succeeds iff the chat is visible to the bot
    async fn get_chat(&self, chat_id: ChatId) -> Result<()>;

    async fn get_chat_member(&self, chat_id: ChatId, user_id: UserId) -> Result<MemberRole>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_roles() {
        assert!(MemberRole::Creator.is_admin());
        assert!(MemberRole::Administrator.is_admin());
        assert!(!MemberRole::Member.is_admin());
        assert!(!MemberRole::Restricted.is_admin());
        assert!(!MemberRole::Left.is_admin());
        assert!(!MemberRole::Kicked.is_admin());
    }

    #[test]
    fn test_gone_roles() {
        assert!(MemberRole::Left.is_gone());
        assert!(MemberRole::Kicked.is_gone());
        assert!(!MemberRole::Member.is_gone());
        assert_eq!(MemberRole::Kicked.to_string(), "kicked");
    }
}

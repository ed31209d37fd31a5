use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use teloxide::types::{ChatId, UserId};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::commands::{self, Command};
use crate::config::{self, Config};
use crate::message_log::MessageLog;
use crate::platform::{ChatPlatform, IncomingMessage, MembershipChange};
use crate::presence::PresenceTracker;

/// The bot's own account, as returned by `getMe`
#[derive(Debug, Clone)]
pub struct BotIdentity {
    pub user_id: UserId,
    pub username: String,
}

/// Shared application state
pub struct AppState {
    platform: Arc<dyn ChatPlatform>,
    config: Config,
    identity: BotIdentity,
    presence: Mutex<PresenceTracker>,
    message_log: MessageLog,
}

impl AppState {
    pub fn new(config: Config, platform: Arc<dyn ChatPlatform>, identity: BotIdentity) -> Self {
        let min_interval = chrono::Duration::seconds(config.presence.min_interval_secs as i64);
        let message_log = MessageLog::new(config.storage.log_directory.clone());
        Self {
            platform,
            config,
            identity,
            presence: Mutex::new(PresenceTracker::new(min_interval)),
            message_log,
        }
    }

    /// Handle an incoming text message. Non-commands are ignored.
    pub async fn handle_message(&self, msg: &IncomingMessage) -> Result<()> {
        let Some(command) = Command::parse(&msg.text, &self.identity.username) else {
            return Ok(());
        };

        info!(
            "Command /{} from {} in chat {}",
            command.name(),
            msg.user_name,
            msg.chat_id
        );

        let reply = self.reply_to(&command, msg).await;
        self.platform
            .send_message(msg.chat_id, &reply)
            .await
            .with_context(|| format!("Failed to reply to /{} in chat {}", command.name(), msg.chat_id))
    }

    async fn reply_to(&self, command: &Command, msg: &IncomingMessage) -> String {
        match command {
            Command::Status => commands::status_reply(Utc::now()),
            Command::Check(arg) => self.check_reply(arg).await.to_string(),
            Command::Save => self.save_reply(msg).await.to_string(),
            Command::Help => commands::HELP.to_string(),
            Command::Unknown(_) => commands::UNKNOWN_COMMAND.to_string(),
        }
    }

    async fn check_reply(&self, arg: &str) -> &'static str {
        if arg.is_empty() {
            return commands::CHECK_USAGE;
        }
        let Some(chat_id) = config::parse_chat_id(arg) else {
            return commands::CHECK_BAD_ID;
        };
        if self.is_present(chat_id).await {
            commands::CHECK_PRESENT
        } else {
            commands::CHECK_ABSENT
        }
    }

    async fn save_reply(&self, msg: &IncomingMessage) -> &'static str {
        let authorized = match msg.user_id {
            Some(user_id) => self.is_admin(msg.chat_id, user_id).await,
            None => false,
        };
        if !authorized {
            return commands::SAVE_DENIED;
        }

        match self
            .message_log
            .append(msg.chat_id, &msg.user_name, &msg.text)
            .await
        {
            Ok(path) => {
                info!("Saved message from {} to {}", msg.user_name, path.display());
                commands::SAVE_OK
            }
            Err(e) => {
                error!("Failed to save message: {:#}", e);
                commands::SAVE_FAILED
            }
        }
    }

    /// Whether the bot can see the chat. Any lookup error counts as absent,
    /// transport failures included.
    pub async fn is_present(&self, chat_id: ChatId) -> bool {
        match self.platform.get_chat(chat_id).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Chat {} lookup failed: {:#}", chat_id, e);
                false
            }
        }
    }

    /// Whether the user is an administrator or the creator of the chat.
    /// Lookup errors deny.
    pub async fn is_admin(&self, chat_id: ChatId, user_id: UserId) -> bool {
        match self.platform.get_chat_member(chat_id, user_id).await {
            Ok(role) => role.is_admin(),
            Err(e) => {
                warn!("Member {} lookup in chat {} failed: {:#}", user_id, chat_id, e);
                false
            }
        }
    }

    /// Run the presence check if at least the minimum interval has passed
    /// since the last one. Returns whether a check ran.
    pub async fn tick(&self, now: DateTime<Utc>) -> bool {
        if !self.presence.lock().await.try_begin(now) {
            return false;
        }
        self.check_presence().await;
        true
    }

    async fn check_presence(&self) {
        let chat_id = match self.config.presence.target_chat_id() {
            Ok(id) => id,
            Err(e) => {
                error!("Skipping presence check: {:#}", e);
                return;
            }
        };

        let present = self.is_present(chat_id).await;
        let changed = self.presence.lock().await.observe(present);
        match changed {
            Some(present) => {
                info!("Presence in chat {} changed to {}", chat_id, present);
                self.notify(present).await;
            }
            None => debug!("Presence in chat {} unchanged ({})", chat_id, present),
        }
    }

    /// Tell the operator the bot was added to or removed from the channel.
    /// Failures are logged only.
    pub async fn notify(&self, present: bool) {
        let chat_id = match self.config.presence.notification_chat_id() {
            Ok(id) => id,
            Err(e) => {
                error!("Skipping notification: {:#}", e);
                return;
            }
        };

        let text = if present {
            commands::NOTIFY_ADDED
        } else {
            commands::NOTIFY_REMOVED
        };

        if let Err(e) = self.platform.send_message(chat_id, text).await {
            error!("Failed to send notification to {}: {:#}", chat_id, e);
        }
    }

    /// React to a membership change reported by the platform. Only changes
    /// to the bot's own membership matter; leaving or being kicked notifies
    /// the operator immediately, without touching the tracked presence.
    pub async fn handle_membership_change(&self, change: &MembershipChange) {
        if change.user_id != self.identity.user_id {
            return;
        }

        info!("Bot status in chat {} changed to: {}", change.chat_id, change.role);

        if change.role.is_gone() {
            self.notify(false).await;
        }
    }
}

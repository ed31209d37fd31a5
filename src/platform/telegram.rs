use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use teloxide::prelude::*;
use teloxide::types::{ChatMemberStatus, ChatMemberUpdated, User};
use tracing::{debug, info};

use crate::bot::AppState;
use crate::platform::{ChatPlatform, IncomingMessage, MemberRole, MembershipChange};

/// `ChatPlatform` backed by the Telegram Bot API
#[derive(Clone)]
pub struct TelegramPlatform {
    bot: Bot,
}

impl TelegramPlatform {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl ChatPlatform for TelegramPlatform {
    async fn send_message(&self, chat_id: ChatId, text: &str) -> Result<()> {
        self.bot
            .send_message(chat_id, text)
            .await
            .with_context(|| format!("sendMessage to {} failed", chat_id))?;
        Ok(())
    }

    async fn get_chat(&self, chat_id: ChatId) -> Result<()> {
        self.bot
            .get_chat(chat_id)
            .await
            .with_context(|| format!("getChat {} failed", chat_id))?;
        Ok(())
    }

    async fn get_chat_member(&self, chat_id: ChatId, user_id: UserId) -> Result<MemberRole> {
        let member = self
            .bot
            .get_chat_member(chat_id, user_id)
            .await
            .with_context(|| format!("getChatMember {} in {} failed", user_id, chat_id))?;
        Ok(role_from_status(member.kind.status()))
    }
}

pub fn role_from_status(status: ChatMemberStatus) -> MemberRole {
    match status {
        ChatMemberStatus::Owner => MemberRole::Creator,
        ChatMemberStatus::Administrator => MemberRole::Administrator,
        ChatMemberStatus::Member => MemberRole::Member,
        ChatMemberStatus::Restricted => MemberRole::Restricted,
        ChatMemberStatus::Left => MemberRole::Left,
        ChatMemberStatus::Banned => MemberRole::Kicked,
    }
}

/// Name written to the message log: the username when set, otherwise the first name
pub fn display_name(user: &User) -> String {
    preferred_name(user.username.as_deref(), &user.first_name)
}

fn preferred_name(username: Option<&str>, first_name: &str) -> String {
    username.unwrap_or(first_name).to_string()
}

/// Run the Telegram update loop until the process is stopped
pub async fn run(state: Arc<AppState>, bot: Bot) -> Result<()> {
    info!("Starting Telegram platform...");

    let handler = dptree::entry()
        .branch(Update::filter_message().endpoint(handle_message))
        .branch(Update::filter_my_chat_member().endpoint(handle_my_chat_member));

    let fallback_state = state.clone();
    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .default_handler(move |upd| {
            let state = fallback_state.clone();
            async move {
                debug!("Ignoring update: {:?}", upd.id);
                state.tick(Utc::now()).await;
            }
        })
        .error_handler(LoggingErrorHandler::with_custom_text("telegram"))
        .build()
        .dispatch()
        .await;

    Ok(())
}

async fn handle_message(msg: Message, state: Arc<AppState>) -> Result<()> {
    if let Some(text) = msg.text() {
        let (user_id, user_name) = match msg.from.as_ref() {
            Some(user) => (Some(user.id), display_name(user)),
            None => (None, msg.chat.id.to_string()),
        };

        let incoming = IncomingMessage {
            chat_id: msg.chat.id,
            user_id,
            user_name,
            text: text.to_string(),
        };

        // A failed reply is logged by the dispatcher; the tick below must still run
        let result = state.handle_message(&incoming).await;
        state.tick(Utc::now()).await;
        return result;
    }

    state.tick(Utc::now()).await;
    Ok(())
}

async fn handle_my_chat_member(update: ChatMemberUpdated, state: Arc<AppState>) -> Result<()> {
    let change = MembershipChange {
        chat_id: update.chat.id,
        user_id: update.new_chat_member.user.id,
        role: role_from_status(update.new_chat_member.kind.status()),
    };

    state.handle_membership_change(&change).await;
    state.tick(Utc::now()).await;
    Ok(())
}

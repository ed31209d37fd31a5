//! Slash-command parsing and the fixed reply texts.

pub const UNKNOWN_COMMAND: &str = "I don't know this command.";
pub const CHECK_USAGE: &str =
    "Please provide a channel ID after the command, for example: /check -1001234567890";
pub const CHECK_BAD_ID: &str = "Invalid channel ID format.";
pub const CHECK_PRESENT: &str = "The bot is a member of this channel/group.";
pub const CHECK_ABSENT: &str =
    "The bot is not a member of this channel/group or cannot read its messages.";
pub const SAVE_OK: &str = "Message saved.";
pub const SAVE_DENIED: &str = "Only chat administrators can save messages.";
pub const SAVE_FAILED: &str = "Failed to save the message.";
pub const HELP: &str = "Commands:\n\
                        /status - Show that the bot is online\n\
                        /check <chat_id> - Check whether the bot can see a channel or group\n\
                        /save - Save this message to the chat log (admins only)";

pub const NOTIFY_ADDED: &str = "Bot was added to the channel.";
pub const NOTIFY_REMOVED: &str = "Bot was removed from the channel.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Status,
    /// Raw argument, possibly empty
    Check(String),
    Save,
    Help,
    Unknown(String),
}

impl Command {
    /// Parse message text into a command.
    ///
    /// Returns `None` when the text is not a command, or when it is addressed
    /// to a different bot via a `/name@otherbot` suffix.
    pub fn parse(text: &str, bot_username: &str) -> Option<Self> {
        let rest = text.trim_start().strip_prefix('/')?;
        let (head, args) = match rest.split_once(char::is_whitespace) {
            Some((head, args)) => (head, args.trim()),
            None => (rest, ""),
        };

        let name = match head.split_once('@') {
            Some((name, target)) => {
                if !target.eq_ignore_ascii_case(bot_username) {
                    return None;
                }
                name
            }
            None => head,
        };

        if name.is_empty() {
            return None;
        }

        let command = match name.to_ascii_lowercase().as_str() {
            "status" => Command::Status,
            "check" => Command::Check(args.to_string()),
            "save" => Command::Save,
            "help" | "start" => Command::Help,
            other => Command::Unknown(other.to_string()),
        };
        Some(command)
    }

    pub fn name(&self) -> &str {
        match self {
            Command::Status => "status",
            Command::Check(_) => "check",
            Command::Save => "save",
            Command::Help => "help",
            Command::Unknown(name) => name,
        }
    }
}

pub fn status_reply(now: chrono::DateTime<chrono::Utc>) -> String {
    format!("Bot is online. Current time: {}", now.to_rfc2822())
}

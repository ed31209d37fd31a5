use anyhow::{Context, Result};
use std::path::PathBuf;
use teloxide::types::ChatId;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// Append-only per-chat text log. One file per chat, one line per entry.
#[derive(Debug, Clone)]
pub struct MessageLog {
    directory: PathBuf,
}

impl MessageLog {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn path_for(&self, chat_id: ChatId) -> PathBuf {
        self.directory.join(format!("messages_{}.txt", chat_id.0))
    }

    /// Append `"<username>: <text>\n"` to the chat's file, creating it if needed.
    /// Line breaks inside the entry are flattened to spaces, so every call
    /// writes exactly one line.
    pub async fn append(&self, chat_id: ChatId, username: &str, text: &str) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.directory)
            .await
            .with_context(|| {
                format!("Failed to create log directory: {}", self.directory.display())
            })?;

        let path = self.path_for(chat_id);
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .with_context(|| format!("Failed to open log file: {}", path.display()))?;

        let line = format!("{}: {}\n", single_line(username), single_line(text));
        file.write_all(line.as_bytes())
            .await
            .with_context(|| format!("Failed to write log file: {}", path.display()))?;
        file.flush().await?;

        debug!("Appended {} bytes to {}", line.len(), path.display());
        Ok(path)
    }
}

fn single_line(text: &str) -> String {
    text.replace("\r\n", " ").replace(['\n', '\r'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "chanwatch-log-{}-{}",
            name,
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_file_name_uses_chat_id() {
        let log = MessageLog::new("/data");
        assert_eq!(
            log.path_for(ChatId(-100123)),
            PathBuf::from("/data/messages_-100123.txt")
        );
    }

    #[tokio::test]
    async fn test_append_is_append_only() {
        let dir = temp_dir("append");
        let log = MessageLog::new(&dir);

        log.append(ChatId(7), "alice", "first").await.unwrap();
        let path = log.append(ChatId(7), "bob", "second").await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "alice: first\nbob: second\n");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_multiline_text_is_one_entry() {
        let dir = temp_dir("multiline");
        let log = MessageLog::new(&dir);

        log.append(ChatId(3), "al\nice", "a\nb\r\nc\rd").await.unwrap();
        let path = log.append(ChatId(3), "bob", "next").await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "al ice: a b c d\nbob: next\n");
        assert_eq!(content.lines().count(), 2);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_chats_have_separate_files() {
        let dir = temp_dir("separate");
        let log = MessageLog::new(&dir);

        log.append(ChatId(1), "alice", "one").await.unwrap();
        log.append(ChatId(2), "bob", "two").await.unwrap();

        assert_eq!(
            std::fs::read_to_string(log.path_for(ChatId(1))).unwrap(),
            "alice: one\n"
        );
        assert_eq!(
            std::fs::read_to_string(log.path_for(ChatId(2))).unwrap(),
            "bob: two\n"
        );

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_unwritable_directory_is_an_error() {
        let dir = temp_dir("blocked");
        std::fs::create_dir_all(dir.parent().unwrap()).unwrap();
        // A regular file where the directory should be
        std::fs::write(&dir, b"not a directory").unwrap();

        let log = MessageLog::new(dir.join("nested"));
        assert!(log.append(ChatId(1), "alice", "hi").await.is_err());

        let _ = std::fs::remove_file(&dir);
    }
}

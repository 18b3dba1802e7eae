use std::sync::OnceLock;

use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl, pooled_connection::deadpool::Pool};
use regex::Regex;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::{
    community::models::mention::NewContentMention,
    schema::{content_mentions, users},
};

/// Work item for the mention-extraction worker. Queued after the comment
/// write has committed; the request does not wait for the outcome.
#[derive(Debug)]
pub enum MentionTask {
    Created { comment_id: Uuid, text: String },
    Updated { comment_id: Uuid, text: String },
}

#[derive(Clone)]
pub struct MentionQueue {
    tx: mpsc::UnboundedSender<MentionTask>,
}

impl MentionQueue {
    /// Fire-and-forget. A send can only fail when the worker is gone, which
    /// is logged and swallowed.
    pub fn enqueue(&self, task: MentionTask) {
        if let Err(e) = self.tx.send(task) {
            tracing::error!(?e, "Mention worker is gone, dropping task");
        }
    }
}

/// Spawns the worker loop draining the mention queue. A failing task is
/// logged and dropped; the loop itself only exits when every queue handle
/// has been dropped.
pub fn spawn_worker(pool: Pool<AsyncPgConnection>) -> MentionQueue {
    let (tx, mut rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        while let Some(task) = rx.recv().await {
            if let Err(e) = process(&pool, &task).await {
                tracing::error!(?e, ?task, "Failed to extract mentions");
            }
        }

        tracing::info!("Mention task channel closed, exiting worker loop");
    });

    MentionQueue { tx }
}

async fn process(pool: &Pool<AsyncPgConnection>, task: &MentionTask) -> eyre::Result<()> {
    let (comment_id, text, replace) = match task {
        MentionTask::Created { comment_id, text } => (*comment_id, text, false),
        MentionTask::Updated { comment_id, text } => (*comment_id, text, true),
    };

    let handles = extract_mentions(text);

    let mut conn = pool.get().await?;

    // an edit replaces whatever the previous text mentioned
    if replace {
        diesel::delete(
            content_mentions::table.filter(content_mentions::comment_id.eq(comment_id)),
        )
        .execute(&mut conn)
        .await?;
    }

    if handles.is_empty() {
        return Ok(());
    }

    // mentions of handles that don't resolve to a user are ignored
    let mentioned: Vec<Uuid> = users::table
        .filter(users::username.eq_any(&handles))
        .select(users::id)
        .load(&mut conn)
        .await?;

    let rows: Vec<NewContentMention> = mentioned
        .into_iter()
        .map(|user_id| NewContentMention {
            comment_id,
            mentioned_user_id: user_id,
        })
        .collect();

    if rows.is_empty() {
        return Ok(());
    }

    diesel::insert_into(content_mentions::table)
        .values(&rows)
        .execute(&mut conn)
        .await?;

    Ok(())
}

static MENTION_RE: OnceLock<Regex> = OnceLock::new();

/// The distinct `@handle` mentions in a comment body, in order of first
/// appearance. A handle must not be glued to a preceding word character so
/// email addresses don't count.
pub fn extract_mentions(text: &str) -> Vec<String> {
    let re = MENTION_RE.get_or_init(|| {
        Regex::new(r"(?:^|[^\w@])@([A-Za-z0-9_]{2,64})").expect("mention regex is valid")
    });

    let mut handles = Vec::new();
    for capture in re.captures_iter(text) {
        let handle = &capture[1];
        if !handles.iter().any(|h| h == handle) {
            handles.push(handle.to_owned());
        }
    }

    handles
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_extracts_handles() {
        assert_eq!(
            extract_mentions("thanks @alice and @bob_99!"),
            vec!["alice", "bob_99"]
        );
    }

    #[test]
    fn test_deduplicates_preserving_first_appearance() {
        assert_eq!(
            extract_mentions("@alice @bob @alice again"),
            vec!["alice", "bob"]
        );
    }

    #[test]
    fn test_ignores_email_addresses() {
        assert_eq!(extract_mentions("mail me at someone@example.com"), Vec::<String>::new());
    }

    #[test]
    fn test_handles_at_start_and_after_punctuation() {
        assert_eq!(
            extract_mentions("@alice, see (@bob)"),
            vec!["alice", "bob"]
        );
    }

    #[test]
    fn test_no_mentions() {
        assert_eq!(extract_mentions("no handles here"), Vec::<String>::new());
    }
}

//! Offline history commands: print or clear one user's stored conversation.

use anyhow::Result;
use std::io::Write;
use storage::ConversationStore;

const CONTENT_PREVIEW_LEN: usize = 80;

fn preview(content: &str) -> String {
    let flat = content.replace('\n', " ");
    if flat.chars().count() <= CONTENT_PREVIEW_LEN {
        flat
    } else {
        let cut: String = flat.chars().take(CONTENT_PREVIEW_LEN).collect();
        format!("{}…", cut)
    }
}

/// Writes the `limit` most recent entries, oldest first, one per line.
pub async fn print_history(
    store: &dyn ConversationStore,
    user_id: i64,
    limit: usize,
    out: &mut impl Write,
) -> Result<usize> {
    let entries = store.read_recent(user_id, limit).await?;
    if entries.is_empty() {
        writeln!(out, "No history for user {}.", user_id)?;
        return Ok(0);
    }
    writeln!(out, "{:<20} {:<5} {}", "timestamp", "role", "content")?;
    writeln!(out, "{}", "-".repeat(100))?;
    for e in &entries {
        writeln!(
            out,
            "{:<20} {:<5} {}",
            e.created_at.format("%Y-%m-%d %H:%M:%S"),
            e.role,
            preview(&e.content)
        )?;
    }
    Ok(entries.len())
}

pub async fn clear_history(
    store: &dyn ConversationStore,
    user_id: i64,
    out: &mut impl Write,
) -> Result<u64> {
    let removed = store.clear(user_id).await?;
    writeln!(out, "Removed {} entries for user {}.", removed, user_id)?;
    Ok(removed)
}

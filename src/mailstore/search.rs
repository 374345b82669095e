use super::{FolderFilter, MailFolder, MailMessage, MessageMatch, SearchReport};
use crate::error::Result;

const SNIPPET_MAX_CHARS: usize = 160;

/// Walk `root` depth-first, pre-order, and collect every message whose body
/// contains `term` ignoring case.
///
/// The root is always scanned. A child is descended into only when its path
/// passes `filter`; the same rule applies at every depth. The first folder or
/// message that cannot be read aborts the walk.
pub fn search_folders<F: MailFolder>(
    root: &F,
    term: &str,
    filter: &FolderFilter,
) -> Result<SearchReport> {
    let needle = term.to_lowercase();
    let mut report = SearchReport::default();
    walk(root, &needle, filter, &mut report)?;
    log::info!(
        "Searched {} folders ({} messages), {} matches",
        report.visited.len(),
        report.messages_scanned,
        report.matches.len()
    );
    Ok(report)
}

/// Run [`search_folders`] on the blocking pool.
pub async fn search_folders_async<F>(
    root: F,
    term: String,
    filter: FolderFilter,
) -> Result<SearchReport>
where
    F: MailFolder + Send + 'static,
{
    tokio::task::spawn_blocking(move || search_folders(&root, &term, &filter)).await?
}

/// Scan the messages directly inside `folder`.
pub fn search_messages<F: MailFolder>(folder: &F, term: &str) -> Result<Vec<MessageMatch>> {
    let needle = term.to_lowercase();
    let mut report = SearchReport::default();
    scan(folder, &needle, &mut report)?;
    Ok(report.matches)
}

fn walk<F: MailFolder>(
    folder: &F,
    needle: &str,
    filter: &FolderFilter,
    report: &mut SearchReport,
) -> Result<()> {
    scan(folder, needle, report)?;
    for child in folder.children()? {
        if filter.accepts(child.path()) {
            walk(&child, needle, filter, report)?;
        } else {
            log::debug!("Skipping folder {}", child.path());
        }
    }
    Ok(())
}

fn scan<F: MailFolder>(folder: &F, needle: &str, report: &mut SearchReport) -> Result<()> {
    log::debug!("Scanning folder {}", folder.path());
    report.visited.push(folder.path().to_string());
    for message in folder.messages()? {
        report.messages_scanned += 1;
        let body = message.body()?;
        if let Some(snippet) = find_snippet(&body, needle) {
            report.matches.push(MessageMatch {
                folder_path: message.folder_path().to_string(),
                message_id: message.id(),
                snippet,
            });
        }
    }
    Ok(())
}

/// `needle` must already be lower-cased.
fn find_snippet(body: &str, needle: &str) -> Option<String> {
    if !body.to_lowercase().contains(needle) {
        return None;
    }
    // A match can span a line break; fall back to the first line then.
    let line = body
        .lines()
        .find(|l| !l.trim().is_empty() && l.to_lowercase().contains(needle))
        .or_else(|| body.lines().find(|l| !l.trim().is_empty()))
        .unwrap_or("");
    Some(line.trim().chars().take(SNIPPET_MAX_CHARS).collect())
}

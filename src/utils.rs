// Discord rejects embed field values longer than this
const EMBED_FIELD_LIMIT: usize = 1024;

pub fn escape_markdown(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('*', "\\*")
        .replace('_', "\\_")
        .replace('`', "\\`")
        .replace('~', "\\~")
        .replace('|', "\\|")
}

/// Cuts `text` to at most `limit` characters, marking the cut with `…`.
pub fn truncate(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }

    let mut cut: String = text.chars().take(limit.saturating_sub(1)).collect();
    // An odd run of trailing backslashes would escape the ellipsis
    let trailing = cut.chars().rev().take_while(|c| *c == '\\').count();
    if trailing % 2 == 1 {
        cut.pop();
    }
    cut.push('…');
    cut
}

/// Free text typed by a user, made safe to show as an embed field.
pub fn embed_field_text(text: &str) -> String {
    truncate(&escape_markdown(text.trim()), EMBED_FIELD_LIMIT)
}

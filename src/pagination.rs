use crate::error::{Error, Result};
use crate::models::ModerationLogEntry;
use crate::utils::truncate;
use serenity::model::mention::Mentionable;

pub const PAGE_SIZE: usize = 5;
// Discord rejects embed descriptions longer than this
pub const DESCRIPTION_LIMIT: usize = 4096;
// Five blocks with reasons this long stay under the description limit
const REASON_LIMIT: usize = 650;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageAction {
    Advance,
    Retreat,
}

impl PageAction {
    pub const CUSTOM_ID_PREFIX: &'static str = "logs:";

    pub fn custom_id(self) -> &'static str {
        match self {
            Self::Advance => "logs:next",
            Self::Retreat => "logs:previous",
        }
    }

    /// Maps a button id back to exactly one action.
    pub fn from_custom_id(custom_id: &str) -> Option<Self> {
        match custom_id {
            "logs:next" => Some(Self::Advance),
            "logs:previous" => Some(Self::Retreat),
            _ => None,
        }
    }
}

/// Enablement of the two navigation buttons for a rendered page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Controls {
    pub advance_disabled: bool,
    pub retreat_disabled: bool,
}

impl Controls {
    pub fn is_disabled(&self, action: PageAction) -> bool {
        match action {
            PageAction::Advance => self.advance_disabled,
            PageAction::Retreat => self.retreat_disabled,
        }
    }
}

/// Paged browsing over a fixed, non-empty snapshot of log entries, so
/// `1 <= current_page <= total_pages` always holds.
#[derive(Debug, Clone, PartialEq)]
pub struct PageView {
    entries: Vec<ModerationLogEntry>,
    current_page: usize,
    total_pages: usize,
}

impl PageView {
    pub fn open(entries: Vec<ModerationLogEntry>) -> Result<Self> {
        if entries.is_empty() {
            return Err(Error::NoEntries);
        }

        let total_pages = entries.len().div_ceil(PAGE_SIZE);
        Ok(Self {
            entries,
            current_page: 1,
            total_pages,
        })
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    /// Entries in `[(page - 1) * PAGE_SIZE, page * PAGE_SIZE)`.
    pub fn page_entries(&self) -> &[ModerationLogEntry] {
        let start = (self.current_page - 1) * PAGE_SIZE;
        let end = (start + PAGE_SIZE).min(self.entries.len());
        &self.entries[start..end]
    }

    pub fn controls(&self) -> Controls {
        Controls {
            advance_disabled: self.current_page == self.total_pages,
            retreat_disabled: self.current_page == 1,
        }
    }

    pub fn render(&self) -> (String, Controls) {
        let text = self
            .page_entries()
            .iter()
            .map(format_entry)
            .collect::<Vec<_>>()
            .join("\n");
        (truncate(&text, DESCRIPTION_LIMIT), self.controls())
    }

    pub fn advance(mut self) -> Self {
        if self.current_page < self.total_pages {
            self.current_page += 1;
        }
        self
    }

    pub fn retreat(mut self) -> Self {
        if self.current_page > 1 {
            self.current_page -= 1;
        }
        self
    }

    /// Applies `action` in place. Returns `false` without touching the page
    /// when the matching button is disabled for the current state, which
    /// happens when a click races a re-render.
    pub fn apply(&mut self, action: PageAction) -> bool {
        if self.controls().is_disabled(action) {
            return false;
        }

        match action {
            PageAction::Advance => self.current_page += 1,
            PageAction::Retreat => self.current_page -= 1,
        }
        true
    }
}

fn format_entry(entry: &ModerationLogEntry) -> String {
    format!(
        "**Case {}**\n**Type:** {}\n**User:** {}\n**Moderator:** {}\n**Reason:** {}\n",
        entry.case_number,
        entry.log_type,
        entry.user_id.mention(),
        entry.moderator_id.mention(),
        truncate(&entry.reason, REASON_LIMIT)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LogType;
    use serenity::model::id::UserId;

    fn entries(count: u64) -> Vec<ModerationLogEntry> {
        (1..=count)
            .map(|case_number| ModerationLogEntry {
                case_number,
                log_type: LogType::Warn,
                user_id: UserId::new(5),
                moderator_id: UserId::new(6),
                reason: format!("reason {}", case_number),
            })
            .collect()
    }

    fn cases(view: &PageView) -> Vec<u64> {
        view.page_entries().iter().map(|e| e.case_number).collect()
    }

    fn last_page(mut view: PageView) -> PageView {
        while view.current_page() < view.total_pages() {
            view = view.advance();
        }
        view
    }

    #[test]
    fn empty_snapshot_is_rejected() {
        assert!(matches!(PageView::open(Vec::new()), Err(Error::NoEntries)));
    }

    #[test]
    fn page_count_and_last_page_size() {
        for n in 1..=23u64 {
            let view = PageView::open(entries(n)).unwrap();
            let total = view.total_pages();
            assert_eq!(total, (n as usize).div_ceil(5), "n = {}", n);

            let last = last_page(view);
            let expected = n as usize - 5 * (total - 1);
            assert_eq!(last.page_entries().len(), expected, "n = {}", n);
            assert!((1..=5).contains(&expected));
        }
    }

    #[test]
    fn seven_entries_split_five_and_two() {
        let view = PageView::open(entries(7)).unwrap();
        assert_eq!(cases(&view), vec![1, 2, 3, 4, 5]);

        let view = view.advance();
        assert_eq!(view.current_page(), 2);
        assert_eq!(cases(&view), vec![6, 7]);
    }

    #[test]
    fn advance_then_retreat_returns_to_interior_page() {
        let view = PageView::open(entries(15)).unwrap().advance();
        assert_eq!(view.current_page(), 2);
        assert_eq!(view.clone().advance().retreat(), view);
        assert_eq!(view.clone().retreat().advance(), view);
    }

    #[test]
    fn boundaries_saturate() {
        let first = PageView::open(entries(12)).unwrap();
        assert_eq!(first.clone().retreat(), first);

        let last = last_page(first);
        assert_eq!(last.current_page(), 3);
        assert_eq!(last.clone().advance(), last);
    }

    #[test]
    fn controls_follow_page_position() {
        let view = PageView::open(entries(11)).unwrap();
        let (_, controls) = view.render();
        assert!(controls.retreat_disabled);
        assert!(!controls.advance_disabled);

        let view = view.advance();
        let (_, controls) = view.render();
        assert!(!controls.retreat_disabled);
        assert!(!controls.advance_disabled);

        let view = view.advance();
        let (_, controls) = view.render();
        assert!(!controls.retreat_disabled);
        assert!(controls.advance_disabled);
    }

    #[test]
    fn single_page_disables_both_controls() {
        let view = PageView::open(entries(5)).unwrap();
        let controls = view.controls();
        assert!(controls.advance_disabled && controls.retreat_disabled);
    }

    #[test]
    fn apply_refuses_disabled_control() {
        let mut view = PageView::open(entries(6)).unwrap();
        assert!(!view.apply(PageAction::Retreat));
        assert_eq!(view.current_page(), 1);

        assert!(view.apply(PageAction::Advance));
        assert_eq!(view.current_page(), 2);
        assert!(!view.apply(PageAction::Advance));
        assert_eq!(view.current_page(), 2);
    }

    #[test]
    fn render_formats_blocks_in_fixed_order() {
        let view = PageView::open(entries(2)).unwrap();
        let (text, _) = view.render();
        assert_eq!(
            text,
            "**Case 1**\n**Type:** Warn\n**User:** <@5>\n**Moderator:** <@6>\n**Reason:** reason 1\n\
             \n\
             **Case 2**\n**Type:** Warn\n**User:** <@5>\n**Moderator:** <@6>\n**Reason:** reason 2\n"
        );
    }

    #[test]
    fn custom_ids_map_to_one_action() {
        for action in [PageAction::Advance, PageAction::Retreat] {
            assert_eq!(PageAction::from_custom_id(action.custom_id()), Some(action));
            assert!(action.custom_id().starts_with(PageAction::CUSTOM_ID_PREFIX));
        }
        assert_eq!(PageAction::from_custom_id("logs:jump"), None);
    }

    #[test]
    fn long_reasons_fit_in_one_description() {
        let logs = (1..=5)
            .map(|case_number| ModerationLogEntry {
                case_number,
                log_type: LogType::Ban,
                user_id: UserId::new(u64::MAX),
                moderator_id: UserId::new(u64::MAX - 1),
                reason: "x".repeat(900),
            })
            .collect();

        let (text, _) = PageView::open(logs).unwrap().render();

        assert!(text.chars().count() <= DESCRIPTION_LIMIT);
        assert_eq!(text.matches("**Case ").count(), 5);
        assert_eq!(text.matches('…').count(), 5);
    }
}

//! Archive of past conversations.
//!
//! Keeps a bounded, newest-first list of conversation summaries for the
//! history view and groups them by day.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use enrollcast_core::{ConversationSummary, Message, Role};

/// Maximum title length in characters before truncation.
const TITLE_MAX_CHARS: usize = 40;

// =============================================================================
// DayGroup
// =============================================================================

/// Coarse age bucket used to group history entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayGroup {
    Today,
    Yesterday,
    Previous7Days,
    Older,
}

impl DayGroup {
    /// Bucket a timestamp relative to `now` by calendar day.
    pub fn for_timestamp(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let days = (now.date_naive() - timestamp.date_naive()).num_days();
        match days {
            d if d <= 0 => DayGroup::Today,
            1 => DayGroup::Yesterday,
            2..=7 => DayGroup::Previous7Days,
            _ => DayGroup::Older,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DayGroup::Today => "Today",
            DayGroup::Yesterday => "Yesterday",
            DayGroup::Previous7Days => "Previous 7 Days",
            DayGroup::Older => "Older",
        }
    }
}

// =============================================================================
// ConversationHistory
// =============================================================================

/// Bounded in-memory archive of finished conversations.
#[derive(Debug, Clone)]
pub struct ConversationHistory {
    /// Maximum number of entries retained.
    pub limit: usize,
    entries: VecDeque<ConversationSummary>,
}

impl ConversationHistory {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            entries: VecDeque::new(),
        }
    }

    /// Archive a conversation.
    ///
    /// Conversations without any user message are not archived. When the
    /// archive is full the oldest entry is dropped.
    pub fn archive(&mut self, messages: &[Message]) -> Option<ConversationSummary> {
        let first_user = messages.iter().find(|m| m.role == Role::User)?;
        let created_at = messages.first()?.timestamp;
        let updated_at = messages.last()?.timestamp;

        let summary = ConversationSummary {
            id: Uuid::new_v4(),
            title: title_from(&first_user.content),
            created_at,
            updated_at,
            message_count: messages.len(),
        };

        if self.limit > 0 {
            self.entries.push_front(summary.clone());
            self.entries.truncate(self.limit);
        }
        Some(summary)
    }

    /// Entries, newest first.
    pub fn entries(&self) -> impl Iterator<Item = &ConversationSummary> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries grouped by day bucket, preserving newest-first order.
    pub fn grouped(&self, now: DateTime<Utc>) -> Vec<(DayGroup, Vec<&ConversationSummary>)> {
        let mut groups: Vec<(DayGroup, Vec<&ConversationSummary>)> = Vec::new();
        for entry in &self.entries {
            let group = DayGroup::for_timestamp(entry.updated_at, now);
            match groups.last_mut() {
                Some((last, items)) if *last == group => items.push(entry),
                _ => groups.push((group, vec![entry])),
            }
        }
        groups
    }
}

fn title_from(content: &str) -> String {
    let trimmed = content.trim();
    if trimmed.chars().count() > TITLE_MAX_CHARS {
        let cut: String = trimmed.chars().take(TITLE_MAX_CHARS).collect();
        format!("{}...", cut.trim_end())
    } else {
        trimmed.to_string()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn conversation(user_text: &str) -> Vec<Message> {
        vec![
            Message::assistant("Hi!"),
            Message::user(user_text),
            Message::assistant("Here you go."),
        ]
    }

    fn summary_at(updated_at: DateTime<Utc>) -> ConversationSummary {
        ConversationSummary {
            id: Uuid::new_v4(),
            title: "t".into(),
            created_at: updated_at,
            updated_at,
            message_count: 2,
        }
    }

    #[test]
    fn test_archive_builds_summary() {
        let mut history = ConversationHistory::new(10);
        let messages = conversation("Forecast Spring 2026");
        let summary = history.archive(&messages).unwrap();
        assert_eq!(summary.title, "Forecast Spring 2026");
        assert_eq!(summary.message_count, 3);
        assert_eq!(summary.created_at, messages[0].timestamp);
        assert_eq!(summary.updated_at, messages[2].timestamp);
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_archive_skips_greeting_only() {
        let mut history = ConversationHistory::new(10);
        assert!(history.archive(&[Message::assistant("Hi!")]).is_none());
        assert!(history.archive(&[]).is_none());
        assert!(history.is_empty());
    }

    #[test]
    fn test_archive_truncates_long_titles() {
        let mut history = ConversationHistory::new(10);
        let long = "Please forecast every FOUN course for Spring 2026 at all campuses";
        let summary = history.archive(&conversation(long)).unwrap();
        assert!(summary.title.ends_with("..."));
        assert!(summary.title.chars().count() <= TITLE_MAX_CHARS + 3);
        assert!(summary.title.starts_with("Please forecast every FOUN"));
    }

    #[test]
    fn test_archive_is_newest_first_and_bounded() {
        let mut history = ConversationHistory::new(2);
        history.archive(&conversation("first"));
        history.archive(&conversation("second"));
        history.archive(&conversation("third"));
        let titles: Vec<&str> = history.entries().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["third", "second"]);
    }

    #[test]
    fn test_zero_limit_keeps_nothing() {
        let mut history = ConversationHistory::new(0);
        assert!(history.archive(&conversation("hello")).is_some());
        assert!(history.is_empty());
    }

    #[test]
    fn test_day_group_buckets() {
        let now = Utc::now();
        assert_eq!(DayGroup::for_timestamp(now, now), DayGroup::Today);
        assert_eq!(
            DayGroup::for_timestamp(now - Duration::days(1), now),
            DayGroup::Yesterday
        );
        assert_eq!(
            DayGroup::for_timestamp(now - Duration::days(5), now),
            DayGroup::Previous7Days
        );
        assert_eq!(
            DayGroup::for_timestamp(now - Duration::days(30), now),
            DayGroup::Older
        );
        assert_eq!(DayGroup::Previous7Days.label(), "Previous 7 Days");
    }

    #[test]
    fn test_grouped_preserves_order() {
        let now = Utc::now();
        let mut history = ConversationHistory::new(10);
        // Pushed oldest first so the newest ends up at the front.
        history.entries.push_front(summary_at(now - Duration::days(10)));
        history.entries.push_front(summary_at(now - Duration::days(1)));
        history.entries.push_front(summary_at(now));
        history.entries.push_front(summary_at(now));

        let groups = history.grouped(now);
        let labels: Vec<&str> = groups.iter().map(|(g, _)| g.label()).collect();
        assert_eq!(labels, vec!["Today", "Yesterday", "Older"]);
        assert_eq!(groups[0].1.len(), 2);
    }
}

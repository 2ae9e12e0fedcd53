use crate::debug_if_enabled;
use crate::error::Result;
use crate::events::WindowRecord;
use crate::services::usage_store::UsageStore;
use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::Arc;

/// Orders a window snapshot by usage: count first, then recency.
///
/// Usage is read from the store on every call; nothing is cached between calls.
/// The sort is stable, so windows with equal count and last-used time keep
/// their enumeration order.
pub struct Ranker {
    usage: Arc<UsageStore>,
}

impl Ranker {
    pub fn new(usage: Arc<UsageStore>) -> Self {
        Self { usage }
    }

    pub fn rank(&self, mut windows: Vec<WindowRecord>) -> Result<Vec<WindowRecord>> {
        let scores: HashMap<String, (u64, u64)> = self
            .usage
            .all_records()?
            .into_iter()
            .map(|record| (record.window_id, (record.count, record.last_used)))
            .collect();

        windows.sort_by_key(|window| {
            let (count, last_used) = scores.get(&window.id).copied().unwrap_or((0, 0));
            (Reverse(count), Reverse(last_used))
        });

        debug_if_enabled!(
            "Ранжировано {} окон ({} записей использования)",
            windows.len(),
            scores.len()
        );
        Ok(windows)
    }

    /// Регистронезависимый фильтр по подстроке заголовка; пустой запрос пропускает всё
    pub fn filter(windows: Vec<WindowRecord>, query: &str) -> Vec<WindowRecord> {
        let query_lower = query.trim().to_lowercase();
        if query_lower.is_empty() {
            return windows;
        }
        windows
            .into_iter()
            .filter(|window| window.matches_query_lower(&query_lower))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::usage_store::{ManualClock, MemoryDocumentStore};
    use pretty_assertions::assert_eq;

    fn setup() -> (Ranker, Arc<UsageStore>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(1_000));
        let usage = Arc::new(UsageStore::new(
            Arc::new(MemoryDocumentStore::new()),
            clock.clone(),
            "window/",
        ));
        (Ranker::new(usage.clone()), usage, clock)
    }

    fn two_windows() -> Vec<WindowRecord> {
        vec![
            WindowRecord::new("0x01", "Terminal"),
            WindowRecord::new("0x02", "Browser"),
        ]
    }

    fn titles(windows: &[WindowRecord]) -> Vec<&str> {
        windows.iter().map(|w| w.title.as_str()).collect()
    }

    #[test]
    fn test_no_usage_keeps_enumeration_order() {
        let (ranker, _, _) = setup();
        let ranked = ranker.rank(two_windows()).unwrap();
        assert_eq!(titles(&ranked), vec!["Terminal", "Browser"]);
    }

    #[test]
    fn test_single_use_ranks_first() {
        let (ranker, usage, _) = setup();
        usage.record_usage("0x02", "Browser").unwrap();

        let ranked = ranker.rank(two_windows()).unwrap();
        assert_eq!(titles(&ranked), vec!["Browser", "Terminal"]);
    }

    #[test]
    fn test_count_beats_recency() {
        let (ranker, usage, clock) = setup();
        usage.record_usage("0x01", "Terminal").unwrap();
        usage.record_usage("0x01", "Terminal").unwrap();
        clock.advance(60_000);
        usage.record_usage("0x02", "Browser").unwrap();

        let ranked = ranker.rank(two_windows()).unwrap();
        assert_eq!(titles(&ranked), vec!["Terminal", "Browser"]);
    }

    #[test]
    fn test_equal_count_broken_by_recency() {
        let (ranker, usage, clock) = setup();
        usage.record_usage("0x01", "Terminal").unwrap();
        clock.advance(10);
        usage.record_usage("0x02", "Browser").unwrap();

        let ranked = ranker.rank(two_windows()).unwrap();
        assert_eq!(titles(&ranked), vec!["Browser", "Terminal"]);
    }

    #[test]
    fn test_rank_is_repeatable_and_reflects_new_usage() {
        let (ranker, usage, clock) = setup();
        let windows = vec![
            WindowRecord::new("0x01", "A"),
            WindowRecord::new("0x02", "B"),
            WindowRecord::new("0x03", "C"),
        ];
        usage.record_usage("0x03", "C").unwrap();

        let first = ranker.rank(windows.clone()).unwrap();
        let second = ranker.rank(windows.clone()).unwrap();
        assert_eq!(first, second);
        assert_eq!(titles(&first), vec!["C", "A", "B"]);

        clock.advance(1);
        usage.record_usage("0x02", "B").unwrap();
        usage.record_usage("0x02", "B").unwrap();
        let third = ranker.rank(windows).unwrap();
        assert_eq!(titles(&third), vec!["B", "C", "A"]);
    }

    #[test]
    fn test_stale_records_for_closed_windows_are_ignored() {
        let (ranker, usage, _) = setup();
        usage.record_usage("0xdead", "Closed").unwrap();

        let ranked = ranker.rank(two_windows()).unwrap();
        assert_eq!(titles(&ranked), vec!["Terminal", "Browser"]);
    }

    #[test]
    fn test_filter_is_case_insensitive_substring() {
        let filtered = Ranker::filter(two_windows(), "term");
        assert_eq!(titles(&filtered), vec!["Terminal"]);

        let filtered = Ranker::filter(two_windows(), "  OWS ");
        assert_eq!(titles(&filtered), vec!["Browser"]);

        assert_eq!(Ranker::filter(two_windows(), "").len(), 2);
        assert!(Ranker::filter(two_windows(), "editor").is_empty());
    }
}

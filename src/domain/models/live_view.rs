//! Ordered, indexed, paginated view of one subject's message log.
//!
//! Invariants held after every mutation:
//! - rows are sorted by `(event_on, id)` and ids are unique
//! - display indices are exactly `1..=N` in row order
//! - the followed record, when set, is one of the rows
//! - the page index puts the followed row on the visible page
//! - error/warning counters match a fresh scan of the rows

use serde::Serialize;
use std::collections::HashSet;

use super::record::{Level, LogRecord, RecordId};
use super::subject::Subject;

/// A record with its derived 1-based display index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogRow {
    /// Position in the sorted view, starting at 1.
    pub index: usize,
    /// The record itself.
    pub record: LogRecord,
}

/// Sorted, indexed and paged records of one subject.
///
/// After every mutation the rows are ordered by [`LogRecord::ordering_key`],
/// indexed `1..=N`, and the followed record sits on the current page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LiveView {
    subject: Subject,
    rows: Vec<LogRow>,
    followed: Option<RecordId>,
    page_size: usize,
    page_index: usize,
    error_count: usize,
    warning_count: usize,
}

impl LiveView {
    /// Empty view; `page_size` is clamped to at least one row.
    pub fn new(subject: Subject, page_size: usize) -> Self {
        Self {
            subject,
            rows: Vec::new(),
            followed: None,
            page_size: page_size.max(1),
            page_index: 0,
            error_count: 0,
            warning_count: 0,
        }
    }

    /// Replace the whole sequence with a snapshot and follow its last record.
    pub fn replace_all(&mut self, mut records: Vec<LogRecord>) {
        records.sort_by(LogRecord::cmp_key);
        let mut seen = HashSet::with_capacity(records.len());
        records.retain(|r| seen.insert(r.id));

        self.rows = records
            .into_iter()
            .enumerate()
            .map(|(i, record)| LogRow {
                index: i + 1,
                record,
            })
            .collect();
        self.followed = self.rows.last().map(|row| row.record.id);
        self.after_mutation();
    }

    /// Ordered insert of a single record, which becomes the followed one.
    ///
    /// A row with the same id is replaced. Returns the row position.
    pub fn insert(&mut self, record: LogRecord) -> usize {
        let mut dirty_from = self.rows.len();
        if let Some(existing) = self.position_of(record.id) {
            self.rows.remove(existing);
            dirty_from = existing;
        }

        let key = record.ordering_key();
        let position = self
            .rows
            .partition_point(|row| row.record.ordering_key() <= key);
        let id = record.id;
        self.rows.insert(position, LogRow { index: 0, record });

        self.reindex_from(dirty_from.min(position));
        self.followed = Some(id);
        self.after_mutation();
        position
    }

    /// Drop the given records. Returns how many rows were removed.
    pub fn remove(&mut self, ids: &[RecordId]) -> usize {
        let doomed: HashSet<RecordId> = ids.iter().copied().collect();
        let before = self.rows.len();
        self.rows.retain(|row| !doomed.contains(&row.record.id));
        let removed = before - self.rows.len();
        if removed == 0 {
            return 0;
        }

        self.reindex_from(0);
        if self.followed.is_some_and(|id| doomed.contains(&id)) {
            self.followed = self.rows.last().map(|row| row.record.id);
        }
        self.after_mutation();
        removed
    }

    /// Follow a record chosen by the user. Ignored for ids not in the view.
    pub fn select(&mut self, id: RecordId) -> bool {
        if self.position_of(id).is_none() {
            return false;
        }
        self.followed = Some(id);
        self.recompute_page();
        true
    }

    /// Change the page size, keeping the followed record visible.
    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
        self.recompute_page();
    }

    /// Derive the page size from the rows that fit in the viewport.
    pub fn resize(&mut self, viewport_height: u32, row_height: u32) {
        self.set_page_size(rows_that_fit(viewport_height, row_height));
    }

    /// Zero-based position of `id`, if present.
    pub fn position_of(&self, id: RecordId) -> Option<usize> {
        self.rows.iter().position(|row| row.record.id == id)
    }

    /// Subject this view shows.
    pub fn subject(&self) -> Subject {
        self.subject
    }

    /// All rows in display order.
    pub fn rows(&self) -> &[LogRow] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the view has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Record the view scrolls to.
    pub fn followed(&self) -> Option<RecordId> {
        self.followed
    }

    /// Row of the followed record.
    pub fn followed_row(&self) -> Option<&LogRow> {
        self.followed
            .and_then(|id| self.position_of(id))
            .map(|pos| &self.rows[pos])
    }

    /// Rows per page.
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Zero-based index of the page holding the followed record.
    pub fn page_index(&self) -> usize {
        self.page_index
    }

    /// Number of pages; at least one.
    pub fn page_count(&self) -> usize {
        self.rows.len().div_ceil(self.page_size).max(1)
    }

    /// Rows on the current page.
    pub fn page(&self) -> &[LogRow] {
        let start = (self.page_index * self.page_size).min(self.rows.len());
        let end = (start + self.page_size).min(self.rows.len());
        &self.rows[start..end]
    }

    /// Rows at [`Level::Error`].
    pub fn error_count(&self) -> usize {
        self.error_count
    }

    /// Rows at [`Level::Warning`].
    pub fn warning_count(&self) -> usize {
        self.warning_count
    }

    fn reindex_from(&mut self, start: usize) {
        for (i, row) in self.rows.iter_mut().enumerate().skip(start) {
            row.index = i + 1;
        }
    }

    fn after_mutation(&mut self) {
        self.recount();
        self.recompute_page();
    }

    fn recount(&mut self) {
        self.error_count = self.count_level(Level::Error);
        self.warning_count = self.count_level(Level::Warning);
    }

    fn count_level(&self, level: Level) -> usize {
        self.rows
            .iter()
            .filter(|row| row.record.level == level)
            .count()
    }

    fn recompute_page(&mut self) {
        self.page_index = self
            .followed
            .and_then(|id| self.position_of(id))
            .map_or(0, |pos| pos / self.page_size);
    }
}

/// Whole rows of `row_height` that fit into `viewport_height`, at least one.
pub fn rows_that_fit(viewport_height: u32, row_height: u32) -> usize {
    if row_height == 0 {
        return 1;
    }
    usize::try_from(viewport_height / row_height)
        .unwrap_or(usize::MAX)
        .max(1)
}

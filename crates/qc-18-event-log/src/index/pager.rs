//! # Search Pager
//!
//! Client-side pagination over capped searches. Each page re-issues the query
//! with `from` moved up to the newest timestamp seen so far. Events sitting
//! exactly on that boundary come back again and are filtered out by id.

use std::collections::HashSet;

use shared_types::ObjectId;

use super::reader::BucketChainReader;
use crate::domain::{EventLogError, IndexedEvent, SearchQuery};
use crate::ports::BucketStore;

/// Iterates over every match of a query in pages of at most `page_size`.
#[derive(Debug, Clone)]
pub struct SearchPager {
    query: SearchQuery,
    page_size: usize,
    /// Ids already delivered whose timestamp equals `query.from`.
    boundary: HashSet<ObjectId>,
    exhausted: bool,
}

impl SearchPager {
    pub fn new(query: SearchQuery, page_size: usize) -> Self {
        Self {
            query,
            page_size: page_size.max(1),
            boundary: HashSet::new(),
            exhausted: false,
        }
    }

    /// The query the next page will run.
    pub fn query(&self) -> &SearchQuery {
        &self.query
    }

    /// Fetch the next page, `None` once every match has been delivered.
    ///
    /// A zero `to` is pinned to `now` on the first page so that all pages
    /// cover the same window.
    pub fn next_page<S: BucketStore>(
        &mut self,
        reader: &BucketChainReader,
        store: &S,
        now: i64,
    ) -> Result<Option<Vec<IndexedEvent>>, EventLogError> {
        if self.exhausted {
            return Ok(None);
        }
        if self.query.to == 0 {
            self.query.to = now;
        }

        // Boundary events sort first; leave room for a full page after them.
        let limit = self.page_size.saturating_add(self.boundary.len());
        let result = reader.search_with_limit(store, &self.query, now, limit)?;
        let last_when = result.last().map(|hit| hit.event.when);

        let fresh: Vec<IndexedEvent> = result
            .events
            .into_iter()
            .filter(|hit| !self.boundary.contains(&hit.id))
            .collect();

        match last_when {
            Some(last) if result.truncated => {
                if last != self.query.from {
                    self.boundary.clear();
                    self.query.from = last;
                }
                self.boundary.extend(
                    fresh
                        .iter()
                        .filter(|hit| hit.event.when == last)
                        .map(|hit| hit.id),
                );
            }
            _ => self.exhausted = true,
        }

        if fresh.is_empty() {
            self.exhausted = true;
            return Ok(None);
        }
        Ok(Some(fresh))
    }

    /// Drain every remaining page into one vector.
    pub fn collect_all<S: BucketStore>(
        mut self,
        reader: &BucketChainReader,
        store: &S,
        now: i64,
    ) -> Result<Vec<IndexedEvent>, EventLogError> {
        let mut all = Vec::new();
        while let Some(page) = self.next_page(reader, store, now)? {
            all.extend(page);
        }
        Ok(all)
    }
}

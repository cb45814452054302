//! Cursor bookkeeping for paginated backend endpoints.

use std::collections::HashSet;

use crate::transport::ApiError;

/// Tracks one sequential walk over a cursor-paginated endpoint.
///
/// Callers ask [`CursorWalk::begin_page`] before each request and feed the
/// page envelope back through [`CursorWalk::advance`]. A cursor is never
/// requested twice.
#[derive(Debug)]
pub(crate) struct CursorWalk {
    max_pages: Option<usize>,
    pages: usize,
    cursor: Option<String>,
    seen: HashSet<String>,
    finished: bool,
}

impl CursorWalk {
    pub(crate) fn new(max_pages: Option<usize>) -> Self {
        Self {
            max_pages,
            pages: 0,
            cursor: None,
            seen: HashSet::new(),
            finished: false,
        }
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.finished
    }

    pub(crate) fn pages(&self) -> usize {
        self.pages
    }

    /// Cursor for the next request, `None` on the first page.
    pub(crate) fn begin_page(&mut self) -> Result<Option<String>, ApiError> {
        if let Some(limit) = self.max_pages {
            if self.pages >= limit {
                return Err(ApiError::PageLimit { limit });
            }
        }
        self.pages += 1;
        Ok(self.cursor.clone())
    }

    pub(crate) fn advance(
        &mut self,
        has_more: bool,
        next_cursor: Option<String>,
    ) -> Result<(), ApiError> {
        if !has_more {
            self.finished = true;
            return Ok(());
        }

        let cursor = next_cursor
            .filter(|cursor| !cursor.is_empty())
            .ok_or(ApiError::MissingCursor { page: self.pages })?;
        if !self.seen.insert(cursor.clone()) {
            return Err(ApiError::CursorLoop { cursor });
        }
        self.cursor = Some(cursor);
        Ok(())
    }
}

// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Ordinal Window Resolution
//!
//! Maps a 1-based `[start, end]` window over an ordered view of the store
//! onto a selection by identity. Identity orders resolve to an inclusive
//! identity range; for descending views the first ordinal holds the larger
//! identity, so the bounds come out swapped. Name order does not follow
//! identities and resolves to an identity set instead.

use crate::error::ExportError;
use crate::source::{
    Category, IdMatch, ListOrder, OrderedView, RecordHandle, RecordSource, Selection, SortOrder,
};

/// A validated 1-based inclusive ordinal window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionWindow {
    start: usize,
    end: usize,
}

impl SelectionWindow {
    /// Validates `1 <= start <= end`.
    pub fn new(start: usize, end: usize) -> Result<Self, ExportError> {
        if start < 1 || start > end {
            return Err(ExportError::InvalidWindow { start, end });
        }
        Ok(SelectionWindow { start, end })
    }

    /// A window covering one ordinal.
    pub fn single(ordinal: usize) -> Result<Self, ExportError> {
        Self::new(ordinal, ordinal)
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    /// Number of ordinals covered.
    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    /// Always false; a valid window covers at least one ordinal.
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Resolves windows against a record source.
pub struct RangeResolver<'a, S: ?Sized> {
    source: &'a S,
}

impl<'a, S: RecordSource + ?Sized> RangeResolver<'a, S> {
    pub fn new(source: &'a S) -> Self {
        RangeResolver { source }
    }

    /// Resolves `window` to a selection over `category`.
    ///
    /// A start past the last record fails with `WindowOutOfRange`; an end
    /// past the last record is clamped to it.
    pub fn resolve(
        &self,
        category: Category,
        window: &SelectionWindow,
        order: SortOrder,
    ) -> Result<Selection, ExportError> {
        let list_order = ListOrder::for_category(category, order);
        let mut view = self.source.open_ordered(category, list_order)?;

        let ids = if list_order == ListOrder::NameAscending {
            let handles = view.range(window.start, window.end)?;
            let Some(first) = handles.first() else {
                return Err(self.out_of_range(category, window));
            };
            if handles.len() == 1 {
                IdMatch::Exact(first.id)
            } else {
                IdMatch::Set(handles.iter().map(|handle| handle.id).collect())
            }
        } else {
            let Some(first) = view.seek(window.start)? else {
                return Err(self.out_of_range(category, window));
            };
            let last = self.last_in_window(view.as_mut(), category, window, &first)?;
            match list_order {
                _ if last.id == first.id => IdMatch::Exact(first.id),
                ListOrder::IdDescending => IdMatch::Range {
                    low: last.id,
                    high: first.id,
                },
                _ => IdMatch::Range {
                    low: first.id,
                    high: last.id,
                },
            }
        };

        tracing::debug!(
            ?category,
            start = window.start,
            end = window.end,
            ?ids,
            "resolved window"
        );
        Ok(Selection {
            category,
            ids,
            order: list_order,
        })
    }

    fn out_of_range(&self, category: Category, window: &SelectionWindow) -> ExportError {
        match self.source.count(category) {
            Ok(size) => ExportError::WindowOutOfRange {
                start: window.start,
                size,
            },
            Err(e) => e.into(),
        }
    }

    fn last_in_window<V: OrderedView + ?Sized>(
        &self,
        view: &mut V,
        category: Category,
        window: &SelectionWindow,
        first: &RecordHandle,
    ) -> Result<RecordHandle, ExportError> {
        if window.end == window.start {
            return Ok(first.clone());
        }
        if let Some(last) = view.seek(window.end)? {
            return Ok(last);
        }
        let size = self.source.count(category)?;
        Ok(view.seek(size)?.unwrap_or_else(|| first.clone()))
    }
}

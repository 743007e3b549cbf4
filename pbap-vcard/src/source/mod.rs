// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Record Source Module
//!
//! The ordered, queryable store the export engine reads from. The engine
//! only relies on forward positional access by ordinal (`OrderedView`) and
//! on record-at-a-time cursors (`RecordCursor`); it never materializes a
//! whole collection.

mod migration;
mod record;
mod sqlite;

pub use migration::{all_migrations, Migration, MigrationRunner};
pub use record::{
    CallRecord, CallType, ContactRecord, LabeledValue, PhoneKind, PhoneNumber, Presentation,
};
pub use sqlite::SqliteRecordSource;

use thiserror::Error;

/// Record store errors.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("Record {0} no longer exists")]
    Vanished(i64),

    #[error("Corrupt record: {0}")]
    Corrupt(String),

    #[error("Cursor exhausted")]
    Exhausted,
}

/// Record collection addressed by an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// Contacts in visible groups.
    Phonebook,
    IncomingCalls,
    OutgoingCalls,
    MissedCalls,
    /// All call-log entries.
    CombinedCalls,
}

impl Category {
    /// Returns true for the call-log categories.
    pub fn is_call_log(self) -> bool {
        !matches!(self, Category::Phonebook)
    }

    /// Call type a call-log category is restricted to.
    pub fn call_type(self) -> Option<CallType> {
        match self {
            Category::IncomingCalls => Some(CallType::Incoming),
            Category::OutgoingCalls => Some(CallType::Outgoing),
            Category::MissedCalls => Some(CallType::Missed),
            Category::Phonebook | Category::CombinedCalls => None,
        }
    }
}

/// Contact ordering requested by the peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// By store identity.
    #[default]
    Indexed,
    /// By display name.
    Alphabetical,
}

/// Concrete ordering of a view over one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListOrder {
    IdAscending,
    /// Most recent first; used for call logs.
    IdDescending,
    NameAscending,
}

impl ListOrder {
    /// Resolves the ordering used for `category`.
    ///
    /// Call logs are always most-recent-first; `order` only applies to contacts.
    pub fn for_category(category: Category, order: SortOrder) -> Self {
        match (category.is_call_log(), order) {
            (true, _) => ListOrder::IdDescending,
            (false, SortOrder::Indexed) => ListOrder::IdAscending,
            (false, SortOrder::Alphabetical) => ListOrder::NameAscending,
        }
    }
}

/// Identity and position of one record in an ordered view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordHandle {
    pub id: i64,
    /// 1-based position in the view.
    pub ordinal: usize,
    /// Display name (contacts) or cached caller name (calls).
    pub name: Option<String>,
}

/// Identity predicate of a selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdMatch {
    Exact(i64),
    /// Inclusive identity bounds.
    Range { low: i64, high: i64 },
    Set(Vec<i64>),
    All,
}

/// Records to compose, and the order to compose them in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub category: Category,
    pub ids: IdMatch,
    pub order: ListOrder,
}

impl Selection {
    /// Selects a whole category in its natural order.
    pub fn all(category: Category) -> Self {
        Selection {
            category,
            ids: IdMatch::All,
            order: ListOrder::for_category(category, SortOrder::Indexed),
        }
    }
}

/// Forward positional access into one ordered view.
pub trait OrderedView {
    /// Returns the record at a 1-based ordinal, or `None` past the end.
    fn seek(&mut self, ordinal: usize) -> Result<Option<RecordHandle>, SourceError>;

    /// Returns the records at ordinals `start..=end` in one pass, stopping at
    /// the end of the view. Empty when `start` is 0 or past the end.
    fn range(&mut self, start: usize, end: usize) -> Result<Vec<RecordHandle>, SourceError>;
}

/// Record-at-a-time cursor over a selection.
pub trait RecordCursor<T> {
    /// Whether another record remains.
    fn has_next(&self) -> bool;

    /// Loads the next record.
    ///
    /// Fails with `Vanished` when the record was deleted after selection.
    fn advance(&mut self) -> Result<T, SourceError>;
}

/// The ordered, queryable store of contacts and call-log entries.
pub trait RecordSource {
    /// Number of records in a category.
    fn count(&self, category: Category) -> Result<usize, SourceError>;

    /// Opens an ordered view over a category.
    fn open_ordered(
        &self,
        category: Category,
        order: ListOrder,
    ) -> Result<Box<dyn OrderedView + '_>, SourceError>;

    /// Opens a cursor over the contacts matched by `selection`.
    fn select_contacts(
        &self,
        selection: &Selection,
    ) -> Result<Box<dyn RecordCursor<ContactRecord> + '_>, SourceError>;

    /// Opens a cursor over the call-log entries matched by `selection`.
    fn select_calls(
        &self,
        selection: &Selection,
    ) -> Result<Box<dyn RecordCursor<CallRecord> + '_>, SourceError>;

    /// Visible contacts with a phone number exactly equal to `number`,
    /// ordered by identity. An empty `number` matches every visible contact.
    fn lookup_by_number(&self, number: &str) -> Result<Vec<RecordHandle>, SourceError>;
}

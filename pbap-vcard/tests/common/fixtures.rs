// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Test Fixtures
//!
//! Names and values avoid the letter pairs `im` and `sip` so the IM/SIP
//! suppression does not remove lines the tests look for.

use std::cell::Cell;

use pbap_vcard::{
    CallRecord, CallType, Category, ContactRecord, ListOrder, OrderedView, PhoneKind,
    Presentation, RecordCursor, RecordHandle, RecordSource, Selection, SourceError,
    SqliteRecordSource,
};

/// 2023-11-14T22:13:20Z
pub const BASE_DATE_MS: i64 = 1_700_000_000_000;

/// Fully populated contact.
pub fn rich_contact() -> ContactRecord {
    ContactRecord::new("Anna Berg")
        .with_name("Anna", "Berg")
        .with_nickname("Annie")
        .with_phone(PhoneKind::Mobile, "(555) 123-4567")
        .with_email("HOME", "anna@berg.example")
        .with_address("HOME", "1 Harbour Road")
        .with_organization("Acme", "Engineer")
        .with_website("https://berg.example")
        .with_note("Met at the conference")
        .with_birthday("1990-04-01")
}

/// Phonebook of plain contacts, one mobile number each; returns the identities
/// in insertion order.
pub fn phonebook(names: &[&str]) -> (SqliteRecordSource, Vec<i64>) {
    let source = SqliteRecordSource::in_memory().unwrap();
    let ids = names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let number = format!("555010{}", i);
            let contact = ContactRecord::new(name).with_phone(PhoneKind::Mobile, &number);
            source.insert_contact(&contact).unwrap()
        })
        .collect();
    (source, ids)
}

/// Default phonebook: five contacts, Anna to Eva.
pub fn default_phonebook() -> (SqliteRecordSource, Vec<i64>) {
    phonebook(&["Anna Berg", "Carl Dahl", "Eva Falk", "Gus Hall", "Jon Kross"])
}

/// Call log with alternating call types, oldest first; returns identities in
/// insertion order.
pub fn call_log() -> (SqliteRecordSource, Vec<i64>) {
    let source = SqliteRecordSource::in_memory().unwrap();
    let calls = [
        CallRecord::new(CallType::Incoming, "5550100", BASE_DATE_MS)
            .with_name("Anna Berg", PhoneKind::Mobile),
        CallRecord::new(CallType::Outgoing, "5550101", BASE_DATE_MS + 60_000),
        CallRecord::new(CallType::Missed, "5550102", BASE_DATE_MS + 120_000)
            .with_presentation(Presentation::Restricted),
        CallRecord::new(CallType::Incoming, "5550103", BASE_DATE_MS + 180_000),
        CallRecord::new(CallType::Missed, "5550104", BASE_DATE_MS + 240_000)
            .with_name("Carl Dahl", PhoneKind::Work),
        CallRecord::new(CallType::Incoming, "5550105", BASE_DATE_MS + 300_000),
    ];
    let ids = calls
        .iter()
        .map(|call| source.insert_call(call).unwrap())
        .collect();
    (source, ids)
}

/// Splits exported output into individual vCards.
pub fn split_vcards(output: &str) -> Vec<String> {
    output
        .split_inclusive("END:VCARD\n")
        .map(str::to_string)
        .collect()
}

/// Record source wrapper that counts store accesses.
pub struct CountingSource<S> {
    pub inner: S,
    calls: Cell<usize>,
    view_queries: Cell<usize>,
}

impl<S> CountingSource<S> {
    pub fn new(inner: S) -> Self {
        CountingSource {
            inner,
            calls: Cell::new(0),
            view_queries: Cell::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }

    /// Positional lookups issued through views this source opened.
    pub fn view_queries(&self) -> usize {
        self.view_queries.get()
    }

    fn hit(&self) {
        self.calls.set(self.calls.get() + 1);
    }
}

struct CountingView<'a> {
    inner: Box<dyn OrderedView + 'a>,
    queries: &'a Cell<usize>,
}

impl OrderedView for CountingView<'_> {
    fn seek(&mut self, ordinal: usize) -> Result<Option<RecordHandle>, SourceError> {
        self.queries.set(self.queries.get() + 1);
        self.inner.seek(ordinal)
    }

    fn range(&mut self, start: usize, end: usize) -> Result<Vec<RecordHandle>, SourceError> {
        self.queries.set(self.queries.get() + 1);
        self.inner.range(start, end)
    }
}

impl<S: RecordSource> RecordSource for CountingSource<S> {
    fn count(&self, category: Category) -> Result<usize, SourceError> {
        self.hit();
        self.inner.count(category)
    }

    fn open_ordered(
        &self,
        category: Category,
        order: ListOrder,
    ) -> Result<Box<dyn OrderedView + '_>, SourceError> {
        self.hit();
        Ok(Box::new(CountingView {
            inner: self.inner.open_ordered(category, order)?,
            queries: &self.view_queries,
        }))
    }

    fn select_contacts(
        &self,
        selection: &Selection,
    ) -> Result<Box<dyn RecordCursor<ContactRecord> + '_>, SourceError> {
        self.hit();
        self.inner.select_contacts(selection)
    }

    fn select_calls(
        &self,
        selection: &Selection,
    ) -> Result<Box<dyn RecordCursor<CallRecord> + '_>, SourceError> {
        self.hit();
        self.inner.select_calls(selection)
    }

    fn lookup_by_number(&self, number: &str) -> Result<Vec<RecordHandle>, SourceError> {
        self.hit();
        self.inner.lookup_by_number(number)
    }
}

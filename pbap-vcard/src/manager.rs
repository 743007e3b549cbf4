// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Phonebook Manager
//!
//! The operations the phonebook access service calls: collection sizes,
//! name listings, owner record, windowed and single-entry exports.

use std::collections::HashSet;

use crate::cancel::AbortSignal;
use crate::composer::{compose_owner_vcard, display_name, VCardVersion};
use crate::config::ExportConfig;
use crate::error::{ExportError, ExportOutcome, ExportResult, ResponseCode};
use crate::export::{ExportOrchestrator, ExportRequest};
use crate::sink::Transport;
use crate::source::{Category, ListOrder, RecordHandle, RecordSource, Selection, SortOrder};

/// Status returned to the service after an export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportStatus {
    pub code: ResponseCode,
    pub outcome: ExportOutcome,
    pub records_written: usize,
    pub reason: Option<String>,
}

/// Phonebook operations over one record source.
pub struct PhonebookManager<S> {
    source: S,
    config: ExportConfig,
}

impl<S: RecordSource> PhonebookManager<S> {
    pub fn new(source: S, config: ExportConfig) -> Self {
        PhonebookManager { source, config }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Number of entries in `category`; the phonebook counts the owner record.
    pub fn collection_size(&self, category: Category) -> ExportResult<usize> {
        let count = self.source.count(category)?;
        Ok(match category {
            Category::Phonebook => count + 1,
            _ => count,
        })
    }

    /// Contact listing as `name,id` strings, preceded by the owner name.
    pub fn ordered_name_list(&self, order: SortOrder) -> ExportResult<Vec<String>> {
        let list_order = ListOrder::for_category(Category::Phonebook, order);
        let mut view = self.source.open_ordered(Category::Phonebook, list_order)?;

        let mut names = vec![self.owner_name().to_string()];
        for handle in view.range(1, usize::MAX)? {
            names.push(self.listing_entry(&handle));
        }
        Ok(names)
    }

    /// Contacts owning `number` exactly, as deduplicated `name,id` strings.
    ///
    /// An empty number lists every contact.
    pub fn names_by_number(&self, number: &str) -> ExportResult<Vec<String>> {
        let mut seen = HashSet::new();
        Ok(self
            .source
            .lookup_by_number(number)?
            .iter()
            .map(|handle| self.listing_entry(handle))
            .filter(|entry| seen.insert(entry.clone()))
            .collect())
    }

    /// Caller names of a call-log category, most recent first.
    pub fn call_history_names(&self, category: Category) -> ExportResult<Vec<String>> {
        if !category.is_call_log() {
            return Err(ExportError::UnsupportedCategory(category));
        }
        let mut cursor = self.source.select_calls(&Selection::all(category))?;
        let mut names = Vec::new();
        while cursor.has_next() {
            let call = cursor.advance()?;
            names.push(display_name(&call, &self.config.unknown_number_label));
        }
        Ok(names)
    }

    /// The owner record as a standalone vCard.
    pub fn owner_vcard(&self, version: VCardVersion) -> String {
        compose_owner_vcard(
            self.owner_name(),
            &self.config.owner_number,
            version,
            self.config.fold_width,
        )
    }

    /// Exports the records at ordinals `request.start..=request.end`.
    pub fn export_window<T: Transport>(
        &self,
        request: &ExportRequest,
        transport: T,
        signal: &AbortSignal,
    ) -> ExportStatus {
        let report = ExportOrchestrator::new(&self.source, &self.config, signal)
            .export_range(request, transport);
        ExportStatus {
            code: report.response_code(),
            outcome: report.outcome,
            records_written: report.records_written,
            reason: report.reason(),
        }
    }

    /// Exports the single contact at a 1-based `offset`.
    ///
    /// Order, version, filter and owner record come from `template`; its
    /// category and window are replaced.
    pub fn export_single<T: Transport>(
        &self,
        offset: usize,
        template: &ExportRequest,
        transport: T,
        signal: &AbortSignal,
    ) -> ExportStatus {
        let request = ExportRequest {
            category: Category::Phonebook,
            start: offset,
            end: offset,
            ..template.clone()
        };
        self.export_window(&request, transport, signal)
    }

    fn owner_name(&self) -> &str {
        if self.config.owner_name.is_empty() {
            &self.config.unknown_name_label
        } else {
            &self.config.owner_name
        }
    }

    fn listing_entry(&self, handle: &RecordHandle) -> String {
        let name = handle
            .name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.config.unknown_name_label);
        format!("{},{}", name, handle.id)
    }
}

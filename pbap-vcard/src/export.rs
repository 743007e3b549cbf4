// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Export Orchestrator
//!
//! Drives one windowed export: resolve the window, compose each record,
//! filter it, strip telephone punctuation and write it to the sink. The
//! abort signal is checked before every record. Every failure ends the
//! export; nothing is retried.

use crate::cancel::{AbortSignal, SignalLease};
use crate::composer::{
    CallLogComposer, ComposeOptions, ContactComposer, RecordComposer, VCardVersion,
};
use crate::config::ExportConfig;
use crate::error::{ExportError, ExportOutcome, ExportResult, ResponseCode};
use crate::filter::{FilterMask, PropertyFilter};
use crate::phone::strip_telephone_formatting;
use crate::range::{RangeResolver, SelectionWindow};
use crate::sink::{StreamSink, Transport};
use crate::source::{Category, RecordSource, SortOrder};

/// Parameters of one windowed export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRequest {
    pub category: Category,
    /// First ordinal, 1-based.
    pub start: usize,
    /// Last ordinal, inclusive.
    pub end: usize,
    pub version: VCardVersion,
    pub order: SortOrder,
    /// Written before any record when present.
    pub owner_vcard: Option<String>,
    /// Peer property mask; `None` keeps every filterable property.
    pub filter: Option<FilterMask>,
    /// Skips the property filter entirely.
    pub ignore_filter: bool,
}

impl ExportRequest {
    pub fn new(category: Category, start: usize, end: usize) -> Self {
        ExportRequest {
            category,
            start,
            end,
            version: VCardVersion::default(),
            order: SortOrder::default(),
            owner_vcard: None,
            filter: None,
            ignore_filter: false,
        }
    }

    pub fn version(mut self, version: VCardVersion) -> Self {
        self.version = version;
        self
    }

    pub fn order(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }

    pub fn owner_vcard(mut self, vcard: String) -> Self {
        self.owner_vcard = Some(vcard);
        self
    }

    pub fn filter(mut self, mask: FilterMask) -> Self {
        self.filter = Some(mask);
        self
    }

    pub fn ignore_filter(mut self) -> Self {
        self.ignore_filter = true;
        self
    }
}

/// Orchestrator progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportState {
    Idle,
    Resolving,
    Composing,
    Filtering,
    Writing,
    /// Terminal.
    Finished(ExportOutcome),
}

/// Result of one export call.
#[derive(Debug)]
pub struct ExportReport {
    pub outcome: ExportOutcome,
    /// Records written, the owner vCard excluded.
    pub records_written: usize,
    /// The failure that ended the export, if any.
    pub error: Option<ExportError>,
}

impl ExportReport {
    /// Diagnostic reason for a failed export.
    pub fn reason(&self) -> Option<String> {
        match (&self.error, self.outcome) {
            (Some(e), _) => Some(e.to_string()),
            (None, ExportOutcome::Aborted) => Some("aborted by peer".to_string()),
            (None, _) => None,
        }
    }

    /// Response code sent to the peer.
    pub fn response_code(&self) -> ResponseCode {
        match (&self.error, self.outcome) {
            (_, ExportOutcome::Success) => ResponseCode::Ok,
            (Some(e), _) => e.response_code(),
            (None, _) => ResponseCode::InternalError,
        }
    }
}

/// Single-use driver for one export.
pub struct ExportOrchestrator<'a, S: ?Sized> {
    source: &'a S,
    config: &'a ExportConfig,
    signal: &'a AbortSignal,
    state: ExportState,
}

impl<'a, S: RecordSource + ?Sized> ExportOrchestrator<'a, S> {
    pub fn new(source: &'a S, config: &'a ExportConfig, signal: &'a AbortSignal) -> Self {
        ExportOrchestrator {
            source,
            config,
            signal,
            state: ExportState::Idle,
        }
    }

    pub fn state(&self) -> ExportState {
        self.state
    }

    /// Runs the export and reports its outcome.
    ///
    /// The transport is closed on every path. A second call fails.
    pub fn export_range<T: Transport>(
        &mut self,
        request: &ExportRequest,
        transport: T,
    ) -> ExportReport {
        if self.state != ExportState::Idle {
            return ExportReport {
                outcome: ExportOutcome::InternalError,
                records_written: 0,
                error: Some(ExportError::OrchestratorReused),
            };
        }

        let mut records_written = 0;
        let report = match self.run(request, transport, &mut records_written) {
            Ok(outcome) => {
                if outcome == ExportOutcome::Aborted {
                    tracing::warn!(records_written, "export aborted");
                } else {
                    tracing::debug!(records_written, "export finished");
                }
                ExportReport {
                    outcome,
                    records_written,
                    error: None,
                }
            }
            Err(e) => {
                if e.response_code() == ResponseCode::BadRequest {
                    tracing::warn!(error = %e, "export rejected");
                } else {
                    tracing::error!(error = %e, records_written, "export failed");
                }
                ExportReport {
                    outcome: ExportOutcome::InternalError,
                    records_written,
                    error: Some(e),
                }
            }
        };
        self.transition(ExportState::Finished(report.outcome));
        report
    }

    fn run<T: Transport>(
        &mut self,
        request: &ExportRequest,
        transport: T,
        records_written: &mut usize,
    ) -> ExportResult<ExportOutcome> {
        let window = SelectionWindow::new(request.start, request.end)?;
        let filter = if request.ignore_filter {
            None
        } else {
            Some(PropertyFilter::from_mask(request.filter.as_ref())?)
        };
        let signal = self.signal;
        let lease = signal.claim()?;

        self.transition(ExportState::Resolving);
        let selection =
            RangeResolver::new(self.source).resolve(request.category, &window, request.order)?;

        self.transition(ExportState::Composing);
        let photo_requested = filter.as_ref().map_or(true, |f| f.is_photo_included());
        let options = ComposeOptions::new(request.version, self.config, photo_requested);
        let mut composer: Box<dyn RecordComposer + 'a> = if request.category.is_call_log() {
            Box::new(CallLogComposer::init(self.source, &selection, options)?)
        } else {
            Box::new(ContactComposer::init(self.source, &selection, options)?)
        };

        let mut sink = StreamSink::new(transport, request.owner_vcard.clone());
        let pumped = self.pump(
            &lease,
            composer.as_mut(),
            &mut sink,
            filter.as_ref(),
            request,
        );
        composer.close();
        *records_written = sink.records_written();
        let closed = sink.close();

        let outcome = pumped?;
        closed?;
        Ok(outcome)
    }

    fn pump<T: Transport>(
        &mut self,
        lease: &SignalLease<'_>,
        composer: &mut (dyn RecordComposer + 'a),
        sink: &mut StreamSink<T>,
        filter: Option<&PropertyFilter>,
        request: &ExportRequest,
    ) -> ExportResult<ExportOutcome> {
        sink.on_init()?;

        while composer.has_more() {
            if lease.take() {
                return Ok(ExportOutcome::Aborted);
            }

            self.transition(ExportState::Composing);
            let vcard = match composer.next_entry() {
                Ok(vcard) => vcard,
                Err(e) => {
                    tracing::error!(
                        reason = composer.error_reason().unwrap_or_default(),
                        written = sink.records_written(),
                        "composer failed"
                    );
                    return Err(e);
                }
            };

            // Call-log entries are written as composed.
            let vcard = if request.category.is_call_log() {
                vcard
            } else {
                self.transition(ExportState::Filtering);
                match filter {
                    Some(filter) => {
                        strip_telephone_formatting(&filter.apply(&vcard, request.version))
                    }
                    None => strip_telephone_formatting(&vcard),
                }
            };

            self.transition(ExportState::Writing);
            sink.on_entry(&vcard)?;
        }

        Ok(ExportOutcome::Success)
    }

    fn transition(&mut self, next: ExportState) {
        if self.state != next {
            tracing::trace!(from = ?self.state, to = ?next, "export state");
            self.state = next;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MockTransport;
    use crate::source::{ContactRecord, PhoneKind, SqliteRecordSource};

    fn source_with(names: &[&str]) -> SqliteRecordSource {
        let source = SqliteRecordSource::in_memory().unwrap();
        for name in names {
            source
                .insert_contact(&ContactRecord::new(name).with_phone(PhoneKind::Home, "555 0100"))
                .unwrap();
        }
        source
    }

    #[test]
    fn test_state_reaches_finished() {
        let source = source_with(&["Anna", "Bert"]);
        let config = ExportConfig::default();
        let signal = AbortSignal::new();
        let mut orchestrator = ExportOrchestrator::new(&source, &config, &signal);
        assert_eq!(orchestrator.state(), ExportState::Idle);

        let mut transport = MockTransport::new();
        let report = orchestrator.export_range(
            &ExportRequest::new(Category::Phonebook, 1, 2),
            &mut transport,
        );
        assert_eq!(report.outcome, ExportOutcome::Success);
        assert_eq!(report.records_written, 2);
        assert_eq!(
            orchestrator.state(),
            ExportState::Finished(ExportOutcome::Success)
        );
        assert!(transport.output().contains("TEL;HOME:5550100\n"));
    }

    #[test]
    fn test_orchestrator_is_single_use() {
        let source = source_with(&["Anna"]);
        let config = ExportConfig::default();
        let signal = AbortSignal::new();
        let mut orchestrator = ExportOrchestrator::new(&source, &config, &signal);
        let request = ExportRequest::new(Category::Phonebook, 1, 1);
        orchestrator.export_range(&request, MockTransport::new());

        let report = orchestrator.export_range(&request, MockTransport::new());
        assert!(matches!(
            report.error,
            Some(ExportError::OrchestratorReused)
        ));
    }

    #[test]
    fn test_busy_signal_is_internal_error() {
        let source = source_with(&["Anna"]);
        let config = ExportConfig::default();
        let signal = AbortSignal::new();
        let _other_export = signal.claim().unwrap();

        let mut transport = MockTransport::new();
        let report = ExportOrchestrator::new(&source, &config, &signal)
            .export_range(&ExportRequest::new(Category::Phonebook, 1, 1), &mut transport);
        assert!(matches!(report.error, Some(ExportError::SignalBusy)));
        assert_eq!(report.response_code(), ResponseCode::InternalError);
        assert_eq!(transport.open_count(), 0);
    }

    #[test]
    fn test_abort_reason() {
        let report = ExportReport {
            outcome: ExportOutcome::Aborted,
            records_written: 0,
            error: None,
        };
        assert_eq!(report.response_code(), ResponseCode::InternalError);
        assert_eq!(report.reason().as_deref(), Some("aborted by peer"));
    }
}

// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! PBAP vCard Export Library
//!
//! Streams contacts and call history to a phonebook access peer as vCard
//! 2.1/3.0 records, one ordinal window at a time, with peer-side property
//! filtering and cooperative cancellation.

pub mod cancel;
pub mod composer;
pub mod config;
pub mod error;
pub mod export;
pub mod filter;
pub mod manager;
pub mod phone;
pub mod range;
pub mod sink;
pub mod source;

pub use cancel::{AbortSignal, SignalLease};
pub use composer::{
    compose_call, compose_contact, compose_owner_vcard, CallLogComposer, ComposeOptions,
    ContactComposer, RecordComposer, VCardBuilder, VCardVersion,
};
pub use config::{
    ConfigError, ExportConfig, DEFAULT_UNKNOWN_NAME_LABEL, DEFAULT_UNKNOWN_NUMBER_LABEL,
};
pub use error::{ExportError, ExportOutcome, ExportResult, ResponseCode};
pub use export::{ExportOrchestrator, ExportReport, ExportRequest, ExportState};
pub use filter::{FilterError, FilterMask, PropertyFilter};
pub use manager::{ExportStatus, PhonebookManager};
pub use phone::{strip_telephone_formatting, translate_pause_wait};
pub use range::{RangeResolver, SelectionWindow};
pub use sink::{MockTransport, StreamSink, Transport, TransportError, WriterTransport};
pub use source::{
    CallRecord, CallType, Category, ContactRecord, IdMatch, ListOrder, OrderedView, PhoneKind,
    Presentation, RecordCursor, RecordHandle, RecordSource, Selection, SortOrder, SourceError,
    SqliteRecordSource,
};

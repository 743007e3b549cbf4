// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Export Error Types
//!
//! Unified error type for the export pipeline and its mapping onto the
//! response codes the phonebook access service sends to the peer.

use thiserror::Error;

use crate::filter::FilterError;
use crate::sink::TransportError;
use crate::source::{Category, SourceError};

/// Response code reported to the surrounding service.
///
/// Values are the OBEX response codes (final bit set).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseCode {
    /// Request served.
    Ok,
    /// Request rejected because of caller-supplied parameters.
    BadRequest,
    /// Request failed on our side.
    InternalError,
}

impl ResponseCode {
    /// Returns the OBEX wire value.
    pub fn as_obex(self) -> u8 {
        match self {
            ResponseCode::Ok => 0xA0,
            ResponseCode::BadRequest => 0xC0,
            ResponseCode::InternalError => 0xD0,
        }
    }

    /// Returns true for the success code.
    pub fn is_ok(self) -> bool {
        self == ResponseCode::Ok
    }
}

/// Terminal result of one export call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportOutcome {
    /// Every record in the window was written.
    Success,
    /// The export stopped on a failure.
    InternalError,
    /// A cancellation was observed between records.
    Aborted,
}

/// Errors raised inside the export pipeline.
#[derive(Error, Debug)]
pub enum ExportError {
    /// Window violates `1 <= start <= end`.
    #[error("invalid window: start {start}, end {end}")]
    InvalidWindow { start: usize, end: usize },

    /// Window starts past the last record of the collection.
    #[error("window start {start} beyond collection of {size} records")]
    WindowOutOfRange { start: usize, size: usize },

    /// Record store could not be queried.
    #[error("record store unavailable: {0}")]
    StoreUnavailable(#[from] SourceError),

    /// A record could not be rendered as a vCard.
    #[error("failed to compose record: {0}")]
    EncodingFailed(String),

    /// Filter mask is too short for the requested bits.
    #[error(transparent)]
    MalformedFilter(#[from] FilterError),

    /// Output transport failed.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The cancellation signal is owned by another export.
    #[error("abort signal already claimed by another export")]
    SignalBusy,

    /// The operation does not apply to this category.
    #[error("operation not supported for {0:?}")]
    UnsupportedCategory(Category),

    /// An orchestrator was asked to run a second export.
    #[error("export orchestrator already used")]
    OrchestratorReused,
}

impl ExportError {
    /// Maps the error onto the response code sent to the peer.
    pub fn response_code(&self) -> ResponseCode {
        match self {
            ExportError::InvalidWindow { .. }
            | ExportError::WindowOutOfRange { .. }
            | ExportError::MalformedFilter(_)
            | ExportError::UnsupportedCategory(_) => ResponseCode::BadRequest,
            ExportError::StoreUnavailable(_)
            | ExportError::EncodingFailed(_)
            | ExportError::Transport(_)
            | ExportError::SignalBusy
            | ExportError::OrchestratorReused => ResponseCode::InternalError,
        }
    }
}

/// Result alias for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

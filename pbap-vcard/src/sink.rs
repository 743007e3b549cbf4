// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Stream Sink
//!
//! Writes encoded vCards to the transport that carries them to the peer,
//! one entry at a time, optionally preceded by the owner vCard.

use std::io::Write;

use thiserror::Error;

use crate::cancel::AbortSignal;
use crate::error::ExportError;

/// Transport errors.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Output stream is not open")]
    NotOpen,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Transport rejected the operation: {0}")]
    Rejected(String),
}

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Byte stream towards the remote peer.
///
/// Synchronous: `write` may block until the bytes are accepted.
pub trait Transport {
    /// Opens the output stream.
    fn open(&mut self) -> TransportResult<()>;

    /// Writes one chunk.
    fn write(&mut self, bytes: &[u8]) -> TransportResult<()>;

    /// Closes the output stream. Safe to call when not open.
    fn close(&mut self) -> TransportResult<()>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn open(&mut self) -> TransportResult<()> {
        (**self).open()
    }

    fn write(&mut self, bytes: &[u8]) -> TransportResult<()> {
        (**self).write(bytes)
    }

    fn close(&mut self) -> TransportResult<()> {
        (**self).close()
    }
}

/// Transport over any `std::io::Write`.
#[derive(Debug)]
pub struct WriterTransport<W: Write> {
    writer: W,
    open: bool,
}

impl<W: Write> WriterTransport<W> {
    pub fn new(writer: W) -> Self {
        WriterTransport {
            writer,
            open: false,
        }
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Transport for WriterTransport<W> {
    fn open(&mut self) -> TransportResult<()> {
        self.open = true;
        Ok(())
    }

    fn write(&mut self, bytes: &[u8]) -> TransportResult<()> {
        if !self.open {
            return Err(TransportError::NotOpen);
        }
        self.writer.write_all(bytes)?;
        Ok(())
    }

    fn close(&mut self) -> TransportResult<()> {
        if self.open {
            self.open = false;
            self.writer.flush()?;
        }
        Ok(())
    }
}

/// In-memory transport for testing.
///
/// Records every write and can inject failures or raise an abort after a
/// given number of writes.
#[derive(Debug, Default)]
pub struct MockTransport {
    open: bool,
    writes: Vec<String>,
    open_count: usize,
    close_count: usize,
    fail_open: bool,
    fail_on_write: Option<usize>,
    abort_after: Option<(usize, AbortSignal)>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `open` fail.
    pub fn failing_open(mut self) -> Self {
        self.fail_open = true;
        self
    }

    /// Makes the `n`-th write (1-based) fail.
    pub fn fail_on_write(mut self, n: usize) -> Self {
        self.fail_on_write = Some(n);
        self
    }

    /// Raises `signal` right after the `n`-th write (1-based).
    pub fn abort_after(mut self, n: usize, signal: AbortSignal) -> Self {
        self.abort_after = Some((n, signal));
        self
    }

    /// Chunks written so far, in order.
    pub fn writes(&self) -> &[String] {
        &self.writes
    }

    /// All written bytes as one string.
    pub fn output(&self) -> String {
        self.writes.concat()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn open_count(&self) -> usize {
        self.open_count
    }

    pub fn close_count(&self) -> usize {
        self.close_count
    }
}

impl Transport for MockTransport {
    fn open(&mut self) -> TransportResult<()> {
        if self.fail_open {
            return Err(TransportError::Rejected("open refused".to_string()));
        }
        self.open = true;
        self.open_count += 1;
        Ok(())
    }

    fn write(&mut self, bytes: &[u8]) -> TransportResult<()> {
        if !self.open {
            return Err(TransportError::NotOpen);
        }
        let attempt = self.writes.len() + 1;
        if self.fail_on_write == Some(attempt) {
            return Err(TransportError::Rejected(format!("write {} refused", attempt)));
        }
        self.writes.push(String::from_utf8_lossy(bytes).into_owned());
        if let Some((n, signal)) = &self.abort_after {
            if *n == attempt {
                signal.abort();
            }
        }
        Ok(())
    }

    fn close(&mut self) -> TransportResult<()> {
        if self.open {
            self.open = false;
            self.close_count += 1;
        }
        Ok(())
    }
}

/// Entry-oriented writer over a transport.
///
/// The transport is closed by `close` or, failing that, on drop.
pub struct StreamSink<T: Transport> {
    transport: T,
    owner_vcard: Option<String>,
    open: bool,
    records_written: usize,
}

impl<T: Transport> StreamSink<T> {
    /// Creates a sink; `owner_vcard` is written first by `on_init`.
    pub fn new(transport: T, owner_vcard: Option<String>) -> Self {
        StreamSink {
            transport,
            owner_vcard,
            open: false,
            records_written: 0,
        }
    }

    /// Opens the transport and writes the owner vCard, if any.
    pub fn on_init(&mut self) -> Result<(), ExportError> {
        self.transport.open()?;
        self.open = true;
        if let Some(owner) = self.owner_vcard.take() {
            self.transport.write(owner.as_bytes())?;
            tracing::trace!("wrote owner vcard");
        }
        Ok(())
    }

    /// Writes one encoded record.
    pub fn on_entry(&mut self, vcard: &str) -> Result<(), ExportError> {
        if !self.open {
            return Err(TransportError::NotOpen.into());
        }
        self.transport.write(vcard.as_bytes())?;
        self.records_written += 1;
        Ok(())
    }

    /// Number of records written, the owner vCard excluded.
    pub fn records_written(&self) -> usize {
        self.records_written
    }

    /// Closes the transport. Idempotent.
    pub fn close(&mut self) -> Result<(), ExportError> {
        if self.open {
            self.open = false;
            self.transport.close()?;
        }
        Ok(())
    }
}

impl<T: Transport> Drop for StreamSink<T> {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            tracing::warn!(error = %e, "failed to close transport");
        }
    }
}

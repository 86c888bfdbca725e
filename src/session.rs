//! Client-side write batching.
//!
//! A session buffers measurements and flushes them through its connection
//! as one batched write, either explicitly via [`Session::commit`], when
//! the autocommit threshold is reached, or on drop.

use std::num::NonZeroUsize;

use tracing::{debug, error};

use crate::connection::Connection;
use crate::error::Result;
use crate::measurement::Measurement;
use crate::write::WriteSink;

/// Configuration for a [`Session`].
#[derive(Clone, Debug, Default)]
pub struct SessionOptions {
    /// Commit automatically once the buffer holds at least this many
    /// measurements.
    pub autocommit_every: Option<NonZeroUsize>,
    /// Retention policy for this session's commits, overriding the
    /// connection default.
    pub retention_policy: Option<String>,
}

/// An ordered buffer of pending measurements bound to one connection.
///
/// Measurements are flushed in exact insertion order as contiguous lines
/// of a single request body. The buffer is exclusively owned by the
/// session; driving one session from multiple call sites concurrently is
/// not supported.
///
/// Any measurements still buffered when the session goes out of scope are
/// flushed by `Drop`. That flush cannot report failure, so call
/// [`Session::commit`] explicitly where delivery errors matter; the
/// drop-time flush is then a no-op.
///
/// # Example
///
/// ```ignore
/// use influxdb_sync::{Client, Measurement, WriteSink};
///
/// let client = Client::new("http://localhost:8086/weather")?;
/// {
///     let mut session = client.session();
///     session.write(Measurement::new("temperature").field("value", 23.1))?;
///     session.write(Measurement::new("temperature").field("value", 25.0))?;
/// } // both measurements go out here, as one request
/// ```
pub struct Session<'a> {
    connection: &'a Connection,
    buffer: Vec<Measurement>,
    autocommit_every: Option<NonZeroUsize>,
    retention_policy: Option<String>,
    pending_override: Option<String>,
}

impl<'a> Session<'a> {
    /// Create a session with no autocommit threshold and no session-level
    /// retention policy.
    pub fn new(connection: &'a Connection) -> Self {
        Self::with_options(connection, SessionOptions::default())
    }

    /// Create a session with the given options.
    pub fn with_options(connection: &'a Connection, options: SessionOptions) -> Self {
        Self {
            connection,
            buffer: Vec::new(),
            autocommit_every: options.autocommit_every,
            retention_policy: options.retention_policy,
            pending_override: None,
        }
    }

    /// Number of buffered measurements.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Whether the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Flush the buffer as one batched write.
    ///
    /// The effective retention policy is the pending per-write override if
    /// one was recorded, else the session-level policy, else the
    /// connection default. An empty buffer is a no-op and issues no
    /// request. The buffer and the pending override are cleared only on
    /// success; after a failed commit both are intact, so the caller may
    /// retry.
    pub fn commit(&mut self) -> Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }

        let policy = self
            .pending_override
            .as_deref()
            .or(self.retention_policy.as_deref());
        debug!(measurements = self.buffer.len(), "committing session buffer");
        self.connection.write_batch(&self.buffer, policy)?;

        self.buffer.clear();
        self.pending_override = None;
        Ok(())
    }
}

impl WriteSink for Session<'_> {
    /// Append the batch to the buffer in order. A supplied retention
    /// policy replaces any previously recorded override for the next
    /// commit. Reaching the autocommit threshold commits immediately.
    fn deliver(
        &mut self,
        batch: Vec<Measurement>,
        retention_policy: Option<String>,
    ) -> Result<()> {
        if let Some(policy) = retention_policy {
            self.pending_override = Some(policy);
        }
        self.buffer.extend(batch);

        if let Some(threshold) = self.autocommit_every {
            if self.buffer.len() >= threshold.get() {
                self.commit()?;
            }
        }
        Ok(())
    }
}

impl Drop for Session<'_> {
    fn drop(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        if let Err(err) = self.commit() {
            error!(error = %err, "failed to flush session buffer on drop");
        }
    }
}

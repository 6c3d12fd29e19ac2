use crate::Result;
use std::ops::{Deref, DerefMut};

/// Lists the columns of a table, in table order.
pub trait SchemaProvider {
    fn column_names(&mut self, schema: &str, table: &str) -> Result<Vec<String>>;
}

/// Connection to the store behind a sink.
pub trait Connection: SchemaProvider {
    /// Human readable description of the connection (driver, url), used to
    /// pick the bulk statement dialect.
    fn descriptor(&self) -> &str;
}

/// Destination of imported records and source of exported ones.
///
/// The sink owns an open transaction, `commit_and_continue` and
/// `rollback_and_continue` end it and immediately begin the next one.
pub trait RecordSink {
    type Connection: Connection;

    fn connection(&mut self) -> &mut Self::Connection;

    /// Number of records currently stored in `table`.
    fn count(&mut self, schema: &str, table: &str) -> Result<u64>;

    /// Deletes every record of `table`, returns how many were removed. Other
    /// tables are left untouched.
    fn remove_all(&mut self, schema: &str, table: &str) -> Result<u64>;

    /// Runs a statement in the store's own dialect, returns the affected rows.
    fn execute_native(&mut self, sql: &str) -> Result<u64>;

    fn commit_and_continue(&mut self) -> Result<()>;

    fn rollback_and_continue(&mut self) -> Result<()>;

    /// Releases the sink, called exactly once by its owner.
    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Record sink accepting typed entities one by one.
pub trait EntitySink<E>: RecordSink {
    fn insert(&mut self, entity: E) -> Result<()>;

    /// Writes pending inserts to the store.
    fn flush(&mut self) -> Result<()>;

    /// Forgets entities tracked since the last flush.
    fn clear(&mut self);
}

/// Owns a sink for the duration of one operation and closes it when dropped.
pub struct SinkGuard<S: RecordSink> {
    sink: S,
}

impl<S: RecordSink> SinkGuard<S> {
    pub fn new(sink: S) -> Self {
        Self { sink }
    }
}

impl<S: RecordSink> Deref for SinkGuard<S> {
    type Target = S;
    fn deref(&self) -> &Self::Target {
        &self.sink
    }
}

impl<S: RecordSink> DerefMut for SinkGuard<S> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.sink
    }
}

impl<S: RecordSink> Drop for SinkGuard<S> {
    fn drop(&mut self) {
        if let Err(e) = self.sink.close() {
            log::error!("Error while closing the sink: {:#}", e);
        }
    }
}

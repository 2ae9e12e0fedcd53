//! UsageStore service: persistent selection counts and recency per window id,
//! on top of a document store with optimistic concurrency.

mod clock;
mod document;
mod json_file;
mod memory;
mod record;
mod store;

pub use self::clock::{Clock, SystemClock};
pub use self::document::{Document, DocumentStore, Revision};
pub use self::json_file::JsonFileDocumentStore;
pub use self::memory::MemoryDocumentStore;
pub use self::record::UsageRecord;
pub use self::store::UsageStore;

#[cfg(test)]
pub use self::clock::ManualClock;

pub mod audit_repo;
pub mod error;
pub mod memory;
pub mod record_repo;

pub use audit_repo::PgAuditSink;
pub use memory::MemoryRecordStore;
pub use record_repo::{DomainRecord, NewRecord, PgRecordStore, RecordStore};

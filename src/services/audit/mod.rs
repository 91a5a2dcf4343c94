pub mod sink;
pub mod tracing_sink;

pub use sink::{AuditError, AuditRecord, AuditSink};
pub use tracing_sink::TracingAuditSink;

//! Row, record and diagnostic types shared by sources and the resolver.

pub mod diagnostic;
pub mod record;
pub mod row;

pub use diagnostic::{Diagnostic, SkipReason};
pub use record::{
    ColumnLayout, DEFAULT_MARKER, Ingestion, LayoutError, Record, identity_key, ingest,
    same_identity,
};
pub use row::Row;

//! Domain models for query results.

mod record;
mod value;

pub use record::Record;
pub use value::{GraphValue, Node, Path, Properties, Relationship, Scalar};

pub mod store;
pub mod types;

pub use store::load_column_types;
pub use types::{ColumnKind, ColumnTypes, Descriptor};

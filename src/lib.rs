pub mod convert;
pub mod error;
pub mod schema;

pub use convert::{convert, ConvertOptions, Converter, Report};
pub use error::{ConvertError, ErrorKind};
pub use schema::{ColumnKind, ColumnTypes};

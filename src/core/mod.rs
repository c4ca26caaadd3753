pub mod value;
pub mod record;
pub mod store;
pub mod errors;

pub use value::Value;
pub use record::Record;
pub use store::{TableStore, TableInfo};
pub use errors::{Result, QueryError, StoreError};

//! Data tables attached to steps, with header-aware record access.

mod error;
mod record;
mod table;

pub use error::DataTableError;
pub use record::{TableRecord, TableRow};
pub use table::DataTable;

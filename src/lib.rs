pub mod error;
pub mod msg;
pub mod response;
pub mod state;
pub mod table;

pub use crate::error::TableError;
pub use crate::response::{Event, Response};
pub use crate::state::TableConfig;
pub use crate::table::Table;

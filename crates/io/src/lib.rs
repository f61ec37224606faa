// File I/O operations

pub mod error;
pub mod json;
pub mod snapshot;
pub mod xlsx;

pub use error::IoError;
pub use snapshot::{load_history, LoadedHistory};
pub use xlsx::XlsxWorkbook;

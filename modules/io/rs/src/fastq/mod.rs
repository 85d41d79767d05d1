mod error;
mod reader;
mod record;
pub mod validate;

pub use error::Error;
pub use reader::Reader;
pub use record::Record;

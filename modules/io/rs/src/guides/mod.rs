mod reader;
mod record;

pub use reader::Reader;
pub use record::Record;

pub mod compression;
pub mod fastq;
pub mod guides;
mod traits;

pub use traits::ReadRecord;

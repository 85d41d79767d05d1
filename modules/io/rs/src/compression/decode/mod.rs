mod algorithm;
mod config;
mod stream;

pub use algorithm::Algorithm;
pub use config::Config;
pub use stream::Stream;

use eyre::Result;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Open the file at the given path with the compression inferred from its name and signature.
pub fn infer_from_path(path: impl AsRef<Path>) -> Result<Stream<File>> {
    let config = Config::infer_from_file(&path)?;
    let file = File::open(path.as_ref())?;
    Stream::new(file, &config)
}

impl<R: Read + Send + Sync + 'static> Stream<R> {
    pub fn boxed(self) -> Box<dyn Read + Send + Sync + 'static> {
        match self {
            Stream::Raw(r) => Box::new(r),
            Stream::Deflate(r) => Box::new(r),
            Stream::Gzip(r) => Box::new(r),
        }
    }
}

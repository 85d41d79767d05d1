use super::algorithm::Algorithm;
use eyre::{bail, ensure, Result};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Config {
    RawBytes(Algorithm), // Directly uncompressed raw bytes as-is
    Gzip,                // GZIP container
}

impl Default for Config {
    fn default() -> Self {
        Self::UNCOMPRESSED
    }
}

impl Config {
    pub const UNCOMPRESSED: Config = Config::RawBytes(Algorithm::None);

    fn mime(&self) -> Option<&'static str> {
        match self {
            Config::Gzip => Some("application/gzip"),
            Config::RawBytes(_) => None,
        }
    }

    pub fn infer_from_path(path: impl AsRef<Path>) -> Self {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| match ext {
                "gz" | "gzip" => Config::Gzip,
                _ => Config::UNCOMPRESSED,
            })
            .unwrap_or(Config::UNCOMPRESSED)
    }

    /// Infer the compression from both the file extension and the internal file signature.
    /// The two must agree, otherwise the format is considered unknown.
    pub fn infer_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        ensure!(path.is_file(), "Path {} is not a file", path.display());

        let from_path = Config::infer_from_path(path);
        let mime = infer::get_from_path(path)?.map(|x| x.mime_type());

        if from_path.mime() == mime {
            Ok(from_path)
        } else {
            bail!(
                "Unknown compression format for file {}: \
                extension suggests {:?}, signature suggests {:?}",
                path.display(),
                from_path.mime(),
                mime
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_from_path() {
        for (path, expected) in [
            ("reads.fastq", Config::UNCOMPRESSED),
            ("reads.fastq.gz", Config::Gzip),
            ("reads.fastq.gzip", Config::Gzip),
            ("guides.tsv", Config::UNCOMPRESSED),
            ("noext", Config::UNCOMPRESSED),
        ] {
            assert_eq!(Config::infer_from_path(path), expected, "Path: {path}");
        }
    }
}

use super::algorithm::Algorithm;
use super::config::Config;
use eyre::Result;
use std::io::Read;

pub enum Stream<R: Read + Send + Sync + 'static> {
    Raw(R),
    Deflate(flate2::read::DeflateDecoder<R>),
    Gzip(flate2::read::MultiGzDecoder<R>),
}

impl<R: Read + Send + Sync + 'static> Stream<R> {
    pub fn new(inner: R, config: &Config) -> Result<Self> {
        match config {
            Config::RawBytes(algo) => match algo {
                Algorithm::None => Ok(Stream::Raw(inner)),
                Algorithm::Deflate => Ok(Stream::Deflate(flate2::read::DeflateDecoder::new(inner))),
            },
            Config::Gzip => Ok(Stream::Gzip(flate2::read::MultiGzDecoder::new(inner))),
        }
    }
}

impl<R: Read + Send + Sync + 'static> Read for Stream<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self {
            Stream::Raw(r) => r.read(buf),
            Stream::Deflate(r) => r.read(buf),
            Stream::Gzip(r) => r.read(buf),
        }
    }
}

use super::record::Record;
use crate::compression::decode;
use crate::traits::ReadRecord;
use eyre::{ensure, OptionExt, Result, WrapErr};
use std::io::BufRead;
use std::path::Path;

/// Columns required in the guide catalog header, in any order. Extra columns are ignored.
const CODE: &str = "CODE";
const GENES: &str = "GENES";
const EXONE: &str = "EXONE";

/// A reader for tab-separated guide catalogs. The first line must be a header naming at least
/// the CODE, GENES, and EXONE columns; records are yielded in file order. Blank lines are
/// skipped.
pub struct Reader<R> {
    reader: R,
    // Positions of the (code, gene, exon) fields within each row
    columns: (usize, usize, usize),
    line: String,
}

impl Reader<()> {
    /// Create a new catalog reader from the given file path.
    /// The compression is detected from the file extension and the internal file signature.
    pub fn from_path(
        path: impl AsRef<Path>,
        decode: &decode::Config,
    ) -> Result<Box<dyn ReadRecord<Record = Record> + Send + Sync + 'static>> {
        let file = std::fs::File::open(path.as_ref())?;
        let boxed: Box<dyn ReadRecord<Record = Record> + Send + Sync + 'static> =
            match decode::Stream::new(file, decode)? {
                decode::Stream::Raw(x) => Box::new(Reader::new(std::io::BufReader::new(x))?),
                decode::Stream::Deflate(x) => Box::new(Reader::new(std::io::BufReader::new(x))?),
                decode::Stream::Gzip(x) => Box::new(Reader::new(std::io::BufReader::new(x))?),
            };
        Ok(boxed)
    }
}

impl<R: BufRead> Reader<R> {
    pub fn new(mut reader: R) -> Result<Self> {
        let mut header = String::new();
        let read = reader
            .read_line(&mut header)
            .wrap_err("Failed to read the guide catalog header")?;
        ensure!(read > 0, "The guide catalog is empty, expected a header");

        let fields: Vec<&str> = header.trim_end().split('\t').collect();
        let locate = |name: &str| {
            fields
                .iter()
                .position(|x| *x == name)
                .ok_or_eyre(format!("Guide catalog header is missing the {name} column"))
        };
        let columns = (locate(CODE)?, locate(GENES)?, locate(EXONE)?);

        Ok(Self {
            reader,
            columns,
            line: String::new(),
        })
    }

    fn read_parts(&mut self, record: &mut Record) -> Result<bool> {
        loop {
            self.line.clear();
            if self.reader.read_line(&mut self.line)? == 0 {
                return Ok(false);
            }
            if !self.line.trim_end().is_empty() {
                break;
            }
        }

        let fields: Vec<&str> = self.line.trim_end().split('\t').collect();
        let field = |ind: usize, name: &str| {
            fields
                .get(ind)
                .map(|x| x.to_string())
                .ok_or_eyre(format!("Guide catalog row is missing the {name} field"))
        };

        let (code, gene, exon) = self.columns;
        record.set(field(code, CODE)?, field(gene, GENES)?, field(exon, EXONE)?)?;
        Ok(true)
    }
}

impl<R: BufRead> ReadRecord for Reader<R> {
    type Record = Record;

    fn read_record(&mut self, into: &mut Self::Record) -> Result<bool> {
        self.read_parts(into)
    }

    fn read_records(&mut self, into: &mut [Self::Record]) -> Result<usize> {
        let mut n = 0;
        for buf in into {
            if self.read_parts(buf)? {
                n += 1;
            } else {
                break;
            }
        }
        Ok(n)
    }

    fn read_to_end(&mut self, into: &mut Vec<Self::Record>) -> Result<usize> {
        let mut total = 0;

        for record in into.iter_mut() {
            if !self.read_parts(record)? {
                return Ok(total);
            }
            total += 1;
        }

        loop {
            let mut record = Record::default();
            if !self.read_parts(&mut record)? {
                return Ok(total);
            }
            into.push(record);
            total += 1;
        }
    }
}

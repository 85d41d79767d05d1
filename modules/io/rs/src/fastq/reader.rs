use super::{error::Error, record::Record, validate};
use crate::compression::decode;
use crate::traits::ReadRecord;
use derive_getters::Dissolve;
use eyre::{Result, WrapErr};
use std::io::BufRead;
use std::path::Path;

/// A FASTQ reader that yields one record at a time. Ignores:
/// - Trailing whitespace at the end of all lines (including Windows line endings)
/// - Line wrapping: both the sequence and the quality may span several physical lines
///
/// The '@' record marker is also a legal quality character, so a quality line starting with '@'
/// is ambiguous. The reader resolves the ambiguity by tracking the accumulated quality length:
/// such a line opens the next record only once at least `sequence.len()` quality characters have
/// been collected. Otherwise it is more quality data, whatever its first character is.
///
/// Parsing is forward-only and fails fast: the first malformed record terminates the stream with
/// an error, and no attempt is made to skip ahead to the next record.
#[derive(Debug, Dissolve)]
pub struct Reader<R> {
    reader: R,
    // Scratch buffer holding the current line. After a record is yielded it may retain the
    // title line of the next record, consumed while scanning the previous quality string.
    line: Vec<u8>,
    retained: bool,
}

impl Reader<()> {
    /// Create a new FASTQ reader from the given file path.
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

// Trailing whitespace (newlines included) carries no meaning anywhere in the format
fn rstrip(line: &mut Vec<u8>) {
    while line.last().map(|x| x.is_ascii_whitespace()).unwrap_or(false) {
        line.pop();
    }
}

impl<R: BufRead> Reader<R> {
    pub fn new(mut reader: R) -> Result<Self> {
        // Check that the stream is either empty or opens with a record marker
        let buffer = reader.fill_buf()?;
        if !buffer.first().map(|x| *x == b'@').unwrap_or(true) {
            return Err(Error::MalformedRecord {
                line: String::from_utf8_lossy(buffer.split(|x| *x == b'\n').next().unwrap_or(b""))
                    .into_owned(),
            }
            .into());
        }
        Ok(Self {
            reader,
            line: Vec::new(),
            retained: false,
        })
    }

    fn next_line(&mut self) -> Result<bool> {
        self.line.clear();
        let read = self.reader.read_until(b'\n', &mut self.line)?;
        rstrip(&mut self.line);
        Ok(read > 0)
    }

    fn read_parts(&mut self, record: &mut Record) -> Result<bool> {
        // The title line: retained from the previous quality scan or read fresh
        if !self.retained && !self.next_line()? {
            return Ok(false);
        }
        self.retained = false;

        if self.line.first() != Some(&b'@') {
            return Err(Error::MalformedRecord {
                line: String::from_utf8_lossy(&self.line).into_owned(),
            }
            .into());
        }

        let (title, sequence, quality) = unsafe { record.raw() };
        title.clear();
        title.push_str(
            std::str::from_utf8(&self.line[1..]).wrap_err("FASTQ title is not valid UTF-8")?,
        );

        // One or more sequence lines, up to the '+' separator
        sequence.clear();
        loop {
            if !self.next_line()? {
                let detail = if sequence.is_empty() {
                    "the record ends right after its title"
                } else {
                    "the record ends without quality information"
                };
                return Err(Error::TruncatedRecord {
                    title: std::mem::take(title),
                    detail,
                }
                .into());
            }
            if self.line.first() == Some(&b'+') {
                break;
            }
            sequence.extend_from_slice(&self.line);
        }

        // The title on the separator line is optional, but if present it must match
        let second = &self.line[1..];
        if !second.is_empty() && second != title.as_bytes() {
            return Err(Error::TitleMismatch {
                title: std::mem::take(title),
                second: String::from_utf8_lossy(second).into_owned(),
            }
            .into());
        }
        validate::sequence(title, sequence)?;

        // Quality lines follow, up to the next record or the end of the stream. A line starting
        // with '@' opens the next record only if enough quality characters were already
        // accumulated. Otherwise it is just more quality data.
        let expected = sequence.len();
        quality.clear();
        loop {
            if !self.next_line()? {
                if quality.len() < expected {
                    return Err(Error::TruncatedRecord {
                        title: std::mem::take(title),
                        detail: "the record ends before the quality string is complete",
                    }
                    .into());
                }
                break;
            }
            if self.line.first() == Some(&b'@') && quality.len() >= expected {
                // The start of the next record: keep the line around, it must not be re-read
                self.retained = true;
                break;
            }
            quality.extend_from_slice(&self.line);
        }
        validate::lengths(title, expected, quality.len())?;

        Ok(true)
    }
}

impl<R: BufRead> ReadRecord for Reader<R> {
    type Record = Record;

    /// Parse the next FASTQ record into the given [Record] buffer.
    /// Returns false if there are no more records to read.
    ///
    /// The read is successful only if the function returns `Ok(true)`.
    /// Otherwise, the buffer is left in an unspecified state, but can be reused for the next read.
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

        // Read into the existing buffer
        for record in into.iter_mut() {
            if !self.read_parts(record)? {
                return Ok(total);
            }
            total += 1;
        }

        // Append to the buffer
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

#[cfg(test)]
mod tests {
    use super::*;

    // The canonical "tricky" FASTQ example: most separator titles omitted, quality lines that
    // start with '@', and the last record wrapped across physical lines.
    const TRICKY: &str = "@071113_EAS56_0053:1:1:998:236\n\
        TTTCTTGCCCCCATAGACTGAGACCTTCCCTAAATA\n\
        +071113_EAS56_0053:1:1:998:236\n\
        IIIIIIIIIIIIIIIIIIIIIIIIIIIIICII+III\n\
        @071113_EAS56_0053:1:1:182:712\n\
        ACCCAGCTAATTTTTGTATTTTTGTTAGAGACAGTG\n\
        +\n\
        @IIIIIIIIIIIIIIICDIIIII<%<6&-*).(*%+\n\
        @071113_EAS56_0053:1:1:153:10\n\
        TGTTCTGAAGGAAGGTGTGCGTGCGTGTGTGTGTGT\n\
        +\n\
        IIIIIIIIIIIICIIGIIIII>IAIIIE65I=II:6\n\
        @071113_EAS56_0053:1:3:990:501\n\
        TGGGAGGTTTTATGTGGA\n\
        AAGCAGCAATGTACAAGA\n\
        +\n\
        IIIIIII.IIIIII1@44\n\
        @-7.%<&+/$/%4(++(%\n";

    const TRICKY_PARSED: &[(&str, &str, &str)] = &[
        (
            "071113_EAS56_0053:1:1:998:236",
            "TTTCTTGCCCCCATAGACTGAGACCTTCCCTAAATA",
            "IIIIIIIIIIIIIIIIIIIIIIIIIIIIICII+III",
        ),
        (
            "071113_EAS56_0053:1:1:182:712",
            "ACCCAGCTAATTTTTGTATTTTTGTTAGAGACAGTG",
            "@IIIIIIIIIIIIIIICDIIIII<%<6&-*).(*%+",
        ),
        (
            "071113_EAS56_0053:1:1:153:10",
            "TGTTCTGAAGGAAGGTGTGCGTGCGTGTGTGTGTGT",
            "IIIIIIIIIIIICIIGIIIII>IAIIIE65I=II:6",
        ),
        (
            "071113_EAS56_0053:1:3:990:501",
            "TGGGAGGTTTTATGTGGAAAGCAGCAATGTACAAGA",
            "IIIIIII.IIIIII1@44@-7.%<&+/$/%4(++(%",
        ),
    ];

    fn test_read_record(content: &str, expected: &[(&str, &str, &str)]) -> Result<()> {
        let mut reader = Reader::new(std::io::Cursor::new(content))?;
        let mut record = Record::default();
        for (title, seq, qual) in expected {
            assert!(reader.read_record(&mut record)?);
            assert_eq!(record, (*title, *seq, *qual).try_into()?);
        }
        assert!(!reader.read_record(&mut record)?);
        Ok(())
    }

    fn test_read_to_end(content: &str, expected: &[(&str, &str, &str)]) -> Result<()> {
        let mut reader = Reader::new(std::io::Cursor::new(content))?;
        let mut records = Vec::new();
        reader.read_to_end(&mut records)?;
        assert_eq!(records.len(), expected.len());
        for (record, (title, seq, qual)) in records.iter().zip(expected.iter()) {
            assert_eq!(*record, (*title, *seq, *qual).try_into()?);
        }
        Ok(())
    }

    fn parse_all(content: &str) -> Result<Vec<Record>> {
        let mut reader = Reader::new(std::io::Cursor::new(content))?;
        let mut records = Vec::new();
        reader.read_to_end(&mut records)?;
        Ok(records)
    }

    #[test]
    fn test_empty_fastq() -> Result<()> {
        test_read_record("", &[])?;
        test_read_to_end("", &[])?;
        Ok(())
    }

    #[test]
    fn test_valid_fastq() {
        for (content, records) in [
            (
                "@id\nACGT\n+\nIIII\n",
                vec![("id", "ACGT", "IIII")],
            ),
            // No trailing newline
            (
                "@id\nACGT\n+\nIIII",
                vec![("id", "ACGT", "IIII")],
            ),
            // Windows line endings
            (
                "@id\r\nACGT\r\n+\r\nIIII\r\n",
                vec![("id", "ACGT", "IIII")],
            ),
            // Repeated title on the separator line
            (
                "@id 1\nACGT\n+id 1\nIIII\n",
                vec![("id 1", "ACGT", "IIII")],
            ),
            // Wrapped sequence and quality
            (
                "@id\nAC\nGT\n+\nII\nII\n",
                vec![("id", "ACGT", "IIII")],
            ),
            (
                "@a\nACGT\n+\nIIII\n@b\nTT\n+\nII\n",
                vec![("a", "ACGT", "IIII"), ("b", "TT", "II")],
            ),
        ] {
            assert!(
                test_read_record(content, &records).is_ok(),
                "Content: {content:?}"
            );
            assert!(
                test_read_to_end(content, &records).is_ok(),
                "Content: {content:?}"
            );
        }
    }

    #[test]
    fn test_tricky_example() -> Result<()> {
        test_read_record(TRICKY, TRICKY_PARSED)?;
        test_read_to_end(TRICKY, TRICKY_PARSED)?;
        Ok(())
    }

    #[test]
    fn test_quality_ambiguity() -> Result<()> {
        // A quality string both starting with '@' and containing '@' after a line break must be
        // consumed whole. The '@' line in the middle is shorter than the sequence, so it can't
        // open a new record at that point.
        let content = "@read\nACGTACGTAC\n+\n@III\n@IIIII\n";
        let records = parse_all(content)?;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].quality(), b"@III@IIIII");
        Ok(())
    }

    #[test]
    fn test_malformed_record() {
        // The very first byte is checked at construction time
        let result = Reader::new(std::io::Cursor::new("ACGT\n+\nIIII\n"));
        assert!(matches!(
            result.unwrap_err().downcast_ref::<Error>(),
            Some(Error::MalformedRecord { .. })
        ));
    }

    #[test]
    fn test_error_kinds() {
        for (content, expected) in [
            (
                "@id\n",
                Error::TruncatedRecord {
                    title: "id".into(),
                    detail: "the record ends right after its title",
                },
            ),
            (
                "@id\nACGT\n",
                Error::TruncatedRecord {
                    title: "id".into(),
                    detail: "the record ends without quality information",
                },
            ),
            (
                "@id\nACGT\n+\nII\n",
                Error::TruncatedRecord {
                    title: "id".into(),
                    detail: "the record ends before the quality string is complete",
                },
            ),
            (
                "@id\nACGT\n+other\nIIII\n",
                Error::TitleMismatch {
                    title: "id".into(),
                    second: "other".into(),
                },
            ),
            (
                "@id\nAC GT\n+\nIIIII\n",
                Error::InvalidCharacter { title: "id".into() },
            ),
            (
                "@id\nACGT\n+\nIIIII\n",
                Error::LengthMismatch {
                    title: "id".into(),
                    expected: 4,
                    actual: 5,
                },
            ),
            // Garbage after a complete quality string is extra quality data
            (
                "@id\nACGT\n+\nIIII\nGARBAGE\n",
                Error::LengthMismatch {
                    title: "id".into(),
                    expected: 4,
                    actual: 11,
                },
            ),
        ] {
            let err = parse_all(content).unwrap_err();
            assert_eq!(
                err.downcast_ref::<Error>(),
                Some(&expected),
                "Content: {content:?}"
            );
        }
    }

    #[test]
    fn test_failure_preserves_previous_records() -> Result<()> {
        // Records yielded before the failure remain valid
        let content = "@a\nACGT\n+\nIIII\n@b\nTT\n+\nI\n";
        let mut reader = Reader::new(std::io::Cursor::new(content))?;
        let mut record = Record::default();

        assert!(reader.read_record(&mut record)?);
        assert_eq!(record, ("a", "ACGT", "IIII").try_into()?);

        let err = reader.read_record(&mut record).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::TruncatedRecord { .. })
        ));
        Ok(())
    }
}

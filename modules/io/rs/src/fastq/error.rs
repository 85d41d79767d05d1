use derive_more::{Display, Error};

/// Errors raised while parsing FASTQ records. Any of them is fatal: the reader never tries to
/// resynchronize on the next record, and records yielded before the failure remain valid.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum Error {
    /// A record line was expected to start with '@' but did not.
    #[display("FASTQ records must start with '@', got: {line:?}")]
    MalformedRecord { line: String },
    /// The stream ended in the middle of a record.
    #[display("unexpected end of file in record '{title}': {detail}")]
    TruncatedRecord {
        title: String,
        detail: &'static str,
    },
    /// The optional title repeated on the '+' separator line disagrees with the '@' title.
    #[display("sequence and quality titles differ: '{title}' vs '{second}'")]
    TitleMismatch { title: String, second: String },
    /// The sequence contains a space or tab character.
    #[display("whitespace is not allowed in the sequence of record '{title}'")]
    InvalidCharacter { title: String },
    /// The sequence and quality strings have different lengths.
    #[display("sequence and quality lengths differ for '{title}' ({expected} and {actual})")]
    LengthMismatch {
        title: String,
        expected: usize,
        actual: usize,
    },
}

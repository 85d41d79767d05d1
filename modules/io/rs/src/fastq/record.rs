use super::validate;
use derive_getters::{Dissolve, Getters};
use derive_more::Into;
use eyre::Result;

/// A single FASTQ record with the following guarantees:
/// - The title is an arbitrary UTF-8 string without newline characters.
/// - The sequence contains no spaces or tabs.
/// - The quality string is exactly as long as the sequence.
///
/// The alphabet of the sequence is not restricted to nucleotides: downstream matchers are
/// expected to simply never match reads carrying unexpected characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Dissolve, Getters, Into)]
pub struct Record {
    title: String,
    sequence: Vec<u8>,
    quality: Vec<u8>,
}

impl Default for Record {
    fn default() -> Self {
        Self {
            title: "Default title".to_string(),
            sequence: b"ACGT".to_vec(),
            quality: b"IIII".to_vec(),
        }
    }
}

impl Record {
    /// Creates a new FASTQ record with the given title, sequence, and quality.
    pub fn new(title: String, sequence: Vec<u8>, quality: Vec<u8>) -> Result<Self> {
        validate::sequence(&title, &sequence)?;
        validate::lengths(&title, sequence.len(), quality.len())?;
        Ok(Self {
            title,
            sequence,
            quality,
        })
    }

    /// # Safety
    /// The caller must ensure that all fields remain valid after modification.
    pub unsafe fn raw(&mut self) -> (&mut String, &mut Vec<u8>, &mut Vec<u8>) {
        (&mut self.title, &mut self.sequence, &mut self.quality)
    }
}

impl<T, S, Q> TryFrom<(T, S, Q)> for Record
where
    T: Into<String>,
    S: Into<Vec<u8>>,
    Q: Into<Vec<u8>>,
{
    type Error = eyre::Report;

    fn try_from(value: (T, S, Q)) -> Result<Self> {
        Self::new(value.0.into(), value.1.into(), value.2.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_record() -> Result<()> {
        for (title, seq, qual) in [
            ("read-1", "ACGTACGT", "IIIIIIII"),
            ("", "A", "@"),
            ("spaces in the title are fine", "NNNN", "@@+@"),
        ] {
            let record: Record = (title, seq, qual).try_into()?;
            assert_eq!(record.title(), title);
            assert_eq!(record.sequence(), seq.as_bytes());
            assert_eq!(record.quality(), qual.as_bytes());
        }
        Ok(())
    }

    #[test]
    fn test_invalid_records() {
        for (title, seq, qual) in [
            // Whitespace in the sequence
            ("id", "AC GT", "IIIII"),
            ("id", "ACGT\t", "IIIII"),
            // Sequence and quality lengths differ
            ("id", "ACGT", "III"),
            ("id", "ACGT", "IIIII"),
            ("id", "", "I"),
        ] {
            let record: Result<Record> = (title, seq, qual).try_into();
            assert!(record.is_err(), "Record: {:?}", record);
        }
    }
}

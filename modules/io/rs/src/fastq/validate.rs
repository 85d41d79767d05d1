use super::error::Error;

/// The sequence must not contain spaces or tabs. Other bytes are accepted as-is: there are no
/// guarantees on the biological meaningfulness of the stored characters.
pub fn sequence(title: &str, seq: &[u8]) -> Result<(), Error> {
    if seq.iter().any(|&x| x == b' ' || x == b'\t') {
        return Err(Error::InvalidCharacter {
            title: title.to_owned(),
        });
    }
    Ok(())
}

/// The quality string must be exactly as long as the sequence.
pub fn lengths(title: &str, expected: usize, actual: usize) -> Result<(), Error> {
    if expected != actual {
        return Err(Error::LengthMismatch {
            title: title.to_owned(),
            expected,
            actual,
        });
    }
    Ok(())
}

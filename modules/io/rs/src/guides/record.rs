use derive_getters::{Dissolve, Getters};
use derive_more::Into;
use eyre::{ensure, Result};

/// One entry of the guide catalog: a short nucleotide pattern plus the gene/exon annotation it
/// targets. The annotation is only used as a grouping key for the final occurrence table.
///
/// Codes are assumed to be unique within a catalog. Duplicates are not rejected here: each copy
/// is simply counted on its own and summed into the shared (gene, exon) row downstream.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Dissolve, Getters, Into)]
pub struct Record {
    code: String,
    gene: String,
    exon: String,
}

impl Default for Record {
    fn default() -> Self {
        Self {
            code: "ACGT".to_string(),
            gene: "Default gene".to_string(),
            exon: "0".to_string(),
        }
    }
}

impl Record {
    /// Creates a new guide entry. The code must be non-empty; the gene and exon fields are
    /// opaque labels and may hold anything.
    pub fn new(code: String, gene: String, exon: String) -> Result<Self> {
        let mut record = Self::default();
        record.set(code, gene, exon)?;
        Ok(record)
    }

    pub fn set(&mut self, code: String, gene: String, exon: String) -> Result<()> {
        ensure!(!code.is_empty(), "Guide code cannot be empty");
        self.code = code;
        self.gene = gene;
        self.exon = exon;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records() -> Result<()> {
        let record = Record::new("ATGCACA".into(), "BRCA1".into(), "2".into())?;
        assert_eq!(record.code(), "ATGCACA");
        assert_eq!(record.gene(), "BRCA1");
        assert_eq!(record.exon(), "2");

        assert!(Record::new("".into(), "BRCA1".into(), "2".into()).is_err());
        Ok(())
    }
}

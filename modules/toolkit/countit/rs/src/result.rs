use ahash::HashMap;
use derive_getters::{Dissolve, Getters};
use derive_more::Constructor;
use eyre::Result;
use guideseq_io_rs::guides;
use itertools::izip;
use std::io::Write;

/// Per-chunk counting statistics: how many reads the chunk holds, how many counting tasks
/// touched it, and the total time those tasks spent.
#[derive(Clone, PartialEq, Debug, Default, Constructor, Dissolve, Getters)]
pub struct Summary {
    chunk: usize,
    reads: usize,
    tasks: usize,
    time_s: f64,
}

impl Summary {
    pub(crate) fn absorb(&mut self, reads: usize, time_s: f64) {
        self.reads = reads;
        self.tasks += 1;
        self.time_s += time_s;
    }
}

/// Raw counting output: one total per guide, aligned with the catalog order, plus per-chunk
/// statistics. Each total is the number of reads containing the guide at least once.
#[derive(Clone, PartialEq, Debug, Default, Constructor, Dissolve, Getters)]
pub struct Counts<Elt> {
    elements: Vec<Elt>,
    counts: Vec<u64>,
    stats: Vec<Summary>,
}

/// One row of the final occurrence table.
#[derive(Clone, PartialEq, Eq, Debug, Constructor, Dissolve, Getters)]
pub struct Row {
    gene: String,
    exon: String,
    occurrence: u64,
}

/// The final occurrence table: one row per distinct (gene, exon) pair of the catalog, in the
/// order pairs first appear there. Guides sharing a pair are summed; pairs whose guides never
/// matched keep a zero row.
#[derive(Clone, PartialEq, Eq, Debug, Default, Dissolve, Getters)]
pub struct Table {
    rows: Vec<Row>,
}

impl Table {
    pub fn from_counts(counts: &Counts<guides::Record>) -> Self {
        let mut index: HashMap<(&str, &str), usize> = HashMap::default();
        let mut rows: Vec<Row> = Vec::new();

        for (element, count) in izip!(counts.elements(), counts.counts()) {
            let key = (element.gene().as_str(), element.exon().as_str());
            match index.get(&key) {
                Some(&ind) => rows[ind].occurrence += *count,
                None => {
                    index.insert(key, rows.len());
                    rows.push(Row::new(
                        element.gene().clone(),
                        element.exon().clone(),
                        *count,
                    ));
                }
            }
        }

        Table { rows }
    }

    /// Write the table as tab-separated text: a header plus one newline-terminated row per
    /// (gene, exon) pair.
    pub fn write_tsv(&self, mut writer: impl Write) -> Result<()> {
        writeln!(writer, "gene\texon\toccurrence")?;
        for row in &self.rows {
            writeln!(writer, "{}\t{}\t{}", row.gene, row.exon, row.occurrence)?;
        }
        Ok(())
    }
}

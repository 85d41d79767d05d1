use crate::chunk::Chunk;
use crate::matcher::Matcher;
use crate::result::Summary;
use ahash::HashMap;
use eyre::{bail, ensure, Result};
use std::collections::hash_map::Entry;

#[derive(Clone, Debug, Default)]
struct CountingResult {
    hits: u64,
    reads: usize,
    time_s: f64,
}

/// Thread-local counting state. Workers never share anything mutable: each one accumulates
/// partial results for the (guide, chunk) tasks it happened to execute, and the accumulators
/// are merged once all tasks have finished.
#[derive(Default)]
pub struct Worker {
    // (guide index, chunk index) -> partial result, ephemeral between a run and its merge
    accumulator: HashMap<(usize, usize), CountingResult>,
    // Per-worker clones of the shared matcher prototypes
    matchers: HashMap<usize, Box<dyn Matcher>>,
}

impl Worker {
    pub fn reset(&mut self) {
        self.accumulator.clear();
        self.matchers.clear();
    }

    /// Count reads of the chunk containing the given guide. Pure with respect to the chunk:
    /// only this worker's own accumulator is touched.
    pub fn process(
        &mut self,
        guide: usize,
        prototype: &(dyn Matcher + 'static),
        chunk: &Chunk,
    ) -> Result<()> {
        let matcher = self
            .matchers
            .entry(guide)
            .or_insert_with(|| dyn_clone::clone_box(prototype));

        let launched_at = std::time::Instant::now();
        let hits = chunk
            .sequences()
            .iter()
            .filter(|x| matcher.is_match(x))
            .count() as u64;
        let result = CountingResult {
            hits,
            reads: chunk.sequences().len(),
            time_s: launched_at.elapsed().as_secs_f64(),
        };

        match self.accumulator.entry((guide, *chunk.index())) {
            Entry::Occupied(_) => bail!(
                "worker already holds a result for guide {guide} and chunk {}",
                chunk.index()
            ),
            Entry::Vacant(entry) => entry.insert(result),
        };
        Ok(())
    }

    /// Merge the partial results of all workers into per-guide totals and per-chunk statistics.
    /// Summation is commutative, so the task completion order never affects the totals. Every
    /// (guide, chunk) pair must have reported exactly once, otherwise the aggregation is
    /// incomplete and no table should be published.
    pub fn aggregate<'a>(
        guides: usize,
        chunks: usize,
        workers: impl Iterator<Item = &'a mut Self>,
    ) -> Result<(Vec<u64>, Vec<Summary>)> {
        let mut counts = vec![0u64; guides];
        let mut stats: Vec<_> = (0..chunks).map(|x| Summary::new(x, 0, 0, 0.0)).collect();
        let mut reported = vec![false; guides * chunks];

        for worker in workers {
            for ((guide, chunk), result) in worker.accumulator.drain() {
                ensure!(
                    !std::mem::replace(&mut reported[guide * chunks + chunk], true),
                    "two workers reported results for guide {guide} and chunk {chunk}"
                );
                counts[guide] += result.hits;
                stats[chunk].absorb(result.reads, result.time_s);
            }
        }

        let missing = reported.iter().filter(|x| !**x).count();
        ensure!(
            missing == 0,
            "aggregation incomplete: {missing} of {} counting tasks never reported a result",
            guides * chunks
        );

        Ok((counts, stats))
    }
}

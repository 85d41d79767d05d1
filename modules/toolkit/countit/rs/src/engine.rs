use crate::builder::EngineBuilder;
use crate::chunk::{self, Chunk};
use crate::matcher::Matcher;
use crate::result::Counts;
use crate::worker::Worker;
use eyre::{eyre, Result, WrapErr};
use rayon::ThreadPool;
use std::cell::RefCell;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use thread_local::ThreadLocal;

/// Counts every configured guide across a set of reads.
///
/// The read set is partitioned into contiguous chunks and every (guide, chunk) pair becomes one
/// counting task on the rayon pool. Workers are thread-local, so the counting phase takes no
/// locks; results are merged behind a join barrier once all tasks have finished. Any task
/// failure aborts the run before the merge: a partially-counted table is never returned.
pub struct Engine<Elt> {
    thread_pool: Option<ThreadPool>,
    matchers: Vec<Box<dyn Matcher>>,
    elements: Vec<Elt>,
    workers: ThreadLocal<RefCell<Worker>>,
}

impl<Elt: Clone + Send + Sync> Engine<Elt> {
    pub(crate) fn new(
        thread_pool: Option<ThreadPool>,
        matchers: Vec<Box<dyn Matcher>>,
        elements: Vec<Elt>,
    ) -> Self {
        Self {
            thread_pool,
            matchers,
            elements,
            workers: ThreadLocal::new(),
        }
    }

    pub fn builder() -> EngineBuilder<Elt> {
        EngineBuilder::default()
    }

    /// Run the counting across all (guide, chunk) pairs and merge the partial results.
    /// The totals are deterministic: they depend only on the reads and the catalog, not on the
    /// number of chunks, pool threads, or task completion order.
    pub fn run(&mut self, sequences: &[Vec<u8>], chunks: usize) -> Result<Counts<Elt>> {
        match self.thread_pool.take() {
            Some(pool) => {
                let result = pool.install(|| self._run(sequences, chunks));
                self.thread_pool = Some(pool);
                result
            }
            None => self._run(sequences, chunks),
        }
    }

    fn _run(&mut self, sequences: &[Vec<u8>], chunks: usize) -> Result<Counts<Elt>> {
        let ranges = chunk::partition(sequences.len(), chunks)?;

        // Soft-reset all workers left over from the previous run
        for worker in self.workers.iter_mut() {
            worker.get_mut().reset();
        }

        let has_failed = AtomicBool::new(false);
        let failure = Mutex::new(None);
        {
            let workers = &self.workers;
            let matchers = &self.matchers;
            let has_failed = &has_failed;
            let failure = &failure;
            let ranges = &ranges;

            rayon::scope(|s| {
                for guide in 0..matchers.len() {
                    for (cind, range) in ranges.iter().enumerate() {
                        // Stop spawning once any task has failed
                        if has_failed.load(Ordering::Relaxed) {
                            return;
                        }

                        s.spawn(move |_| {
                            if has_failed.load(Ordering::Relaxed) {
                                return;
                            }

                            let chunk = Chunk::new(cind, &sequences[range.clone()]);
                            let mut worker = workers
                                .get_or(|| RefCell::new(Worker::default()))
                                .borrow_mut();

                            let result =
                                worker
                                    .process(guide, &*matchers[guide], &chunk)
                                    .wrap_err_with(|| {
                                        format!(
                                        "counting task failed for guide #{guide} on chunk #{cind}"
                                    )
                                    });

                            if let Err(err) = result {
                                has_failed.store(true, Ordering::Relaxed);
                                log::error!("{err:?}");
                                failure
                                    .lock()
                                    .unwrap_or_else(|x| x.into_inner())
                                    .get_or_insert(err);
                            }
                        });
                    }
                }
            });
        }

        if has_failed.into_inner() {
            let err = failure
                .into_inner()
                .unwrap_or_else(|x| x.into_inner())
                .unwrap_or_else(|| eyre!("counting failed, see the log for details"));
            return Err(err);
        }

        let (counts, stats) = Worker::aggregate(
            self.matchers.len(),
            ranges.len(),
            self.workers.iter_mut().map(|x| x.get_mut()),
        )?;
        Ok(Counts::new(self.elements.clone(), counts, stats))
    }
}

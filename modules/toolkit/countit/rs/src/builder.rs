use crate::engine::Engine;
use crate::matcher::Matcher;
use rayon::ThreadPool;

pub struct EngineBuilder<Elt> {
    matchers: Vec<Box<dyn Matcher>>,
    elements: Vec<Elt>,
    thread_pool: Option<ThreadPool>,
}

impl<Elt> Default for EngineBuilder<Elt> {
    fn default() -> Self {
        Self {
            matchers: Vec::new(),
            elements: Vec::new(),
            thread_pool: None,
        }
    }
}

impl<Elt: Clone + Send + Sync> EngineBuilder<Elt> {
    /// Register guides in catalog order: a matcher deciding whether a read contains the guide,
    /// plus an arbitrary payload carried into the final counts (e.g. the catalog record).
    pub fn add_guides(mut self, guides: impl Iterator<Item = (Box<dyn Matcher>, Elt)>) -> Self {
        for (matcher, element) in guides {
            self.matchers.push(matcher);
            self.elements.push(element);
        }
        self
    }

    /// Without an explicit pool the engine runs on the global rayon pool.
    pub fn set_thread_pool(mut self, pool: ThreadPool) -> Self {
        self.thread_pool = Some(pool);
        self
    }

    pub fn build(self) -> Engine<Elt> {
        if self.matchers.is_empty() {
            log::warn!("No guides were registered: every run will produce an empty table");
        }
        Engine::new(self.thread_pool, self.matchers, self.elements)
    }
}

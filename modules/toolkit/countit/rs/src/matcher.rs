use dyn_clone::DynClone;
use memchr::memmem;

/// Decides whether a single read contains a guide pattern.
///
/// Counting over a chunk uses per-read presence semantics: a read contributes at most one
/// occurrence, no matter how many times the pattern repeats inside it. Reads are never
/// concatenated, so a pattern can't match across read boundaries.
///
/// Matchers are cloned into every worker thread, so implementations should keep their state
/// cheap to copy.
pub trait Matcher: DynClone + Send + Sync {
    fn is_match(&self, sequence: &[u8]) -> bool;
}

dyn_clone::clone_trait_object!(Matcher);

/// Case-sensitive literal substring search. Guide codes are plain nucleotide strings
/// (A, C, G, T, N), so no richer pattern syntax is supported; bytes outside the nucleotide
/// alphabet are not rejected, they simply never occur in well-formed guides.
#[derive(Clone)]
pub struct LiteralMatcher {
    finder: memmem::Finder<'static>,
}

impl LiteralMatcher {
    pub fn new(pattern: impl AsRef<[u8]>) -> Self {
        Self {
            finder: memmem::Finder::new(pattern.as_ref()).into_owned(),
        }
    }

    pub fn pattern(&self) -> &[u8] {
        self.finder.needle()
    }
}

impl Matcher for LiteralMatcher {
    fn is_match(&self, sequence: &[u8]) -> bool {
        self.finder.find(sequence).is_some()
    }
}

pub use builder::EngineBuilder;
pub use engine::Engine;
pub use matcher::{LiteralMatcher, Matcher};
pub use result::{Counts, Row, Summary, Table};

pub mod chunk;
pub mod parallelism;

mod builder;
mod engine;
mod matcher;
mod result;
mod worker;

//! Library-tree expansion, fallback episode synthesis and the composite
//! catalog-id codec.

pub mod codec;
pub mod expander;
pub mod fallback;

pub use expander::{FolderChildren, SourceChildren, expand};
pub use fallback::{DEFAULT_FALLBACK_LIMIT, FallbackEpisodeSynthesizer};

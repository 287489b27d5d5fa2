//! Re-exports of performance-oriented collection types.

pub use rustc_hash::{FxHashMap, FxHashSet};
pub use smallvec::SmallVec;
pub use std::collections::BTreeMap;

/// SmallVec for per-node adjacency (most nodes move stock to a handful of places).
pub type SmallVec4<T> = SmallVec<[T; 4]>;

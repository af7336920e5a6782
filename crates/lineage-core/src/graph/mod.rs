//! Hierarchy resolution over entity ids.
//!
//! ## Submodules
//!
//! - [`relation`] — direct child → parent relation, last write wins.
//! - [`ancestry`] — transitive ancestor walk and the accumulated ancestor map.
//! - [`cycles`] — every loop in a relation, via strongly connected components.

pub mod ancestry;
pub mod cycles;
pub mod relation;

pub use ancestry::{
    AncestorMap, CycleError, accumulated_ancestors, ancestor_chain, ancestors_of, render_line,
};
pub use cycles::find_cycles;
pub use relation::DirectRelation;

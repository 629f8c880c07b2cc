//! Crossword filling as a constraint satisfaction problem.
//!
//! Each slot in the grid is a variable whose domain starts out as the whole vocabulary. Solving
//! runs in three stages:
//!
//! 1. Node consistency drops every word whose length doesn't match its slot.
//! 2. AC-3 removes words with no agreeing partner in some crossing slot, until a fixed point.
//! 3. Backtracking search assigns slots in minimum-remaining-values order (ties go to the slot
//!    with the most crossings), trying the least-constraining words first.
//!
//! An unsatisfiable crossword is an ordinary outcome, reported as a `FillFailure` (or `None` from
//! `solve`), not as an error.

mod arc_consistency;
mod assignment;
mod crossword;
mod domains;
mod search;
mod vocabulary;

pub use arc_consistency::{enforce_arc_consistency, revise, CrossingArc};
pub use assignment::{assignment_complete, consistent, consistent_with, Assignment, Choice};
pub use crossword::{Crossing, Crossword, CrosswordError, Direction, GridCoord, Overlap, Variable};
pub use domains::{enforce_node_consistency, Checkpoint, Domains};
pub use search::{
    find_fill, order_domain_values, select_unassigned_variable, solve, FillFailure, FillSuccess, Inference,
    SolverConfig, Statistics,
};
pub use vocabulary::{Vocabulary, Word};

/// The expected maximum length for a single slot. Longer words still work, they just spill their
/// characters onto the heap.
pub const MAX_SLOT_LENGTH: usize = 21;

/// An identifier for a given slot, based on its index in the crossword's variable list.
pub type VariableId = usize;

/// An identifier for a given word, based on its index in the vocabulary.
pub type WordId = usize;

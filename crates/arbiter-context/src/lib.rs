//! # arbiter-context
//!
//! The execution context of the arbiter rule kernel: one business-data bag
//! per evaluation pass, projected through two capability views.
//!
//! [`Context`] is the always-available live read view. [`MutatorContext`] is
//! a privilege, not a property: it exists only while the pass is in its
//! writable phase and the bag is not frozen, and every operation through it
//! re-validates that grant. Freezing is a one-way semantic lock — once a bag
//! is frozen no later phase restores writability.
//!
//! A bag serves exactly one pass. Create it, seed it, evaluate against it,
//! freeze it, drop it; reuse across independent passes is unsupported.

#![deny(unsafe_code)]
#![warn(rust_2018_idioms)]

pub mod execution;
pub mod phase;
pub mod value;

pub use execution::{Context, ExecutionContext, MutatorContext};
pub use phase::ExecutionPhase;
pub use value::{FromValue, Value};

//! # arbiter-fault
//!
//! Fault taxonomy for the arbiter rule kernel.
//!
//! Inside the kernel there are no plain errors, only *faults*: values that fix
//! a stable machine code, a category, a human-readable message, and a snapshot
//! of diagnostic attributes at construction time. Faults are immutable;
//! enrichment during propagation produces a new value and leaves every
//! already-captured instance untouched.
//!
//! The `Control` category is the one non-error: it signals a deliberate
//! short-circuit of a rule chain and must never be alerted on.

#![deny(unsafe_code)]
#![warn(rust_2018_idioms)]

pub mod code;
pub mod fault;

pub use code::ErrorCode;
pub use fault::{Fault, FaultCategory, FaultResult};

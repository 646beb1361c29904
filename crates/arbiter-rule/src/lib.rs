//! # arbiter-rule
//!
//! The condition/action algebra of the arbiter rule kernel, plus the rule
//! model external drivers consume.
//!
//! A [`Condition`] is a pure predicate over the read view; an [`Action`] is a
//! side-effecting operation over the privileged view. Both compose through
//! combinators that return new closures — there is no trait hierarchy to
//! implement. Every combinator boundary normalizes kernel faults: a fault
//! raised inside a combined condition resurfaces as a logic fault tagged with
//! the combinator that caught it, with the original message preserved as a
//! nested diagnostic attribute.
//!
//! The algebra is single-threaded by contract; conditions and actions are
//! cheap `Rc` clones and are not `Send`.

#![deny(unsafe_code)]
#![warn(rust_2018_idioms)]

pub mod action;
pub mod condition;
pub mod rule;

pub use action::Action;
pub use condition::Condition;
pub use rule::{Rule, RuleBuilder};

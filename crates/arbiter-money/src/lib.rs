//! # arbiter-money
//!
//! The single numeric standard of the arbiter rule kernel.
//!
//! Business rules compare amounts, rates, and weights; they must never trip
//! over representation. [`Decimal`] normalizes away trailing-zero precision
//! at construction so that the values written `1.0` and `1.00` are one value:
//! equal, identically ordered, identically hashed. [`Money`] pairs a decimal
//! with descriptive metadata (currency, unit, scale policy) and is the
//! reference implementation of the [`FinancialValue`] contract the kernel
//! consumes; hosts may bring their own.

#![deny(unsafe_code)]
#![warn(rust_2018_idioms)]

pub mod decimal;
pub mod money;

pub use decimal::{Decimal, ParseDecimalError};
pub use money::{FinancialValue, Money, CURRENCY};

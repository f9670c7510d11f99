//! Core draft types, calculation engine, and validation engine.
//!
//! This module provides the EN 16931 invoice draft model, derives every
//! document total from it, and checks the Peppol BIS Billing 3.0 business
//! rule subset that gates export.

mod builder;
mod calc;
pub mod countries;
pub mod currencies;
mod error;
mod normalize;
mod patterns;
pub mod reason_codes;
mod types;
pub mod units;
mod validation;

pub use builder::*;
pub use calc::*;
pub use error::*;
pub use normalize::*;
pub use types::*;
pub use units::is_known_unit_code;
pub use validation::*;

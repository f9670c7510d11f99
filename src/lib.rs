//! # einvoice
//!
//! Calculation, validation and serialization core for EN 16931 /
//! Peppol BIS Billing 3.0 invoices expressed as UBL 2.1.
//!
//! All monetary values are [`rust_decimal::Decimal`], never floating point.
//! Every figure written to XML comes from a single [`ComputedTotals`] value,
//! so the document is consistent with the totals by construction.
//!
//! ## Quick Start
//!
//! ```rust
//! use einvoice::core::*;
//! use rust_decimal_macros::dec;
//!
//! let draft = InvoiceDraftBuilder::new("INV-2024-001", "2024-06-15")
//!     .seller(PartyBuilder::new("Seller SIA", AddressBuilder::new("Riga", "LV").build()).build())
//!     .buyer(PartyBuilder::new("Buyer AS", AddressBuilder::new("Tallinn", "EE").build()).build())
//!     .payment_account("LV80BANK0000435195001", None)
//!     .add_line(InvoiceLineBuilder::new("1", "Consulting", dec!(2), "HUR", dec!(100))
//!         .vat("S", dec!(21))
//!         .build())
//!     .build();
//!
//! assert!(validate_for_export(&draft).is_valid());
//! let computed = calc_invoice(&draft);
//! assert_reconciliation(&computed).unwrap();
//! assert_eq!(computed.payable_amount, dec!(242.00));
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `core` (default) | Draft types, calculation engine, validation engine |
//! | `json` | Lenient JSON boundary for drafts |
//! | `ubl` | UBL 2.1 Invoice XML generation |
//! | `export` | Export pipeline (validate → compute → reconcile → serialize) |
//! | `all` | Everything |

#[cfg(feature = "core")]
pub mod core;

#[cfg(feature = "ubl")]
pub mod ubl;

#[cfg(feature = "export")]
pub mod export;

// Re-export core types at crate root for convenience
#[cfg(feature = "core")]
pub use crate::core::*;

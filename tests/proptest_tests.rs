//! Property-based tests for the calculation engine and serializer.
//!
//! Run with: `cargo test --features all --test proptest_tests`

use einvoice::core::*;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn seller() -> Party {
    PartyBuilder::new("Seller SIA", AddressBuilder::new("Riga", "LV").build())
        .vat_id("LV40003245752")
        .build()
}

fn buyer() -> Party {
    PartyBuilder::new("Buyer AS", AddressBuilder::new("Tallinn", "EE").build()).build()
}

fn build_draft(
    lines: Vec<InvoiceLine>,
    allowances: Vec<Decimal>,
    charges: Vec<Decimal>,
    prepaid: Decimal,
) -> InvoiceDraft {
    let mut builder = InvoiceDraftBuilder::new("PROP-1", "2024-06-15")
        .seller(seller())
        .buyer(buyer())
        .payment_account("LV80BANK0000435195001", None)
        .prepaid(prepaid);
    for amount in allowances {
        builder = builder.add_allowance(AllowanceChargeBuilder::new(amount, "S", dec!(21)).build());
    }
    for amount in charges {
        builder = builder.add_charge(AllowanceChargeBuilder::new(amount, "S", dec!(21)).build());
    }
    for line in lines {
        builder = builder.add_line(line);
    }
    builder.build()
}

// ── Proptest Strategies ─────────────────────────────────────────────────────

/// Generate a reasonable price (0.001 to 9999.999), including sub-cent values.
fn arb_price() -> impl Strategy<Value = Decimal> {
    (1u64..10_000_000u64).prop_map(|mills| Decimal::new(mills as i64, 3))
}

/// Generate a quantity (0.01 to 999.99).
fn arb_quantity() -> impl Strategy<Value = Decimal> {
    (1u64..100_000u64).prop_map(|hundredths| Decimal::new(hundredths as i64, 2))
}

/// A VAT (category, rate) pair seen on real invoices.
fn arb_vat() -> impl Strategy<Value = (&'static str, Decimal)> {
    prop_oneof![
        Just(("S", dec!(21))),
        Just(("S", dec!(12))),
        Just(("S", dec!(5))),
        Just(("S", dec!(25.5))),
        Just(("Z", dec!(0))),
        Just(("E", dec!(0))),
    ]
}

fn arb_amount() -> impl Strategy<Value = Decimal> {
    (0u64..5_000_000u64).prop_map(|cents| Decimal::new(cents as i64, 2))
}

fn arb_line(idx: usize) -> impl Strategy<Value = InvoiceLine> {
    (arb_quantity(), arb_price(), arb_vat(), 0u64..2_000u64).prop_map(
        move |(qty, price, (cat, rate), discount_cents)| {
            InvoiceLineBuilder::new((idx + 1).to_string(), format!("Item {idx}"), qty, "C62", price)
                .vat(cat, rate)
                .discount(Decimal::new(discount_cents as i64, 2))
                .build()
        },
    )
}

fn arb_lines() -> impl Strategy<Value = Vec<InvoiceLine>> {
    (1usize..=8).prop_flat_map(|n| (0..n).map(arb_line).collect::<Vec<_>>())
}

fn arb_draft() -> impl Strategy<Value = InvoiceDraft> {
    (
        arb_lines(),
        prop::collection::vec(arb_amount(), 0..3),
        prop::collection::vec(arb_amount(), 0..3),
        arb_amount(),
    )
        .prop_map(|(lines, allowances, charges, prepaid)| {
            build_draft(lines, allowances, charges, prepaid)
        })
}

// ── Property Tests ──────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn calc_is_deterministic(draft in arb_draft()) {
        prop_assert_eq!(calc_invoice(&draft), calc_invoice(&draft));
    }

    #[test]
    fn reconciliation_identities_hold(draft in arb_draft()) {
        let c = calc_invoice(&draft);
        let report = check_reconciliation(&c);
        prop_assert!(report.is_ok(), "{:?} for {:?}", report, c);
        prop_assert!(assert_reconciliation(&c).is_ok());
    }

    #[test]
    fn bucket_taxable_sum_tracks_tax_exclusive(draft in arb_draft()) {
        let c = calc_invoice(&draft);
        if c.tax_exclusive_amount <= Decimal::ZERO {
            prop_assert!(c.tax_breakdown.is_empty());
        } else if c.subtotal > Decimal::ZERO {
            let taxable: Decimal = c.tax_breakdown.iter().map(|b| b.taxable_amount).sum();
            // Line nets are whole cents, so each bucket's only rounding step is
            // on its share of the document delta: at most half a cent. Two
            // buckets stay within one cent; the residue grows with the count.
            let tolerance = Decimal::new(5, 3) * Decimal::from(c.tax_breakdown.len());
            prop_assert!(
                (taxable - c.tax_exclusive_amount).abs() <= tolerance,
                "taxable {} vs tax exclusive {}", taxable, c.tax_exclusive_amount
            );
        }
    }

    #[test]
    fn buckets_are_unique_per_category_and_rate(draft in arb_draft()) {
        let c = calc_invoice(&draft);
        for (i, a) in c.tax_breakdown.iter().enumerate() {
            for b in &c.tax_breakdown[i + 1..] {
                prop_assert!(!(a.category_code == b.category_code && a.rate == b.rate));
            }
        }
    }

    #[test]
    fn every_amount_is_at_currency_precision(draft in arb_draft()) {
        let c = calc_invoice(&draft);
        let amounts = [
            c.subtotal,
            c.document_discount,
            c.document_charge,
            c.tax_exclusive_amount,
            c.total_vat,
            c.tax_inclusive_amount,
            c.payable_amount,
        ];
        for a in amounts {
            prop_assert_eq!(a, round_amount(a, 2));
        }
        for l in &c.lines {
            prop_assert!(l.line_net_amount >= Decimal::ZERO);
            prop_assert!(l.line_discount_amount <= l.line_subtotal);
            prop_assert_eq!(l.line_net_amount, round_amount(l.line_net_amount, 2));
        }
    }

    #[test]
    fn generated_drafts_pass_validation(lines in arb_lines()) {
        let draft = build_draft(lines, vec![], vec![], Decimal::ZERO);
        let report = validate_for_export(&draft);
        prop_assert!(report.is_valid(), "{:?}", report.messages());
    }

    #[test]
    fn normalize_coercion_never_panics(s in "\\PC{0,20}") {
        let _ = coerce_decimal(&s);
    }
}

#[cfg(feature = "ubl")]
proptest! {
    #[test]
    fn xml_payable_matches_computed(draft in arb_draft()) {
        let c = calc_invoice(&draft);
        let xml = einvoice::ubl::to_ubl_xml(&draft, &c).unwrap();
        let doc = roxmltree::Document::parse(&xml).unwrap();
        let payable = doc
            .descendants()
            .find(|n| n.tag_name().name() == "PayableAmount")
            .and_then(|n| n.text())
            .unwrap();
        prop_assert_eq!(payable.parse::<Decimal>().unwrap(), c.payable_amount);
        let lines = doc
            .descendants()
            .filter(|n| n.tag_name().name() == "InvoiceLine")
            .count();
        prop_assert_eq!(lines, draft.lines.len());
    }
}

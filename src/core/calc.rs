//! Calculation engine: one pure function per EN 16931 business term.
//!
//! Every intermediate figure is rounded half away from zero at the
//! currency's decimal count, so the aggregates agree with their
//! constituents by construction (BR-CO-10 to BR-CO-17).
//!
//! Arithmetic never panics. A step that would leave the `Decimal` range
//! yields zero, and [`check_reconciliation`] then reports the totals as
//! inconsistent.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use super::error::InvoiceError;
use super::types::*;

/// Decimal places used when a currency has no explicit entry.
pub const DEFAULT_CURRENCY_DECIMALS: u32 = 2;

/// VAT amounts are always stated with two decimals.
pub const TAX_DECIMALS: u32 = 2;

/// Tolerance for the reconciliation identities.
pub const RECONCILIATION_EPSILON: Decimal = dec!(0.000001);

/// Minor-unit decimal count for `currency_code`.
pub fn currency_decimals(currency_code: &str) -> u32 {
    match currency_code {
        "EUR" | "USD" | "GBP" => 2,
        _ => DEFAULT_CURRENCY_DECIMALS,
    }
}

/// Round half away from zero to `dp` decimal places.
pub fn round_amount(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

fn mul(a: Decimal, b: Decimal) -> Decimal {
    a.checked_mul(b).unwrap_or(Decimal::ZERO)
}

fn add(a: Decimal, b: Decimal) -> Decimal {
    a.checked_add(b).unwrap_or(Decimal::ZERO)
}

fn sub(a: Decimal, b: Decimal) -> Decimal {
    a.checked_sub(b).unwrap_or(Decimal::ZERO)
}

/// `amount × rate / 100`.
fn percent_of(amount: Decimal, rate: Decimal) -> Decimal {
    mul(amount, rate) / dec!(100)
}

fn checked_sum(values: impl IntoIterator<Item = Decimal>) -> Option<Decimal> {
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(v))
}

fn sum(values: impl IntoIterator<Item = Decimal>) -> Decimal {
    checked_sum(values).unwrap_or(Decimal::ZERO)
}

/// Quantity × net price, before discount.
pub fn line_subtotal(line: &InvoiceLine, currency_code: &str) -> Decimal {
    round_amount(
        mul(line.quantity, line.net_price),
        currency_decimals(currency_code),
    )
}

/// Fixed-amount line discount, clamped to `[0, line_subtotal]`.
pub fn line_discount_amount(line: &InvoiceLine, currency_code: &str) -> Decimal {
    let amount = line.discount_amount.max(Decimal::ZERO);
    if amount.is_zero() {
        return Decimal::ZERO;
    }
    let subtotal = line_subtotal(line, currency_code).max(Decimal::ZERO);
    round_amount(amount.min(subtotal), currency_decimals(currency_code))
}

/// BT-131: Line net amount.
pub fn line_net(line: &InvoiceLine, currency_code: &str) -> Decimal {
    round_amount(
        sub(
            line_subtotal(line, currency_code),
            line_discount_amount(line, currency_code),
        ),
        currency_decimals(currency_code),
    )
}

/// Line VAT at the line's own rate.
pub fn line_tax_amount(line: &InvoiceLine, currency_code: &str) -> Decimal {
    round_amount(
        percent_of(line_net(line, currency_code), line.vat_rate),
        currency_decimals(currency_code),
    )
}

/// Line net plus line VAT.
pub fn line_gross_amount(line: &InvoiceLine, currency_code: &str) -> Decimal {
    round_amount(
        add(line_net(line, currency_code), line_tax_amount(line, currency_code)),
        currency_decimals(currency_code),
    )
}

/// BT-106: Sum of line net amounts.
pub fn sum_line_nets(lines: &[InvoiceLine], currency_code: &str) -> Decimal {
    sum(lines.iter().map(|l| line_net(l, currency_code)))
}

/// Rounded amount and base of one document allowance or charge. The base is
/// kept only when a percentage is set.
pub fn allowance_charge_totals(ac: &AllowanceCharge, currency_code: &str) -> AllowanceChargeTotals {
    let dp = currency_decimals(currency_code);
    AllowanceChargeTotals {
        amount: round_amount(ac.amount, dp),
        base_amount: ac
            .base_amount
            .filter(|_| ac.percent.is_some())
            .map(|b| round_amount(b, dp)),
    }
}

/// BT-107 / BT-108: Sums of document allowances and charges, each amount
/// rounded before summing. Returns `(allowances, charges)`.
pub fn document_allowance_charge_totals(draft: &InvoiceDraft) -> (Decimal, Decimal) {
    let cc = &draft.header.currency_code;
    let dp = currency_decimals(cc);
    let total = |items: &[AllowanceCharge]| {
        round_amount(
            sum(items.iter().map(|a| allowance_charge_totals(a, cc).amount)),
            dp,
        )
    };
    (total(&draft.document_allowances), total(&draft.document_charges))
}

/// BT-109: Line net sum − allowances + charges.
pub fn tax_exclusive_amount(draft: &InvoiceDraft) -> Decimal {
    let cc = &draft.header.currency_code;
    let (allowances, charges) = document_allowance_charge_totals(draft);
    round_amount(
        add(sub(sum_line_nets(&draft.lines, cc), allowances), charges),
        currency_decimals(cc),
    )
}

/// BG-23: VAT breakdown.
///
/// Lines are grouped by `(category, rate)` in order of first appearance.
/// The document-level net delta (charges − allowances) is spread over the
/// buckets by each bucket's share of the total line net.
pub fn vat_breakdown(draft: &InvoiceDraft) -> Vec<VatBucket> {
    let cc = &draft.header.currency_code;
    let dp = currency_decimals(cc);
    let line_net_sum = sum_line_nets(&draft.lines, cc);
    let (allowances, charges) = document_allowance_charge_totals(draft);

    if add(sub(line_net_sum, allowances), charges) <= Decimal::ZERO {
        return Vec::new();
    }

    // (category, rate, summed line net)
    let mut groups: Vec<(String, Decimal, Decimal)> = Vec::new();
    for line in &draft.lines {
        let net = line_net(line, cc);
        match groups
            .iter_mut()
            .find(|(cat, rate, _)| *cat == line.vat_category_code && *rate == line.vat_rate)
        {
            Some(group) => group.2 = add(group.2, net),
            None => groups.push((line.vat_category_code.clone(), line.vat_rate, net)),
        }
    }

    let total_line_net = sum(groups.iter().map(|g| g.2));
    if total_line_net <= Decimal::ZERO {
        return groups
            .into_iter()
            .map(|(category_code, rate, _)| VatBucket {
                category_code,
                rate,
                taxable_amount: Decimal::ZERO,
                tax_amount: Decimal::ZERO,
            })
            .collect();
    }

    let delta = sub(charges, allowances);
    groups
        .into_iter()
        .map(|(category_code, rate, bucket_net)| {
            let share = bucket_net
                .checked_div(total_line_net)
                .unwrap_or(Decimal::ZERO);
            let taxable_amount = round_amount(add(bucket_net, mul(delta, share)), dp);
            let tax_amount = round_amount(percent_of(taxable_amount, rate), TAX_DECIMALS);
            VatBucket {
                category_code,
                rate,
                taxable_amount,
                tax_amount,
            }
        })
        .collect()
}

/// BT-110: Total VAT.
pub fn total_vat(draft: &InvoiceDraft) -> Decimal {
    sum_bucket_tax(&vat_breakdown(draft))
}

/// BT-112: Total with VAT.
pub fn tax_inclusive_amount(draft: &InvoiceDraft) -> Decimal {
    round_amount(
        add(tax_exclusive_amount(draft), total_vat(draft)),
        currency_decimals(&draft.header.currency_code),
    )
}

/// BT-113: Paid amount.
pub fn prepaid_amount(draft: &InvoiceDraft) -> Decimal {
    round_amount(
        draft.header.prepaid_amount.unwrap_or(Decimal::ZERO),
        currency_decimals(&draft.header.currency_code),
    )
}

/// BT-114: Rounding amount.
pub fn rounding_amount(draft: &InvoiceDraft) -> Decimal {
    round_amount(
        draft.header.rounding_amount.unwrap_or(Decimal::ZERO),
        currency_decimals(&draft.header.currency_code),
    )
}

/// BT-115: Total with VAT − paid + rounding.
pub fn payable_amount(draft: &InvoiceDraft) -> Decimal {
    round_amount(
        add(
            sub(tax_inclusive_amount(draft), prepaid_amount(draft)),
            rounding_amount(draft),
        ),
        currency_decimals(&draft.header.currency_code),
    )
}

fn sum_bucket_tax(buckets: &[VatBucket]) -> Decimal {
    round_amount(sum(buckets.iter().map(|b| b.tax_amount)), TAX_DECIMALS)
}

/// Compute every export figure for `draft`.
///
/// Pure: the same draft always yields an identical result, and nothing is
/// cached between calls.
pub fn calc_invoice(draft: &InvoiceDraft) -> ComputedTotals {
    let cc = draft.header.currency_code.clone();
    let dp = currency_decimals(&cc);

    let lines: Vec<LineTotals> = draft
        .lines
        .iter()
        .map(|l| LineTotals {
            id: l.id.clone(),
            line_subtotal: line_subtotal(l, &cc),
            line_discount_amount: line_discount_amount(l, &cc),
            line_net_amount: line_net(l, &cc),
            line_tax_amount: line_tax_amount(l, &cc),
            line_gross_amount: line_gross_amount(l, &cc),
        })
        .collect();
    let document_allowances: Vec<AllowanceChargeTotals> = draft
        .document_allowances
        .iter()
        .map(|a| allowance_charge_totals(a, &cc))
        .collect();
    let document_charges: Vec<AllowanceChargeTotals> = draft
        .document_charges
        .iter()
        .map(|c| allowance_charge_totals(c, &cc))
        .collect();

    let subtotal = round_amount(sum(lines.iter().map(|l| l.line_net_amount)), dp);
    let document_discount = round_amount(sum(document_allowances.iter().map(|a| a.amount)), dp);
    let document_charge = round_amount(sum(document_charges.iter().map(|c| c.amount)), dp);
    let tax_breakdown = vat_breakdown(draft);
    let total_vat = sum_bucket_tax(&tax_breakdown);
    let tax_exclusive_amount =
        round_amount(add(sub(subtotal, document_discount), document_charge), dp);
    let tax_inclusive_amount = round_amount(add(tax_exclusive_amount, total_vat), dp);
    let prepaid_amount = prepaid_amount(draft);
    let rounding_amount = rounding_amount(draft);
    let payable_amount = round_amount(
        add(sub(tax_inclusive_amount, prepaid_amount), rounding_amount),
        dp,
    );

    ComputedTotals {
        currency_code: cc,
        lines,
        subtotal,
        document_allowances,
        document_charges,
        document_discount,
        document_charge,
        tax_exclusive_amount,
        tax_breakdown,
        total_vat,
        tax_inclusive_amount,
        prepaid_amount,
        rounding_amount,
        payable_amount,
    }
}

/// Outcome of each reconciliation identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconciliationReport {
    /// BR-CO-10: Σ line net == subtotal.
    pub line_net_sum_ok: bool,
    /// BR-CO-11: Σ document allowance amounts == allowance total.
    pub allowance_sum_ok: bool,
    /// BR-CO-12: Σ document charge amounts == charge total.
    pub charge_sum_ok: bool,
    /// BR-CO-13: tax exclusive == subtotal − allowances + charges.
    pub tax_exclusive_ok: bool,
    /// BR-CO-14: Σ bucket tax == total VAT.
    pub vat_sum_ok: bool,
    /// BR-CO-15: tax inclusive == tax exclusive + total VAT.
    pub tax_inclusive_ok: bool,
    /// BR-CO-16: payable == subtotal − allowances + charges + VAT − prepaid + rounding.
    pub payable_ok: bool,
    /// BR-CO-17: each bucket tax == taxable × rate / 100, rounded.
    pub bucket_tax_ok: bool,
}

impl ReconciliationReport {
    pub fn is_ok(&self) -> bool {
        self.line_net_sum_ok
            && self.allowance_sum_ok
            && self.charge_sum_ok
            && self.tax_exclusive_ok
            && self.vat_sum_ok
            && self.tax_inclusive_ok
            && self.payable_ok
            && self.bucket_tax_ok
    }
}

/// An identity whose recomputation overflowed does not hold.
fn within_epsilon(a: Option<Decimal>, b: Option<Decimal>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a
            .checked_sub(b)
            .is_some_and(|d| d.abs() < RECONCILIATION_EPSILON),
        _ => false,
    }
}

/// Recompute each aggregate from its constituents and compare.
///
/// The recomputation uses checked arithmetic, so totals that were coerced
/// to zero on overflow fail here instead of passing silently.
pub fn check_reconciliation(computed: &ComputedTotals) -> ReconciliationReport {
    let line_net_sum = checked_sum(computed.lines.iter().map(|l| l.line_net_amount));
    let allowance_sum = checked_sum(computed.document_allowances.iter().map(|a| a.amount));
    let charge_sum = checked_sum(computed.document_charges.iter().map(|c| c.amount));
    let bucket_tax = checked_sum(computed.tax_breakdown.iter().map(|b| b.tax_amount));
    let expected_exclusive = computed
        .subtotal
        .checked_sub(computed.document_discount)
        .and_then(|v| v.checked_add(computed.document_charge));
    let expected_inclusive = computed
        .tax_exclusive_amount
        .checked_add(computed.total_vat);
    let expected_payable = expected_exclusive
        .and_then(|v| v.checked_add(computed.total_vat))
        .and_then(|v| v.checked_sub(computed.prepaid_amount))
        .and_then(|v| v.checked_add(computed.rounding_amount));
    let bucket_tax_ok = computed.tax_breakdown.iter().all(|b| {
        let expected = b
            .taxable_amount
            .checked_mul(b.rate)
            .map(|v| round_amount(v / dec!(100), TAX_DECIMALS));
        within_epsilon(expected, Some(b.tax_amount))
    });

    ReconciliationReport {
        line_net_sum_ok: within_epsilon(line_net_sum, Some(computed.subtotal)),
        allowance_sum_ok: within_epsilon(allowance_sum, Some(computed.document_discount)),
        charge_sum_ok: within_epsilon(charge_sum, Some(computed.document_charge)),
        tax_exclusive_ok: within_epsilon(Some(computed.tax_exclusive_amount), expected_exclusive),
        vat_sum_ok: within_epsilon(bucket_tax, Some(computed.total_vat)),
        tax_inclusive_ok: within_epsilon(Some(computed.tax_inclusive_amount), expected_inclusive),
        payable_ok: within_epsilon(expected_payable, Some(computed.payable_amount)),
        bucket_tax_ok,
    }
}

/// Fail with [`InvoiceError::Reconciliation`] unless every identity holds.
///
/// Must pass before totals are handed to the serializer.
pub fn assert_reconciliation(computed: &ComputedTotals) -> Result<(), InvoiceError> {
    let report = check_reconciliation(computed);
    let failure = if !report.line_net_sum_ok {
        Some("sum of line net amounts does not equal subtotal")
    } else if !report.allowance_sum_ok {
        Some("sum of document allowances does not equal the allowance total")
    } else if !report.charge_sum_ok {
        Some("sum of document charges does not equal the charge total")
    } else if !report.tax_exclusive_ok {
        Some("tax exclusive amount does not match subtotal - allowances + charges")
    } else if !report.vat_sum_ok {
        Some("sum of VAT breakdown tax amounts does not equal total VAT")
    } else if !report.bucket_tax_ok {
        Some("VAT breakdown tax amount does not match taxable amount times rate")
    } else if !report.tax_inclusive_ok {
        Some("tax inclusive amount does not match tax exclusive + total VAT")
    } else if !report.payable_ok {
        Some("payable amount does not match its formula")
    } else {
        None
    };
    match failure {
        Some(msg) => Err(InvoiceError::Reconciliation(msg.into())),
        None => Ok(()),
    }
}

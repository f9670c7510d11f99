use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rust_decimal_macros::dec;

use einvoice::core::*;
use einvoice::ubl;

fn build_draft(line_count: u32) -> InvoiceDraft {
    let mut builder = InvoiceDraftBuilder::new("BENCH-001", "2024-06-15")
        .due_date("2024-06-29")
        .seller(
            PartyBuilder::new(
                "Benchmark SIA",
                AddressBuilder::new("Riga", "LV").line1("Brivibas iela 1").build(),
            )
            .vat_id("LV40003245752")
            .registration_id("40003245752")
            .build(),
        )
        .buyer(
            PartyBuilder::new("Buyer AS", AddressBuilder::new("Tallinn", "EE").build())
                .vat_id("EE100247019")
                .build(),
        )
        .payment_account("LV80BANK0000435195001", Some("Example Bank".into()))
        .add_allowance(AllowanceChargeBuilder::new(dec!(12.50), "S", dec!(21)).build())
        .add_charge(
            AllowanceChargeBuilder::new(dec!(7.95), "S", dec!(21))
                .reason_code("FC")
                .build(),
        );

    for i in 1..=line_count {
        let (cat, rate) = match i % 3 {
            0 => ("Z", dec!(0)),
            1 => ("S", dec!(21)),
            _ => ("S", dec!(12)),
        };
        builder = builder.add_line(
            InvoiceLineBuilder::new(i.to_string(), format!("Item {i}"), dec!(3), "C62", dec!(19.995))
                .vat(cat, rate)
                .build(),
        );
    }

    builder.build()
}

fn bench_calc(c: &mut Criterion) {
    let small = build_draft(10);
    let large = build_draft(1000);
    c.bench_function("calc_invoice_10_lines", |b| {
        b.iter(|| black_box(calc_invoice(black_box(&small))));
    });
    c.bench_function("calc_invoice_1000_lines", |b| {
        b.iter(|| black_box(calc_invoice(black_box(&large))));
    });
}

fn bench_validate(c: &mut Criterion) {
    let draft = build_draft(10);
    c.bench_function("validate_for_export_10_lines", |b| {
        b.iter(|| black_box(validate_for_export(black_box(&draft))));
    });
}

fn bench_ubl_serialize(c: &mut Criterion) {
    let small = build_draft(10);
    let small_totals = calc_invoice(&small);
    let large = build_draft(1000);
    let large_totals = calc_invoice(&large);
    c.bench_function("ubl_serialize_10_lines", |b| {
        b.iter(|| black_box(ubl::to_ubl_xml(black_box(&small), black_box(&small_totals))));
    });
    c.bench_function("ubl_serialize_1000_lines", |b| {
        b.iter(|| black_box(ubl::to_ubl_xml(black_box(&large), black_box(&large_totals))));
    });
}

criterion_group!(benches, bench_calc, bench_validate, bench_ubl_serialize);
criterion_main!(benches);

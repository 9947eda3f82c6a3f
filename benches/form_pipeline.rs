//! Form pipeline benchmarks
//!
//! Extraction and regeneration over a generated multi-page form.
//!
//! Run with: `cargo bench --bench form_pipeline`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use lopdf::{dictionary, Document, Object};
use std::time::Duration;

use pdf_form_editor::forms::{self, FieldRecord, FieldType, TopLeftRect};

/// Blank letter-size document with `pages` pages
fn blank_pdf(pages: usize) -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let kids: Vec<Object> = (0..pages)
        .map(|_| {
            doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            })
            .into()
        })
        .collect();

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut out = Vec::new();
    doc.save_to(&mut out).expect("save blank pdf");
    out
}

/// A mix of field types laid out in rows on every page
fn field_grid(pages: u32, per_page: u32) -> Vec<FieldRecord> {
    let types = [
        FieldType::Text,
        FieldType::Date,
        FieldType::Checkbox,
        FieldType::Textarea,
        FieldType::Signature,
    ];
    let mut fields = Vec::new();
    for page in 0..pages {
        for i in 0..per_page {
            let field_type = types[i as usize % types.len()];
            let height = if field_type == FieldType::Textarea { 60.0 } else { 20.0 };
            let rect = TopLeftRect {
                x: 72.0,
                y: 40.0 + f64::from(i) * 24.0,
                width: if field_type == FieldType::Checkbox { 12.0 } else { 240.0 },
                height,
            };
            fields.push(FieldRecord::new(
                format!("field_{}_{}", page, i),
                format!("{}_{}_{}", field_type.as_str(), page, i),
                field_type,
                page,
                rect,
            ));
        }
    }
    fields
}

fn bench_extraction(c: &mut Criterion) {
    let mut group = c.benchmark_group("form_extraction");
    group.measurement_time(Duration::from_secs(10));

    for pages in [1u32, 10, 50] {
        let blank = blank_pdf(pages as usize);
        let form = forms::regenerate(&blank, &field_grid(pages, 25)).expect("build form");
        group.throughput(Throughput::Bytes(form.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(pages), &form, |b, form| {
            b.iter(|| forms::extract_fields(black_box(form)))
        });
    }

    group.finish();
}

fn bench_regeneration(c: &mut Criterion) {
    let mut group = c.benchmark_group("form_regeneration");
    group.measurement_time(Duration::from_secs(10));

    for pages in [1u32, 10, 50] {
        let blank = blank_pdf(pages as usize);
        let fields = field_grid(pages, 25);
        group.throughput(Throughput::Elements(fields.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(pages), &fields, |b, fields| {
            b.iter(|| forms::regenerate(black_box(&blank), black_box(fields)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_extraction, bench_regeneration);
criterion_main!(benches);

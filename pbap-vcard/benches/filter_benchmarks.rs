// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Performance Benchmarks for Composing, Filtering and Exporting
//!
//! Run with: cargo bench -p pbap-vcard

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use pbap_vcard::{
    compose_contact, strip_telephone_formatting, AbortSignal, Category, ComposeOptions,
    ContactRecord, ExportConfig, ExportOrchestrator, ExportRequest, FilterMask, MockTransport,
    PhoneKind, PropertyFilter, SqliteRecordSource, VCardVersion,
};

fn sample_contact(photo_len: usize) -> ContactRecord {
    ContactRecord::new("Anna Berg")
        .with_name("Anna", "Berg")
        .with_nickname("Annie")
        .with_phone(PhoneKind::Mobile, "(555) 123-4567")
        .with_phone(PhoneKind::Work, "+1 555 987 6543,,22")
        .with_email("HOME", "anna@berg.example")
        .with_address("HOME", "1 Harbour Road")
        .with_organization("Acme", "Engineer")
        .with_note("Met at the conference")
        .with_photo(vec![0xA5; photo_len])
}

// =============================================================================
// COMPOSER BENCHMARKS
// =============================================================================

fn bench_compose(c: &mut Criterion) {
    let config = ExportConfig::default();
    let mut group = c.benchmark_group("compose");

    let plain = sample_contact(0);
    for version in [VCardVersion::V21, VCardVersion::V30] {
        let options = ComposeOptions::new(version, &config, true);
        group.bench_function(format!("contact_{}", version.as_str()), |b| {
            b.iter(|| compose_contact(black_box(&plain), black_box(&options)))
        });
    }

    // Photo dominates the card size
    let with_photo = sample_contact(16 * 1024);
    let options = ComposeOptions::new(VCardVersion::V30, &config, true);
    group.throughput(Throughput::Bytes(16 * 1024));
    group.bench_function("contact_photo_16KB", |b| {
        b.iter(|| compose_contact(black_box(&with_photo), black_box(&options)))
    });

    group.finish();
}

// =============================================================================
// FILTER BENCHMARKS
// =============================================================================

fn bench_filter(c: &mut Criterion) {
    let config = ExportConfig::default();
    let card = compose_contact(
        &sample_contact(16 * 1024),
        &ComposeOptions::new(VCardVersion::V21, &config, true),
    );

    let mut group = c.benchmark_group("filter");
    group.throughput(Throughput::Bytes(card.len() as u64));

    let keep_all = PropertyFilter::from_mask(Some(&FilterMask::all())).unwrap();
    group.bench_function("keep_all", |b| {
        b.iter(|| keep_all.apply(black_box(&card), VCardVersion::V21))
    });

    // Drops the folded photo and everything but N, FN and TEL
    let minimal = PropertyFilter::from_mask(Some(&FilterMask::with_bits(&[0, 1, 2, 7]))).unwrap();
    group.bench_function("drop_photo", |b| {
        b.iter(|| minimal.apply(black_box(&card), VCardVersion::V21))
    });

    group.bench_function("strip_telephone", |b| {
        b.iter(|| strip_telephone_formatting(black_box(&card)))
    });

    group.finish();
}

// =============================================================================
// EXPORT BENCHMARKS
// =============================================================================

fn bench_export_window(c: &mut Criterion) {
    let source = SqliteRecordSource::in_memory().unwrap();
    for i in 0..200 {
        source
            .insert_contact(
                &ContactRecord::new(&format!("Contact {:03}", i))
                    .with_phone(PhoneKind::Mobile, &format!("555 01{:02}", i % 100)),
            )
            .unwrap();
    }
    let config = ExportConfig::default();

    let mut group = c.benchmark_group("export");
    group.sample_size(20);

    for (start, end) in [(1, 10), (1, 200)] {
        let request = ExportRequest::new(Category::Phonebook, start, end);
        group.throughput(Throughput::Elements((end - start + 1) as u64));
        group.bench_function(format!("phonebook_{}_records", end - start + 1), |b| {
            b.iter(|| {
                let signal = AbortSignal::new();
                ExportOrchestrator::new(&source, &config, &signal)
                    .export_range(black_box(&request), MockTransport::new())
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_compose, bench_filter, bench_export_window);
criterion_main!(benches);

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use sheet_ingest::ingestion::{RowMapper, Source};
use sheet_ingest::types::{FieldMap, Record};
use sheet_ingest::MapperResult;

fn csv_body(rows: usize) -> String {
    let mut out = String::from("id,name,email,city,notes\n");
    for i in 0..rows {
        out.push_str(&format!("{i},user{i},user{i}@example.com,city{},note\n", i % 17));
    }
    out
}

fn fields() -> FieldMap {
    [("id", "id"), ("name", "name"), ("email", "email")].into_iter().collect()
}

fn bench_read_list(c: &mut Criterion) {
    let mut group = c.benchmark_group("read_list_csv");
    for rows in [1_000usize, 10_000] {
        let body = csv_body(rows);
        group.bench_with_input(BenchmarkId::new("collect", rows), &body, |b, body| {
            b.iter(|| {
                let records = RowMapper::new()
                    .set_source(Source::upload("bench.csv", body.as_bytes().to_vec()))
                    .unwrap()
                    .set_field_map(fields())
                    .read_list()
                    .unwrap();
                black_box(records.len())
            })
        });
        group.bench_with_input(BenchmarkId::new("batched_500", rows), &body, |b, body| {
            b.iter(|| {
                let mut n = 0usize;
                RowMapper::new()
                    .set_source(Source::upload("bench.csv", body.as_bytes().to_vec()))
                    .unwrap()
                    .set_field_map(fields())
                    .set_batch(500, |batch: Vec<Record>| -> MapperResult<()> {
                        n += batch.len();
                        Ok(())
                    })
                    .unwrap()
                    .read_list()
                    .unwrap();
                black_box(n)
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_read_list);
criterion_main!(benches);

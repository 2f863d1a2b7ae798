use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use geosearch_documents::{DocumentParser, ResultSet, SearchResponse};
use serde_json::{json, Value};

fn response(count: usize) -> SearchResponse {
    let docs = (0..count)
        .map(|i| {
            let x = (i % 359) as f64 - 180.0;
            let x1 = x + 1.0;
            let geom = match i % 3 {
                0 => format!("{{'type':'Feature','geometry':{{'type':'Point','coordinates':[{x},50]}}}}"),
                1 => format!(
                    "{{'type':'Feature','geometry':{{'type':'LineString','coordinates':[[{x},50],[{x},51],[{x},52]]}}}}"
                ),
                _ => format!(
                    "{{'type':'Feature','geometry':{{'type':'Polygon','coordinates':[[[{x},50],[{x1},50],[{x1},51],[{x},50]]]}}}}"
                ),
            };
            match json!({"id": format!("doc-{i}"), "title": [format!("Sheet {i}")], "geom": [geom]}) {
                Value::Object(map) => map,
                _ => unreachable!(),
            }
        })
        .collect();
    SearchResponse {
        docs,
        num_found: count as u64,
    }
}

fn bench_from_response(c: &mut Criterion) {
    let parser = DocumentParser::default();
    let mut group = c.benchmark_group("result_set");

    for size in [100, 1_000, 10_000] {
        let input = response(size);
        group.bench_with_input(BenchmarkId::new("from_response", size), &input, |b, input| {
            b.iter(|| ResultSet::from_response(black_box(input.clone()), &parser))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_from_response);
criterion_main!(benches);

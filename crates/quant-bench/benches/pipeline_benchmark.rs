//! Compiler Performance Benchmarks
//!
//! Run with: `cargo bench --package quant-bench pipeline_benchmark`

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use quant_core::{
    BuildOptions, MatchMode, PropertyCatalog, collect_flat_rules, compile_jit, compile_source,
    expand_nesting, extract_classes, parse, validate,
};
use std::hint::black_box;

const UTILITIES: &str = r#"
btn {
  padding: 0.5rem 1rem;
  color: white;
  background-color: #2563eb;
  &:hover { background-color: #1d4ed8; }
  &:focus { outline: 2px solid #93c5fd; }
}

card { padding: 1rem; border-radius: 0.5rem; }
flex { display: flex; }
hidden { display: none !important; }

@media (min-width: 768px) {
  md:flex { display: flex; }
  md:grid { display: grid; }
  @supports (gap: 1rem) {
    md:gap-4 { gap: 1rem; }
  }
}
"#;

const MARKUP: &str = r#"
<main class="card md:flex">
  <button class="btn hover:btn focus:btn">Save</button>
  <div className={`flex ${open ? "md:grid" : "hidden"} md:gap-4`}></div>
  <!-- <span class="commented-out"></span> -->
</main>
"#;

/// Stylesheet with `count` generated utilities after the sample rules
fn generated_stylesheet(count: usize) -> String {
    let mut source = String::from(UTILITIES);
    for i in 0..count {
        source.push_str(&format!("p-{i} {{ padding: {i}px; }}\nm-{i} {{ margin: {i}px; }}\n"));
    }
    source
}

fn bench_parser(c: &mut Criterion) {
    let mut group = c.benchmark_group("parser");

    group.bench_function("sample_utilities", |b| {
        b.iter(|| black_box(parse(black_box(UTILITIES))));
    });

    for size in [100, 1000] {
        let source = generated_stylesheet(size);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}_utilities_{}KB", size * 2, source.len() / 1024)),
            &source,
            |b, source| b.iter(|| black_box(parse(source))),
        );
    }

    group.finish();
}

fn bench_validation(c: &mut Criterion) {
    let catalog = PropertyCatalog::standard();
    let source = generated_stylesheet(500);
    let parsed = parse(&source);

    c.bench_function("validate_1000_utilities", |b| {
        b.iter(|| black_box(validate(&parsed.stylesheet, &catalog)));
    });
}

fn bench_jit(c: &mut Criterion) {
    let mut group = c.benchmark_group("jit");

    let source = generated_stylesheet(1000);
    let rules = collect_flat_rules(&expand_nesting(&parse(&source).stylesheet));
    let used: Vec<String> = (0..1000)
        .step_by(10)
        .map(|i| format!("md:p-{i}"))
        .chain(["btn", "btn:hover", "md:flex"].map(String::from))
        .collect();

    for mode in [MatchMode::Flex, MatchMode::Strict] {
        group.bench_with_input(BenchmarkId::new("compile", mode), &mode, |b, &mode| {
            b.iter(|| black_box(compile_jit(&rules, &used, mode)));
        });
    }

    group.finish();
}

fn bench_scanner(c: &mut Criterion) {
    let mut group = c.benchmark_group("scanner");

    group.bench_function("extract_sample_markup", |b| {
        b.iter(|| black_box(extract_classes(black_box(MARKUP))));
    });

    let large_markup = MARKUP.repeat(500);
    group.bench_function("extract_large_markup", |b| {
        b.iter(|| black_box(extract_classes(&large_markup)));
    });

    group.finish();
}

fn bench_end_to_end(c: &mut Criterion) {
    let used = extract_classes(MARKUP);
    let options = BuildOptions::default();

    c.bench_function("compile_source_sample", |b| {
        b.iter(|| black_box(compile_source(black_box(UTILITIES), &used, &options)));
    });
}

criterion_group!(
    benches,
    bench_parser,
    bench_validation,
    bench_jit,
    bench_scanner,
    bench_end_to_end
);
criterion_main!(benches);

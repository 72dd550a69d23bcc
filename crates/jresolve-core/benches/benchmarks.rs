use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use jresolve_core::config::Config;
use jresolve_core::parser::ParsedFile;
use jresolve_core::semantic::SemanticModel;
use jresolve_core::syntax::CompilationUnit;

const FIXTURES_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../tests/fixtures");

fn generate_500_loc_java() -> String {
    let mut code = String::with_capacity(20000);
    code.push_str("package bench;\n\npublic class Generated {\n");

    for i in 0..25 {
        code.push_str(&format!(
            r#"
  static class Entity{i} extends Base {{
    private int id;
    private String name;

    Entity{i}(int id, String name) {{
      this.id = id;
      this.name = name;
    }}

    int score(int factor) {{
      int total = 0;
      outer:
      for (int k = 0; k < factor; k++) {{
        if (k > id) break outer;
        total += k * id;
      }}
      return total + shared;
    }}
  }}
"#,
            i = i
        ));
    }

    code.push_str("\n  static class Base {\n    int shared;\n  }\n}\n");
    code
}

fn generate_project(files: usize) -> Vec<(String, String)> {
    (0..files)
        .map(|i| {
            let previous = i.saturating_sub(1);
            let filename = format!("bench/p{i}/Item{i}.java");
            let content = format!(
                r#"package bench.p{i};

import bench.p{previous}.Item{previous};

public class Item{i} extends Item{previous} {{
  protected int value{i};

  int process(Item{previous} other) {{
    int local = value{i};
    return local + other.hashCode();
  }}
}}
"#,
            );
            (filename, content)
        })
        .collect()
}

fn parse_all(files: &[(String, String)]) -> Vec<CompilationUnit> {
    files
        .iter()
        .map(|(name, content)| ParsedFile::from_source(name, content).into_unit())
        .collect()
}

fn read_fixture(path: &str) -> String {
    std::fs::read_to_string(format!("{}/{}", FIXTURES_DIR, path))
        .unwrap_or_else(|_| panic!("Failed to read fixture: {}", path))
}

fn bench_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("parsing");

    let code_500 = generate_500_loc_java();
    let lines_500 = code_500.lines().count();

    group.throughput(Throughput::Elements(lines_500 as u64));
    group.bench_function("parse_500_loc", |b| {
        b.iter(|| ParsedFile::from_source(black_box("Generated.java"), black_box(&code_500)))
    });

    let field_access = read_fixture("java/references/FieldAccess.java");
    group.throughput(Throughput::Elements(field_access.lines().count() as u64));
    group.bench_function("parse_field_access", |b| {
        b.iter(|| ParsedFile::from_source(black_box("FieldAccess.java"), black_box(&field_access)))
    });

    group.finish();
}

fn bench_model(c: &mut Criterion) {
    let mut group = c.benchmark_group("model");

    let code_500 = generate_500_loc_java();
    let unit = ParsedFile::from_source("Generated.java", &code_500).into_unit();
    group.bench_function("build_500_loc", |b| {
        b.iter(|| SemanticModel::build(black_box(&unit)))
    });

    let sequential = Config {
        resolution: jresolve_core::config::ResolutionConfig {
            parallel: false,
            ..Default::default()
        },
        ..Default::default()
    };
    let parallel = Config::default();

    for size in [10, 50, 200] {
        let units = parse_all(&generate_project(size));
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("sequential", size), &units, |b, units| {
            b.iter(|| SemanticModel::build_all(black_box(units), &sequential))
        });
        group.bench_with_input(BenchmarkId::new("parallel", size), &units, |b, units| {
            b.iter(|| SemanticModel::build_all(black_box(units), &parallel))
        });
    }

    group.finish();
}

fn bench_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("queries");

    let units = parse_all(&generate_project(100));
    let model = match SemanticModel::build_all(&units, &Config::default()) {
        Ok(model) => model,
        Err(e) => panic!("model failed to build: {e}"),
    };

    group.bench_function("resolve_reference", |b| {
        b.iter(|| {
            for unit in 0..units.len() {
                black_box(model.resolve_reference(unit, black_box(9), black_box(17)));
            }
        })
    });

    group.bench_function("find_symbol_at", |b| {
        b.iter(|| model.find_symbol_at(black_box("local"), black_box(9)))
    });

    group.finish();
}

criterion_group!(benches, bench_parsing, bench_model, bench_queries);
criterion_main!(benches);

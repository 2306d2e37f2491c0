//! Lexer, parser and evaluation throughput benchmarks
//!
//! Measures each stage of a query separately so regressions can be pinned
//! to one of them:
//! - Lexing expressions of increasing predicate depth
//! - Parsing the same expressions into an AST
//! - Evaluating axis-heavy paths over documents of growing size
//!
//! Run benchmarks: `cargo bench --bench xpath_throughput`
//!
//! Compare specific groups:
//! ```
//! cargo bench --bench xpath_throughput -- "lexer"
//! cargo bench --bench xpath_throughput -- "evaluate"
//! ```

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use petty_xmltree::XmlDocument;
use petty_xpath1::{EvaluationContext, FunctionRegistry, evaluate, parse_expression, tokenize};
use std::collections::HashMap;
use std::hint::black_box;

/// `a[b[c[...]]]/@id`, nested `depth` predicates deep.
fn nested_expression(depth: usize) -> String {
    let mut expr = String::from("n0");
    for i in 1..=depth {
        expr.push_str(&format!("[n{}", i));
    }
    expr.push_str(&"]".repeat(depth));
    expr.push_str("/@id");
    expr
}

/// A flat document with `sections` sections of ten items each.
fn generate_document(sections: usize) -> String {
    let mut xml = String::from("<root>");
    for s in 0..sections {
        xml.push_str(&format!("<section id=\"s{}\">", s));
        for i in 0..10 {
            xml.push_str(&format!(
                "<item id=\"i{}-{}\" price=\"{}\"><name>Item {}</name></item>",
                s, i, i, i
            ));
        }
        xml.push_str("</section>");
    }
    xml.push_str("</root>");
    xml
}

fn bench_lexer(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer");
    for depth in [1, 4, 16, 30] {
        let expr = nested_expression(depth);
        group.throughput(Throughput::Bytes(expr.len() as u64));
        group.bench_with_input(BenchmarkId::new("nested_predicates", depth), &expr, |b, e| {
            b.iter(|| tokenize(black_box(e)))
        });
    }
    let mixed = "//section[@id='s1' or count(item[@price > 5]) >= 2]/item[last()]/name";
    group.bench_function("mixed_operators", |b| b.iter(|| tokenize(black_box(mixed))));
    group.finish();
}

fn bench_parser(c: &mut Criterion) {
    let mut group = c.benchmark_group("parser");
    for depth in [1, 4, 16, 30] {
        let expr = nested_expression(depth);
        group.bench_with_input(BenchmarkId::new("nested_predicates", depth), &expr, |b, e| {
            b.iter(|| parse_expression(black_box(e)))
        });
    }
    group.finish();
}

fn bench_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate");
    let funcs = FunctionRegistry::default();
    let queries = [
        ("descendant", "count(//item)"),
        ("predicate", "//item[@price > 7]/name"),
        ("preceding", "count(//section[last()]/item[1]/preceding::item)"),
        ("following_sibling", "//item[1]/following-sibling::item[@price = 3]"),
    ];

    for sections in [10, 100] {
        let xml = generate_document(sections);
        let doc = XmlDocument::parse(&xml).unwrap();
        let root = doc.root_node();
        let vars = HashMap::new();
        let e_ctx = EvaluationContext::new(root, root, &funcs, &vars);

        group.throughput(Throughput::Elements((sections * 10) as u64));
        for (label, query) in queries {
            let expr = parse_expression(query).unwrap();
            group.bench_with_input(BenchmarkId::new(label, sections), &expr, |b, e| {
                b.iter(|| evaluate(black_box(e), &e_ctx).unwrap())
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_lexer, bench_parser, bench_evaluate);
criterion_main!(benches);

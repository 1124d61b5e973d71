// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

use std::fs;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tempfile::TempDir;

use mdoc::{listing::list_files, markdown, request::Request, Handler};

fn request_parse_benchmark(c: &mut Criterion) {
    let request = b"GET /docs/api/guide.md?rev=2 HTTP/1.1\r\n\
                    Host: localhost:3000\r\n\
                    User-Agent: Mozilla/5.0 (Windows NT 10.0; Win64; x64)\r\n\
                    Accept-Encoding: gzip, deflate, br\r\n\
                    If-Modified-Since: Tue, 14 Nov 2023 22:13:20 GMT\r\n\
                    \r\n";

    c.bench_function("request_parse", |b| {
        b.iter(|| {
            let buffer = black_box(request.to_vec());
            let _ = Request::try_from(&buffer, 0).unwrap();
        });
    });
}

fn markdown_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("markdown_to_html");
    for sections in [1usize, 10, 100] {
        let source = "## Section\n\nSome *emphasis*, a [link](a.md) and `code`.\n\n| a | b |\n|---|---|\n| 1 | 2 |\n\n"
            .repeat(sections);
        group.bench_with_input(BenchmarkId::from_parameter(sections), &source, |b, source| {
            b.iter(|| markdown::to_html(black_box(source.as_bytes())));
        });
    }
    group.finish();
}

fn fixture() -> (TempDir, TempDir) {
    let docs = TempDir::new().unwrap();
    for i in 0..200 {
        fs::write(docs.path().join(format!("doc{:03}.md", i)), "# Doc\n\ntext").unwrap();
    }
    for i in 0..20 {
        fs::create_dir(docs.path().join(format!("dir{:02}", i))).unwrap();
        fs::write(docs.path().join(format!(".hidden{}.md", i)), "x").unwrap();
    }
    let theme = TempDir::new().unwrap();
    fs::write(
        theme.path().join("layout.html"),
        "<!DOCTYPE html><html><body>{% block content %}{% endblock %}</body></html>",
    )
    .unwrap();
    fs::write(
        theme.path().join("index.html"),
        r#"{% extends "layout.html" %}{% block content %}{% for f in files %}<a href="{{ f.display_name }}">{{ f.display_name }}</a>{% endfor %}{% endblock %}"#,
    )
    .unwrap();
    fs::write(
        theme.path().join("doc.html"),
        r#"{% extends "layout.html" %}{% block content %}{{ content }}{% endblock %}"#,
    )
    .unwrap();
    (docs, theme)
}

fn listing_benchmark(c: &mut Criterion) {
    let (docs, _theme) = fixture();
    c.bench_function("list_files_220_entries", |b| {
        b.iter(|| list_files(black_box(docs.path())).unwrap());
    });
}

fn handler_benchmark(c: &mut Criterion) {
    let (docs, theme) = fixture();
    let handler = Handler::builder(docs.path())
        .theme(theme.path())
        .build()
        .unwrap();
    let mut group = c.benchmark_group("handler_serve");
    for (name, raw) in [
        ("listing", "GET / HTTP/1.1\r\n\r\n"),
        ("document", "GET /doc042.md HTTP/1.1\r\n\r\n"),
        ("redirect", "GET /dir07 HTTP/1.1\r\n\r\n"),
        ("not_found", "GET /missing.md HTTP/1.1\r\n\r\n"),
    ] {
        let request = Request::try_from(raw.as_bytes(), 0).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(name), &request, |b, request| {
            b.iter(|| handler.serve(black_box(request)));
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    request_parse_benchmark,
    markdown_benchmark,
    listing_benchmark,
    handler_benchmark
);
criterion_main!(benches);

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use tessella::{
    find_tables, AxisConvention, Char, Color, LinePath, Page, PageSource, PathKind, RectPrim,
    TfSettings,
};

struct GridSource {
    n: usize,
    lines: Vec<LinePath>,
}

impl GridSource {
    fn new(n: usize) -> Self {
        let step = 10.0;
        let extent = step * n as f64;
        let mut lines = Vec::with_capacity(2 * (n + 1));
        for i in 0..=n {
            let offset = step * i as f64;
            lines.push(LinePath {
                kind: PathKind::Straight,
                points: vec![(0.0, offset), (extent, offset)],
                color: Color::BLACK,
                width: 1.0,
            });
            lines.push(LinePath {
                kind: PathKind::Straight,
                points: vec![(offset, 0.0), (offset, extent)],
                color: Color::BLACK,
                width: 1.0,
            });
        }
        Self { n, lines }
    }
}

impl PageSource for GridSource {
    fn width(&self) -> f64 {
        10.0 * self.n as f64
    }
    fn height(&self) -> f64 {
        10.0 * self.n as f64
    }
    fn chars(&mut self) -> Box<dyn Iterator<Item = Char> + '_> {
        Box::new(std::iter::empty())
    }
    fn lines(&mut self) -> Box<dyn Iterator<Item = LinePath> + '_> {
        Box::new(std::mem::take(&mut self.lines).into_iter())
    }
    fn rects(&mut self) -> Box<dyn Iterator<Item = RectPrim> + '_> {
        Box::new(std::iter::empty())
    }
    fn is_valid(&self) -> bool {
        true
    }
}

fn bench_find_tables(c: &mut Criterion) {
    let settings = TfSettings::default();
    let mut group = c.benchmark_group("find_tables_grid");

    for n in [4usize, 12, 24] {
        let mut source = GridSource::new(n);
        let page = Page::from_source(0, AxisConvention::TopOrigin, &mut source).expect("page");
        group.bench_with_input(BenchmarkId::from_parameter(n), &page, |b, page| {
            b.iter(|| {
                let tables = find_tables(page, false, &settings).expect("find tables");
                black_box(tables.len());
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_find_tables);
criterion_main!(benches);

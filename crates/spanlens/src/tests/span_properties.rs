use proptest::prelude::*;

use crate::span::{Span, SpanMap, SpanMapBuilder};

/// Bands of rows; each band holds spans anchored on its first row at
/// disjoint column ranges. Bands never share rows, so the spans never
/// overlap and come out in `(row, col)` order.
fn sorted_spans() -> impl Strategy<Value = Vec<Span>> {
    let segment = (0i32..3, 1i32..4, 1i32..4);
    let band = (0i32..3, 1i32..5, prop::collection::vec(segment, 1..5));
    prop::collection::vec(band, 0..12).prop_map(|bands| {
        let mut spans = Vec::new();
        let mut row = 0;
        for (gap, height, segments) in bands {
            row += gap;
            let mut col = 0;
            for (col_gap, width, rows) in segments {
                col += col_gap;
                spans.push(Span::new(row, col, rows.min(height), width));
                col += width;
            }
            row += height;
        }
        spans
    })
}

fn build(spans: &[Span]) -> SpanMap {
    let mut map = SpanMap::with_chunk(4);
    for s in spans {
        map.add(s.row, s.col, s.rows, s.cols);
    }
    map
}

fn extent(spans: &[Span]) -> (i32, i32) {
    let rows = spans.iter().map(|s| s.row + s.rows).max().unwrap_or(0) + 2;
    let cols = spans.iter().map(|s| s.col + s.cols).max().unwrap_or(0) + 2;
    (rows, cols)
}

fn expected(spans: &[Span], row: i32, col: i32) -> Option<Span> {
    spans
        .iter()
        .copied()
        .find(|s| !s.is_degenerate() && s.contains(row, col))
}

proptest! {
    #[test]
    fn every_covered_cell_resolves_to_its_anchor(spans in sorted_spans()) {
        let map = build(&spans);
        let (rows, cols) = extent(&spans);
        for row in -1..rows {
            for col in -1..cols {
                let got = map.get(row, col);
                match expected(&spans, row, col) {
                    Some(s) => {
                        let rect = got.expect("covered cell must resolve");
                        prop_assert_eq!(rect.anchor_row(row), s.row);
                        prop_assert_eq!(rect.anchor_col(col), s.col);
                        prop_assert_eq!(rect.size(), s.size());
                        prop_assert!(rect.x <= 0 && rect.y <= 0);
                    }
                    None => prop_assert_eq!(got, None),
                }
            }
        }
    }

    #[test]
    fn builder_accepts_any_order(spans in sorted_spans()) {
        let mut builder = SpanMapBuilder::new();
        builder.extend(spans.iter().rev().copied());
        let built = builder.build().expect("disjoint spans build");
        let direct = build(&spans);
        prop_assert_eq!(built.span_count(), direct.span_count());
        let (rows, cols) = extent(&spans);
        for row in 0..rows {
            for col in 0..cols {
                prop_assert_eq!(built.get(row, col), direct.get(row, col));
            }
        }
    }

    #[test]
    fn checked_add_agrees_with_add(spans in sorted_spans()) {
        let mut checked = SpanMap::new();
        for s in &spans {
            prop_assert!(checked.try_add(s.row, s.col, s.rows, s.cols).is_ok());
        }
        let direct = build(&spans);
        prop_assert_eq!(checked.len(), direct.len());
        prop_assert_eq!(checked.span_count(), direct.span_count());
    }

    #[test]
    fn trim_drops_exactly_the_untouched_containers(
        spans in sorted_spans(),
        picks in prop::collection::vec(any::<bool>(), 0..64),
    ) {
        let mut map = build(&spans);
        let stored: Vec<Span> = spans.iter().copied().filter(|s| !s.is_degenerate()).collect();
        let hit: Vec<Span> = stored
            .iter()
            .zip(picks.iter().chain(std::iter::repeat(&false)))
            .filter(|(_, pick)| **pick)
            .map(|(s, _)| *s)
            .collect();

        let mut touched: Vec<usize> = hit
            .iter()
            .filter_map(|s| map.containers().iter().position(|c| c.spans().contains(s)))
            .collect();
        touched.sort_unstable();
        touched.dedup();

        let before = map.len();
        let snapshot: Vec<_> = hit.iter().map(|s| map.get(s.last_row(), s.last_col())).collect();

        map.mark();
        for s in &hit {
            map.get(s.row, s.col);
        }
        let removed = map.trim();

        prop_assert_eq!(removed, before - touched.len());
        prop_assert_eq!(map.len(), touched.len());
        for (s, rect) in hit.iter().zip(snapshot) {
            prop_assert_eq!(map.get(s.last_row(), s.last_col()), rect);
        }
    }
}

use spanlens_common::{LensError, Result};

use super::{Span, SpanMap, span_map::DEFAULT_CHUNK};

/// Collects spans in any order and produces a [`SpanMap`].
///
/// `build` sorts by anchor and rejects overlapping rectangles, so callers
/// that cannot guarantee the `(row, col)` order required by
/// [`SpanMap::add`] go through here.
#[derive(Debug, Clone)]
pub struct SpanMapBuilder {
    spans: Vec<Span>,
    chunk: usize,
}

impl Default for SpanMapBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SpanMapBuilder {
    pub fn new() -> Self {
        Self {
            spans: Vec::new(),
            chunk: DEFAULT_CHUNK,
        }
    }

    pub fn with_chunk(mut self, chunk: usize) -> Self {
        self.chunk = chunk;
        self
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    pub fn push(&mut self, row: i32, col: i32, rows: i32, cols: i32) -> &mut Self {
        self.spans.push(Span::new(row, col, rows, cols));
        self
    }

    pub fn push_span(&mut self, span: Span) -> &mut Self {
        self.spans.push(span);
        self
    }

    pub fn build(mut self) -> Result<SpanMap> {
        if let Some(bad) = self.spans.iter().find(|s| !s.is_valid()) {
            return Err(LensError::InvalidSpan {
                row: bad.row,
                col: bad.col,
                rows: bad.rows,
                cols: bad.cols,
            });
        }
        self.spans.retain(|s| !s.is_degenerate());
        self.spans.sort_by_key(|s| (s.row, s.col));

        let mut map = SpanMap::with_chunk(self.chunk);
        for span in self.spans {
            map.try_add(span.row, span.col, span.rows, span.cols)?;
        }
        Ok(map)
    }
}

impl Extend<Span> for SpanMapBuilder {
    fn extend<I: IntoIterator<Item = Span>>(&mut self, iter: I) {
        self.spans.extend(iter);
    }
}

impl FromIterator<Span> for SpanMapBuilder {
    fn from_iter<I: IntoIterator<Item = Span>>(iter: I) -> Self {
        let mut builder = SpanMapBuilder::new();
        builder.extend(iter);
        builder
    }
}

#[derive(Debug, Copy, Clone, PartialEq, PartialOrd, Eq, Ord, Hash, Default)]
pub struct BytePos(pub u32);

impl BytePos {
    pub fn shift(self, ch: char) -> Self {
        BytePos(self.0 + ch.len_utf8() as u32)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: BytePos,
    pub end: BytePos,
}

impl Span {
    pub const fn new(start: BytePos, end: BytePos) -> Self {
        Span { start, end }
    }

    pub const fn empty() -> Self {
        Span {
            start: BytePos(0),
            end: BytePos(0),
        }
    }

    pub fn union_span(a: Self, b: Self) -> Self {
        use std::cmp;

        Span {
            start: cmp::min(a.start, b.start),
            end: cmp::max(a.end, b.end),
        }
    }

    pub fn union<A: Into<Span>, B: Into<Span>>(a: A, b: B) -> Self {
        Self::union_span(a.into(), b.into())
    }
}

impl<T> From<&WithSpan<T>> for Span {
    fn from(with_span: &WithSpan<T>) -> Span {
        with_span.span
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WithSpan<T> {
    pub value: T,
    pub span: Span,
}

impl<T> WithSpan<T> {
    pub const fn new(value: T, span: Span) -> Self {
        WithSpan { value, span }
    }

    pub const fn empty(value: T) -> Self {
        Self {
            value,
            span: Span::empty(),
        }
    }

    pub const fn as_ref(&self) -> WithSpan<&T> {
        WithSpan {
            span: self.span,
            value: &self.value,
        }
    }
}

/// A source-level problem reported by the tokenizer or a parser. The message
/// carries no position prefix; drivers render it with a line number computed
/// through [`LineOffsets`].
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub span: Span,
    pub message: String,
}

/// Byte offsets of every line start, for mapping a `BytePos` to a 1-based
/// line number.
#[derive(Debug, Clone)]
pub struct LineOffsets {
    offsets: Vec<u32>,
}

impl LineOffsets {
    pub fn new(source: &str) -> Self {
        let mut offsets = vec![0];
        for (index, byte) in source.bytes().enumerate() {
            if byte == b'\n' {
                offsets.push(index as u32 + 1);
            }
        }
        LineOffsets { offsets }
    }

    pub fn line(&self, pos: BytePos) -> u32 {
        self.offsets.partition_point(|&start| start <= pos.0) as u32
    }
}

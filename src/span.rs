use derive_more::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[display(fmt = "[{}:{}]", start, end)]
pub struct Span {
    // half-open range of character offsets
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }

    pub fn empty(at: usize) -> Self {
        Span { start: at, end: at }
    }

    pub fn string_from_chars(&self, chars: &[char]) -> String {
        chars[self.start..self.end].iter().collect()
    }
}

//! Append-only token log with shared segments.
//!
//! Tokens are sealed into immutable `Arc<[Token]>` segments of
//! [`SEGMENT_LEN`] tokens; only the last, partially filled segment is an
//! owned `Vec`. Taking a prefix for a resumed parse shares every whole
//! segment and copies at most one segment's worth of tokens.

use std::sync::Arc;

use super::cursor::Token;

/// Tokens per sealed segment
const SEGMENT_LEN: usize = 512;

#[derive(Debug, Clone, Default)]
pub struct TokenLog {
    /// Full segments, each exactly `SEGMENT_LEN` long
    sealed: Vec<Arc<[Token]>>,
    tail: Vec<Token>,
}

impl TokenLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sealed.len() * SEGMENT_LEN + self.tail.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sealed.is_empty() && self.tail.is_empty()
    }

    pub fn push(&mut self, token: Token) {
        self.tail.push(token);
        if self.tail.len() == SEGMENT_LEN {
            let segment: Arc<[Token]> = std::mem::take(&mut self.tail).into();
            self.sealed.push(segment);
        }
    }

    pub fn get(&self, index: usize) -> Option<&Token> {
        let segment = index / SEGMENT_LEN;
        match self.sealed.get(segment) {
            Some(tokens) => tokens.get(index % SEGMENT_LEN),
            None => self.tail.get(index - self.sealed.len() * SEGMENT_LEN),
        }
    }

    pub fn last(&self) -> Option<&Token> {
        self.tail
            .last()
            .or_else(|| self.sealed.last().and_then(|tokens| tokens.last()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Token> {
        self.sealed
            .iter()
            .flat_map(|tokens| tokens.iter())
            .chain(self.tail.iter())
    }

    /// The first `len` tokens, or `None` if the log is shorter.
    pub fn prefix(&self, len: usize) -> Option<Self> {
        if len > self.len() {
            return None;
        }
        let whole = len / SEGMENT_LEN;
        let rest = len % SEGMENT_LEN;
        let source: &[Token] = match self.sealed.get(whole) {
            Some(tokens) => tokens,
            None => &self.tail,
        };
        Some(Self {
            sealed: self.sealed[..whole].to_vec(),
            tail: source[..rest].to_vec(),
        })
    }

    /// Number of sealed segments `other` shares with this log.
    pub fn shared_segments(&self, other: &TokenLog) -> usize {
        self.sealed
            .iter()
            .zip(&other.sealed)
            .take_while(|(a, b)| Arc::ptr_eq(a, b))
            .count()
    }
}

impl PartialEq for TokenLog {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl Eq for TokenLog {}

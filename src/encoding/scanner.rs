//! Cursor-based scanner over type-encoding text.
//!
//! [`Scanner`] keeps a position within an encoding string and offers the handful of
//! primitives the classifier and the property type scanner need: peeking, advancing,
//! matching literals and consuming text up to a set of delimiters.
//!
//! All delimiters used by the encoding grammar are ASCII, so every position the scanner
//! stops at is a valid `char` boundary and the returned slices are always valid `&str`.
//!
//! # Examples
//!
//! ```rust
//! use objscope::encoding::Scanner;
//!
//! let mut scanner = Scanner::new("@\"NSString\"");
//! assert!(scanner.scan_literal("@\""));
//! assert_eq!(scanner.scan_up_to(b"\"<"), Some("NSString"));
//! assert_eq!(scanner.peek_byte(), Some(b'"'));
//! ```

/// A cursor over the bytes of a type-encoding string.
pub struct Scanner<'a> {
    /// The text being scanned
    data: &'a str,
    /// Current byte position within `data`
    position: usize,
}

impl<'a> Scanner<'a> {
    /// Create a new [`Scanner`] positioned at the start of `data`.
    #[must_use]
    pub fn new(data: &'a str) -> Self {
        Scanner { data, position: 0 }
    }

    /// Returns the length of the underlying text in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the underlying text is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the current byte position.
    #[must_use]
    pub fn pos(&self) -> usize {
        self.position
    }

    /// Returns `true` while unconsumed text remains.
    #[must_use]
    pub fn has_more_data(&self) -> bool {
        self.position < self.data.len()
    }

    /// Returns the unconsumed remainder of the text.
    #[must_use]
    pub fn remaining(&self) -> &'a str {
        // position only ever rests after ASCII bytes or at the end
        self.data.get(self.position..).unwrap_or_default()
    }

    /// Returns the byte at the current position without consuming it.
    #[must_use]
    pub fn peek_byte(&self) -> Option<u8> {
        self.data.as_bytes().get(self.position).copied()
    }

    /// Moves the position forward by one byte, saturating at the end.
    pub fn advance(&mut self) {
        if self.has_more_data() {
            self.position += 1;
        }
    }

    /// Consumes `literal` if the remaining text starts with it.
    ///
    /// Returns `false` and leaves the position untouched otherwise.
    pub fn scan_literal(&mut self, literal: &str) -> bool {
        if self.remaining().starts_with(literal) {
            self.position += literal.len();
            true
        } else {
            false
        }
    }

    /// Consumes one byte if it is `byte`.
    pub fn scan_byte(&mut self, byte: u8) -> bool {
        if self.peek_byte() == Some(byte) {
            self.position += 1;
            true
        } else {
            false
        }
    }

    /// Consumes text up to (not including) the first of the ASCII `delimiters`, or to the end.
    ///
    /// Returns `None` when nothing was consumed, i.e. the scanner already sits on a
    /// delimiter or at the end of the text.
    pub fn scan_up_to(&mut self, delimiters: &[u8]) -> Option<&'a str> {
        let rest = self.remaining();
        let stop = rest
            .bytes()
            .position(|b| delimiters.contains(&b))
            .unwrap_or(rest.len());

        if stop == 0 {
            return None;
        }

        self.position += stop;
        rest.get(..stop)
    }

    /// Consumes bytes while `accept` returns `Some`, folding the accepted values with `fold`.
    ///
    /// Returns the folded value and the number of bytes consumed.
    pub fn scan_while<T, F, G>(&mut self, init: T, accept: F, fold: G) -> (T, usize)
    where
        F: Fn(u8) -> Option<T>,
        G: Fn(T, T) -> T,
    {
        let start = self.position;
        let mut acc = init;

        while let Some(byte) = self.peek_byte() {
            match accept(byte) {
                Some(value) => {
                    acc = fold(acc, value);
                    self.position += 1;
                }
                None => break,
            }
        }

        (acc, self.position - start)
    }
}

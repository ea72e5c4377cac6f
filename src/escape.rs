//! Protected-region scanning.
//! Text between a pair of `ignore_balanced` delimiters, or after an
//! `ignore_line` prefix up to the end of its line, is protected: it never
//! holds an interpolation site and is never used as a split point.

use crate::config::EscapeRules;
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Open,
    Balanced(char),
    Line,
}

/// Incremental scanner that tracks whether the text fed so far ends inside a
/// protected region.
#[derive(Debug, Clone)]
pub struct EscapeScanner<'a> {
    rules: &'a EscapeRules,
    state: State,
    escaped: bool,
}

impl<'a> EscapeScanner<'a> {
    pub fn new(rules: &'a EscapeRules) -> Self {
        Self {
            rules,
            state: State::Open,
            escaped: false,
        }
    }

    /// True when the next character would land inside a protected region.
    pub fn is_protected(&self) -> bool {
        self.state != State::Open
    }

    /// Advances over all of `text`.
    pub fn feed(&mut self, text: &str) {
        let mut pos = 0;
        while pos < text.len() {
            pos += self.step(&text[pos..]);
        }
    }

    /// Consumes one token at the start of `rest` and returns its byte length.
    pub fn step(&mut self, rest: &str) -> usize {
        let Some(c) = rest.chars().next() else {
            return 0;
        };
        match self.state {
            State::Open => {
                if let Some(prefix) = self
                    .rules
                    .ignore_line
                    .iter()
                    .find(|p| !p.is_empty() && rest.starts_with(p.as_str()))
                {
                    self.state = State::Line;
                    return prefix.len();
                }
                if self.rules.ignore_balanced.contains(&c) {
                    self.state = State::Balanced(c);
                    self.escaped = false;
                }
            }
            State::Balanced(delim) => {
                if self.escaped {
                    self.escaped = false;
                } else if c == '\\' {
                    self.escaped = true;
                } else if c == delim {
                    self.state = State::Open;
                }
            }
            State::Line => {
                if c == '\n' {
                    self.state = State::Open;
                }
            }
        }
        c.len_utf8()
    }
}

/// Byte ranges of a text that are protected under a set of escape rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProtectedRegions {
    ranges: Vec<Range<usize>>,
}

impl ProtectedRegions {
    /// Scans `text` once. A region starts at its opening delimiter or line
    /// prefix and ends after the closing delimiter or at the newline. An
    /// unterminated region runs to the end of the text.
    pub fn scan(text: &str, rules: &EscapeRules) -> Self {
        let mut scanner = EscapeScanner::new(rules);
        let mut ranges: Vec<Range<usize>> = Vec::new();
        let mut start = None;
        let mut pos = 0;
        while pos < text.len() {
            let was_protected = scanner.is_protected();
            let len = scanner.step(&text[pos..]);
            match (was_protected, scanner.is_protected()) {
                (false, true) => start = Some(pos),
                (true, false) => {
                    if let Some(s) = start.take() {
                        ranges.push(s..pos + len);
                    }
                }
                _ => {}
            }
            pos += len;
        }
        if let Some(s) = start {
            ranges.push(s..text.len());
        }
        Self { ranges }
    }

    pub fn contains(&self, pos: usize) -> bool {
        let idx = self.ranges.partition_point(|r| r.end <= pos);
        self.ranges.get(idx).is_some_and(|r| r.start <= pos)
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn ranges(&self) -> &[Range<usize>] {
        &self.ranges
    }
}

use crate::lexer::{LexerWarning, Position, Symbol, Token, TokenKind};
use std::collections::VecDeque;

/// Character-level scanner over one compilation unit.
///
/// Tokens are produced lazily through [`Iterator`]. Identifier, keyword and
/// integer text is accumulated until whitespace, a comment opener, a quote or
/// a symbol ends it. The block-comment state survives line breaks.
pub struct Scanner<'a> {
    input: &'a str,
    current: usize,
    line: usize,
    column: usize,
    buffer: String,
    buffer_start: Position,
    /// Set while inside `/* ... */`, holding where the comment opened.
    block_comment: Option<Position>,
    pending: VecDeque<Token>,
    warnings: Vec<LexerWarning>,
    finished: bool,
}

/// Output of a complete scan.
#[derive(Debug, Clone, Default)]
pub struct Tokenized {
    pub tokens: Vec<Token>,
    pub warnings: Vec<LexerWarning>,
}

impl Tokenized {
    /// True when the input ended inside a string or block comment.
    #[must_use]
    pub fn is_truncated(&self) -> bool {
        !self.warnings.is_empty()
    }
}

impl<'a> Scanner<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            current: 0,
            line: 1,
            column: 1,
            buffer: String::new(),
            buffer_start: Position::start(),
            block_comment: None,
            pending: VecDeque::new(),
            warnings: Vec::new(),
            finished: false,
        }
    }

    pub fn scan_all(mut self) -> Tokenized {
        let tokens = self.by_ref().collect();
        Tokenized {
            tokens,
            warnings: self.warnings,
        }
    }

    /// Warnings raised so far.
    #[must_use]
    pub fn warnings(&self) -> &[LexerWarning] {
        &self.warnings
    }

    fn current_position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    fn peek(&self) -> Option<char> {
        self.input[self.current..].chars().next()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.current += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Process one character (or the end of input).
    fn step(&mut self) {
        if let Some(opened_at) = self.block_comment {
            match self.advance() {
                Some('*') => {
                    if self.match_char('/') {
                        self.block_comment = None;
                    }
                }
                Some(_) => {}
                None => {
                    self.block_comment = None;
                    self.record(LexerWarning::UnterminatedBlockComment(opened_at));
                    self.finish();
                }
            }
            return;
        }

        let pos = self.current_position();
        let Some(ch) = self.advance() else {
            self.finish();
            return;
        };

        match ch {
            ch if ch.is_whitespace() => self.flush(),
            '/' if self.peek() == Some('/') => {
                self.flush();
                self.skip_line_comment();
            }
            '/' if self.peek() == Some('*') => {
                self.flush();
                self.advance();
                self.block_comment = Some(pos);
            }
            '"' => {
                self.flush();
                self.scan_string(pos);
            }
            ch => match Symbol::from_char(ch) {
                Some(symbol) => {
                    self.flush();
                    self.pending
                        .push_back(Token::new(TokenKind::Symbol(symbol), pos, ch.to_string()));
                }
                None => {
                    if self.buffer.is_empty() {
                        self.buffer_start = pos;
                    }
                    self.buffer.push(ch);
                }
            },
        }
    }

    fn skip_line_comment(&mut self) {
        while self.peek().is_some_and(|ch| ch != '\n') {
            self.advance();
        }
    }

    fn scan_string(&mut self, start_pos: Position) {
        let mut value = String::new();
        loop {
            match self.advance() {
                Some('"') => break,
                Some(ch) => value.push(ch),
                None => {
                    self.record(LexerWarning::UnterminatedString(start_pos));
                    break;
                }
            }
        }
        self.pending
            .push_back(Token::new(TokenKind::StringConstant, start_pos, value));
    }

    fn flush(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.buffer);
        self.pending.push_back(Token::classify(text, self.buffer_start));
    }

    fn finish(&mut self) {
        self.flush();
        self.finished = true;
    }

    fn record(&mut self, warning: LexerWarning) {
        self.warnings.push(warning);
    }
}

impl Iterator for Scanner<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return Some(token);
            }
            if self.finished {
                return None;
            }
            self.step();
        }
    }
}

// Convenience function for tokenizing input
pub fn tokenize(input: &str) -> Tokenized {
    Scanner::new(input).scan_all()
}

//! Base token cursor shared by the fragment parsers.
//!
//! Tokenizes with `MsSqlDialect`, drops whitespace and comments, and offers
//! the navigation and check helpers the statement, query, expression and
//! definition parsers build on.

use sqlparser::dialect::MsSqlDialect;
use sqlparser::tokenizer::{Token, TokenWithSpan, Tokenizer, TokenizerError, Word};

use super::identifier_utils::{format_token, join_tokens};
use crate::syntax::{CodeLocation, CodeRegion, Identifier, ScriptToken};

/// Token cursor over a whitespace-free token stream.
pub struct TokenParser {
    tokens: Vec<TokenWithSpan>,
    pos: usize,
}

impl TokenParser {
    /// Tokenize `sql` with `MsSqlDialect`.
    pub fn new(sql: &str) -> Result<Self, TokenizerError> {
        let dialect = MsSqlDialect {};
        let tokens = Tokenizer::new(&dialect, sql).tokenize_with_location()?;
        Ok(Self::from_tokens(tokens))
    }

    /// Build from already tokenized input, dropping whitespace, comments and EOF.
    pub fn from_tokens(tokens: Vec<TokenWithSpan>) -> Self {
        let tokens = tokens
            .into_iter()
            .filter(|t| !matches!(t.token, Token::Whitespace(_) | Token::EOF))
            .collect();
        Self { tokens, pos: 0 }
    }

    // ========================================================================
    // Position and state
    // ========================================================================

    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    #[inline]
    pub fn pos(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn set_pos(&mut self, pos: usize) {
        self.pos = pos.min(self.tokens.len());
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    // ========================================================================
    // Token access
    // ========================================================================

    #[inline]
    pub fn current_token(&self) -> Option<&TokenWithSpan> {
        self.tokens.get(self.pos)
    }

    #[inline]
    pub fn peek(&self, offset: usize) -> Option<&TokenWithSpan> {
        self.tokens.get(self.pos + offset)
    }

    #[inline]
    pub fn advance(&mut self) {
        if !self.is_at_end() {
            self.pos += 1;
        }
    }

    /// Current token if it is a word.
    pub fn current_word(&self) -> Option<&Word> {
        self.peek_word(0)
    }

    pub fn peek_word(&self, offset: usize) -> Option<&Word> {
        match self.peek(offset).map(|t| &t.token) {
            Some(Token::Word(w)) => Some(w),
            _ => None,
        }
    }

    // ========================================================================
    // Token type checks
    // ========================================================================

    /// Check if the current token is an unquoted word equal to `word` (case-insensitive).
    #[inline]
    pub fn check_word_ci(&self, word: &str) -> bool {
        self.peek_word_ci(0, word)
    }

    /// Check an unquoted word at `offset` from the current position.
    pub fn peek_word_ci(&self, offset: usize, word: &str) -> bool {
        matches!(self.peek_word(offset), Some(w) if w.quote_style.is_none() && w.value.eq_ignore_ascii_case(word))
    }

    /// Check if the current token is any of the unquoted `words`.
    pub fn check_any_word_ci(&self, words: &[&str]) -> bool {
        words.iter().any(|w| self.check_word_ci(w))
    }

    /// Check if the current token is an `@variable` (or `@@function`) word.
    pub fn check_variable(&self) -> bool {
        matches!(self.current_word(), Some(w) if w.quote_style.is_none() && w.value.starts_with('@'))
    }

    /// Check if the current token matches a token type (by discriminant).
    #[inline]
    pub fn check_token(&self, expected: &Token) -> bool {
        self.peek_token(0, expected)
    }

    pub fn peek_token(&self, offset: usize, expected: &Token) -> bool {
        match self.peek(offset) {
            Some(token) => std::mem::discriminant(&token.token) == std::mem::discriminant(expected),
            None => false,
        }
    }

    // ========================================================================
    // Expect methods (check and advance)
    // ========================================================================

    /// Consume the word if present; position unchanged otherwise.
    pub fn expect_word_ci(&mut self, word: &str) -> Option<()> {
        if self.check_word_ci(word) {
            self.advance();
            Some(())
        } else {
            None
        }
    }

    /// Consume the word if present and report whether it was.
    pub fn eat_word_ci(&mut self, word: &str) -> bool {
        self.expect_word_ci(word).is_some()
    }

    pub fn expect_token(&mut self, expected: &Token) -> Option<()> {
        if self.check_token(expected) {
            self.advance();
            Some(())
        } else {
            None
        }
    }

    pub fn eat_token(&mut self, expected: &Token) -> bool {
        self.expect_token(expected).is_some()
    }

    // ========================================================================
    // Identifier parsing
    // ========================================================================

    /// Parse an identifier (bracketed, quoted or plain).
    ///
    /// A `#` token directly followed by a word is folded into one `#name`
    /// identifier in case the tokenizer split a temp-table name.
    pub fn parse_identifier(&mut self) -> Option<Identifier> {
        let token = self.current_token()?.clone();
        match &token.token {
            Token::Word(w) => {
                self.advance();
                Some(Identifier {
                    value: w.value.clone(),
                    quote_style: w.quote_style,
                    region: span_region(&token),
                })
            }
            Token::Sharp => {
                let mut prefix = String::from("#");
                let mut offset = 1;
                if self.peek_token(1, &Token::Sharp) {
                    prefix.push('#');
                    offset = 2;
                }
                let next = self.peek(offset)?.clone();
                let Token::Word(w) = &next.token else {
                    return None;
                };
                self.pos += offset + 1;
                Some(Identifier {
                    value: format!("{}{}", prefix, w.value),
                    quote_style: None,
                    region: CodeRegion::new(
                        token.span.start.into(),
                        next.span.end.into(),
                    ),
                })
            }
            _ => None,
        }
    }

    // ========================================================================
    // Balanced skipping
    // ========================================================================

    /// Skip a parenthesized group starting at the current `(`.
    ///
    /// Returns false (position unchanged) if the current token is not `(`.
    pub fn skip_parenthesized(&mut self) -> bool {
        if !self.check_token(&Token::LParen) {
            return false;
        }
        let mut depth = 0usize;
        while !self.is_at_end() {
            if self.check_token(&Token::LParen) {
                depth += 1;
            } else if self.check_token(&Token::RParen) {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    self.advance();
                    return true;
                }
            }
            self.advance();
        }
        true
    }

    // ========================================================================
    // Regions
    // ========================================================================

    /// Region from the start of token `first` to the end of token `last`.
    pub fn region_between(&self, first: usize, last: usize) -> CodeRegion {
        match (self.tokens.get(first), self.tokens.get(last)) {
            (Some(a), Some(b)) => CodeRegion::new(a.span.start.into(), b.span.end.into()),
            (Some(a), None) => span_region(a),
            _ => CodeRegion::default(),
        }
    }

    pub fn location_of(&self, index: usize) -> CodeLocation {
        self.tokens
            .get(index)
            .map(|t| t.span.start.into())
            .unwrap_or_default()
    }

    /// Compact SQL text of tokens `first..=last`.
    pub fn text_between(&self, first: usize, last: usize) -> String {
        if first > last || first >= self.tokens.len() {
            return String::new();
        }
        let last = last.min(self.tokens.len() - 1);
        join_tokens(self.tokens[first..=last].iter().map(|t| &t.token))
    }

    /// Script tokens with rendered text, for the finished tree.
    pub fn script_tokens(&self) -> Vec<ScriptToken> {
        self.tokens
            .iter()
            .map(|t| ScriptToken {
                text: format_token(&t.token),
                region: span_region(t),
            })
            .collect()
    }
}

fn span_region(token: &TokenWithSpan) -> CodeRegion {
    CodeRegion::new(token.span.start.into(), token.span.end.into())
}

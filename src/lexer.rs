// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//    http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
use crate::error::LexError;

// ===================================================================
// Token
// ===================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Identifier,
    IntLiteral,
    FloatLiteral,
    Operator,
    Delimiter,
    Keyword,
    EndOfInput,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub int_value: Option<i64>,
    pub float_value: Option<f64>,
    pub row: usize,
    pub column: usize,
}

impl Token {
    fn new(kind: TokenKind, lexeme: String, row: usize, column: usize) -> Self {
        Self { kind, lexeme, int_value: None, float_value: None, row, column }
    }
}

const KEYWORDS: &[&str] = &["if", "else", "while", "read", "print"];

fn is_delimiter(c: char) -> bool {
    matches!(c, '(' | ')' | '{' | '}' | ';')
}

fn is_single_op(c: char) -> bool {
    matches!(c, '+' | '-' | '*' | '/')
}

// ===================================================================
// Lexer
// ===================================================================

/// A table-driven DFA lexer with states `Start`, `Ident`, `Int`, `Dot`,
/// `Float`, `Less`, `Greater`, `Equal`, with `Accept`/`AcceptRollback`/
/// `Error` realized as control flow rather than states that persist
/// across calls to `next_token`.
///
/// A `Lexer` is restartable only by constructing a fresh one; it holds no
/// state beyond its current position.
pub struct Lexer {
    chars: Vec<char>,
    pos: usize,
    row: usize,
    column: usize,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum State {
    Start,
    Ident,
    Int,
    Dot,
    Float,
    Less,
    Greater,
    Equal,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Self { chars: input.chars().collect(), pos: 0, row: 1, column: 1 }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    /// Consume the current character, updating row/column tracking.
    /// A newline moves to the next row and resets the column; any other
    /// character just advances the column.
    fn advance(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += 1;
            if c == '\n' {
                self.row += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
    }

    fn error_here(&self, row: usize, column: usize, message: impl Into<String>) -> LexError {
        LexError::new(row, column, message)
    }

    pub fn next_token(&mut self) -> Result<Token, LexError> {
        // Skip whitespace in the Start state before the lexeme begins.
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => self.advance(),
                _ => break,
            }
        }

        let start_row = self.row;
        let start_col = self.column;

        let Some(first) = self.peek() else {
            return Ok(Token::new(TokenKind::EndOfInput, String::new(), start_row, start_col));
        };

        if first.is_alphabetic() || first == '_' {
            return self.scan_ident(start_row, start_col);
        }
        if first.is_ascii_digit() {
            return self.scan_number(start_row, start_col);
        }
        if is_delimiter(first) {
            self.advance();
            return Ok(Token::new(TokenKind::Delimiter, first.to_string(), start_row, start_col));
        }
        if is_single_op(first) {
            self.advance();
            return Ok(Token::new(TokenKind::Operator, first.to_string(), start_row, start_col));
        }
        match first {
            '<' => self.scan_relational(State::Less, start_row, start_col),
            '>' => self.scan_relational(State::Greater, start_row, start_col),
            '=' => self.scan_relational(State::Equal, start_row, start_col),
            c => Err(self.error_here(start_row, start_col, format!("unrecognized character '{}'", c))),
        }
    }

    fn scan_ident(&mut self, row: usize, col: usize) -> Result<Token, LexError> {
        let mut lexeme = String::new();
        loop {
            match self.peek() {
                Some(c) if c.is_alphanumeric() || c == '_' => {
                    lexeme.push(c);
                    self.advance();
                }
                _ => break,
            }
        }
        let kind = if KEYWORDS.contains(&lexeme.as_str()) { TokenKind::Keyword } else { TokenKind::Identifier };
        Ok(Token::new(kind, lexeme, row, col))
    }

    fn scan_number(&mut self, row: usize, col: usize) -> Result<Token, LexError> {
        let mut lexeme = String::new();
        let mut state = State::Int;
        loop {
            match state {
                State::Int => match self.peek() {
                    Some(c) if c.is_ascii_digit() => {
                        lexeme.push(c);
                        self.advance();
                    }
                    Some('.') => {
                        lexeme.push('.');
                        self.advance();
                        state = State::Dot;
                    }
                    Some(c) if c.is_alphabetic() || c == '_' => {
                        return Err(self.error_here(row, col, format!("malformed number literal '{}{}'", lexeme, c)));
                    }
                    _ => break,
                },
                State::Dot => match self.peek() {
                    Some(c) if c.is_ascii_digit() => {
                        lexeme.push(c);
                        self.advance();
                        state = State::Float;
                    }
                    _ => {
                        return Err(self.error_here(row, col, format!("malformed number literal '{}'", lexeme)));
                    }
                },
                State::Float => match self.peek() {
                    Some(c) if c.is_ascii_digit() => {
                        lexeme.push(c);
                        self.advance();
                    }
                    Some(c) if c.is_alphabetic() || c == '.' || c == '_' => {
                        return Err(self.error_here(row, col, format!("malformed number literal '{}{}'", lexeme, c)));
                    }
                    _ => break,
                },
                _ => unreachable!("scan_number only ever holds Int/Dot/Float"),
            }
        }
        if state == State::Float {
            let value: f64 = lexeme
                .parse()
                .map_err(|_| self.error_here(row, col, format!("malformed float literal '{}'", lexeme)))?;
            let mut tok = Token::new(TokenKind::FloatLiteral, lexeme, row, col);
            tok.float_value = Some(value);
            Ok(tok)
        } else {
            let value: i64 = lexeme
                .parse()
                .map_err(|_| self.error_here(row, col, format!("malformed integer literal '{}'", lexeme)))?;
            let mut tok = Token::new(TokenKind::IntLiteral, lexeme, row, col);
            tok.int_value = Some(value);
            Ok(tok)
        }
    }

    /// Shared handling for the `<`, `>` and `=` states: each may extend
    /// into a two-character operator, or terminate and roll back (without
    /// consuming) onto whatever follows.
    fn scan_relational(&mut self, state: State, row: usize, col: usize) -> Result<Token, LexError> {
        debug_assert!(matches!(state, State::Less | State::Greater | State::Equal));
        let first = self.peek().unwrap();
        self.advance();
        match (state, self.peek()) {
            (State::Less, Some('=')) => {
                self.advance();
                Ok(Token::new(TokenKind::Operator, "<=".to_string(), row, col))
            }
            (State::Less, Some('>')) => {
                self.advance();
                Ok(Token::new(TokenKind::Operator, "<>".to_string(), row, col))
            }
            (State::Greater, Some('=')) => {
                self.advance();
                Ok(Token::new(TokenKind::Operator, ">=".to_string(), row, col))
            }
            (State::Equal, Some('=')) => {
                self.advance();
                Ok(Token::new(TokenKind::Operator, "==".to_string(), row, col))
            }
            (_, Some(c)) if c.is_alphanumeric() || c.is_whitespace() || is_delimiter(c) || c == '_' => {
                // Rollback: the lookahead character was only peeked, never
                // consumed, so there is nothing to undo — just emit the
                // single-character token.
                Ok(Token::new(TokenKind::Operator, first.to_string(), row, col))
            }
            (_, None) => Ok(Token::new(TokenKind::Operator, first.to_string(), row, col)),
            (_, Some(c)) => Err(self.error_here(row, col, format!("unexpected character '{}' after '{}'", c, first))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        let mut lexer = Lexer::new(input);
        let mut out = Vec::new();
        loop {
            let tok = lexer.next_token().expect("lex error");
            let done = tok.kind == TokenKind::EndOfInput;
            out.push(tok.kind);
            if done {
                break;
            }
        }
        out
    }

    fn lexemes(input: &str) -> Vec<String> {
        let mut lexer = Lexer::new(input);
        let mut out = Vec::new();
        loop {
            let tok = lexer.next_token().expect("lex error");
            if tok.kind == TokenKind::EndOfInput {
                break;
            }
            out.push(tok.lexeme);
        }
        out
    }

    #[test]
    fn empty_input_is_just_eof() {
        assert_eq!(kinds(""), vec![TokenKind::EndOfInput]);
    }

    #[test]
    fn keywords_are_reclassified() {
        assert_eq!(
            kinds("if else while read print x"),
            vec![
                TokenKind::Keyword,
                TokenKind::Keyword,
                TokenKind::Keyword,
                TokenKind::Keyword,
                TokenKind::Keyword,
                TokenKind::Identifier,
                TokenKind::EndOfInput,
            ]
        );
    }

    #[test]
    fn assignment_is_not_confused_with_equality() {
        // A lone '=' must roll back cleanly even directly against an
        // identifier, with no stray trailing '='.
        assert_eq!(lexemes("x=y"), vec!["x", "=", "y"]);
        assert_eq!(lexemes("x == y"), vec!["x", "==", "y"]);
    }

    #[test]
    fn two_char_operators() {
        assert_eq!(lexemes("a <= b >= c <> d == e"), vec!["a", "<=", "b", ">=", "c", "<>", "d", "==", "e"]);
    }

    #[test]
    fn integer_and_float_literals() {
        let mut lexer = Lexer::new("42 3.25");
        let a = lexer.next_token().unwrap();
        assert_eq!(a.kind, TokenKind::IntLiteral);
        assert_eq!(a.int_value, Some(42));
        let b = lexer.next_token().unwrap();
        assert_eq!(b.kind, TokenKind::FloatLiteral);
        assert_eq!(b.float_value, Some(3.25));
    }

    #[test]
    fn row_and_column_track_newlines() {
        let mut lexer = Lexer::new("x\ny");
        let x = lexer.next_token().unwrap();
        assert_eq!((x.row, x.column), (1, 1));
        let y = lexer.next_token().unwrap();
        assert_eq!((y.row, y.column), (2, 1));
    }

    #[test]
    fn malformed_number_is_a_lex_error() {
        let mut lexer = Lexer::new("1.2.3");
        assert!(lexer.next_token().is_err());
    }

    #[test]
    fn unrecognized_character_is_a_lex_error() {
        let mut lexer = Lexer::new("@");
        assert!(lexer.next_token().is_err());
    }

    #[test]
    fn delimiters_and_single_char_operators() {
        assert_eq!(lexemes("(x + y);"), vec!["(", "x", "+", "y", ")", ";"]);
    }
}

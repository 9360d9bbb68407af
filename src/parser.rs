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
use crate::error::ParseError;
use crate::ir::Opcode;
use crate::lexer::{Lexer, Token, TokenKind};

/// Recursive-descent parser that emits IR directly as it recognizes the
/// grammar — there is no separate AST stage. Owns the monotonically
/// increasing label counter used by `IfElse` and `While`, and never
/// backtracks: the first lex or syntax error stops parsing immediately.
pub struct Parser {
    lexer: Lexer,
    current: Token,
    code: Vec<Opcode>,
    next_label: u32,
}

impl Parser {
    pub fn new(input: &str) -> Result<Self, ParseError> {
        let mut lexer = Lexer::new(input);
        let current = lexer.next_token().map_err(Self::lex_to_parse)?;
        Ok(Self { lexer, current, code: Vec::new(), next_label: 0 })
    }

    /// Parse the whole program and return its emitted instruction stream.
    pub fn parse(mut self) -> Result<Vec<Opcode>, ParseError> {
        self.parse_statement_list()?;
        self.expect_kind(TokenKind::EndOfInput, "expected end of input")?;
        Ok(self.code)
    }

    fn lex_to_parse(e: crate::error::LexError) -> ParseError {
        ParseError::new(e.row, e.column, e.message)
    }

    fn fresh_label(&mut self) -> u32 {
        let id = self.next_label;
        self.next_label += 1;
        id
    }

    fn emit(&mut self, op: Opcode) {
        self.code.push(op);
    }

    fn bump(&mut self) -> Result<Token, ParseError> {
        let tok = self.current.clone();
        self.current = self.lexer.next_token().map_err(Self::lex_to_parse)?;
        Ok(tok)
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError::new(self.current.row, self.current.column, message.into())
    }

    fn is_delimiter(&self, lexeme: &str) -> bool {
        self.current.kind == TokenKind::Delimiter && self.current.lexeme == lexeme
    }

    fn is_operator(&self, lexeme: &str) -> bool {
        self.current.kind == TokenKind::Operator && self.current.lexeme == lexeme
    }

    fn is_keyword(&self, lexeme: &str) -> bool {
        self.current.kind == TokenKind::Keyword && self.current.lexeme == lexeme
    }

    fn expect_kind(&mut self, kind: TokenKind, message: &str) -> Result<Token, ParseError> {
        if self.current.kind == kind {
            self.bump()
        } else {
            Err(self.error(format!("{}, found '{}'", message, self.current.lexeme)))
        }
    }

    fn expect_delimiter(&mut self, lexeme: &str) -> Result<(), ParseError> {
        if self.is_delimiter(lexeme) {
            self.bump()?;
            Ok(())
        } else {
            Err(self.error(format!("expected '{}', found '{}'", lexeme, self.current.lexeme)))
        }
    }

    fn expect_operator(&mut self, lexeme: &str) -> Result<(), ParseError> {
        if self.is_operator(lexeme) {
            self.bump()?;
            Ok(())
        } else {
            Err(self.error(format!("expected '{}', found '{}'", lexeme, self.current.lexeme)))
        }
    }

    fn expect_keyword(&mut self, lexeme: &str) -> Result<(), ParseError> {
        if self.is_keyword(lexeme) {
            self.bump()?;
            Ok(())
        } else {
            Err(self.error(format!("expected '{}', found '{}'", lexeme, self.current.lexeme)))
        }
    }

    // StatementList := Statement StatementList | epsilon
    fn parse_statement_list(&mut self) -> Result<(), ParseError> {
        loop {
            match self.current.kind {
                TokenKind::Identifier => self.parse_statement()?,
                TokenKind::Keyword => self.parse_statement()?,
                TokenKind::Delimiter if self.current.lexeme == ";" => self.parse_statement()?,
                _ => break,
            }
        }
        Ok(())
    }

    // Statement := Assignment ';' | IfElse ';' | While ';' | IO ';' | ';'
    fn parse_statement(&mut self) -> Result<(), ParseError> {
        if self.is_delimiter(";") {
            self.bump()?;
            return Ok(());
        }
        if self.is_keyword("if") {
            self.parse_if_else()?;
        } else if self.is_keyword("while") {
            self.parse_while()?;
        } else if self.is_keyword("read") || self.is_keyword("print") {
            self.parse_io()?;
        } else if self.current.kind == TokenKind::Identifier {
            self.parse_assignment()?;
        } else {
            return Err(self.error("expected a statement"));
        }
        self.expect_delimiter(";")
    }

    // Assignment := Identifier '=' Expression
    fn parse_assignment(&mut self) -> Result<(), ParseError> {
        let name_tok = self.expect_kind(TokenKind::Identifier, "expected an identifier")?;
        self.expect_operator("=")?;
        self.parse_expression()?;
        // Value then name, matching the runtime's pop-value-then-pop-name
        // Assign handler.
        self.emit(Opcode::PushName(name_tok.lexeme));
        self.emit(Opcode::Assign);
        Ok(())
    }

    // Expression := Term ExprTail, with ExprTail folded into an iterative
    // loop so that a chain of same-precedence operators evaluates
    // left-associatively: each operator is emitted right after its right
    // operand, before the next one is even parsed.
    fn parse_expression(&mut self) -> Result<(), ParseError> {
        self.parse_term()?;
        loop {
            if self.is_operator("+") {
                self.bump()?;
                self.parse_term()?;
                self.emit(Opcode::Add);
            } else if self.is_operator("-") {
                self.bump()?;
                self.parse_term()?;
                self.emit(Opcode::Sub);
            } else {
                break;
            }
        }
        Ok(())
    }

    // Term := Factor TermTail, same left-associative iterative scheme.
    fn parse_term(&mut self) -> Result<(), ParseError> {
        self.parse_factor()?;
        loop {
            if self.is_operator("*") {
                self.bump()?;
                self.parse_factor()?;
                self.emit(Opcode::Mul);
            } else if self.is_operator("/") {
                self.bump()?;
                self.parse_factor()?;
                self.emit(Opcode::Div);
            } else {
                break;
            }
        }
        Ok(())
    }

    // Factor := Identifier | IntLiteral | FloatLiteral | '(' Expression ')'
    fn parse_factor(&mut self) -> Result<(), ParseError> {
        match self.current.kind {
            TokenKind::Identifier => {
                let tok = self.bump()?;
                self.emit(Opcode::PushName(tok.lexeme));
                Ok(())
            }
            TokenKind::IntLiteral => {
                let tok = self.bump()?;
                self.emit(Opcode::PushInt(tok.int_value.expect("int literal carries int_value")));
                Ok(())
            }
            TokenKind::FloatLiteral => {
                let tok = self.bump()?;
                self.emit(Opcode::PushFloat(tok.float_value.expect("float literal carries float_value")));
                Ok(())
            }
            TokenKind::Delimiter if self.current.lexeme == "(" => {
                self.bump()?;
                self.parse_expression()?;
                self.expect_delimiter(")")?;
                Ok(())
            }
            _ => Err(self.error("expected an identifier, a number, or '('")),
        }
    }

    // Condition := Expression CmpOp Expression
    fn parse_condition(&mut self) -> Result<(), ParseError> {
        self.parse_expression()?;
        let op = if self.is_operator("<=") {
            Opcode::Le
        } else if self.is_operator(">=") {
            Opcode::Ge
        } else if self.is_operator("==") {
            Opcode::Eq
        } else if self.is_operator("<>") {
            Opcode::Ne
        } else if self.is_operator("<") {
            Opcode::Lt
        } else if self.is_operator(">") {
            Opcode::Gt
        } else {
            return Err(self.error("expected a comparison operator"));
        };
        self.bump()?;
        self.parse_expression()?;
        self.emit(op);
        Ok(())
    }

    // IfElse := 'if' '(' Condition ')' '{' StatementList '}'
    //           ( 'else' '{' StatementList '}' )?
    fn parse_if_else(&mut self) -> Result<(), ParseError> {
        self.expect_keyword("if")?;
        self.expect_delimiter("(")?;
        self.parse_condition()?;
        self.expect_delimiter(")")?;
        self.expect_delimiter("{")?;
        let body_start_label = self.fresh_label();
        self.emit(Opcode::LabelRef(body_start_label));
        self.emit(Opcode::JumpIfFalse);
        self.parse_statement_list()?;
        self.expect_delimiter("}")?;

        if self.is_keyword("else") {
            self.bump()?;
            let end_label = self.fresh_label();
            self.emit(Opcode::LabelRef(end_label));
            self.emit(Opcode::Jmp);
            self.emit(Opcode::LabelDef(body_start_label));
            self.expect_delimiter("{")?;
            self.parse_statement_list()?;
            self.expect_delimiter("}")?;
            self.emit(Opcode::LabelDef(end_label));
        } else {
            self.emit(Opcode::LabelDef(body_start_label));
        }
        Ok(())
    }

    // While := 'while' '(' Condition ')' '{' StatementList '}'
    fn parse_while(&mut self) -> Result<(), ParseError> {
        self.expect_keyword("while")?;
        let head_label = self.fresh_label();
        self.emit(Opcode::LabelDef(head_label));
        self.expect_delimiter("(")?;
        self.parse_condition()?;
        self.expect_delimiter(")")?;
        let end_label = self.fresh_label();
        self.emit(Opcode::LabelRef(end_label));
        self.emit(Opcode::JumpIfFalse);
        self.expect_delimiter("{")?;
        self.parse_statement_list()?;
        self.expect_delimiter("}")?;
        self.emit(Opcode::LabelRef(head_label));
        self.emit(Opcode::Jmp);
        self.emit(Opcode::LabelDef(end_label));
        Ok(())
    }

    // IO := 'read' '(' Identifier ')' | 'print' '(' Expression ')'
    fn parse_io(&mut self) -> Result<(), ParseError> {
        if self.is_keyword("read") {
            self.bump()?;
            self.expect_delimiter("(")?;
            let name_tok = self.expect_kind(TokenKind::Identifier, "expected an identifier")?;
            self.expect_delimiter(")")?;
            self.emit(Opcode::PushName(name_tok.lexeme));
            self.emit(Opcode::Read);
            Ok(())
        } else {
            self.expect_keyword("print")?;
            self.expect_delimiter("(")?;
            self.parse_expression()?;
            self.expect_delimiter(")")?;
            self.emit(Opcode::Print);
            Ok(())
        }
    }
}

/// Parse a full program and return its emitted instruction stream,
/// without exposing the `Parser` construction dance to callers that just
/// want to compile a string.
pub fn compile(source: &str) -> Result<Vec<Opcode>, ParseError> {
    Parser::new(source)?.parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Opcode::*;

    #[test]
    fn empty_source_emits_nothing() {
        assert_eq!(compile("").unwrap(), Vec::<crate::ir::Opcode>::new());
    }

    #[test]
    fn lone_semicolon_emits_nothing() {
        assert_eq!(compile(";").unwrap(), Vec::<crate::ir::Opcode>::new());
    }

    #[test]
    fn arithmetic_precedence() {
        let code = compile("x = 1 + 2 * 3;").unwrap();
        assert_eq!(
            code,
            vec![PushInt(1), PushInt(2), PushInt(3), Mul, Add, PushName("x".into()), Assign]
        );
    }

    #[test]
    fn subtraction_is_left_associative() {
        let code = compile("x = a - b - c;").unwrap();
        assert_eq!(
            code,
            vec![
                PushName("a".into()),
                PushName("b".into()),
                Sub,
                PushName("c".into()),
                Sub,
                PushName("x".into()),
                Assign,
            ]
        );
    }

    #[test]
    fn assignment_emits_value_before_name() {
        let code = compile("x = 5;").unwrap();
        assert_eq!(code, vec![PushInt(5), PushName("x".into()), Assign]);
    }

    #[test]
    fn read_and_print() {
        let code = compile("read(x); print(x);").unwrap();
        assert_eq!(code, vec![PushName("x".into()), Read, PushName("x".into()), Print]);
    }

    #[test]
    fn if_without_else_has_one_label() {
        let code = compile("if (x < 1) { print(x); };").unwrap();
        assert_eq!(
            code,
            vec![
                PushName("x".into()),
                PushInt(1),
                Lt,
                LabelRef(0),
                JumpIfFalse,
                PushName("x".into()),
                Print,
                LabelDef(0),
            ]
        );
    }

    #[test]
    fn if_else_has_two_distinct_labels() {
        let code = compile("if (x < 1) { print(1); } else { print(2); };").unwrap();
        assert_eq!(
            code,
            vec![
                PushName("x".into()),
                PushInt(1),
                Lt,
                LabelRef(0),
                JumpIfFalse,
                PushInt(1),
                Print,
                LabelRef(1),
                Jmp,
                LabelDef(0),
                PushInt(2),
                Print,
                LabelDef(1),
            ]
        );
    }

    #[test]
    fn while_loop_jumps_back_to_its_head() {
        let code = compile("while (i < 3) { print(i); };").unwrap();
        assert_eq!(
            code,
            vec![
                LabelDef(0),
                PushName("i".into()),
                PushInt(3),
                Lt,
                LabelRef(1),
                JumpIfFalse,
                PushName("i".into()),
                Print,
                LabelRef(0),
                Jmp,
                LabelDef(1),
            ]
        );
    }

    #[test]
    fn while_with_empty_body() {
        let code = compile("while (i < 3) { };").unwrap();
        assert_eq!(
            code,
            vec![LabelDef(0), PushName("i".into()), PushInt(3), Lt, LabelRef(1), JumpIfFalse, LabelRef(0), Jmp, LabelDef(1)]
        );
    }

    #[test]
    fn nested_if_in_while_in_if_uses_unique_labels() {
        let code = compile("if (1 < 2) { while (1 < 2) { if (1 < 2) { print(1); }; }; };").unwrap();
        let mut seen_defs = std::collections::HashSet::new();
        for op in &code {
            if let LabelDef(id) = op {
                assert!(seen_defs.insert(*id), "label {} defined twice", id);
            }
        }
        assert_eq!(seen_defs.len(), 3);
    }

    #[test]
    fn missing_semicolon_is_a_parse_error() {
        assert!(compile("x = 1").is_err());
    }

    #[test]
    fn unexpected_token_is_a_parse_error() {
        assert!(compile("x = ;").is_err());
    }
}

use crate::codegen::{Arithmetic, Segment};
use crate::compiler::{ArrayAssignment, CompileError, Compiler};
use crate::lexer::{Keyword, Symbol, TokenKind};
use std::io::Write;

/// Statement forms, selected by their leading keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Let,
    If,
    While,
    Do,
    Return,
}

impl StatementKind {
    pub fn from_keyword(keyword: Keyword) -> Option<Self> {
        match keyword {
            Keyword::Let => Some(StatementKind::Let),
            Keyword::If => Some(StatementKind::If),
            Keyword::While => Some(StatementKind::While),
            Keyword::Do => Some(StatementKind::Do),
            Keyword::Return => Some(StatementKind::Return),
            _ => None,
        }
    }
}

impl<W: Write> Compiler<W> {
    /// Compile statements until the next token doesn't start one
    pub(crate) fn compile_statements(&mut self) -> Result<(), CompileError> {
        while let Some(kind) = self.peek_statement() {
            self.compile_statement(kind)?;
        }
        Ok(())
    }

    fn peek_statement(&self) -> Option<StatementKind> {
        match self.peek_kind()? {
            TokenKind::Keyword(keyword) => StatementKind::from_keyword(keyword),
            _ => None,
        }
    }

    fn compile_statement(&mut self, kind: StatementKind) -> Result<(), CompileError> {
        match kind {
            StatementKind::Let => self.compile_let(),
            StatementKind::If => self.compile_if(),
            StatementKind::While => self.compile_while(),
            StatementKind::Do => self.compile_do(),
            StatementKind::Return => self.compile_return(),
        }
    }

    /// Compile `{ statements }`
    fn compile_block(&mut self) -> Result<(), CompileError> {
        self.expect_symbol(Symbol::OpenBrace)?;
        self.compile_statements()?;
        self.expect_symbol(Symbol::CloseBrace)?;
        Ok(())
    }

    /// Compile `( expression )`
    fn compile_condition(&mut self) -> Result<(), CompileError> {
        self.expect_symbol(Symbol::OpenParen)?;
        self.compile_expression()?;
        self.expect_symbol(Symbol::CloseParen)?;
        Ok(())
    }

    fn compile_let(&mut self) -> Result<(), CompileError> {
        self.expect_keyword(Keyword::Let)?;
        let target = self.expect_identifier("variable name")?;
        let (segment, index) = self.resolve_variable(&target.lexeme, target.pos)?;

        if !self.match_symbol(Symbol::OpenBracket) {
            self.expect_symbol(Symbol::Equal)?;
            self.compile_expression()?;
            self.expect_symbol(Symbol::Semicolon)?;
            self.writer.write_pop(segment, index)?;
            return Ok(());
        }

        match self.options.array_assignment {
            ArrayAssignment::Legacy => {
                self.compile_expression()?;
                self.expect_symbol(Symbol::CloseBracket)?;
                self.expect_symbol(Symbol::Equal)?;
                self.compile_expression()?;
                self.expect_symbol(Symbol::Semicolon)?;
                self.writer.write_pop(segment, index)?;
            }
            ArrayAssignment::Indirect => {
                self.writer.write_push(segment, index)?;
                self.compile_expression()?;
                self.expect_symbol(Symbol::CloseBracket)?;
                self.writer.write_arithmetic(Arithmetic::Add)?;
                self.expect_symbol(Symbol::Equal)?;
                self.compile_expression()?;
                self.expect_symbol(Symbol::Semicolon)?;
                // the value has to be parked while the address moves into `that`
                self.writer.write_pop(Segment::Temp, 0)?;
                self.writer.write_pop(Segment::Pointer, 1)?;
                self.writer.write_push(Segment::Temp, 0)?;
                self.writer.write_pop(Segment::That, 0)?;
            }
        }
        Ok(())
    }

    fn compile_if(&mut self) -> Result<(), CompileError> {
        self.expect_keyword(Keyword::If)?;
        let else_label = self.new_label();
        let end_label = self.new_label();

        self.compile_condition()?;
        self.writer.write_arithmetic(Arithmetic::Not)?;
        self.writer.write_if(&else_label)?;

        self.compile_block()?;
        self.writer.write_goto(&end_label)?;
        self.writer.write_label(&else_label)?;

        if self.check_keyword(Keyword::Else) {
            self.expect_keyword(Keyword::Else)?;
            self.compile_block()?;
        }

        self.writer.write_label(&end_label)?;
        Ok(())
    }

    fn compile_while(&mut self) -> Result<(), CompileError> {
        self.expect_keyword(Keyword::While)?;
        let start_label = self.new_label();
        let end_label = self.new_label();

        self.writer.write_label(&start_label)?;
        self.compile_condition()?;
        self.writer.write_arithmetic(Arithmetic::Not)?;
        self.writer.write_if(&end_label)?;

        self.compile_block()?;
        self.writer.write_goto(&start_label)?;
        self.writer.write_label(&end_label)?;
        Ok(())
    }

    fn compile_do(&mut self) -> Result<(), CompileError> {
        self.expect_keyword(Keyword::Do)?;
        let first = self.expect_identifier("subroutine or class name")?;
        self.compile_subroutine_call(first)?;
        self.expect_symbol(Symbol::Semicolon)?;
        self.writer.write_pop(Segment::Temp, 0)?;
        Ok(())
    }

    fn compile_return(&mut self) -> Result<(), CompileError> {
        self.expect_keyword(Keyword::Return)?;

        if self.check_symbol(Symbol::Semicolon) {
            self.writer.write_push(Segment::Constant, 0)?;
        } else {
            self.compile_expression()?;
        }

        self.expect_symbol(Symbol::Semicolon)?;
        self.writer.write_return()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::compiler::{compile_source, ArrayAssignment, CompileError, CompilerOptions};

    fn run(statements: &str, options: CompilerOptions) -> Result<Vec<String>, CompileError> {
        let source = format!(
            "class Main {{ function void run() {{ var int x, i; var Array arr; {statements} }} }}"
        );
        let out = compile_source(&source, options)?;
        Ok(out.lines().skip(1).map(str::to_string).collect())
    }

    fn lines(statements: &str) -> Vec<String> {
        run(statements, CompilerOptions::default()).unwrap()
    }

    #[test]
    fn if_else_with_constant_condition() {
        assert_eq!(
            lines("if (true) { return 1; } else { return 2; }"),
            vec![
                "push constant 0",
                "not",
                "not",
                "if-goto L0",
                "push constant 1",
                "return",
                "goto L1",
                "label L0",
                "push constant 2",
                "return",
                "label L1",
            ]
        );
    }

    #[test]
    fn if_without_else_still_emits_both_labels() {
        assert_eq!(
            lines("if (x) { let x = 0; }"),
            vec![
                "push local 0",
                "not",
                "if-goto L0",
                "push constant 0",
                "pop local 0",
                "goto L1",
                "label L0",
                "label L1",
            ]
        );
    }

    #[test]
    fn while_loop_counts_up() {
        assert_eq!(
            lines("while (x < 10) { let x = x + 1; }"),
            vec![
                "label L0",
                "push local 0",
                "push constant 10",
                "lt",
                "not",
                "if-goto L1",
                "push local 0",
                "push constant 1",
                "add",
                "pop local 0",
                "goto L0",
                "label L1",
            ]
        );
    }

    #[test]
    fn nested_control_flow_gets_distinct_labels() {
        let out = lines("while (x < 3) { if (x = 1) { let i = 1; } let x = x + 1; }");
        let labels: Vec<&str> = out
            .iter()
            .map(String::as_str)
            .filter(|l| l.starts_with("label"))
            .collect();
        assert_eq!(labels, vec!["label L0", "label L2", "label L3", "label L1"]);
    }

    #[test]
    fn do_discards_the_return_value() {
        assert_eq!(
            lines("do Output.printInt(x);"),
            vec!["push local 0", "call Output.printInt 1", "pop temp 0"]
        );
    }

    #[test]
    fn bare_return_pushes_zero() {
        assert_eq!(lines("return;"), vec!["push constant 0", "return"]);
    }

    #[test]
    fn legacy_array_assignment_pops_into_the_variable() {
        assert_eq!(
            lines("let arr[i] = x;"),
            vec!["push local 1", "push local 0", "pop local 2"]
        );
    }

    #[test]
    fn indirect_array_assignment_stores_through_that() {
        let options = CompilerOptions {
            array_assignment: ArrayAssignment::Indirect,
            ..CompilerOptions::default()
        };
        assert_eq!(
            run("let arr[i] = x;", options).unwrap(),
            vec![
                "push local 2",
                "push local 1",
                "add",
                "push local 0",
                "pop temp 0",
                "pop pointer 1",
                "push temp 0",
                "pop that 0",
            ]
        );
    }

    #[test]
    fn missing_semicolon_reports_position() {
        let err = run("let x = 1 return;", CompilerOptions::default()).unwrap_err();
        match err {
            CompileError::ExpectedToken(expected, found, pos) => {
                assert_eq!(expected, "';'");
                assert_eq!(found, "return");
                assert_eq!(pos.line, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn let_into_unknown_variable_fails() {
        let err = run("let nope = 1;", CompilerOptions::default()).unwrap_err();
        assert!(matches!(err, CompileError::UndefinedVariable(..)));
    }
}

use crate::codegen::{Arithmetic, BinaryOp, Segment, UnaryOp, VmWriter};
use crate::compiler::{CompileError, CompilerOptions, StringConstruction};
use crate::lexer::{Keyword, Position, Symbol, Token, TokenKind};
use crate::symbol::SymbolTable;
use std::io::Write;

/// Largest value a VM `push constant` accepts
const MAX_INTEGER_CONSTANT: usize = 32767;

/// Keyword constants usable as terms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordConstant {
    True,
    False,
    Null,
    This,
}

impl KeywordConstant {
    pub fn from_keyword(keyword: Keyword) -> Option<Self> {
        match keyword {
            Keyword::True => Some(KeywordConstant::True),
            Keyword::False => Some(KeywordConstant::False),
            Keyword::Null => Some(KeywordConstant::Null),
            Keyword::This => Some(KeywordConstant::This),
            _ => None,
        }
    }
}

/// Syntax-directed translator for one compilation unit.
///
/// Parses the token stream by recursive descent and writes VM code as each
/// construct is recognised.
pub struct Compiler<W: Write> {
    tokens: Vec<Token>,
    current: usize,
    pub(crate) symbol_table: SymbolTable,
    pub(crate) writer: VmWriter<W>,
    pub(crate) options: CompilerOptions,
    pub(crate) class_name: String,
    label_counter: usize,
}

impl<W: Write> Compiler<W> {
    #[must_use]
    pub fn new(tokens: Vec<Token>, out: W, options: CompilerOptions) -> Self {
        Self {
            tokens,
            current: 0,
            symbol_table: SymbolTable::new(),
            writer: VmWriter::new(out),
            options,
            class_name: String::new(),
            label_counter: 0,
        }
    }

    /// Get reference to symbol table
    #[must_use]
    pub fn symbol_table(&self) -> &SymbolTable {
        &self.symbol_table
    }

    /// Give back the output sink
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }

    /// Check if we've reached the end of tokens
    pub(crate) fn is_at_end(&self) -> bool {
        self.current >= self.tokens.len()
    }

    /// Peek at current token without consuming it
    pub(crate) fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.current)
    }

    /// Current token kind, if any
    pub(crate) fn peek_kind(&self) -> Option<TokenKind> {
        self.peek().map(|token| token.kind)
    }

    /// Advance to next token
    pub(crate) fn advance(&mut self, expected: &str) -> Result<Token, CompileError> {
        let token = self
            .peek()
            .cloned()
            .ok_or_else(|| CompileError::UnexpectedEof(expected.to_string()))?;
        self.current += 1;
        Ok(token)
    }

    pub(crate) fn check_symbol(&self, symbol: Symbol) -> bool {
        self.peek().is_some_and(|token| token.is_symbol(symbol))
    }

    pub(crate) fn check_keyword(&self, keyword: Keyword) -> bool {
        self.peek().is_some_and(|token| token.is_keyword(keyword))
    }

    /// Consume the current token if it is `symbol`
    pub(crate) fn match_symbol(&mut self, symbol: Symbol) -> bool {
        if self.check_symbol(symbol) {
            self.current += 1;
            true
        } else {
            false
        }
    }

    /// Build the error for a token that doesn't fit `expected`
    pub(crate) fn error_expected(&self, expected: &str) -> CompileError {
        match self.peek() {
            Some(token) => {
                CompileError::ExpectedToken(expected.to_string(), token.to_string(), token.pos)
            }
            None => CompileError::UnexpectedEof(expected.to_string()),
        }
    }

    pub(crate) fn expect_symbol(&mut self, symbol: Symbol) -> Result<Token, CompileError> {
        if self.check_symbol(symbol) {
            self.advance(&format!("'{symbol}'"))
        } else {
            Err(self.error_expected(&format!("'{symbol}'")))
        }
    }

    pub(crate) fn expect_keyword(&mut self, keyword: Keyword) -> Result<Token, CompileError> {
        if self.check_keyword(keyword) {
            self.advance(&format!("'{keyword}'"))
        } else {
            Err(self.error_expected(&format!("'{keyword}'")))
        }
    }

    pub(crate) fn expect_identifier(&mut self, what: &str) -> Result<Token, CompileError> {
        if self.peek_kind() == Some(TokenKind::Identifier) {
            self.advance(what)
        } else {
            Err(self.error_expected(what))
        }
    }

    /// Fresh control-flow label, unique within this compiler
    pub(crate) fn new_label(&mut self) -> String {
        let label = format!("L{}", self.label_counter);
        self.label_counter += 1;
        label
    }

    /// Memory location of a declared variable
    pub(crate) fn resolve_variable(&self, name: &str, pos: Position) -> Result<(Segment, usize), CompileError> {
        self.symbol_table
            .lookup(name)
            .map(|entry| (Segment::from(entry.storage_class), entry.index))
            .ok_or_else(|| CompileError::UndefinedVariable(name.to_string(), pos))
    }

    /// Compile an expression
    ///
    /// Only one `op term` pair follows the first term unless operator chains
    /// are enabled; chains are then folded strictly left to right.
    pub(crate) fn compile_expression(&mut self) -> Result<(), CompileError> {
        self.compile_term()?;

        while let Some(op) = self.match_binary_op()? {
            self.compile_term()?;
            self.writer.write_binary(op)?;

            if !self.options.operator_chains {
                break;
            }
        }

        Ok(())
    }

    fn match_binary_op(&mut self) -> Result<Option<BinaryOp>, CompileError> {
        let Some(token) = self.peek() else {
            return Ok(None);
        };
        let op = match token.kind {
            TokenKind::Symbol(Symbol::Plus) => BinaryOp::Add,
            TokenKind::Symbol(Symbol::Minus) => BinaryOp::Sub,
            TokenKind::Symbol(Symbol::Asterisk) => BinaryOp::Mul,
            TokenKind::Symbol(Symbol::Ampersand) => BinaryOp::And,
            TokenKind::Symbol(Symbol::Pipe) => BinaryOp::Or,
            TokenKind::Symbol(Symbol::Less) => BinaryOp::Less,
            TokenKind::Symbol(Symbol::Greater) => BinaryOp::Greater,
            TokenKind::Symbol(Symbol::Equal) => BinaryOp::Equal,
            TokenKind::Symbol(Symbol::Slash) => {
                return Err(CompileError::UnsupportedOperator('/', token.pos));
            }
            _ => return Ok(None),
        };
        self.current += 1;
        Ok(Some(op))
    }

    /// Compile a single term
    fn compile_term(&mut self) -> Result<(), CompileError> {
        let token = self.advance("a term")?;
        let kind = token.kind;

        match kind {
            TokenKind::IntegerConstant => {
                let value = token
                    .lexeme
                    .parse::<usize>()
                    .ok()
                    .filter(|&value| value <= MAX_INTEGER_CONSTANT)
                    .ok_or_else(|| CompileError::IntegerOutOfRange(token.lexeme.clone(), token.pos))?;
                self.writer.write_push(Segment::Constant, value)?;
            }
            TokenKind::StringConstant => self.compile_string_constant(&token)?,
            TokenKind::Keyword(keyword) => {
                let constant = KeywordConstant::from_keyword(keyword)
                    .ok_or_else(|| CompileError::UnexpectedToken(token.lexeme.clone(), token.pos))?;
                self.compile_keyword_constant(constant)?;
            }
            TokenKind::Identifier => self.compile_identifier_term(token)?,
            TokenKind::Symbol(Symbol::OpenParen) => {
                self.compile_expression()?;
                self.expect_symbol(Symbol::CloseParen)?;
            }
            TokenKind::Symbol(Symbol::Minus) => self.compile_unary(UnaryOp::Neg)?,
            TokenKind::Symbol(Symbol::Tilde) => self.compile_unary(UnaryOp::Not)?,
            TokenKind::Symbol(_) => {
                return Err(CompileError::UnexpectedToken(token.lexeme, token.pos));
            }
        }

        Ok(())
    }

    fn compile_unary(&mut self, op: UnaryOp) -> Result<(), CompileError> {
        self.compile_term()?;
        self.writer.write_arithmetic(op.into())?;
        Ok(())
    }

    fn compile_keyword_constant(&mut self, constant: KeywordConstant) -> Result<(), CompileError> {
        match constant {
            KeywordConstant::True => {
                self.writer.write_push(Segment::Constant, 0)?;
                self.writer.write_arithmetic(Arithmetic::Not)?;
            }
            KeywordConstant::False | KeywordConstant::Null => {
                self.writer.write_push(Segment::Constant, 0)?;
            }
            KeywordConstant::This => self.writer.write_push(Segment::Pointer, 0)?,
        }
        Ok(())
    }

    /// Every character becomes a `push constant`, so each code point has to
    /// fit the same range as an integer literal
    fn compile_string_constant(&mut self, token: &Token) -> Result<(), CompileError> {
        let text = token.lexeme.as_str();
        if let Some(ch) = text.chars().find(|&ch| ch as usize > MAX_INTEGER_CONSTANT) {
            return Err(CompileError::CharacterOutOfRange(ch, token.pos));
        }

        let constructor = match self.options.string_construction {
            StringConstruction::AppendPriming => "String.appendChar",
            StringConstruction::Allocate => "String.new",
        };
        self.writer.write_push(Segment::Constant, text.chars().count())?;
        self.writer.write_call(constructor, 1)?;

        for ch in text.chars() {
            self.writer.write_push(Segment::Constant, ch as usize)?;
            self.writer.write_call("String.appendChar", 2)?;
        }
        Ok(())
    }

    /// Variable, array element, or subroutine call, decided by the next token
    fn compile_identifier_term(&mut self, name: Token) -> Result<(), CompileError> {
        match self.peek_kind() {
            Some(TokenKind::Symbol(Symbol::Dot | Symbol::OpenParen)) => {
                self.compile_subroutine_call(name)
            }
            Some(TokenKind::Symbol(Symbol::OpenBracket)) => {
                self.current += 1;
                let (segment, index) = self.resolve_variable(&name.lexeme, name.pos)?;
                self.writer.write_push(segment, index)?;
                self.compile_expression()?;
                self.expect_symbol(Symbol::CloseBracket)?;
                self.writer.write_arithmetic(Arithmetic::Add)?;
                self.writer.write_pop(Segment::Pointer, 1)?;
                self.writer.write_push(Segment::That, 0)?;
                Ok(())
            }
            _ => {
                let (segment, index) = self.resolve_variable(&name.lexeme, name.pos)?;
                self.writer.write_push(segment, index)?;
                Ok(())
            }
        }
    }

    /// Compile `name(args)` or `qualifier.name(args)`; `first` is already consumed.
    ///
    /// The qualifier is used as written. A bare name is qualified with the
    /// class being compiled.
    pub(crate) fn compile_subroutine_call(&mut self, first: Token) -> Result<(), CompileError> {
        let name = if self.match_symbol(Symbol::Dot) {
            let subroutine = self.expect_identifier("subroutine name")?;
            format!("{}.{}", first.lexeme, subroutine.lexeme)
        } else {
            format!("{}.{}", self.class_name, first.lexeme)
        };

        self.expect_symbol(Symbol::OpenParen)?;
        let n_args = self.compile_expression_list()?;
        self.expect_symbol(Symbol::CloseParen)?;

        self.writer.write_call(&name, n_args)?;
        Ok(())
    }

    /// Compile a possibly empty, comma-separated expression list and return
    /// how many expressions it held
    fn compile_expression_list(&mut self) -> Result<usize, CompileError> {
        if self.check_symbol(Symbol::CloseParen) {
            return Ok(0);
        }

        let mut count = 0;
        loop {
            self.compile_expression()?;
            count += 1;
            if !self.match_symbol(Symbol::Comma) {
                break;
            }
        }
        Ok(count)
    }
}

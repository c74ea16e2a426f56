use crate::compiler::{CompileError, Compiler, CompilerOptions};
use crate::lexer::{tokenize, Keyword, LexerWarning, Symbol, TokenKind};
use crate::symbol::{StorageClass, SymbolTable};
use std::io::Write;
use tracing::debug;

/// Subroutine flavours
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubroutineKind {
    Constructor,
    Function,
    Method,
}

impl SubroutineKind {
    pub fn from_keyword(keyword: Keyword) -> Option<Self> {
        match keyword {
            Keyword::Constructor => Some(SubroutineKind::Constructor),
            Keyword::Function => Some(SubroutineKind::Function),
            Keyword::Method => Some(SubroutineKind::Method),
            _ => None,
        }
    }
}

impl<W: Write> Compiler<W> {
    /// Compile every class in the token stream and flush the output
    /// # Errors
    /// The first syntax, resolution, or output error aborts the unit
    pub fn compile(&mut self) -> Result<(), CompileError> {
        while !self.is_at_end() {
            self.compile_class()?;
        }
        self.writer.flush()?;
        Ok(())
    }

    fn compile_class(&mut self) -> Result<(), CompileError> {
        self.expect_keyword(Keyword::Class)?;
        let name = self.expect_identifier("class name")?;
        debug!(class = %name.lexeme, "compiling class");

        self.class_name = name.lexeme;
        self.symbol_table = SymbolTable::new();

        self.expect_symbol(Symbol::OpenBrace)?;

        while let Some(storage_class) = self.peek_class_var_kind() {
            self.skip_keyword()?;
            self.compile_var_names(storage_class)?;
        }

        while let Some(kind) = self.peek_subroutine_kind() {
            self.skip_keyword()?;
            self.compile_subroutine(kind)?;
        }

        self.expect_symbol(Symbol::CloseBrace)?;
        Ok(())
    }

    fn skip_keyword(&mut self) -> Result<(), CompileError> {
        self.advance("declaration keyword").map(|_| ())
    }

    fn peek_class_var_kind(&self) -> Option<StorageClass> {
        match self.peek_kind()? {
            TokenKind::Keyword(Keyword::Static) => Some(StorageClass::Static),
            TokenKind::Keyword(Keyword::Field) => Some(StorageClass::Field),
            _ => None,
        }
    }

    fn peek_subroutine_kind(&self) -> Option<SubroutineKind> {
        match self.peek_kind()? {
            TokenKind::Keyword(keyword) => SubroutineKind::from_keyword(keyword),
            _ => None,
        }
    }

    /// Parse a type: `int`, `char`, `boolean`, or a class name
    fn compile_type(&mut self) -> Result<String, CompileError> {
        match self.peek_kind() {
            Some(TokenKind::Keyword(Keyword::Int | Keyword::Char | Keyword::Boolean))
            | Some(TokenKind::Identifier) => Ok(self.advance("type")?.lexeme),
            _ => Err(self.error_expected("type")),
        }
    }

    /// `type name (, name)* ;` after the storage keyword
    fn compile_var_names(&mut self, storage_class: StorageClass) -> Result<(), CompileError> {
        let declared_type = self.compile_type()?;

        loop {
            let name = self.expect_identifier("variable name")?;
            self.symbol_table
                .define(name.lexeme, declared_type.clone(), storage_class);
            if !self.match_symbol(Symbol::Comma) {
                break;
            }
        }

        self.expect_symbol(Symbol::Semicolon)?;
        Ok(())
    }

    fn compile_subroutine(&mut self, kind: SubroutineKind) -> Result<(), CompileError> {
        let return_type = if self.check_keyword(Keyword::Void) {
            self.advance("return type")?.lexeme
        } else {
            self.compile_type()?
        };
        let name = self.expect_identifier("subroutine name")?;

        self.symbol_table.start_subroutine();

        self.expect_symbol(Symbol::OpenParen)?;
        let n_params = self.compile_parameter_list()?;
        self.expect_symbol(Symbol::CloseParen)?;

        self.expect_symbol(Symbol::OpenBrace)?;
        while self.check_keyword(Keyword::Var) {
            self.skip_keyword()?;
            self.compile_var_names(StorageClass::Local)?;
        }

        // the local count is only known once every `var` has been read
        let n_locals = self.symbol_table.var_count(StorageClass::Local);
        let full_name = format!("{}.{}", self.class_name, name.lexeme);
        debug!(
            subroutine = %full_name,
            ?kind,
            %return_type,
            n_params,
            n_locals,
            "compiling subroutine"
        );
        self.writer.write_function(&full_name, n_locals)?;

        self.compile_statements()?;
        self.expect_symbol(Symbol::CloseBrace)?;
        Ok(())
    }

    /// Define each `type name` pair as an argument and return how many there were
    fn compile_parameter_list(&mut self) -> Result<usize, CompileError> {
        if self.check_symbol(Symbol::CloseParen) {
            return Ok(0);
        }

        let mut count = 0;
        loop {
            let declared_type = self.compile_type()?;
            let name = self.expect_identifier("parameter name")?;
            self.symbol_table
                .define(name.lexeme, declared_type, StorageClass::Argument);
            count += 1;
            if !self.match_symbol(Symbol::Comma) {
                break;
            }
        }
        Ok(count)
    }
}

/// VM code for one unit plus whatever the scanner had to recover from
#[derive(Debug, Clone, Default)]
pub struct Compilation {
    pub code: String,
    pub warnings: Vec<LexerWarning>,
}

/// Tokenize and compile one unit into VM code held in memory
/// # Errors
/// Returns the first `CompileError` hit; no partial output is returned
pub fn compile_unit(source: &str, options: CompilerOptions) -> Result<Compilation, CompileError> {
    let tokenized = tokenize(source);
    let mut compiler = Compiler::new(tokenized.tokens, Vec::new(), options);
    compiler.compile()?;
    Ok(Compilation {
        code: String::from_utf8_lossy(&compiler.into_inner()).into_owned(),
        warnings: tokenized.warnings,
    })
}

/// Like [`compile_unit`], keeping only the code. Truncation warnings are
/// dropped; use [`compile_unit`] to see them.
/// # Errors
/// See [`compile_unit`]
pub fn compile_source(source: &str, options: CompilerOptions) -> Result<String, CompileError> {
    compile_unit(source, options).map(|compilation| compilation.code)
}

#[cfg(test)]
mod tests {
    use super::*;

    const POINT: &str = r#"
        // A 2D point
        class Point {
            field int x, y;
            static int count;

            /** Creates a point. */
            constructor Point new(int ax, int ay) {
                let x = ax;
                let y = ay;
                let count = count + 1;
                return this;
            }

            method int getX() { return x; }

            function int sum(Point p, Point q) {
                var int total;
                var int tmp, unused;
                let total = p.getX();
                return total;
            }
        }
    "#;

    #[test]
    fn compiles_a_complete_class() {
        let out = compile_source(POINT, CompilerOptions::default()).unwrap();
        let expected = "\
function Point.new 0
push argument 0
pop this 0
push argument 1
pop this 1
push static 0
push constant 1
add
pop static 0
push pointer 0
return
function Point.getX 0
push this 0
return
function Point.sum 3
call p.getX 0
pop local 0
push local 0
return
";
        assert_eq!(out, expected);
    }

    #[test]
    fn function_header_counts_locals_not_parameters() {
        let source = "class A { function void f(int a, int b, int c) { var int x; return; } }";
        let out = compile_source(source, CompilerOptions::default()).unwrap();
        assert_eq!(out.lines().next(), Some("function A.f 1"));
    }

    #[test]
    fn subroutine_scope_does_not_leak() {
        let source = "class A {
            function void f() { var int leaked; return; }
            function void g() { let leaked = 1; return; }
        }";
        let err = compile_source(source, CompilerOptions::default()).unwrap_err();
        assert!(matches!(err, CompileError::UndefinedVariable(ref n, _) if n == "leaked"));
    }

    #[test]
    fn local_shadows_field() {
        let source = "class A {
            field int v;
            method int f() { var int v; return v; }
        }";
        let out = compile_source(source, CompilerOptions::default()).unwrap();
        assert_eq!(out, "function A.f 1\npush local 0\nreturn\n");
    }

    #[test]
    fn several_classes_in_one_unit_get_fresh_tables() {
        let source = "class A { static int s; function int f() { return s; } }
                      class B { function int g() { return A.f(); } }";
        let out = compile_source(source, CompilerOptions::default()).unwrap();
        assert_eq!(
            out,
            "function A.f 0\npush static 0\nreturn\nfunction B.g 0\ncall A.f 0\nreturn\n"
        );

        let leaking = "class A { static int s; }
                       class B { function int g() { return s; } }";
        assert!(compile_source(leaking, CompilerOptions::default()).is_err());
    }

    #[test]
    fn compiling_twice_is_identical() {
        let first = compile_source(POINT, CompilerOptions::default()).unwrap();
        let second = compile_source(POINT, CompilerOptions::default()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn symbol_table_is_exposed_after_compiling() {
        let tokens = tokenize("class A { field int a, b; static A inst; }").tokens;
        let mut compiler = Compiler::new(tokens, Vec::new(), CompilerOptions::default());
        compiler.compile().unwrap();

        let table = compiler.symbol_table();
        assert_eq!(table.index_of("b"), Some(1));
        assert_eq!(table.type_of("inst"), Some("A"));
        assert_eq!(table.kind_of("inst"), Some(StorageClass::Static));
    }

    #[test]
    fn missing_class_keyword() {
        let err = compile_source("function void f() {}", CompilerOptions::default()).unwrap_err();
        assert!(matches!(err, CompileError::ExpectedToken(ref e, ref f, _) if e == "'class'" && f == "function"));
    }

    #[test]
    fn truncated_class() {
        let err = compile_source("class A { function void f() {", CompilerOptions::default()).unwrap_err();
        assert!(matches!(err, CompileError::UnexpectedEof(_)), "{err}");
    }

    #[test]
    fn unit_reports_truncation_warnings_with_the_code() {
        let source = "class A { function void f() { return; } } /* left open";
        let compilation = compile_unit(source, CompilerOptions::default()).unwrap();
        assert_eq!(compilation.code, "function A.f 0\npush constant 0\nreturn\n");
        assert!(matches!(
            compilation.warnings.as_slice(),
            [LexerWarning::UnterminatedBlockComment(pos)] if pos.column == 43
        ));
    }

    #[test]
    fn empty_unit_produces_no_code() {
        assert_eq!(compile_source("// nothing here\n", CompilerOptions::default()).unwrap(), "");
    }
}

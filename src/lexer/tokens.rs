use crate::lexer::Position;
use std::fmt;

/// Language keywords
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Class,
    Constructor,
    Function,
    Method,
    Field,
    Static,
    Var,
    Int,
    Char,
    Boolean,
    Void,
    True,
    False,
    Null,
    This,
    Let,
    Do,
    If,
    Else,
    While,
    Return,
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Keyword::Class => "class",
            Keyword::Constructor => "constructor",
            Keyword::Function => "function",
            Keyword::Method => "method",
            Keyword::Field => "field",
            Keyword::Static => "static",
            Keyword::Var => "var",
            Keyword::Int => "int",
            Keyword::Char => "char",
            Keyword::Boolean => "boolean",
            Keyword::Void => "void",
            Keyword::True => "true",
            Keyword::False => "false",
            Keyword::Null => "null",
            Keyword::This => "this",
            Keyword::Let => "let",
            Keyword::Do => "do",
            Keyword::If => "if",
            Keyword::Else => "else",
            Keyword::While => "while",
            Keyword::Return => "return",
        };
        write!(f, "{}", s)
    }
}

impl Keyword {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "class" => Some(Keyword::Class),
            "constructor" => Some(Keyword::Constructor),
            "function" => Some(Keyword::Function),
            "method" => Some(Keyword::Method),
            "field" => Some(Keyword::Field),
            "static" => Some(Keyword::Static),
            "var" => Some(Keyword::Var),
            "int" => Some(Keyword::Int),
            "char" => Some(Keyword::Char),
            "boolean" => Some(Keyword::Boolean),
            "void" => Some(Keyword::Void),
            "true" => Some(Keyword::True),
            "false" => Some(Keyword::False),
            "null" => Some(Keyword::Null),
            "this" => Some(Keyword::This),
            "let" => Some(Keyword::Let),
            "do" => Some(Keyword::Do),
            "if" => Some(Keyword::If),
            "else" => Some(Keyword::Else),
            "while" => Some(Keyword::While),
            "return" => Some(Keyword::Return),
            _ => None,
        }
    }
}

/// Single-character symbols
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol {
    OpenBrace,    // {
    CloseBrace,   // }
    OpenParen,    // (
    CloseParen,   // )
    OpenBracket,  // [
    CloseBracket, // ]
    Dot,          // .
    Comma,        // ,
    Semicolon,    // ;
    Plus,         // +
    Minus,        // -
    Asterisk,     // *
    Slash,        // /
    Ampersand,    // &
    Pipe,         // |
    Less,         // <
    Greater,      // >
    Equal,        // =
    Tilde,        // ~
}

impl Symbol {
    pub fn from_char(ch: char) -> Option<Self> {
        match ch {
            '{' => Some(Symbol::OpenBrace),
            '}' => Some(Symbol::CloseBrace),
            '(' => Some(Symbol::OpenParen),
            ')' => Some(Symbol::CloseParen),
            '[' => Some(Symbol::OpenBracket),
            ']' => Some(Symbol::CloseBracket),
            '.' => Some(Symbol::Dot),
            ',' => Some(Symbol::Comma),
            ';' => Some(Symbol::Semicolon),
            '+' => Some(Symbol::Plus),
            '-' => Some(Symbol::Minus),
            '*' => Some(Symbol::Asterisk),
            '/' => Some(Symbol::Slash),
            '&' => Some(Symbol::Ampersand),
            '|' => Some(Symbol::Pipe),
            '<' => Some(Symbol::Less),
            '>' => Some(Symbol::Greater),
            '=' => Some(Symbol::Equal),
            '~' => Some(Symbol::Tilde),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Symbol::OpenBrace => '{',
            Symbol::CloseBrace => '}',
            Symbol::OpenParen => '(',
            Symbol::CloseParen => ')',
            Symbol::OpenBracket => '[',
            Symbol::CloseBracket => ']',
            Symbol::Dot => '.',
            Symbol::Comma => ',',
            Symbol::Semicolon => ';',
            Symbol::Plus => '+',
            Symbol::Minus => '-',
            Symbol::Asterisk => '*',
            Symbol::Slash => '/',
            Symbol::Ampersand => '&',
            Symbol::Pipe => '|',
            Symbol::Less => '<',
            Symbol::Greater => '>',
            Symbol::Equal => '=',
            Symbol::Tilde => '~',
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Token kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Keyword(Keyword),
    Symbol(Symbol),
    Identifier,
    IntegerConstant,
    StringConstant,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TokenKind::Keyword(_) => write!(f, "keyword"),
            TokenKind::Symbol(_) => write!(f, "symbol"),
            TokenKind::Identifier => write!(f, "identifier"),
            TokenKind::IntegerConstant => write!(f, "integerConstant"),
            TokenKind::StringConstant => write!(f, "stringConstant"),
        }
    }
}

/// A token with position information.
///
/// `lexeme` is the source text of the token, except for string constants
/// where the enclosing quotes are stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub pos: Position,
    pub lexeme: String,
}

impl Token {
    pub fn new(kind: TokenKind, pos: Position, lexeme: String) -> Self {
        Self { kind, pos, lexeme }
    }

    /// Classify an accumulated run of non-symbol, non-space characters.
    pub fn classify(text: String, pos: Position) -> Self {
        let kind = if let Some(keyword) = Keyword::from_str(&text) {
            TokenKind::Keyword(keyword)
        } else if is_integer_constant(&text) {
            TokenKind::IntegerConstant
        } else {
            TokenKind::Identifier
        };
        Self::new(kind, pos, text)
    }

    pub fn is_symbol(&self, symbol: Symbol) -> bool {
        self.kind == TokenKind::Symbol(symbol)
    }

    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        self.kind == TokenKind::Keyword(keyword)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.kind {
            TokenKind::StringConstant => write!(f, "\"{}\"", self.lexeme),
            _ => write!(f, "{}", self.lexeme),
        }
    }
}

fn is_integer_constant(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit())
}

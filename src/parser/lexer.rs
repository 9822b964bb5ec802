//! Lexer (tokenizer) for IFJ24 source code
//!
//! Converts raw source text into [`Token`]s on demand. The parser pulls one token at a
//! time through [`Lexer::next_token`]; [`Lexer::tokenize`] collects the whole stream and
//! exists mostly for tests and tooling.
//!
//! Identifier and literal text is interned, so every AST node that refers to the same
//! name shares one allocation for as long as the compilation lives.

use super::ast::SourceLocation;
use rustc_hash::FxHashSet;
use std::fmt;
use std::rc::Rc;

/// Lexical categories produced by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    // Literals
    IntLiteral,
    Zero, // the lone `0`; semantically an int literal
    FloatLiteral,
    StringLiteral,

    // Identifiers
    Ident,
    Underscore, // `_` discard target

    // Keywords
    Const,
    Else,
    Fn,
    If,
    I32,
    F64,
    U8,
    Null,
    Pub,
    Return,
    Var,
    Void,
    While,
    Import, // @import

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    EqEq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,

    // Punctuation
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Dot,
    Semicolon,
    Colon,
    Pipe,
    Question,

    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TokenKind::IntLiteral | TokenKind::Zero => "integer literal",
            TokenKind::FloatLiteral => "float literal",
            TokenKind::StringLiteral => "string literal",
            TokenKind::Ident => "identifier",
            TokenKind::Underscore => "'_'",
            TokenKind::Const => "'const'",
            TokenKind::Else => "'else'",
            TokenKind::Fn => "'fn'",
            TokenKind::If => "'if'",
            TokenKind::I32 => "'i32'",
            TokenKind::F64 => "'f64'",
            TokenKind::U8 => "'u8'",
            TokenKind::Null => "'null'",
            TokenKind::Pub => "'pub'",
            TokenKind::Return => "'return'",
            TokenKind::Var => "'var'",
            TokenKind::Void => "'void'",
            TokenKind::While => "'while'",
            TokenKind::Import => "'@import'",
            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::Star => "'*'",
            TokenKind::Slash => "'/'",
            TokenKind::EqEq => "'=='",
            TokenKind::NotEq => "'!='",
            TokenKind::Lt => "'<'",
            TokenKind::Le => "'<='",
            TokenKind::Gt => "'>'",
            TokenKind::Ge => "'>='",
            TokenKind::Eq => "'='",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::Comma => "','",
            TokenKind::Dot => "'.'",
            TokenKind::Semicolon => "';'",
            TokenKind::Colon => "':'",
            TokenKind::Pipe => "'|'",
            TokenKind::Question => "'?'",
            TokenKind::Eof => "end of file",
        };
        write!(f, "{}", text)
    }
}

/// A single token. `lexeme` is present for identifiers and literals only.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: Option<Rc<str>>,
    pub location: SourceLocation,
}

impl Token {
    fn new(kind: TokenKind, location: SourceLocation) -> Self {
        Token {
            kind,
            lexeme: None,
            location,
        }
    }

    fn with_lexeme(kind: TokenKind, lexeme: Rc<str>, location: SourceLocation) -> Self {
        Token {
            kind,
            lexeme: Some(lexeme),
            location,
        }
    }

    /// Lexeme text, or an empty string for punctuation and keywords
    pub fn text(&self) -> &str {
        self.lexeme.as_deref().unwrap_or("")
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.kind, &self.lexeme) {
            (TokenKind::Ident, Some(name)) => write!(f, "identifier '{}'", name),
            (TokenKind::StringLiteral, Some(text)) => write!(f, "string literal \"{}\"", text),
            (kind, Some(text)) => write!(f, "{} {}", kind, text),
            (kind, None) => write!(f, "{}", kind),
        }
    }
}

/// Lexer error type
#[derive(Debug)]
pub struct LexError {
    pub message: String,
    pub location: SourceLocation,
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Lexer error at line {}, column {}: {}",
            self.location.line, self.location.column, self.message
        )
    }
}

impl std::error::Error for LexError {}

/// Shared storage for identifier and literal text
#[derive(Debug, Default)]
pub struct Interner {
    strings: FxHashSet<Rc<str>>,
}

impl Interner {
    pub fn intern(&mut self, text: &str) -> Rc<str> {
        if let Some(existing) = self.strings.get(text) {
            return Rc::clone(existing);
        }
        let interned: Rc<str> = Rc::from(text);
        self.strings.insert(Rc::clone(&interned));
        interned
    }
}

/// Append the UTF-8 encoding of `ch`, one char per byte.
///
/// String literals hold bytes, so a `\xHH` escape and a raw source character share the
/// representation U+0000..U+00FF.
fn push_bytes(string: &mut String, ch: char) {
    let mut buffer = [0; 4];
    string.extend(ch.encode_utf8(&mut buffer).bytes().map(char::from));
}

/// Lexer for IFJ24 source code
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
    interner: Interner,
}

impl Lexer {
    /// Create a new lexer for the given source string.
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
            interner: Interner::default(),
        }
    }

    /// Tokenize the entire input, ending with `Eof`
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();

        loop {
            let token = self.next_token()?;
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                break;
            }
        }

        Ok(tokens)
    }

    /// Produce the next token. Once the input is exhausted every call returns `Eof`.
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_whitespace_and_comments();

        let loc = self.current_location();
        let ch = match self.advance() {
            Some(ch) => ch,
            None => return Ok(Token::new(TokenKind::Eof, loc)),
        };

        match ch {
            '"' => self.string_literal(loc),
            '\\' => self.multiline_string_literal(loc),
            '0'..='9' => self.number_literal(ch, loc),
            'a'..='z' | 'A'..='Z' | '_' => Ok(self.identifier_or_keyword(ch, loc)),
            '@' => self.import_directive(loc),

            '+' => Ok(Token::new(TokenKind::Plus, loc)),
            '-' => Ok(Token::new(TokenKind::Minus, loc)),
            '*' => Ok(Token::new(TokenKind::Star, loc)),
            '/' => Ok(Token::new(TokenKind::Slash, loc)),
            '=' => Ok(self.one_or_two('=', TokenKind::EqEq, TokenKind::Eq, loc)),
            '<' => Ok(self.one_or_two('=', TokenKind::Le, TokenKind::Lt, loc)),
            '>' => Ok(self.one_or_two('=', TokenKind::Ge, TokenKind::Gt, loc)),
            '!' => {
                if self.peek() == Some('=') {
                    self.advance();
                    Ok(Token::new(TokenKind::NotEq, loc))
                } else {
                    Err(LexError {
                        message: "Expected '=' after '!'".to_string(),
                        location: loc,
                    })
                }
            }
            '(' => Ok(Token::new(TokenKind::LParen, loc)),
            ')' => Ok(Token::new(TokenKind::RParen, loc)),
            '{' => Ok(Token::new(TokenKind::LBrace, loc)),
            '}' => Ok(Token::new(TokenKind::RBrace, loc)),
            '[' => Ok(Token::new(TokenKind::LBracket, loc)),
            ']' => Ok(Token::new(TokenKind::RBracket, loc)),
            ',' => Ok(Token::new(TokenKind::Comma, loc)),
            '.' => Ok(Token::new(TokenKind::Dot, loc)),
            ';' => Ok(Token::new(TokenKind::Semicolon, loc)),
            ':' => Ok(Token::new(TokenKind::Colon, loc)),
            '|' => Ok(Token::new(TokenKind::Pipe, loc)),
            '?' => Ok(Token::new(TokenKind::Question, loc)),

            _ => Err(LexError {
                message: format!("Unexpected character: '{}'", ch),
                location: loc,
            }),
        }
    }

    fn one_or_two(
        &mut self,
        second: char,
        double: TokenKind,
        single: TokenKind,
        loc: SourceLocation,
    ) -> Token {
        if self.peek() == Some(second) {
            self.advance();
            Token::new(double, loc)
        } else {
            Token::new(single, loc)
        }
    }

    /// Parse string literal; the opening quote is already consumed
    fn string_literal(&mut self, loc: SourceLocation) -> Result<Token, LexError> {
        let mut string = String::new();

        while let Some(ch) = self.peek() {
            match ch {
                '"' => {
                    self.advance();
                    let lexeme = self.interner.intern(&string);
                    return Ok(Token::with_lexeme(TokenKind::StringLiteral, lexeme, loc));
                }
                '\n' => break,
                '\\' => {
                    self.advance();
                    string.push(self.escape_sequence()?);
                }
                _ => {
                    push_bytes(&mut string, ch);
                    self.advance();
                }
            }
        }

        Err(LexError {
            message: "Unterminated string literal".to_string(),
            location: loc,
        })
    }

    /// Decode the character after a backslash
    fn escape_sequence(&mut self) -> Result<char, LexError> {
        let escape_loc = self.current_location();
        let escaped = self.advance().ok_or_else(|| LexError {
            message: "Unexpected end of file in string literal".to_string(),
            location: escape_loc,
        })?;

        match escaped {
            'n' => Ok('\n'),
            't' => Ok('\t'),
            'r' => Ok('\r'),
            '\\' => Ok('\\'),
            '"' => Ok('"'),
            'x' => {
                let hex: String = [self.advance(), self.advance()]
                    .iter()
                    .flatten()
                    .collect();
                u8::from_str_radix(&hex, 16)
                    .ok()
                    .filter(|_| hex.len() == 2)
                    .map(char::from)
                    .ok_or_else(|| LexError {
                        message: format!("Invalid hex escape sequence: \\x{}", hex),
                        location: escape_loc,
                    })
            }
            _ => Err(LexError {
                message: format!("Unknown escape sequence: \\{}", escaped),
                location: escape_loc,
            }),
        }
    }

    /// Parse `\\`-prefixed lines; consecutive lines are joined with newlines
    fn multiline_string_literal(&mut self, loc: SourceLocation) -> Result<Token, LexError> {
        if self.peek() != Some('\\') {
            return Err(LexError {
                message: "Expected '\\\\' to start a multi-line string".to_string(),
                location: loc,
            });
        }
        self.advance();

        let mut string = String::new();
        loop {
            while let Some(ch) = self.peek() {
                if ch == '\n' {
                    break;
                }
                push_bytes(&mut string, ch);
                self.advance();
            }

            while matches!(self.peek(), Some(' ' | '\t' | '\r' | '\n')) {
                self.advance();
            }

            if self.peek() == Some('\\') && self.peek_ahead(1) == Some('\\') {
                self.advance();
                self.advance();
                string.push('\n');
            } else {
                break;
            }
        }

        let lexeme = self.interner.intern(&string);
        Ok(Token::with_lexeme(TokenKind::StringLiteral, lexeme, loc))
    }

    /// Parse integer or float literal
    fn number_literal(&mut self, first_digit: char, loc: SourceLocation) -> Result<Token, LexError> {
        let mut num_str = String::new();
        num_str.push(first_digit);

        if first_digit == '0' && self.peek().is_some_and(|c| c.is_ascii_digit()) {
            return Err(LexError {
                message: "Integer literal cannot have leading zeros".to_string(),
                location: loc,
            });
        }

        self.take_digits(&mut num_str);
        let mut is_float = false;

        if self.peek() == Some('.') {
            if !self.peek_ahead(1).is_some_and(|c| c.is_ascii_digit()) {
                return Err(LexError {
                    message: format!("Expected digits after '{}.'", num_str),
                    location: loc,
                });
            }
            is_float = true;
            num_str.push('.');
            self.advance();
            self.take_digits(&mut num_str);
        }

        if let Some(e @ ('e' | 'E')) = self.peek() {
            is_float = true;
            num_str.push(e);
            self.advance();
            if let Some(sign @ ('+' | '-')) = self.peek() {
                num_str.push(sign);
                self.advance();
            }
            if !self.peek().is_some_and(|c| c.is_ascii_digit()) {
                return Err(LexError {
                    message: format!("Malformed exponent in literal: {}", num_str),
                    location: loc,
                });
            }
            self.take_digits(&mut num_str);
        }

        if is_float {
            let value = num_str.parse::<f64>().map_err(|_| LexError {
                message: format!("Invalid float literal: {}", num_str),
                location: loc,
            })?;
            if !value.is_finite() {
                return Err(LexError {
                    message: format!("Float literal out of range: {}", num_str),
                    location: loc,
                });
            }
            let lexeme = self.interner.intern(&num_str);
            return Ok(Token::with_lexeme(TokenKind::FloatLiteral, lexeme, loc));
        }

        num_str.parse::<i32>().map_err(|_| LexError {
            message: format!("Integer literal out of range: {}", num_str),
            location: loc,
        })?;

        let kind = if num_str == "0" {
            TokenKind::Zero
        } else {
            TokenKind::IntLiteral
        };
        let lexeme = self.interner.intern(&num_str);
        Ok(Token::with_lexeme(kind, lexeme, loc))
    }

    fn take_digits(&mut self, buffer: &mut String) {
        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                buffer.push(ch);
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Parse identifier or keyword
    fn identifier_or_keyword(&mut self, first_char: char, loc: SourceLocation) -> Token {
        let mut ident = String::new();
        ident.push(first_char);

        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                ident.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        let kind = match ident.as_str() {
            "_" => TokenKind::Underscore,
            "const" => TokenKind::Const,
            "else" => TokenKind::Else,
            "fn" => TokenKind::Fn,
            "if" => TokenKind::If,
            "i32" => TokenKind::I32,
            "f64" => TokenKind::F64,
            "u8" => TokenKind::U8,
            "null" => TokenKind::Null,
            "pub" => TokenKind::Pub,
            "return" => TokenKind::Return,
            "var" => TokenKind::Var,
            "void" => TokenKind::Void,
            "while" => TokenKind::While,
            _ => {
                let lexeme = self.interner.intern(&ident);
                return Token::with_lexeme(TokenKind::Ident, lexeme, loc);
            }
        };

        Token::new(kind, loc)
    }

    /// Parse `@import`; the `@` is already consumed
    fn import_directive(&mut self, loc: SourceLocation) -> Result<Token, LexError> {
        let mut word = String::new();
        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                word.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        if word == "import" {
            Ok(Token::new(TokenKind::Import, loc))
        } else {
            Err(LexError {
                message: format!("Expected '@import', found '@{}'", word),
                location: loc,
            })
        }
    }

    /// Skip whitespace and `//` comments
    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.peek() {
                Some(' ') | Some('\t') | Some('\r') | Some('\n') => {
                    self.advance();
                }
                Some('/') if self.peek_ahead(1) == Some('/') => {
                    while let Some(ch) = self.peek() {
                        self.advance();
                        if ch == '\n' {
                            break;
                        }
                    }
                }
                _ => break,
            }
        }
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_ahead(&self, n: usize) -> Option<char> {
        self.input.get(self.position + n).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.position += 1;

        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }

        Some(ch)
    }

    fn current_location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let mut lexer = Lexer::new(source);
        lexer
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_simple_tokens() {
        let tokens = kinds("pub fn main() void { return; }");

        assert_eq!(
            tokens,
            vec![
                TokenKind::Pub,
                TokenKind::Fn,
                TokenKind::Ident,
                TokenKind::LParen,
                TokenKind::RParen,
                TokenKind::Void,
                TokenKind::LBrace,
                TokenKind::Return,
                TokenKind::Semicolon,
                TokenKind::RBrace,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_operators() {
        let tokens = kinds("+ - * / == != < <= > >= = ? |");

        assert_eq!(
            tokens,
            vec![
                TokenKind::Plus,
                TokenKind::Minus,
                TokenKind::Star,
                TokenKind::Slash,
                TokenKind::EqEq,
                TokenKind::NotEq,
                TokenKind::Lt,
                TokenKind::Le,
                TokenKind::Gt,
                TokenKind::Ge,
                TokenKind::Eq,
                TokenKind::Question,
                TokenKind::Pipe,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_numbers() {
        let mut lexer = Lexer::new("0 42 3.5 1e3 2.5E-2");
        let tokens = lexer.tokenize().unwrap();

        assert_eq!(tokens[0].kind, TokenKind::Zero);
        assert_eq!(tokens[1].kind, TokenKind::IntLiteral);
        assert_eq!(tokens[1].text(), "42");
        assert_eq!(tokens[2].kind, TokenKind::FloatLiteral);
        assert_eq!(tokens[3].kind, TokenKind::FloatLiteral);
        assert_eq!(tokens[3].text(), "1e3");
        assert_eq!(tokens[4].text(), "2.5E-2");
    }

    #[test]
    fn test_leading_zero_rejected() {
        let mut lexer = Lexer::new("007");
        let err = lexer.tokenize().unwrap_err();
        assert!(err.message.contains("leading zeros"));
    }

    #[test]
    fn test_int_out_of_range() {
        let mut lexer = Lexer::new("3000000000");
        assert!(lexer.tokenize().is_err());
    }

    #[test]
    fn test_string_escapes() {
        let mut lexer = Lexer::new(r#""a\tb\n\"q\" \x41""#);
        let tokens = lexer.tokenize().unwrap();

        assert_eq!(tokens[0].kind, TokenKind::StringLiteral);
        assert_eq!(tokens[0].text(), "a\tb\n\"q\" A");
    }

    #[test]
    fn test_string_literals_hold_bytes() {
        let mut lexer = Lexer::new("\"\\xE9\" \"\u{e9}\"");
        let tokens = lexer.tokenize().unwrap();

        assert_eq!(tokens[0].text(), "\u{e9}");
        assert_eq!(tokens[1].text(), "\u{c3}\u{a9}");
    }

    #[test]
    fn test_unterminated_string() {
        let mut lexer = Lexer::new("\"abc\nx");
        let err = lexer.tokenize().unwrap_err();
        assert_eq!(err.message, "Unterminated string literal");
        assert_eq!(err.location, SourceLocation::new(1, 1));
    }

    #[test]
    fn test_multiline_string() {
        let mut lexer = Lexer::new("\\\\first\n   \\\\second\n;");
        let tokens = lexer.tokenize().unwrap();

        assert_eq!(tokens[0].kind, TokenKind::StringLiteral);
        assert_eq!(tokens[0].text(), "first\nsecond");
        assert_eq!(tokens[1].kind, TokenKind::Semicolon);
    }

    #[test]
    fn test_import_directive() {
        assert_eq!(kinds("@import")[0], TokenKind::Import);

        let mut lexer = Lexer::new("@imp");
        assert!(lexer.tokenize().is_err());
    }

    #[test]
    fn test_comments_and_locations() {
        let mut lexer = Lexer::new("var x // comment\n  = _;");
        let tokens = lexer.tokenize().unwrap();

        assert_eq!(tokens[0].kind, TokenKind::Var);
        assert_eq!(tokens[1].kind, TokenKind::Ident);
        assert_eq!(tokens[2].kind, TokenKind::Eq);
        assert_eq!(tokens[2].location, SourceLocation::new(2, 3));
        assert_eq!(tokens[3].kind, TokenKind::Underscore);
    }

    #[test]
    fn test_identifiers_are_interned() {
        let mut lexer = Lexer::new("abc abc abd");
        let tokens = lexer.tokenize().unwrap();

        let first = tokens[0].lexeme.clone().unwrap();
        let second = tokens[1].lexeme.clone().unwrap();
        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(lexer.interner.strings.len(), 2);
    }

    #[test]
    fn test_eof_is_sticky() {
        let mut lexer = Lexer::new("x");
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Ident);
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Eof);
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Eof);
    }
}

//! Selector Tokenizer
//!
//! Tokenizes selector text following the CSS Syntax Module Level 3 token
//! rules that selectors use.

use crate::error::{SelectorError, SelectorResult, SourceLocation};

/// Selector token types
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Identifier (type names, class names, attribute names)
    Ident(String),
    /// Function token (identifier followed by '(')
    Function(String),
    /// Hash token (e.g., #id)
    Hash(String, HashType),
    /// String token
    String(String),
    /// Number, kept as written
    Number(String),
    /// Whitespace
    Whitespace,
    /// Colon ':'
    Colon,
    /// Comma ','
    Comma,
    /// Left bracket '['
    LeftBracket,
    /// Right bracket ']'
    RightBracket,
    /// Left paren '('
    LeftParen,
    /// Right paren ')'
    RightParen,
    /// Delim (any other single character)
    Delim(char),
    /// End of input
    Eof,
}

impl Token {
    /// Short description for error messages
    pub fn describe(&self) -> String {
        match self {
            Token::Ident(s) => format!("identifier '{}'", s),
            Token::Function(s) => format!("function '{}('", s),
            Token::Hash(s, _) => format!("'#{}'", s),
            Token::String(s) => format!("string \"{}\"", s),
            Token::Number(n) => format!("number '{}'", n),
            Token::Whitespace => "whitespace".to_string(),
            Token::Colon => "':'".to_string(),
            Token::Comma => "','".to_string(),
            Token::LeftBracket => "'['".to_string(),
            Token::RightBracket => "']'".to_string(),
            Token::LeftParen => "'('".to_string(),
            Token::RightParen => "')'".to_string(),
            Token::Delim(c) => format!("'{}'", c),
            Token::Eof => "end of selector".to_string(),
        }
    }
}

/// Hash token type (id or unrestricted)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashType {
    /// Valid as an ID selector
    Id,
    /// Starts with a digit, not an identifier
    Unrestricted,
}

/// Selector tokenizer
pub struct Tokenizer<'a> {
    input: &'a str,
    position: usize,
    line: usize,
    column: usize,
}

impl<'a> Tokenizer<'a> {
    /// Create a new tokenizer
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            position: 0,
            line: 1,
            column: 1,
        }
    }

    /// Get the current source location
    pub fn location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column, self.position)
    }

    /// Peek at the next character without consuming
    fn peek(&self) -> Option<char> {
        self.input[self.position..].chars().next()
    }

    /// Peek at the second character without consuming
    fn peek_second(&self) -> Option<char> {
        let mut iter = self.input[self.position..].chars();
        iter.next();
        iter.next()
    }

    /// Consume the next character
    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.position += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    /// Consume a comment
    fn consume_comment(&mut self) {
        self.advance(); // consume '/'
        self.advance(); // consume '*'
        loop {
            match self.advance() {
                Some('*') if self.peek() == Some('/') => {
                    self.advance();
                    return;
                }
                Some(_) => continue,
                None => return, // EOF in comment
            }
        }
    }

    /// Get the next token
    pub fn next_token(&mut self) -> SelectorResult<Token> {
        // Skip whitespace and comments, but track if we saw whitespace
        let mut saw_whitespace = false;
        while let Some(c) = self.peek() {
            if is_whitespace(c) {
                saw_whitespace = true;
                self.advance();
            } else if c == '/' && self.peek_second() == Some('*') {
                self.consume_comment();
            } else {
                break;
            }
        }

        if saw_whitespace {
            return Ok(Token::Whitespace);
        }

        let Some(c) = self.peek() else {
            return Ok(Token::Eof);
        };

        let single = match c {
            ':' => Some(Token::Colon),
            ',' => Some(Token::Comma),
            '[' => Some(Token::LeftBracket),
            ']' => Some(Token::RightBracket),
            '(' => Some(Token::LeftParen),
            ')' => Some(Token::RightParen),
            _ => None,
        };
        if let Some(token) = single {
            self.advance();
            return Ok(token);
        }

        match c {
            '"' | '\'' => self.consume_string(c),
            '#' => self.consume_hash(),
            '0'..='9' => Ok(self.consume_number()),
            _ if self.starts_identifier() => Ok(self.consume_ident_like()),
            _ => {
                self.advance();
                Ok(Token::Delim(c))
            }
        }
    }

    /// Raw text of a functional argument up to the matching ')', which is
    /// consumed. Used for `an+b` expressions.
    pub fn consume_raw_argument(&mut self) -> SelectorResult<String> {
        let start = self.position;
        let mut depth = 1usize;
        loop {
            match self.advance() {
                Some('(') => depth += 1,
                Some(')') => {
                    depth -= 1;
                    if depth == 0 {
                        let end = self.position - 1;
                        return Ok(self.input[start..end].trim().to_string());
                    }
                }
                Some(_) => {}
                None => return Err(SelectorError::unexpected("end of selector", self.location())),
            }
        }
    }

    /// Check if input starts an identifier
    fn starts_identifier(&self) -> bool {
        let mut chars = self.input[self.position..].chars();
        match chars.next() {
            Some('-') => match chars.next() {
                Some('-') => true,
                Some('\\') => chars.next().is_some_and(|c| c != '\n'),
                Some(c) => is_ident_start(c),
                None => false,
            },
            Some('\\') => chars.next().is_some_and(|c| c != '\n'),
            Some(c) => is_ident_start(c),
            None => false,
        }
    }

    /// Consume a string token
    fn consume_string(&mut self, quote: char) -> SelectorResult<Token> {
        self.advance(); // consume the quote
        let mut value = String::new();

        loop {
            match self.advance() {
                Some(c) if c == quote => return Ok(Token::String(value)),
                Some('\\') => match self.peek() {
                    Some('\n') => {
                        self.advance();
                    }
                    Some(_) => value.push(self.consume_escape()),
                    None => {}
                },
                Some('\n') | None => {
                    return Err(SelectorError::UnterminatedString {
                        location: self.location(),
                    });
                }
                Some(c) => value.push(c),
            }
        }
    }

    /// Consume an escape after the backslash: up to six hex digits and one
    /// optional whitespace, or any single character
    fn consume_escape(&mut self) -> char {
        let mut hex = String::new();
        while hex.len() < 6 {
            match self.peek() {
                Some(c) if c.is_ascii_hexdigit() => {
                    hex.push(c);
                    self.advance();
                }
                _ => break,
            }
        }
        if hex.is_empty() {
            return self.advance().unwrap_or('\u{FFFD}');
        }
        if self.peek().is_some_and(is_whitespace) {
            self.advance();
        }
        u32::from_str_radix(&hex, 16)
            .ok()
            .filter(|&v| v != 0)
            .and_then(char::from_u32)
            .unwrap_or('\u{FFFD}')
    }

    /// Consume a hash token
    fn consume_hash(&mut self) -> SelectorResult<Token> {
        self.advance(); // consume '#'
        let hash_type = if self.starts_identifier() {
            HashType::Id
        } else {
            HashType::Unrestricted
        };
        let value = self.consume_ident_name();
        if value.is_empty() {
            return Ok(Token::Delim('#'));
        }
        Ok(Token::Hash(value, hash_type))
    }

    /// Consume an identifier name
    fn consume_ident_name(&mut self) -> String {
        let mut name = String::new();
        while let Some(c) = self.peek() {
            if is_ident_char(c) {
                name.push(c);
                self.advance();
            } else if c == '\\' && self.peek_second().is_some_and(|n| n != '\n') {
                self.advance();
                name.push(self.consume_escape());
            } else {
                break;
            }
        }
        name
    }

    /// Consume an identifier or function token
    fn consume_ident_like(&mut self) -> Token {
        let name = self.consume_ident_name();
        if self.peek() == Some('(') {
            self.advance(); // consume '('
            return Token::Function(name);
        }
        Token::Ident(name)
    }

    /// Consume a number token
    fn consume_number(&mut self) -> Token {
        let mut number = String::new();
        while let Some(c) = self.peek() {
            let fraction = c == '.' && self.peek_second().is_some_and(|n| n.is_ascii_digit());
            if c.is_ascii_digit() || fraction {
                number.push(c);
                self.advance();
            } else {
                break;
            }
        }
        Token::Number(number)
    }

    /// Tokenize all remaining input
    pub fn tokenize_all(&mut self) -> SelectorResult<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            if token == Token::Eof {
                break;
            }
            tokens.push(token);
        }
        Ok(tokens)
    }
}

fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0C')
}

/// Check if character can start an identifier
fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c > '\x7F'
}

/// Check if character can be part of an identifier
fn is_ident_char(c: char) -> bool {
    is_ident_start(c) || c.is_ascii_digit() || c == '-'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(input: &str) -> Vec<Token> {
        Tokenizer::new(input).tokenize_all().unwrap()
    }

    #[test]
    fn test_class_selector() {
        let tokens = tokenize(".container");
        assert!(matches!(tokens[0], Token::Delim('.')));
        assert!(matches!(tokens[1], Token::Ident(ref s) if s == "container"));
    }

    #[test]
    fn test_id_selector() {
        let tokens = tokenize("#main #1a");
        assert!(matches!(tokens[0], Token::Hash(ref s, HashType::Id) if s == "main"));
        assert!(matches!(tokens[2], Token::Hash(ref s, HashType::Unrestricted) if s == "1a"));
    }

    #[test]
    fn test_combinators() {
        let tokens = tokenize("div > p + span ~ a");
        assert!(matches!(tokens[0], Token::Ident(ref s) if s == "div"));
        assert!(matches!(tokens[2], Token::Delim('>')));
        assert!(matches!(tokens[6], Token::Delim('+')));
        assert!(matches!(tokens[10], Token::Delim('~')));
    }

    #[test]
    fn test_attribute_selector() {
        let tokens = tokenize("[data-x=\"text\"]");
        assert!(matches!(tokens[0], Token::LeftBracket));
        assert!(matches!(tokens[1], Token::Ident(ref s) if s == "data-x"));
        assert!(matches!(tokens[2], Token::Delim('=')));
        assert!(matches!(tokens[3], Token::String(ref s) if s == "text"));
        assert!(matches!(tokens[4], Token::RightBracket));
    }

    #[test]
    fn test_pseudo_classes() {
        let tokens = tokenize(":first-child:not(");
        assert!(matches!(tokens[0], Token::Colon));
        assert!(matches!(tokens[1], Token::Ident(ref s) if s == "first-child"));
        assert!(matches!(tokens[3], Token::Function(ref s) if s == "not"));
    }

    #[test]
    fn test_escapes() {
        let tokens = tokenize(r"#a\:b .\31 23 'it\'s'");
        assert!(matches!(tokens[0], Token::Hash(ref s, HashType::Id) if s == "a:b"));
        assert!(matches!(tokens[3], Token::Ident(ref s) if s == "123"));
        assert!(matches!(tokens[5], Token::String(ref s) if s == "it's"));
    }

    #[test]
    fn test_custom_ident_and_number() {
        let tokens = tokenize("--x -y 12.5");
        assert!(matches!(tokens[0], Token::Ident(ref s) if s == "--x"));
        assert!(matches!(tokens[2], Token::Ident(ref s) if s == "-y"));
        assert!(matches!(tokens[4], Token::Number(ref n) if n == "12.5"));
    }

    #[test]
    fn test_comment_skipped() {
        let tokens = tokenize("/* comment */p");
        assert_eq!(tokens, vec![Token::Ident("p".to_string())]);
    }

    #[test]
    fn test_unterminated_string() {
        let err = Tokenizer::new("[a='x").tokenize_all().unwrap_err();
        assert!(matches!(err, SelectorError::UnterminatedString { .. }));
    }

    #[test]
    fn test_raw_argument() {
        let mut tokenizer = Tokenizer::new("nth-child( 2n + 1 ) b");
        assert_eq!(tokenizer.next_token().unwrap(), Token::Function("nth-child".to_string()));
        assert_eq!(tokenizer.consume_raw_argument().unwrap(), "2n + 1");
        assert_eq!(tokenizer.next_token().unwrap(), Token::Whitespace);
    }
}

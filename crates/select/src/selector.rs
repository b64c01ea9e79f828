//! Selector Parser
//!
//! Parses selector lists into compiled selectors: compound selectors of
//! simple selectors joined by combinators.

use crate::error::{SelectorError, SelectorResult, SourceLocation};
use crate::tokenizer::{HashType, Token, Tokenizer};

/// A complex selector (compound selectors joined by combinators)
#[derive(Debug, Clone, PartialEq)]
pub struct Selector {
    /// Compound selectors and the combinators between them, left to right
    pub parts: Vec<SelectorPart>,
}

/// A part of a complex selector
#[derive(Debug, Clone, PartialEq)]
pub enum SelectorPart {
    /// Universal selector (*)
    Universal,
    /// Type selector, lowercased (e.g., div, p, span)
    Type(String),
    /// Class selector (e.g., .container)
    Class(String),
    /// ID selector (e.g., #main)
    Id(String),
    /// Attribute selector (e.g., [type="text"])
    Attribute {
        name: String,
        op: Option<AttributeOp>,
        value: Option<String>,
        case_insensitive: bool,
    },
    /// Pseudo-class (e.g., :first-child, :not(.a))
    PseudoClass(PseudoClass),
    /// Pseudo-element; never matches an element
    PseudoElement(String),
    /// Combinator between compound selectors
    Combinator(Combinator),
}

/// Attribute selector operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeOp {
    /// [attr=value] - exact match
    Equals,
    /// [attr~=value] - contains word
    Includes,
    /// [attr|=value] - starts with value or value-
    DashMatch,
    /// [attr^=value] - starts with
    PrefixMatch,
    /// [attr$=value] - ends with
    SuffixMatch,
    /// [attr*=value] - contains
    SubstringMatch,
}

/// Selector combinators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// Descendant combinator (space)
    Descendant,
    /// Child combinator (>)
    Child,
    /// Next sibling combinator (+)
    NextSibling,
    /// Subsequent sibling combinator (~)
    SubsequentSibling,
}

/// Supported pseudo-classes
#[derive(Debug, Clone, PartialEq)]
pub enum PseudoClass {
    Root,
    Scope,
    Empty,
    FirstChild,
    LastChild,
    OnlyChild,
    FirstOfType,
    LastOfType,
    OnlyOfType,
    /// `:nth-child(an+b)` and friends
    Nth {
        a: i32,
        b: i32,
        of_type: bool,
        from_end: bool,
    },
    Not(Vec<Selector>),
    /// `:is()` and `:where()`
    Is(Vec<Selector>),
    Checked,
    Disabled,
    Enabled,
    Link,
}

impl Selector {
    /// Parse a single complex selector
    pub fn parse(input: &str) -> SelectorResult<Self> {
        let mut parser = SelectorParser::new(input)?;
        parser.skip_whitespace()?;
        let selector = parser.parse_selector()?;
        parser.skip_whitespace()?;
        parser.expect_eof()?;
        Ok(selector)
    }

    /// Parse a comma-separated list of selectors
    pub fn parse_list(input: &str) -> SelectorResult<Vec<Self>> {
        let mut parser = SelectorParser::new(input)?;
        let selectors = parser.parse_selector_list()?;
        parser.expect_eof()?;
        Ok(selectors)
    }

    /// The compound selector at the right end, the one the matched element
    /// itself must satisfy
    pub fn subject(&self) -> &[SelectorPart] {
        let start = self
            .parts
            .iter()
            .rposition(|part| matches!(part, SelectorPart::Combinator(_)))
            .map_or(0, |i| i + 1);
        &self.parts[start..]
    }
}

/// Selector parser
struct SelectorParser<'a> {
    tokenizer: Tokenizer<'a>,
    current: Token,
}

impl<'a> SelectorParser<'a> {
    fn new(input: &'a str) -> SelectorResult<Self> {
        let mut tokenizer = Tokenizer::new(input);
        let current = tokenizer.next_token()?;
        Ok(Self { tokenizer, current })
    }

    fn location(&self) -> SourceLocation {
        self.tokenizer.location()
    }

    fn advance(&mut self) -> SelectorResult<Token> {
        let next = self.tokenizer.next_token()?;
        Ok(std::mem::replace(&mut self.current, next))
    }

    fn peek(&self) -> &Token {
        &self.current
    }

    fn unexpected(&self) -> SelectorError {
        SelectorError::unexpected(self.current.describe(), self.location())
    }

    fn skip_whitespace(&mut self) -> SelectorResult<()> {
        while let Token::Whitespace = self.peek() {
            self.advance()?;
        }
        Ok(())
    }

    fn expect_eof(&self) -> SelectorResult<()> {
        match self.peek() {
            Token::Eof => Ok(()),
            _ => Err(self.unexpected()),
        }
    }

    /// Selectors separated by commas, up to the end of input or a ')'
    fn parse_selector_list(&mut self) -> SelectorResult<Vec<Selector>> {
        let mut selectors = Vec::new();
        loop {
            self.skip_whitespace()?;
            selectors.push(self.parse_selector()?);
            self.skip_whitespace()?;
            match self.peek() {
                Token::Comma => {
                    self.advance()?;
                }
                _ => break,
            }
        }
        Ok(selectors)
    }

    fn parse_selector(&mut self) -> SelectorResult<Selector> {
        let mut parts = Vec::new();

        loop {
            // Track if there's whitespace before the next token
            let had_whitespace = matches!(self.peek(), Token::Whitespace);
            self.skip_whitespace()?;

            if matches!(self.peek(), Token::Eof | Token::Comma | Token::RightParen) {
                break;
            }

            // Check for explicit combinator (>, +, ~)
            if let Some(comb) = self.try_parse_combinator()? {
                if parts.is_empty() {
                    return Err(SelectorError::unexpected(
                        format!("combinator {:?}", comb),
                        self.location(),
                    ));
                }
                parts.push(SelectorPart::Combinator(comb));
                self.skip_whitespace()?;
            } else if had_whitespace && !parts.is_empty() {
                // Whitespace between compound selectors = descendant combinator
                parts.push(SelectorPart::Combinator(Combinator::Descendant));
            }

            // Every combinator is followed by a simple selector, so a
            // dangling one fails here
            match self.try_parse_simple_selector()? {
                Some(part) => parts.push(part),
                None => return Err(self.unexpected()),
            }
        }

        if parts.is_empty() {
            return Err(SelectorError::Empty {
                location: self.location(),
            });
        }

        Ok(Selector { parts })
    }

    fn try_parse_combinator(&mut self) -> SelectorResult<Option<Combinator>> {
        let combinator = match self.peek() {
            Token::Delim('>') => Combinator::Child,
            Token::Delim('+') => Combinator::NextSibling,
            Token::Delim('~') => Combinator::SubsequentSibling,
            _ => return Ok(None),
        };
        self.advance()?;
        Ok(Some(combinator))
    }

    fn try_parse_simple_selector(&mut self) -> SelectorResult<Option<SelectorPart>> {
        match self.peek().clone() {
            Token::Delim('*') => {
                self.advance()?;
                Ok(Some(SelectorPart::Universal))
            }
            Token::Ident(name) => {
                self.advance()?;
                Ok(Some(SelectorPart::Type(name.to_ascii_lowercase())))
            }
            Token::Hash(name, HashType::Id) => {
                self.advance()?;
                Ok(Some(SelectorPart::Id(name)))
            }
            Token::Delim('.') => {
                self.advance()?;
                match self.advance()? {
                    Token::Ident(name) => Ok(Some(SelectorPart::Class(name))),
                    other => Err(SelectorError::unexpected(other.describe(), self.location())),
                }
            }
            Token::LeftBracket => self.parse_attribute_selector().map(Some),
            Token::Colon => self.parse_pseudo_selector().map(Some),
            _ => Ok(None),
        }
    }

    fn parse_attribute_selector(&mut self) -> SelectorResult<SelectorPart> {
        self.advance()?; // consume '['
        self.skip_whitespace()?;

        let name = match self.advance()? {
            Token::Ident(name) => name.to_ascii_lowercase(),
            other => return Err(SelectorError::unexpected(other.describe(), self.location())),
        };
        self.skip_whitespace()?;

        let op = match self.peek() {
            Token::Delim('=') => Some(AttributeOp::Equals),
            Token::Delim('~') => Some(AttributeOp::Includes),
            Token::Delim('|') => Some(AttributeOp::DashMatch),
            Token::Delim('^') => Some(AttributeOp::PrefixMatch),
            Token::Delim('$') => Some(AttributeOp::SuffixMatch),
            Token::Delim('*') => Some(AttributeOp::SubstringMatch),
            _ => None,
        };
        if let Some(op) = op {
            self.advance()?;
            if op != AttributeOp::Equals {
                match self.advance()? {
                    Token::Delim('=') => {}
                    other => return Err(SelectorError::unexpected(other.describe(), self.location())),
                }
            }
        }
        self.skip_whitespace()?;

        let value = if op.is_some() {
            match self.advance()? {
                Token::Ident(v) | Token::String(v) => Some(v),
                other => return Err(SelectorError::unexpected(other.describe(), self.location())),
            }
        } else {
            None
        };
        self.skip_whitespace()?;

        // Case sensitivity flag
        let mut case_insensitive = false;
        if op.is_some() {
            if let Token::Ident(flag) = self.peek() {
                if flag.eq_ignore_ascii_case("i") || flag.eq_ignore_ascii_case("s") {
                    case_insensitive = flag.eq_ignore_ascii_case("i");
                    self.advance()?;
                    self.skip_whitespace()?;
                }
            }
        }

        match self.advance()? {
            Token::RightBracket => {}
            other => return Err(SelectorError::unexpected(other.describe(), self.location())),
        }

        Ok(SelectorPart::Attribute {
            name,
            op,
            value,
            case_insensitive,
        })
    }

    fn parse_pseudo_selector(&mut self) -> SelectorResult<SelectorPart> {
        let location = self.location();
        self.advance()?; // consume first ':'

        if matches!(self.peek(), Token::Colon) {
            self.advance()?;
            return match self.advance()? {
                Token::Ident(name) => Ok(SelectorPart::PseudoElement(name.to_ascii_lowercase())),
                other => Err(SelectorError::unexpected(other.describe(), self.location())),
            };
        }

        match self.peek().clone() {
            Token::Ident(name) => {
                let name = name.to_ascii_lowercase();
                let pseudo = match name.as_str() {
                    "root" => PseudoClass::Root,
                    "scope" => PseudoClass::Scope,
                    "empty" => PseudoClass::Empty,
                    "first-child" => PseudoClass::FirstChild,
                    "last-child" => PseudoClass::LastChild,
                    "only-child" => PseudoClass::OnlyChild,
                    "first-of-type" => PseudoClass::FirstOfType,
                    "last-of-type" => PseudoClass::LastOfType,
                    "only-of-type" => PseudoClass::OnlyOfType,
                    "checked" => PseudoClass::Checked,
                    "disabled" => PseudoClass::Disabled,
                    "enabled" => PseudoClass::Enabled,
                    "link" | "any-link" => PseudoClass::Link,
                    // Legacy pseudo-elements with single colon
                    "before" | "after" | "first-line" | "first-letter" => {
                        self.advance()?;
                        return Ok(SelectorPart::PseudoElement(name));
                    }
                    _ => return Err(SelectorError::UnknownPseudoClass { name, location }),
                };
                self.advance()?;
                Ok(SelectorPart::PseudoClass(pseudo))
            }
            Token::Function(name) => {
                let name = name.to_ascii_lowercase();
                let nth = match name.as_str() {
                    "nth-child" => Some((false, false)),
                    "nth-last-child" => Some((false, true)),
                    "nth-of-type" => Some((true, false)),
                    "nth-last-of-type" => Some((true, true)),
                    _ => None,
                };
                if let Some((of_type, from_end)) = nth {
                    // The function token ends right after '(', so the
                    // argument can be read raw from the tokenizer
                    let expr = self.tokenizer.consume_raw_argument()?;
                    let (a, b) = parse_nth(&expr).ok_or_else(|| SelectorError::InvalidNth {
                        expr: expr.clone(),
                        location,
                    })?;
                    self.current = self.tokenizer.next_token()?;
                    return Ok(SelectorPart::PseudoClass(PseudoClass::Nth {
                        a,
                        b,
                        of_type,
                        from_end,
                    }));
                }

                let pseudo = match name.as_str() {
                    "not" => PseudoClass::Not,
                    "is" | "where" | "matches" | "any" => PseudoClass::Is,
                    _ => return Err(SelectorError::UnknownPseudoClass { name, location }),
                };
                self.advance()?; // consume the function token
                let selectors = self.parse_selector_list()?;
                match self.advance()? {
                    Token::RightParen => {}
                    other => return Err(SelectorError::unexpected(other.describe(), self.location())),
                }
                Ok(SelectorPart::PseudoClass(pseudo(selectors)))
            }
            other => Err(SelectorError::unexpected(other.describe(), self.location())),
        }
    }
}

/// Parse an `an+b` expression (e.g., "2n+1", "odd", "even", "-n+3", "3")
pub fn parse_nth(expr: &str) -> Option<(i32, i32)> {
    let expr: String = expr
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase();

    match expr.as_str() {
        "odd" => return Some((2, 1)),
        "even" => return Some((2, 0)),
        "" => return None,
        _ => {}
    }

    let Some(n_pos) = expr.find('n') else {
        return parse_signed(&expr).map(|b| (0, b));
    };

    let a = match &expr[..n_pos] {
        "" | "+" => 1,
        "-" => -1,
        a_part => parse_signed(a_part)?,
    };
    let b_part = &expr[n_pos + 1..];
    let b = if b_part.is_empty() {
        0
    } else {
        // The sign is required between the n and b terms
        if !b_part.starts_with(['+', '-']) {
            return None;
        }
        parse_signed(b_part)?
    };
    Some((a, b))
}

fn parse_signed(text: &str) -> Option<i32> {
    let digits = text.strip_prefix(['+', '-']).unwrap_or(text);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_selector() {
        let sel = Selector::parse("DIV").unwrap();
        assert_eq!(sel.parts, vec![SelectorPart::Type("div".to_string())]);
    }

    #[test]
    fn test_compound_selector() {
        let sel = Selector::parse("div.container#main").unwrap();
        assert_eq!(
            sel.parts,
            vec![
                SelectorPart::Type("div".to_string()),
                SelectorPart::Class("container".to_string()),
                SelectorPart::Id("main".to_string()),
            ]
        );
    }

    #[test]
    fn test_combinators() {
        let sel = Selector::parse("div  p>span + a~b").unwrap();
        let combinators: Vec<Combinator> = sel
            .parts
            .iter()
            .filter_map(|part| match part {
                SelectorPart::Combinator(c) => Some(*c),
                _ => None,
            })
            .collect();
        assert_eq!(
            combinators,
            vec![
                Combinator::Descendant,
                Combinator::Child,
                Combinator::NextSibling,
                Combinator::SubsequentSibling,
            ]
        );
        assert_eq!(sel.subject(), &[SelectorPart::Type("b".to_string())]);
    }

    #[test]
    fn test_combinator_placement() {
        let sel = Selector::parse("div > p").unwrap();
        assert_eq!(
            sel.parts,
            vec![
                SelectorPart::Type("div".to_string()),
                SelectorPart::Combinator(Combinator::Child),
                SelectorPart::Type("p".to_string()),
            ]
        );
        assert_eq!(Selector::parse("div>p").unwrap(), sel);

        for source in ["div > > p", "div ~", "+ a", ":is(> p)", "a, ~ b"] {
            assert!(Selector::parse_list(source).is_err(), "{:?} should not parse", source);
        }
    }

    #[test]
    fn test_attribute_selectors() {
        let sel = Selector::parse("[disabled]").unwrap();
        assert!(matches!(&sel.parts[0], SelectorPart::Attribute { name, op: None, .. } if name == "disabled"));

        let sel = Selector::parse("[TYPE = \"text\" i]").unwrap();
        assert_eq!(
            sel.parts[0],
            SelectorPart::Attribute {
                name: "type".to_string(),
                op: Some(AttributeOp::Equals),
                value: Some("text".to_string()),
                case_insensitive: true,
            }
        );

        for (source, op) in [
            ("[a~=b]", AttributeOp::Includes),
            ("[a|=b]", AttributeOp::DashMatch),
            ("[a^=b]", AttributeOp::PrefixMatch),
            ("[a$=b]", AttributeOp::SuffixMatch),
            ("[a*=b]", AttributeOp::SubstringMatch),
        ] {
            let sel = Selector::parse(source).unwrap();
            assert!(
                matches!(&sel.parts[0], SelectorPart::Attribute { op: Some(o), .. } if *o == op),
                "{}",
                source
            );
        }
    }

    #[test]
    fn test_pseudo_classes() {
        let sel = Selector::parse("li:first-child:nth-last-of-type(2n+1)").unwrap();
        assert_eq!(sel.parts[1], SelectorPart::PseudoClass(PseudoClass::FirstChild));
        assert_eq!(
            sel.parts[2],
            SelectorPart::PseudoClass(PseudoClass::Nth {
                a: 2,
                b: 1,
                of_type: true,
                from_end: true,
            })
        );
    }

    #[test]
    fn test_not_and_is() {
        let sel = Selector::parse("p:not(.a, #b):is(div > p)").unwrap();
        let SelectorPart::PseudoClass(PseudoClass::Not(inner)) = &sel.parts[1] else {
            panic!("Expected :not");
        };
        assert_eq!(inner.len(), 2);
        let SelectorPart::PseudoClass(PseudoClass::Is(inner)) = &sel.parts[2] else {
            panic!("Expected :is");
        };
        assert_eq!(inner[0].parts.len(), 3);
    }

    #[test]
    fn test_pseudo_elements() {
        let sel = Selector::parse("p::before").unwrap();
        assert_eq!(sel.parts[1], SelectorPart::PseudoElement("before".to_string()));
        let sel = Selector::parse(":after").unwrap();
        assert_eq!(sel.parts[0], SelectorPart::PseudoElement("after".to_string()));
    }

    #[test]
    fn test_selector_list() {
        let selectors = Selector::parse_list(" div , .class,#id ").unwrap();
        assert_eq!(selectors.len(), 3);
        assert_eq!(selectors[1].parts, vec![SelectorPart::Class("class".to_string())]);
    }

    #[test]
    fn test_invalid_selectors() {
        for source in ["", "  ", "div,", ",div", "> p", "p >", "[a", "[a=]", ".", "#1a", "p:hover", ":nth-child(x)", "a)", "p{"] {
            assert!(Selector::parse_list(source).is_err(), "{:?} should not parse", source);
        }
        assert!(matches!(
            Selector::parse_list("p:bogus"),
            Err(SelectorError::UnknownPseudoClass { ref name, .. }) if name == "bogus"
        ));
    }

    #[test]
    fn test_parse_nth() {
        assert_eq!(parse_nth("odd"), Some((2, 1)));
        assert_eq!(parse_nth("EVEN"), Some((2, 0)));
        assert_eq!(parse_nth("3"), Some((0, 3)));
        assert_eq!(parse_nth("-n + 3"), Some((-1, 3)));
        assert_eq!(parse_nth("+n"), Some((1, 0)));
        assert_eq!(parse_nth("2n-1"), Some((2, -1)));
        assert_eq!(parse_nth("2n1"), None);
        assert_eq!(parse_nth("n+"), None);
        assert_eq!(parse_nth(""), None);
    }
}

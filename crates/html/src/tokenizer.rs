//! HTML5 Tokenizer
//!
//! Converts HTML text into a stream of tokens.

use smallvec::SmallVec;
use std::collections::VecDeque;

use crate::entities::{decode_named, decode_numeric};

/// An HTML token
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// DOCTYPE declaration
    Doctype {
        name: String,
        public_id: Option<String>,
        system_id: Option<String>,
        force_quirks: bool,
    },
    /// Start tag
    StartTag {
        name: String,
        attributes: SmallVec<[(String, String); 4]>,
        self_closing: bool,
    },
    /// End tag
    EndTag {
        name: String,
    },
    /// Character data
    Character(char),
    /// Comment
    Comment(String),
    /// End of file
    Eof,
}

/// How the content of an element is tokenized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextMode {
    /// Markup is recognized
    Data,
    /// Text up to the matching end tag, character references decoded
    /// (`title`, `textarea`)
    RcData,
    /// Text up to the matching end tag, taken literally (`script`, `style`, ...)
    RawText,
    /// Everything to the end of input is text
    Plaintext,
}

impl TextMode {
    /// The mode the content of an element named `name` is read in
    pub fn for_element(name: &str) -> Self {
        match name {
            "title" | "textarea" => TextMode::RcData,
            "script" | "style" | "xmp" | "iframe" | "noembed" | "noframes" => TextMode::RawText,
            "plaintext" => TextMode::Plaintext,
            _ => TextMode::Data,
        }
    }
}

/// Tokenizer state machine states
#[derive(Debug, Clone, Copy, PartialEq)]
enum State {
    Data,
    RcData,
    RawText,
    Plaintext,
    TagOpen,
    EndTagOpen,
    TagName,
    BeforeAttributeName,
    AttributeName,
    AfterAttributeName,
    BeforeAttributeValue,
    AttributeValueDoubleQuoted,
    AttributeValueSingleQuoted,
    AttributeValueUnquoted,
    AfterAttributeValueQuoted,
    SelfClosingStartTag,
    BogusComment,
    MarkupDeclarationOpen,
    CommentStart,
    CommentStartDash,
    Comment,
    CommentEndDash,
    CommentEnd,
    Doctype,
    BeforeDoctypeName,
    DoctypeName,
    AfterDoctypeName,
    TextLessThan,
    TextEndTagOpen,
    TextEndTagName,
}

/// HTML5 tokenizer
pub struct Tokenizer {
    input: Vec<char>,
    pos: usize,
    state: State,
    /// Text state that `</` sequences fall back to
    return_state: State,
    tokens: VecDeque<Token>,
    finished: bool,

    // Current token being built
    current_tag_name: String,
    current_tag_is_end: bool,
    current_tag_self_closing: bool,
    current_attributes: SmallVec<[(String, String); 4]>,
    current_attr_name: String,
    current_attr_value: String,
    current_comment: String,
    current_doctype_name: String,
    current_doctype_public: Option<String>,
    current_doctype_system: Option<String>,
    current_doctype_force_quirks: bool,

    // For raw text and RCDATA end tag matching
    last_start_tag: String,
    temp_buffer: String,
}

impl Tokenizer {
    /// Create a new tokenizer for the given input
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            pos: 0,
            state: State::Data,
            return_state: State::Data,
            tokens: VecDeque::new(),
            finished: false,

            current_tag_name: String::new(),
            current_tag_is_end: false,
            current_tag_self_closing: false,
            current_attributes: SmallVec::new(),
            current_attr_name: String::new(),
            current_attr_value: String::new(),
            current_comment: String::new(),
            current_doctype_name: String::new(),
            current_doctype_public: None,
            current_doctype_system: None,
            current_doctype_force_quirks: false,

            last_start_tag: String::new(),
            temp_buffer: String::new(),
        }
    }

    /// Tokenizer for markup that is the content of a `context` element,
    /// starting in the text mode of that element
    pub fn for_fragment(input: &str, context: &str) -> Self {
        let mut tokenizer = Self::new(input);
        tokenizer.last_start_tag = context.to_string();
        tokenizer.enter_text_mode(TextMode::for_element(context));
        tokenizer
    }

    /// Get the next token; [`Token::Eof`] once the input is exhausted
    pub fn next_token(&mut self) -> Token {
        while self.tokens.is_empty() {
            if self.finished {
                return Token::Eof;
            }
            self.step();
        }
        self.tokens.pop_front().unwrap_or(Token::Eof)
    }

    fn enter_text_mode(&mut self, mode: TextMode) {
        self.state = match mode {
            TextMode::Data => State::Data,
            TextMode::RcData => State::RcData,
            TextMode::RawText => State::RawText,
            TextMode::Plaintext => State::Plaintext,
        };
        self.return_state = self.state;
    }

    /// Peek at the current character without consuming
    fn current_char(&self) -> Option<char> {
        self.input.get(self.pos).copied()
    }

    /// Consume and return the current character
    fn consume(&mut self) -> Option<char> {
        let c = self.current_char()?;
        self.pos += 1;
        Some(c)
    }

    /// Check if we're at a specific string (case-insensitive)
    fn at_str_ci(&self, s: &str) -> bool {
        let mut rest = self.input[self.pos..].iter();
        s.chars()
            .all(|expected| rest.next().is_some_and(|c| c.eq_ignore_ascii_case(&expected)))
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.current_char(), Some('\t' | '\n' | '\x0C' | ' ')) {
            self.pos += 1;
        }
    }

    /// Emit a token
    fn emit(&mut self, token: Token) {
        if let Token::StartTag { ref name, .. } = token {
            self.last_start_tag = name.clone();
        }
        self.tokens.push_back(token);
    }

    fn emit_str(&mut self, s: &str) {
        for c in s.chars() {
            self.emit(Token::Character(c));
        }
    }

    fn emit_eof(&mut self) {
        self.finished = true;
        self.emit(Token::Eof);
    }

    /// Emit the current tag and switch to the state its content is read in
    fn finish_tag(&mut self) {
        let is_start = !self.current_tag_is_end;
        let mode = TextMode::for_element(&self.current_tag_name);
        if self.current_tag_is_end {
            self.emit(Token::EndTag {
                name: self.current_tag_name.clone(),
            });
        } else {
            self.emit(Token::StartTag {
                name: self.current_tag_name.clone(),
                attributes: self.current_attributes.clone(),
                self_closing: self.current_tag_self_closing,
            });
        }
        self.reset_tag();
        self.enter_text_mode(if is_start { mode } else { TextMode::Data });
    }

    /// Reset tag state
    fn reset_tag(&mut self) {
        self.current_tag_name.clear();
        self.current_tag_is_end = false;
        self.current_tag_self_closing = false;
        self.current_attributes.clear();
        self.current_attr_name.clear();
        self.current_attr_value.clear();
    }

    /// Push current attribute; a repeated name keeps its first value
    fn push_attribute(&mut self) {
        if !self.current_attr_name.is_empty() {
            let name = self.current_attr_name.to_ascii_lowercase();
            if self.current_attributes.iter().any(|(existing, _)| *existing == name) {
                log::warn!("duplicate attribute '{}' dropped", name);
            } else {
                self.current_attributes
                    .push((name, self.current_attr_value.clone()));
            }
        }
        self.current_attr_name.clear();
        self.current_attr_value.clear();
    }

    fn emit_comment(&mut self) {
        let comment = std::mem::take(&mut self.current_comment);
        self.emit(Token::Comment(comment));
    }

    fn emit_doctype(&mut self) {
        let doctype = Token::Doctype {
            name: std::mem::take(&mut self.current_doctype_name),
            public_id: self.current_doctype_public.take(),
            system_id: self.current_doctype_system.take(),
            force_quirks: self.current_doctype_force_quirks,
        };
        self.emit(doctype);
        self.current_doctype_force_quirks = false;
    }

    /// Execute one step of the state machine
    fn step(&mut self) {
        match self.state {
            State::Data => self.data_state(),
            State::RcData => self.rcdata_state(),
            State::RawText => self.raw_text_state(),
            State::Plaintext => self.plaintext_state(),
            State::TagOpen => self.tag_open_state(),
            State::EndTagOpen => self.end_tag_open_state(),
            State::TagName => self.tag_name_state(),
            State::BeforeAttributeName => self.before_attribute_name_state(),
            State::AttributeName => self.attribute_name_state(),
            State::AfterAttributeName => self.after_attribute_name_state(),
            State::BeforeAttributeValue => self.before_attribute_value_state(),
            State::AttributeValueDoubleQuoted => self.attribute_value_quoted_state('"'),
            State::AttributeValueSingleQuoted => self.attribute_value_quoted_state('\''),
            State::AttributeValueUnquoted => self.attribute_value_unquoted_state(),
            State::AfterAttributeValueQuoted => self.after_attribute_value_quoted_state(),
            State::SelfClosingStartTag => self.self_closing_start_tag_state(),
            State::BogusComment => self.bogus_comment_state(),
            State::MarkupDeclarationOpen => self.markup_declaration_open_state(),
            State::CommentStart => self.comment_start_state(),
            State::CommentStartDash => self.comment_start_dash_state(),
            State::Comment => self.comment_state(),
            State::CommentEndDash => self.comment_end_dash_state(),
            State::CommentEnd => self.comment_end_state(),
            State::Doctype => self.doctype_state(),
            State::BeforeDoctypeName => self.before_doctype_name_state(),
            State::DoctypeName => self.doctype_name_state(),
            State::AfterDoctypeName => self.after_doctype_name_state(),
            State::TextLessThan => self.text_less_than_state(),
            State::TextEndTagOpen => self.text_end_tag_open_state(),
            State::TextEndTagName => self.text_end_tag_name_state(),
        }
    }

    // State implementations

    fn data_state(&mut self) {
        match self.consume() {
            Some('<') => self.state = State::TagOpen,
            Some('&') => self.emit_reference(),
            Some(c) => self.emit(Token::Character(c)),
            None => self.emit_eof(),
        }
    }

    fn rcdata_state(&mut self) {
        match self.consume() {
            Some('<') => self.state = State::TextLessThan,
            Some('&') => self.emit_reference(),
            Some(c) => self.emit(Token::Character(c)),
            None => self.emit_eof(),
        }
    }

    fn raw_text_state(&mut self) {
        match self.consume() {
            Some('<') => self.state = State::TextLessThan,
            Some(c) => self.emit(Token::Character(c)),
            None => self.emit_eof(),
        }
    }

    fn plaintext_state(&mut self) {
        match self.consume() {
            Some(c) => self.emit(Token::Character(c)),
            None => self.emit_eof(),
        }
    }

    fn emit_reference(&mut self) {
        match self.consume_reference(false) {
            Some(decoded) => self.emit(Token::Character(decoded)),
            None => self.emit(Token::Character('&')),
        }
    }

    fn tag_open_state(&mut self) {
        match self.current_char() {
            Some('!') => {
                self.consume();
                self.state = State::MarkupDeclarationOpen;
            }
            Some('/') => {
                self.consume();
                self.state = State::EndTagOpen;
            }
            Some(c) if c.is_ascii_alphabetic() => {
                self.reset_tag();
                self.state = State::TagName;
            }
            Some('?') => {
                self.current_comment.clear();
                self.state = State::BogusComment;
            }
            _ => {
                self.emit(Token::Character('<'));
                self.state = State::Data;
            }
        }
    }

    fn end_tag_open_state(&mut self) {
        match self.current_char() {
            Some(c) if c.is_ascii_alphabetic() => {
                self.reset_tag();
                self.current_tag_is_end = true;
                self.state = State::TagName;
            }
            Some('>') => {
                self.consume();
                self.state = State::Data;
            }
            None => {
                self.emit_str("</");
                self.emit_eof();
            }
            _ => {
                self.current_comment.clear();
                self.state = State::BogusComment;
            }
        }
    }

    fn tag_name_state(&mut self) {
        match self.consume() {
            Some('\t' | '\n' | '\x0C' | ' ') => self.state = State::BeforeAttributeName,
            Some('/') => self.state = State::SelfClosingStartTag,
            Some('>') => self.finish_tag(),
            Some(c) => self.current_tag_name.push(c.to_ascii_lowercase()),
            None => {
                log::warn!("end of input inside a tag");
                self.emit_eof();
            }
        }
    }

    fn before_attribute_name_state(&mut self) {
        match self.current_char() {
            Some('\t' | '\n' | '\x0C' | ' ') => {
                self.consume();
            }
            Some('/' | '>') | None => self.state = State::AfterAttributeName,
            Some('=') => {
                self.consume();
                self.current_attr_name.clear();
                self.current_attr_value.clear();
                self.current_attr_name.push('=');
                self.state = State::AttributeName;
            }
            _ => {
                self.current_attr_name.clear();
                self.current_attr_value.clear();
                self.state = State::AttributeName;
            }
        }
    }

    fn attribute_name_state(&mut self) {
        match self.current_char() {
            Some('\t' | '\n' | '\x0C' | ' ' | '/' | '>') | None => {
                self.state = State::AfterAttributeName;
            }
            Some('=') => {
                self.consume();
                self.state = State::BeforeAttributeValue;
            }
            Some(c) => {
                self.consume();
                self.current_attr_name.push(c.to_ascii_lowercase());
            }
        }
    }

    fn after_attribute_name_state(&mut self) {
        match self.current_char() {
            Some('\t' | '\n' | '\x0C' | ' ') => {
                self.consume();
            }
            Some('/') => {
                self.consume();
                self.push_attribute();
                self.state = State::SelfClosingStartTag;
            }
            Some('=') => {
                self.consume();
                self.state = State::BeforeAttributeValue;
            }
            Some('>') => {
                self.consume();
                self.push_attribute();
                self.finish_tag();
            }
            None => {
                log::warn!("end of input inside a tag");
                self.emit_eof();
            }
            _ => {
                self.push_attribute();
                self.state = State::AttributeName;
            }
        }
    }

    fn before_attribute_value_state(&mut self) {
        match self.current_char() {
            Some('\t' | '\n' | '\x0C' | ' ') => {
                self.consume();
            }
            Some('"') => {
                self.consume();
                self.state = State::AttributeValueDoubleQuoted;
            }
            Some('\'') => {
                self.consume();
                self.state = State::AttributeValueSingleQuoted;
            }
            Some('>') => {
                self.consume();
                self.push_attribute();
                self.finish_tag();
            }
            _ => self.state = State::AttributeValueUnquoted,
        }
    }

    fn attribute_value_quoted_state(&mut self, quote: char) {
        match self.consume() {
            Some(c) if c == quote => {
                self.push_attribute();
                self.state = State::AfterAttributeValueQuoted;
            }
            Some('&') => self.push_attribute_reference(),
            Some(c) => self.current_attr_value.push(c),
            None => {
                log::warn!("end of input inside an attribute value");
                self.emit_eof();
            }
        }
    }

    fn attribute_value_unquoted_state(&mut self) {
        match self.consume() {
            Some('\t' | '\n' | '\x0C' | ' ') => {
                self.push_attribute();
                self.state = State::BeforeAttributeName;
            }
            Some('&') => self.push_attribute_reference(),
            Some('>') => {
                self.push_attribute();
                self.finish_tag();
            }
            Some(c) => self.current_attr_value.push(c),
            None => {
                log::warn!("end of input inside an attribute value");
                self.emit_eof();
            }
        }
    }

    fn push_attribute_reference(&mut self) {
        match self.consume_reference(true) {
            Some(decoded) => self.current_attr_value.push(decoded),
            None => self.current_attr_value.push('&'),
        }
    }

    fn after_attribute_value_quoted_state(&mut self) {
        match self.current_char() {
            Some('\t' | '\n' | '\x0C' | ' ') => {
                self.consume();
                self.state = State::BeforeAttributeName;
            }
            Some('/') => {
                self.consume();
                self.state = State::SelfClosingStartTag;
            }
            Some('>') => {
                self.consume();
                self.finish_tag();
            }
            None => self.emit_eof(),
            _ => self.state = State::BeforeAttributeName,
        }
    }

    fn self_closing_start_tag_state(&mut self) {
        match self.current_char() {
            Some('>') => {
                self.consume();
                self.current_tag_self_closing = true;
                self.finish_tag();
            }
            None => self.emit_eof(),
            _ => self.state = State::BeforeAttributeName,
        }
    }

    fn bogus_comment_state(&mut self) {
        match self.consume() {
            Some('>') => {
                self.emit_comment();
                self.state = State::Data;
            }
            Some(c) => self.current_comment.push(c),
            None => {
                self.emit_comment();
                self.emit_eof();
            }
        }
    }

    fn markup_declaration_open_state(&mut self) {
        self.current_comment.clear();
        if self.at_str_ci("--") {
            self.pos += 2;
            self.state = State::CommentStart;
        } else if self.at_str_ci("DOCTYPE") {
            self.pos += 7;
            self.state = State::Doctype;
        } else if self.at_str_ci("[CDATA[") {
            // CDATA only exists in foreign content, which is not supported
            self.pos += 7;
            self.current_comment.push_str("[CDATA[");
            self.state = State::BogusComment;
        } else {
            self.state = State::BogusComment;
        }
    }

    fn comment_start_state(&mut self) {
        match self.current_char() {
            Some('-') => {
                self.consume();
                self.state = State::CommentStartDash;
            }
            Some('>') => {
                self.consume();
                self.emit_comment();
                self.state = State::Data;
            }
            _ => self.state = State::Comment,
        }
    }

    fn comment_start_dash_state(&mut self) {
        match self.current_char() {
            Some('-') => {
                self.consume();
                self.state = State::CommentEnd;
            }
            Some('>') => {
                self.consume();
                self.emit_comment();
                self.state = State::Data;
            }
            None => {
                self.emit_comment();
                self.emit_eof();
            }
            _ => {
                self.current_comment.push('-');
                self.state = State::Comment;
            }
        }
    }

    fn comment_state(&mut self) {
        match self.consume() {
            Some('-') => self.state = State::CommentEndDash,
            Some(c) => self.current_comment.push(c),
            None => {
                log::warn!("unterminated comment");
                self.emit_comment();
                self.emit_eof();
            }
        }
    }

    fn comment_end_dash_state(&mut self) {
        match self.current_char() {
            Some('-') => {
                self.consume();
                self.state = State::CommentEnd;
            }
            None => {
                self.emit_comment();
                self.emit_eof();
            }
            _ => {
                self.current_comment.push('-');
                self.state = State::Comment;
            }
        }
    }

    fn comment_end_state(&mut self) {
        match self.current_char() {
            Some('>') => {
                self.consume();
                self.emit_comment();
                self.state = State::Data;
            }
            Some('-') => {
                self.consume();
                self.current_comment.push('-');
            }
            None => {
                self.emit_comment();
                self.emit_eof();
            }
            _ => {
                self.current_comment.push_str("--");
                self.state = State::Comment;
            }
        }
    }

    fn doctype_state(&mut self) {
        self.current_doctype_name.clear();
        self.current_doctype_public = None;
        self.current_doctype_system = None;
        self.current_doctype_force_quirks = false;
        match self.current_char() {
            Some('\t' | '\n' | '\x0C' | ' ') => {
                self.consume();
                self.state = State::BeforeDoctypeName;
            }
            None => {
                self.current_doctype_force_quirks = true;
                self.emit_doctype();
                self.emit_eof();
            }
            _ => self.state = State::BeforeDoctypeName,
        }
    }

    fn before_doctype_name_state(&mut self) {
        match self.current_char() {
            Some('\t' | '\n' | '\x0C' | ' ') => {
                self.consume();
            }
            Some('>') => {
                self.consume();
                self.current_doctype_force_quirks = true;
                self.emit_doctype();
                self.state = State::Data;
            }
            None => {
                self.current_doctype_force_quirks = true;
                self.emit_doctype();
                self.emit_eof();
            }
            _ => self.state = State::DoctypeName,
        }
    }

    fn doctype_name_state(&mut self) {
        match self.consume() {
            Some('\t' | '\n' | '\x0C' | ' ') => self.state = State::AfterDoctypeName,
            Some('>') => {
                self.emit_doctype();
                self.state = State::Data;
            }
            Some(c) => self.current_doctype_name.push(c.to_ascii_lowercase()),
            None => {
                self.current_doctype_force_quirks = true;
                self.emit_doctype();
                self.emit_eof();
            }
        }
    }

    /// After the name: optional `PUBLIC "id" "id"` or `SYSTEM "id"`, then
    /// anything up to `>` is skipped
    fn after_doctype_name_state(&mut self) {
        self.skip_whitespace();
        if self.at_str_ci("PUBLIC") {
            self.pos += 6;
            self.current_doctype_public = self.consume_quoted_identifier();
            if self.current_doctype_public.is_some() {
                self.current_doctype_system = self.consume_quoted_identifier();
            } else {
                self.current_doctype_force_quirks = true;
            }
        } else if self.at_str_ci("SYSTEM") {
            self.pos += 6;
            self.current_doctype_system = self.consume_quoted_identifier();
            if self.current_doctype_system.is_none() {
                self.current_doctype_force_quirks = true;
            }
        } else if !matches!(self.current_char(), Some('>') | None) {
            self.current_doctype_force_quirks = true;
        }

        loop {
            match self.consume() {
                Some('>') => {
                    self.emit_doctype();
                    self.state = State::Data;
                    return;
                }
                Some(_) => {}
                None => {
                    self.current_doctype_force_quirks = true;
                    self.emit_doctype();
                    self.emit_eof();
                    return;
                }
            }
        }
    }

    /// A quoted doctype identifier; an unterminated one ends before `>`
    fn consume_quoted_identifier(&mut self) -> Option<String> {
        self.skip_whitespace();
        let quote = match self.current_char() {
            Some(q @ ('"' | '\'')) => q,
            _ => return None,
        };
        self.consume();
        let mut value = String::new();
        while let Some(c) = self.current_char() {
            if c == '>' {
                break;
            }
            self.consume();
            if c == quote {
                break;
            }
            value.push(c);
        }
        Some(value)
    }

    fn text_less_than_state(&mut self) {
        match self.current_char() {
            Some('/') => {
                self.consume();
                self.temp_buffer.clear();
                self.state = State::TextEndTagOpen;
            }
            _ => {
                self.emit(Token::Character('<'));
                self.state = self.return_state;
            }
        }
    }

    fn text_end_tag_open_state(&mut self) {
        match self.current_char() {
            Some(c) if c.is_ascii_alphabetic() => {
                self.reset_tag();
                self.current_tag_is_end = true;
                self.state = State::TextEndTagName;
            }
            _ => {
                self.emit_str("</");
                self.state = self.return_state;
            }
        }
    }

    /// Only the end tag of the element that opened the text closes it
    fn text_end_tag_name_state(&mut self) {
        let appropriate = self.current_tag_name == self.last_start_tag;
        match self.current_char() {
            Some('\t' | '\n' | '\x0C' | ' ') if appropriate => {
                self.consume();
                self.state = State::BeforeAttributeName;
            }
            Some('/') if appropriate => {
                self.consume();
                self.state = State::SelfClosingStartTag;
            }
            Some('>') if appropriate => {
                self.consume();
                self.finish_tag();
            }
            Some(c) if c.is_ascii_alphabetic() => {
                self.consume();
                self.current_tag_name.push(c.to_ascii_lowercase());
                self.temp_buffer.push(c);
            }
            _ => self.emit_text_end_tag_chars(),
        }
    }

    fn emit_text_end_tag_chars(&mut self) {
        self.emit_str("</");
        let buffered = std::mem::take(&mut self.temp_buffer);
        self.emit_str(&buffered);
        self.current_tag_name.clear();
        self.current_tag_is_end = false;
        self.state = self.return_state;
    }

    /// Consume a character reference after `&`
    ///
    /// Named references need their `;` inside attribute values, so query
    /// strings like `?a=1&copy=2` stay intact. Nothing is consumed when no
    /// reference matches.
    fn consume_reference(&mut self, in_attribute: bool) -> Option<char> {
        let start = self.pos;
        match self.current_char() {
            Some('#') => {
                self.consume();
                let hex = matches!(self.current_char(), Some('x' | 'X'));
                if hex {
                    self.consume();
                }
                let mut digits = String::new();
                while let Some(c) = self.current_char() {
                    let is_digit = if hex { c.is_ascii_hexdigit() } else { c.is_ascii_digit() };
                    if !is_digit {
                        break;
                    }
                    digits.push(c);
                    self.consume();
                }
                if self.current_char() == Some(';') {
                    self.consume();
                }
                let decoded = decode_numeric(&digits, hex);
                if decoded.is_none() {
                    self.pos = start;
                }
                decoded
            }
            Some(c) if c.is_ascii_alphanumeric() => {
                let mut name = String::new();
                while let Some(c) = self.current_char() {
                    if !c.is_ascii_alphanumeric() {
                        break;
                    }
                    name.push(c);
                    self.consume();
                }
                let terminated = self.current_char() == Some(';');
                match decode_named(&name) {
                    Some(decoded) if terminated || !in_attribute => {
                        if terminated {
                            self.consume();
                        }
                        Some(decoded)
                    }
                    _ => {
                        self.pos = start;
                        None
                    }
                }
            }
            _ => None,
        }
    }
}

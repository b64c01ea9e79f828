//! HTML Tree Builder
//!
//! Constructs parsed node trees from HTML tokens. Elements are assembled
//! bottom-up on the stack of open elements and handed to the DOM as
//! [`ParsedNode`] values once closed.

use sapling_dom::{MarkupParser, ParsedNode};

use crate::error::{HtmlError, HtmlResult};
use crate::tokenizer::{Token, Tokenizer};

type Attributes = Vec<(String, String)>;

/// Parser options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserConfig {
    /// Drop text nodes that hold only whitespace
    pub drop_whitespace_text: bool,
    /// Deepest nesting of open elements; deeper elements are added as
    /// siblings of the innermost open element instead
    pub max_depth: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            drop_whitespace_text: false,
            max_depth: 512,
        }
    }
}

/// HTML parser producing parsed node trees
#[derive(Debug, Clone, Default)]
pub struct HtmlParser {
    config: ParserConfig,
}

impl HtmlParser {
    /// Create a new HTML parser
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parse a whole document. The result always has `html`, `head` and
    /// `body` elements.
    pub fn parse_document(&self, html: &str) -> ParsedNode {
        let builder = TreeBuilder::for_document(&self.config);
        builder.run(Tokenizer::new(html))
    }

    /// Parse `html` as the content of a `context` element
    pub fn parse_fragment_in(&self, html: &str, context: &str) -> HtmlResult<ParsedNode> {
        let valid = context
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-');
        if context.is_empty() || !valid {
            return Err(HtmlError::InvalidContext(context.to_string()));
        }
        let context = context.to_ascii_lowercase();
        let builder = TreeBuilder::for_fragment(&self.config, &context);
        Ok(builder.run(Tokenizer::for_fragment(html, &context)))
    }
}

impl MarkupParser for HtmlParser {
    fn parse(&self, html: &str) -> ParsedNode {
        self.parse_document(html)
    }

    fn parse_fragment(&self, html: &str, context: &str) -> ParsedNode {
        match self.parse_fragment_in(html, context) {
            Ok(parsed) => parsed,
            Err(err) => {
                log::warn!("{}; parsing in body context", err);
                let builder = TreeBuilder::for_fragment(&self.config, "body");
                builder.run(Tokenizer::new(html))
            }
        }
    }
}

/// Insertion modes of the tree builder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InsertionMode {
    BeforeHtml,
    BeforeHead,
    InHead,
    AfterHead,
    InBody,
    AfterBody,
    AfterAfterBody,
}

/// An element whose end has not been seen yet
#[derive(Debug)]
struct OpenElement {
    name: String,
    attributes: Attributes,
    children: Vec<ParsedNode>,
}

impl OpenElement {
    fn new(name: &str, attributes: Attributes) -> Self {
        Self {
            name: name.to_string(),
            attributes,
            children: Vec::new(),
        }
    }

    fn into_node(self) -> ParsedNode {
        ParsedNode::Element {
            name: self.name,
            attributes: self.attributes,
            children: self.children,
        }
    }
}

struct TreeBuilder<'a> {
    config: &'a ParserConfig,
    mode: InsertionMode,
    /// Fragment parses keep their context element at the bottom of the stack
    fragment: bool,
    document: Vec<ParsedNode>,
    open_elements: Vec<OpenElement>,
    /// Comments seen after `</body>`, kept for the end of `html`
    after_body: Vec<ParsedNode>,
    /// Comments seen after `</html>`
    after_html: Vec<ParsedNode>,
    /// A newline right after `<pre>`, `<listing>` or `<textarea>` is dropped
    skip_newline: bool,
    depth_warned: bool,
}

impl<'a> TreeBuilder<'a> {
    fn for_document(config: &'a ParserConfig) -> Self {
        Self {
            config,
            mode: InsertionMode::BeforeHtml,
            fragment: false,
            document: Vec::new(),
            open_elements: Vec::new(),
            after_body: Vec::new(),
            after_html: Vec::new(),
            skip_newline: false,
            depth_warned: false,
        }
    }

    fn for_fragment(config: &'a ParserConfig, context: &str) -> Self {
        let mut builder = Self::for_document(config);
        builder.fragment = true;
        builder.mode = InsertionMode::InBody;
        builder.open_elements.push(OpenElement::new(context, Vec::new()));
        builder
    }

    fn run(mut self, mut tokenizer: Tokenizer) -> ParsedNode {
        let mut text = String::new();
        loop {
            let token = tokenizer.next_token();
            if let Token::Character(c) = token {
                text.push(c);
                continue;
            }
            if !text.is_empty() {
                self.process_text(std::mem::take(&mut text));
            }
            if token == Token::Eof {
                break;
            }
            self.skip_newline = false;
            self.process_token(token);
        }
        self.finish()
    }

    fn finish(mut self) -> ParsedNode {
        if self.fragment {
            while self.open_elements.len() > 1 {
                self.pop_element();
            }
            let children = self
                .open_elements
                .pop()
                .map(|root| root.children)
                .unwrap_or_default();
            return ParsedNode::Document(children);
        }

        loop {
            match self.mode {
                InsertionMode::BeforeHtml => self.open_html(Vec::new()),
                InsertionMode::BeforeHead => self.open_head(Vec::new()),
                InsertionMode::InHead => self.close_head(),
                InsertionMode::AfterHead => self.open_body(Vec::new()),
                _ => break,
            }
        }
        while self.open_elements.len() > 1 {
            self.pop_element();
        }
        match self.open_elements.last_mut() {
            Some(html) => html.children.append(&mut self.after_body),
            None => self.document.append(&mut self.after_body),
        }
        self.pop_element();
        self.document.append(&mut self.after_html);
        ParsedNode::Document(self.document)
    }

    /// Process a single token
    fn process_token(&mut self, token: Token) {
        match token {
            Token::Doctype {
                name,
                public_id,
                system_id,
                ..
            } => {
                if self.mode == InsertionMode::BeforeHtml && !self.fragment {
                    self.document.push(ParsedNode::Doctype {
                        name,
                        public_id: public_id.unwrap_or_default(),
                        system_id: system_id.unwrap_or_default(),
                    });
                } else {
                    log::warn!("misplaced doctype '{}' ignored", name);
                }
            }
            Token::Comment(text) => self.insert_comment(text),
            Token::StartTag {
                name,
                attributes,
                self_closing,
            } => self.handle_start_tag(&name, attributes.into_vec(), self_closing),
            Token::EndTag { name } => self.handle_end_tag(&name),
            Token::Character(c) => self.process_text(c.to_string()),
            Token::Eof => {}
        }
    }

    fn process_text(&mut self, mut text: String) {
        if std::mem::take(&mut self.skip_newline) && text.starts_with('\n') {
            text.remove(0);
        }
        loop {
            let split = text.len() - text.trim_start_matches(is_html_whitespace).len();
            match self.mode {
                InsertionMode::BeforeHtml | InsertionMode::BeforeHead => {
                    if split == text.len() {
                        return;
                    }
                    text.drain(..split);
                    if self.mode == InsertionMode::BeforeHtml {
                        self.open_html(Vec::new());
                    } else {
                        self.open_head(Vec::new());
                    }
                }
                InsertionMode::InHead if !self.current_is("head") => {
                    self.insert_text(text);
                    return;
                }
                InsertionMode::InHead | InsertionMode::AfterHead => {
                    let rest = text.split_off(split);
                    self.insert_text(text);
                    if rest.is_empty() {
                        return;
                    }
                    text = rest;
                    if self.mode == InsertionMode::InHead {
                        self.close_head();
                    } else {
                        self.open_body(Vec::new());
                    }
                }
                InsertionMode::InBody => {
                    self.insert_text(text);
                    return;
                }
                InsertionMode::AfterBody | InsertionMode::AfterAfterBody => {
                    if split < text.len() {
                        log::warn!("text after the end of body");
                        self.mode = InsertionMode::InBody;
                    }
                    self.insert_text(text);
                    return;
                }
            }
        }
    }

    /// Handle a start tag
    fn handle_start_tag(&mut self, name: &str, attributes: Attributes, self_closing: bool) {
        loop {
            match self.mode {
                InsertionMode::BeforeHtml => {
                    if name == "html" {
                        self.open_html(attributes);
                        return;
                    }
                    self.open_html(Vec::new());
                }
                InsertionMode::BeforeHead => match name {
                    "html" => return self.merge_attributes(0, attributes),
                    "head" => return self.open_head(attributes),
                    _ => self.open_head(Vec::new()),
                },
                InsertionMode::InHead if !self.current_is("head") => {
                    return self.insert_start_tag(name, attributes, self_closing);
                }
                InsertionMode::InHead => match name {
                    "html" => return self.merge_attributes(0, attributes),
                    "head" => {
                        log::warn!("nested <head> ignored");
                        return;
                    }
                    "base" | "basefont" | "bgsound" | "link" | "meta" => {
                        return self.insert_element(name, attributes, false);
                    }
                    "title" | "style" | "script" | "noscript" | "noframes" | "template" => {
                        return self.insert_element(name, attributes, !self_closing);
                    }
                    _ => self.close_head(),
                },
                InsertionMode::AfterHead => match name {
                    "html" => return self.merge_attributes(0, attributes),
                    "body" => return self.open_body(attributes),
                    "head" => {
                        log::warn!("<head> after head ignored");
                        return;
                    }
                    _ => self.open_body(Vec::new()),
                },
                InsertionMode::InBody => return self.in_body_start_tag(name, attributes, self_closing),
                InsertionMode::AfterBody | InsertionMode::AfterAfterBody => {
                    log::warn!("<{}> after the end of body", name);
                    self.mode = InsertionMode::InBody;
                }
            }
        }
    }

    fn in_body_start_tag(&mut self, name: &str, attributes: Attributes, self_closing: bool) {
        match name {
            "html" | "body" | "head" if self.fragment => {
                log::warn!("<{}> ignored inside a fragment", name);
            }
            "html" => self.merge_attributes(0, attributes),
            "body" => {
                if self.open_elements.get(1).is_some_and(|e| e.name == "body") {
                    self.merge_attributes(1, attributes);
                }
            }
            "head" => log::warn!("<head> inside body ignored"),
            _ => self.insert_start_tag(name, attributes, self_closing),
        }
    }

    /// Insert a start tag, closing the elements it implicitly ends
    fn insert_start_tag(&mut self, name: &str, attributes: Attributes, self_closing: bool) {
        if name == "form" && self.has_in_scope("form", DEFAULT_SCOPE) {
            log::warn!("nested <form> ignored");
            return;
        }
        if closes_paragraph(name) && self.has_in_scope("p", BUTTON_SCOPE) {
            self.pop_until("p");
        }
        match name {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                if self.current_name().is_some_and(is_heading) {
                    self.pop_element();
                }
            }
            "li" => self.close_list_item(&["li"]),
            "dd" | "dt" => self.close_list_item(&["dd", "dt"]),
            "option" => {
                if self.current_is("option") {
                    self.pop_element();
                }
            }
            "optgroup" => {
                if self.current_is("option") {
                    self.pop_element();
                }
                if self.current_is("optgroup") {
                    self.pop_element();
                }
            }
            "a" | "button" | "nobr" => {
                if self.has_in_scope(name, DEFAULT_SCOPE) {
                    log::warn!("nested <{}>; closing the outer one", name);
                    self.pop_until(name);
                }
            }
            "td" | "th" => self.close_in_table_scope(&["td", "th"], &["tr"]),
            "tr" => self.close_in_table_scope(&["tr"], &["thead", "tbody", "tfoot"]),
            "thead" | "tbody" | "tfoot" => self.close_in_table_scope(&["thead", "tbody", "tfoot"], &[]),
            _ => {}
        }

        let push = !self_closing && !is_void_element(name);
        self.insert_element(name, attributes, push);
        if push && matches!(name, "pre" | "listing" | "textarea") {
            self.skip_newline = true;
        }
    }

    /// Handle an end tag
    fn handle_end_tag(&mut self, name: &str) {
        loop {
            match self.mode {
                InsertionMode::BeforeHtml => match name {
                    "head" | "body" | "html" | "br" => self.open_html(Vec::new()),
                    _ => {
                        log::debug!("stray </{}> ignored", name);
                        return;
                    }
                },
                InsertionMode::BeforeHead => match name {
                    "head" | "body" | "html" | "br" => self.open_head(Vec::new()),
                    _ => {
                        log::debug!("stray </{}> ignored", name);
                        return;
                    }
                },
                InsertionMode::InHead if !self.current_is("head") => {
                    if matches!(name, "head" | "body" | "html" | "br") {
                        log::debug!("</{}> ignored inside head content", name);
                        return;
                    }
                    return self.close_element(name);
                }
                InsertionMode::InHead => match name {
                    "head" => return self.close_head(),
                    "body" | "html" | "br" => self.close_head(),
                    _ => {
                        log::debug!("stray </{}> ignored", name);
                        return;
                    }
                },
                InsertionMode::AfterHead => match name {
                    "body" | "html" | "br" => self.open_body(Vec::new()),
                    _ => {
                        log::debug!("stray </{}> ignored", name);
                        return;
                    }
                },
                InsertionMode::InBody => return self.in_body_end_tag(name),
                InsertionMode::AfterBody => {
                    if name == "html" {
                        self.mode = InsertionMode::AfterAfterBody;
                        return;
                    }
                    log::warn!("</{}> after the end of body", name);
                    self.mode = InsertionMode::InBody;
                }
                InsertionMode::AfterAfterBody => {
                    log::warn!("</{}> after the end of html", name);
                    self.mode = InsertionMode::InBody;
                }
            }
        }
    }

    fn in_body_end_tag(&mut self, name: &str) {
        match name {
            "body" | "html" if self.fragment => {
                log::debug!("</{}> ignored inside a fragment", name);
            }
            "body" | "html" => {
                if self.open_elements.get(1).is_some_and(|e| e.name == "body") {
                    self.mode = if name == "body" {
                        InsertionMode::AfterBody
                    } else {
                        InsertionMode::AfterAfterBody
                    };
                }
            }
            "br" => {
                log::warn!("</br> treated as <br>");
                self.insert_start_tag("br", Vec::new(), true);
            }
            "p" if !self.has_in_scope("p", BUTTON_SCOPE) => {
                log::warn!("</p> without an open paragraph");
                self.insert_element("p", Vec::new(), false);
            }
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let open = (1..self.open_elements.len())
                    .rev()
                    .map(|i| self.open_elements[i].name.as_str())
                    .take_while(|n| !DEFAULT_SCOPE.contains(n))
                    .find(|n| is_heading(n))
                    .map(str::to_string);
                match open {
                    Some(heading) => self.pop_until(&heading),
                    None => log::debug!("stray </{}> ignored", name),
                }
            }
            _ => self.close_element(name),
        }
    }

    /// Close the nearest open element named `name`
    ///
    /// Special elements close only when in scope; other elements close
    /// unless a special element stands between them and the current node.
    fn close_element(&mut self, name: &str) {
        if is_special(name) {
            let scope = match name {
                "table" | "caption" | "thead" | "tbody" | "tfoot" | "tr" | "td" | "th" => TABLE_SCOPE,
                _ => DEFAULT_SCOPE,
            };
            if self.has_in_scope(name, scope) {
                self.pop_until(name);
            } else {
                log::debug!("stray </{}> ignored", name);
            }
            return;
        }
        for i in (1..self.open_elements.len()).rev() {
            let open = self.open_elements[i].name.as_str();
            if open == name {
                self.pop_until(name);
                return;
            }
            if is_special(open) {
                break;
            }
        }
        log::debug!("stray </{}> ignored", name);
    }

    fn close_list_item(&mut self, names: &[&str]) {
        for i in (1..self.open_elements.len()).rev() {
            let open = self.open_elements[i].name.clone();
            if names.contains(&open.as_str()) {
                self.pop_until(&open);
                return;
            }
            if is_special(&open) && !matches!(open.as_str(), "address" | "div" | "p") {
                return;
            }
        }
    }

    /// Close the nearest of `names` together with everything opened inside
    /// it, unless `table`, `template` or one of `boundaries` is closer
    fn close_in_table_scope(&mut self, names: &[&str], boundaries: &[&str]) {
        for i in (1..self.open_elements.len()).rev() {
            let open = self.open_elements[i].name.clone();
            if names.contains(&open.as_str()) {
                self.pop_until(&open);
                return;
            }
            if boundaries.contains(&open.as_str()) || TABLE_SCOPE.contains(&open.as_str()) {
                return;
            }
        }
    }

    fn has_in_scope(&self, name: &str, scope: &[&str]) -> bool {
        for open in self.open_elements.iter().skip(1).rev() {
            if open.name == name {
                return true;
            }
            if scope.contains(&open.name.as_str()) {
                return false;
            }
        }
        false
    }

    // Tree construction

    fn current_name(&self) -> Option<&str> {
        self.open_elements.last().map(|e| e.name.as_str())
    }

    fn current_is(&self, name: &str) -> bool {
        self.current_name() == Some(name)
    }

    fn current_children(&mut self) -> &mut Vec<ParsedNode> {
        match self.open_elements.last_mut() {
            Some(open) => &mut open.children,
            None => &mut self.document,
        }
    }

    fn insert_text(&mut self, text: String) {
        if text.is_empty() {
            return;
        }
        if self.config.drop_whitespace_text && text.chars().all(is_html_whitespace) {
            return;
        }
        let children = self.current_children();
        if let Some(ParsedNode::Text(last)) = children.last_mut() {
            last.push_str(&text);
        } else {
            children.push(ParsedNode::Text(text));
        }
    }

    fn insert_comment(&mut self, text: String) {
        let comment = ParsedNode::Comment(text);
        match self.mode {
            _ if self.fragment => self.current_children().push(comment),
            InsertionMode::BeforeHtml => self.document.push(comment),
            InsertionMode::AfterBody => self.after_body.push(comment),
            InsertionMode::AfterAfterBody => self.after_html.push(comment),
            _ => self.current_children().push(comment),
        }
    }

    /// Append an element to the current node, opening it when `push` is set
    fn insert_element(&mut self, name: &str, attributes: Attributes, push: bool) {
        let open = OpenElement::new(name, attributes);
        if !push {
            self.current_children().push(open.into_node());
            return;
        }
        if self.open_elements.len() >= self.config.max_depth {
            if !self.depth_warned {
                log::warn!(
                    "nesting deeper than {} elements; flattening <{}> and deeper content",
                    self.config.max_depth,
                    name
                );
                self.depth_warned = true;
            }
            self.current_children().push(open.into_node());
            return;
        }
        self.open_elements.push(open);
    }

    /// Pop the current node into its parent
    fn pop_element(&mut self) {
        if let Some(open) = self.open_elements.pop() {
            let node = open.into_node();
            self.current_children().push(node);
        }
    }

    /// Pop elements up to and including the nearest one named `name`
    fn pop_until(&mut self, name: &str) {
        while self.open_elements.len() > 1 {
            let done = self.current_is(name);
            self.pop_element();
            if done {
                break;
            }
        }
    }

    fn merge_attributes(&mut self, index: usize, attributes: Attributes) {
        if self.fragment {
            return;
        }
        if let Some(open) = self.open_elements.get_mut(index) {
            for (name, value) in attributes {
                if !open.attributes.iter().any(|(existing, _)| *existing == name) {
                    open.attributes.push((name, value));
                }
            }
        }
    }

    fn open_html(&mut self, attributes: Attributes) {
        self.open_elements.push(OpenElement::new("html", attributes));
        self.mode = InsertionMode::BeforeHead;
    }

    fn open_head(&mut self, attributes: Attributes) {
        self.open_elements.push(OpenElement::new("head", attributes));
        self.mode = InsertionMode::InHead;
    }

    fn close_head(&mut self) {
        if self.open_elements.iter().any(|e| e.name == "head") {
            self.pop_until("head");
        }
        self.mode = InsertionMode::AfterHead;
    }

    fn open_body(&mut self, attributes: Attributes) {
        self.open_elements.push(OpenElement::new("body", attributes));
        self.mode = InsertionMode::InBody;
    }
}

/// Stops for "in scope" checks
const DEFAULT_SCOPE: &[&str] = &[
    "applet", "caption", "html", "table", "td", "th", "marquee", "object", "template",
];

const BUTTON_SCOPE: &[&str] = &[
    "applet", "caption", "html", "table", "td", "th", "marquee", "object", "template", "button",
];

const TABLE_SCOPE: &[&str] = &["html", "table", "template"];

/// Check if an element is a void element (self-closing)
fn is_void_element(name: &str) -> bool {
    matches!(
        name,
        "area" | "base" | "br" | "col" | "embed" | "hr" | "img" | "input"
        | "link" | "meta" | "param" | "source" | "track" | "wbr"
    )
}

fn is_heading(name: &str) -> bool {
    matches!(name, "h1" | "h2" | "h3" | "h4" | "h5" | "h6")
}

/// Block-level start tags that end an open paragraph
fn closes_paragraph(name: &str) -> bool {
    is_heading(name)
        || matches!(
            name,
            "address" | "article" | "aside" | "blockquote" | "center" | "dd" | "details"
            | "dialog" | "dir" | "div" | "dl" | "dt" | "fieldset" | "figcaption" | "figure"
            | "footer" | "form" | "header" | "hgroup" | "hr" | "li" | "listing" | "main"
            | "menu" | "nav" | "ol" | "p" | "plaintext" | "pre" | "section" | "summary"
            | "table" | "ul" | "xmp"
        )
}

/// Elements with their own end-tag handling
fn is_special(name: &str) -> bool {
    is_heading(name)
        || matches!(
            name,
            "address" | "applet" | "area" | "article" | "aside" | "base" | "blockquote"
            | "body" | "br" | "button" | "caption" | "center" | "col" | "dd" | "details"
            | "dir" | "div" | "dl" | "dt" | "embed" | "fieldset" | "figcaption" | "figure"
            | "footer" | "form" | "head" | "header" | "hgroup" | "hr" | "html" | "iframe"
            | "img" | "input" | "li" | "link" | "listing" | "main" | "marquee" | "menu"
            | "meta" | "nav" | "noembed" | "noframes" | "noscript" | "object" | "ol" | "p"
            | "plaintext" | "pre" | "script" | "section" | "select" | "style" | "summary"
            | "table" | "tbody" | "td" | "template" | "textarea" | "tfoot" | "th" | "thead"
            | "title" | "tr" | "ul" | "wbr" | "xmp"
        )
}

fn is_html_whitespace(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\x0C' | '\r' | ' ')
}

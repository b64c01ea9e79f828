//! Sapling HTML Parser
//!
//! HTML5 tokenizer and tree construction. [`HtmlParser`] is the markup
//! parser behind `innerHTML`, `outerHTML` and `DOMParser` in `sapling-dom`.

mod entities;
mod error;
mod tokenizer;
mod tree_builder;

pub use error::{HtmlError, HtmlResult};
pub use tokenizer::{TextMode, Token, Tokenizer};
pub use tree_builder::{HtmlParser, ParserConfig};

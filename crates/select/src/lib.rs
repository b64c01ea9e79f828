//! Sapling Select - CSS selector engine
//!
//! Parses selector lists and matches them against a [`sapling_dom::DomTree`].
//! Install [`selector_engine_factory`] on a tree to serve `querySelector`,
//! `querySelectorAll`, `matches` and `closest`.

mod engine;
mod error;
mod matching;
mod selector;
mod tokenizer;

pub use engine::{selector_engine_factory, Selectors};
pub use error::{SelectorError, SelectorResult, SourceLocation};
pub use matching::{matches_any, matches_selector, MatchingContext};
pub use selector::{parse_nth, AttributeOp, Combinator, PseudoClass, Selector, SelectorPart};
pub use tokenizer::{HashType, Token, Tokenizer};

//! Lexical analysis
//!
//! Tokens with source positions, a lossless tokenizer, and the
//! insertion-aware [`TokenBuffer`] the rewrite passes work on.

pub mod buffer;
pub mod tokenizer;
pub mod tokens;

pub use buffer::{InsertError, TokenBuffer, TokenDraft};
pub use tokenizer::{tokenize, untokenize};
pub use tokens::{is_keyword, Token, TokenKind};

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn atom_strategy() -> impl Strategy<Value = String> {
        prop_oneof![
            "[a-z][a-z0-9_]{0,6}",
            "[0-9]{1,6}",
            "[0-9]{1,3}\\.[0-9]{1,3}",
        ]
    }

    fn line_strategy() -> impl Strategy<Value = String> {
        (
            prop::collection::vec((atom_strategy(), "[ ]{0,3}"), 0..8),
            prop_oneof![Just(""), Just("+"), Just("*"), Just("("), Just(")")],
        )
            .prop_map(|(parts, tail)| {
                let mut line = String::new();
                for (atom, gap) in parts {
                    line.push_str(&atom);
                    line.push_str(&gap);
                }
                line.push_str(tail);
                // trailing blanks are not covered by any token
                line.trim_end().to_string()
            })
    }

    proptest! {
        #[test]
        fn roundtrip_is_lossless(lines in prop::collection::vec(line_strategy(), 1..4)) {
            let input = lines.join("\n");
            let tokens = tokenize(&input);
            prop_assert_eq!(untokenize(&tokens), input);
        }
    }
}

// ABOUTME: Whitespace cleaning for case data trees.
// ABOUTME: Collapses whitespace runs in keys and strings, and drops entries whose key cleans to empty.

use crate::tree::{insert_entry, Scalar, Tree};

/// Collapses every run of whitespace (line breaks included) into a single space and trims the ends.
pub fn clean_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut last_was_space = false;

    for c in s.chars() {
        if c.is_whitespace() {
            if !last_was_space {
                result.push(' ');
                last_was_space = true;
            }
        } else {
            result.push(c);
            last_was_space = false;
        }
    }

    result.trim().to_string()
}

/// Returns a cleaned copy of `tree`.
///
/// - String scalars are passed through [`clean_string`]; other scalars are unchanged.
/// - Object keys are cleaned the same way. An entry whose key becomes empty is dropped
///   together with its value. When two keys clean to the same string, the later value
///   wins and stays at the position of the first.
/// - Arrays keep their order and length.
pub fn clean(tree: &Tree) -> Tree {
    match tree {
        Tree::Object(entries) => {
            let mut cleaned = Vec::with_capacity(entries.len());
            for (key, value) in entries {
                let key = clean_string(key);
                if key.is_empty() {
                    continue;
                }
                insert_entry(&mut cleaned, key, clean(value));
            }
            Tree::Object(cleaned)
        }
        Tree::Array(items) => Tree::Array(items.iter().map(clean).collect()),
        Tree::Scalar(Scalar::String(s)) => Tree::string(clean_string(s)),
        Tree::Scalar(other) => Tree::Scalar(other.clone()),
    }
}

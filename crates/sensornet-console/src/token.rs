//! Tokenizer for console input lines.
//!
//! A line splits on whitespace outside double quotes; a quote toggles
//! quoting and is itself dropped from the token. The first token is the
//! verb (matched case-insensitively). Of the rest, a token containing `=`
//! past its first character is a key/value pair (keys case-insensitive,
//! values trimmed); everything else is positional, numbered from zero.

use std::collections::HashMap;

/// A tokenized input line: verb plus parsed arguments.
#[derive(Debug, Clone, Default)]
pub struct Tokens {
    verb: String,
    named: HashMap<String, String>,
    positional: Vec<String>,
}

impl Tokens {
    /// Tokenize a line. Returns `None` if it holds no tokens at all.
    pub fn parse(line: &str) -> Option<Self> {
        let mut raw = split_quoted(line).into_iter();
        let verb = raw.next()?;

        let mut named = HashMap::new();
        let mut positional = Vec::new();
        for token in raw {
            match token.find('=') {
                Some(eq) if eq > 0 => {
                    let key = token[..eq].trim().to_lowercase();
                    let value = token[eq + 1..].trim().to_string();
                    named.insert(key, value);
                }
                _ => positional.push(token.trim().to_string()),
            }
        }

        Some(Self {
            verb,
            named,
            positional,
        })
    }

    /// The verb, lowercased.
    pub fn verb(&self) -> String {
        self.verb.to_lowercase()
    }

    /// A named argument's value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.named.get(key).map(String::as_str)
    }

    /// A named argument parsed as an unsigned integer. `None` covers both a
    /// missing key and a value that does not parse.
    pub fn get_u32(&self, key: &str) -> Option<u32> {
        self.get(key)?.parse().ok()
    }

    /// A positional argument by index.
    pub fn positional(&self, index: usize) -> Option<&str> {
        self.positional.get(index).map(String::as_str)
    }
}

/// Split on whitespace outside double quotes, dropping the quotes.
fn split_quoted(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in line.chars() {
        if ch == '"' {
            in_quotes = !in_quotes;
            continue;
        }
        if ch.is_whitespace() && !in_quotes {
            if !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
        } else {
            current.push(ch);
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

// ===========================================================================
// Tests
// ===========================================================================

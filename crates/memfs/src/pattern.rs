//! Key scan patterns.
//!
//! Store scans select keys with glob patterns: `*` matches any run of
//! characters, `?` matches exactly one, and `\` makes the following character
//! literal. Everything else, including `[` and `]`, is matched literally.

/// Characters that must be escaped to be matched literally
const SPECIAL: [char; 5] = ['*', '?', '[', ']', '\\'];

/// Escape literal key text for use inside a pattern
pub fn escape(literal: &str) -> String {
    let mut out = String::with_capacity(literal.len());
    for ch in literal.chars() {
        if SPECIAL.contains(&ch) {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// One element of a parsed pattern
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum PatternToken {
    /// A run of characters that must match exactly
    Literal(String),
    /// `?`
    AnyChar,
    /// `*`
    AnyRun,
}

/// A parsed glob pattern
#[derive(Debug, Clone, PartialEq)]
pub struct KeyPattern {
    tokens: Vec<PatternToken>,
}

impl KeyPattern {
    pub fn parse(pattern: &str) -> Self {
        let mut tokens = Vec::new();
        let mut literal = String::new();
        let mut chars = pattern.chars();

        while let Some(ch) = chars.next() {
            let token = match ch {
                '\\' => {
                    // A trailing backslash stands for itself
                    literal.push(chars.next().unwrap_or('\\'));
                    continue;
                }
                '*' => PatternToken::AnyRun,
                '?' => PatternToken::AnyChar,
                _ => {
                    literal.push(ch);
                    continue;
                }
            };
            if !literal.is_empty() {
                tokens.push(PatternToken::Literal(std::mem::take(&mut literal)));
            }
            // Adjacent stars are equivalent to one
            if token == PatternToken::AnyRun && tokens.last() == Some(&PatternToken::AnyRun) {
                continue;
            }
            tokens.push(token);
        }
        if !literal.is_empty() {
            tokens.push(PatternToken::Literal(literal));
        }

        Self { tokens }
    }

    /// Literal text every matching key starts with
    pub fn literal_prefix(&self) -> &str {
        match self.tokens.first() {
            Some(PatternToken::Literal(text)) => text,
            _ => "",
        }
    }

    pub fn matches(&self, key: &str) -> bool {
        match_tokens(&self.tokens, key)
    }
}

fn match_tokens(tokens: &[PatternToken], key: &str) -> bool {
    let Some((first, rest)) = tokens.split_first() else {
        return key.is_empty();
    };
    match first {
        PatternToken::Literal(text) => key
            .strip_prefix(text.as_str())
            .is_some_and(|remaining| match_tokens(rest, remaining)),
        PatternToken::AnyChar => {
            let mut chars = key.chars();
            chars.next().is_some() && match_tokens(rest, chars.as_str())
        }
        PatternToken::AnyRun => {
            if rest.is_empty() {
                return true;
            }
            key.char_indices()
                .map(|(idx, _)| idx)
                .chain(std::iter::once(key.len()))
                .any(|idx| match_tokens(rest, &key[idx..]))
        }
    }
}

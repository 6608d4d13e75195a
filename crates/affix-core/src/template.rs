//! Path templates
//!
//! A template such as `/:name/:style/:id:extension` is parsed once into
//! literal and token segments. A token is a `:` followed by the longest run of
//! ASCII letters, so `:id_:name` holds two tokens; a `:` followed by anything
//! else is literal.
//! Rendering substitutes every occurrence of every token.

use std::fmt;

use crate::error::ConfigurationError;

/// Default template used when options do not override `path`.
pub const DEFAULT_PATH_TEMPLATE: &str = "/:name/:style/:id:extension";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Id,
    Name,
    Style,
    Extension,
}

impl Token {
    fn parse(word: &str) -> Option<Self> {
        match word {
            "id" => Some(Token::Id),
            "name" => Some(Token::Name),
            "style" => Some(Token::Style),
            "extension" => Some(Token::Extension),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Token(Token),
}

/// Values substituted into a template for one style.
#[derive(Debug, Clone, Copy)]
pub struct PathVariables<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub style: &'a str,
    /// Extension with its leading dot, or empty
    pub extension: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl PathTemplate {
    /// Parse a template, rejecting unknown tokens and templates that cannot
    /// distinguish records, styles or formats.
    pub fn parse(template: &str) -> Result<Self, ConfigurationError> {
        let malformed = |reason: String| ConfigurationError::MalformedTemplate {
            template: template.to_string(),
            reason,
        };

        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut rest = template;

        while let Some(colon) = rest.find(':') {
            literal.push_str(&rest[..colon]);
            let after = &rest[colon + 1..];
            let word_len = after
                .find(|c: char| !c.is_ascii_alphabetic())
                .unwrap_or(after.len());

            if word_len == 0 {
                literal.push(':');
                rest = after;
                continue;
            }

            let word = &after[..word_len];
            let token = Token::parse(word).ok_or_else(|| malformed(format!("unknown token :{}", word)))?;
            if !literal.is_empty() {
                segments.push(Segment::Literal(std::mem::take(&mut literal)));
            }
            segments.push(Segment::Token(token));
            rest = &after[word_len..];
        }
        literal.push_str(rest);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        for (required, label) in [
            (Token::Id, ":id"),
            (Token::Style, ":style"),
            (Token::Extension, ":extension"),
        ] {
            if !segments.contains(&Segment::Token(required)) {
                return Err(malformed(format!("missing {} placeholder", label)));
            }
        }

        Ok(Self {
            source: template.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn render(&self, vars: &PathVariables<'_>) -> String {
        let mut out = String::with_capacity(self.source.len() + 32);
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Token(Token::Id) => out.push_str(vars.id),
                Segment::Token(Token::Name) => out.push_str(vars.name),
                Segment::Token(Token::Style) => out.push_str(vars.style),
                Segment::Token(Token::Extension) => out.push_str(vars.extension),
            }
        }
        out
    }
}

impl Default for PathTemplate {
    fn default() -> Self {
        // The default template is known to be well formed.
        Self {
            source: DEFAULT_PATH_TEMPLATE.to_string(),
            segments: vec![
                Segment::Literal("/".to_string()),
                Segment::Token(Token::Name),
                Segment::Literal("/".to_string()),
                Segment::Token(Token::Style),
                Segment::Literal("/".to_string()),
                Segment::Token(Token::Id),
                Segment::Token(Token::Extension),
            ],
        }
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

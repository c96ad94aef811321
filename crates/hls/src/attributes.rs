//! Attribute-list scanner.
//!
//! Scans what follows `NAME:` on a tag line. Two grammars exist: the list
//! grammar used by every tag (`KEY=VALUE,KEY="quoted value"` or one single
//! value) and the EXTINF grammar (`<duration>,[<title>]`).
//!
//! The scan is a single forward pass over the input driven by two small state
//! variables, see [`scan`].

use std::fmt;

use serde::Serialize;
use serde::ser::SerializeMap;
use tracing::trace;

use crate::error::TokenizerError;

/// Which attribute-list grammar to scan with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grammar {
    /// `KEY=VALUE` pairs, or a single bare value.
    List,
    /// `<duration>,[<title>]`. Everything after the first comma is the title,
    /// taken verbatim.
    ExtInf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trace {
    Generic,
    QuotedString,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Value,
    List,
    ExtInf,
}

/// A value as it appears in the scanned input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawValue<'a> {
    /// The value text, without surrounding quotes.
    pub text: &'a str,
    /// Whether the value was written as a quoted string.
    pub quoted: bool,
}

impl<'a> RawValue<'a> {
    fn bare(text: &'a str) -> Self {
        Self {
            text,
            quoted: false,
        }
    }

    fn quoted(text: &'a str) -> Self {
        Self { text, quoted: true }
    }
}

/// Keys and values found by [`scan_collect`], in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scanned<'a> {
    pub keys: Vec<&'a str>,
    pub values: Vec<RawValue<'a>>,
}

fn unexpected(character: char, index: usize, token: &str) -> TokenizerError {
    TokenizerError::UnexpectedCharacter {
        character,
        index,
        token: token.to_string(),
    }
}

/// Scans `input` and reports every key and every value in order.
///
/// `token` is the whole source line and is only used to build errors. Error
/// indices are byte offsets into `input`.
///
/// Keys and values are reported through separate callbacks; callers pair them
/// up positionally.
pub fn scan<'a>(
    input: &'a str,
    token: &str,
    grammar: Grammar,
    mut on_key: impl FnMut(&'a str),
    mut on_value: impl FnMut(RawValue<'a>),
) -> Result<(), TokenizerError> {
    let mut trace = Trace::Generic;
    let mut mode = Mode::Value;
    // Start of the key or value currently being accumulated.
    let mut field_start = 0;
    let mut previous: Option<char> = None;
    // Set right after a quoted string closed; only `,` may follow.
    let mut after_quote = false;

    for (index, character) in input.char_indices() {
        if trace == Trace::QuotedString {
            if character == '"' {
                trace = Trace::Generic;
                after_quote = true;
                let value = &input[field_start + 1..index];
                trace!(value, ?mode, "quoted string");
                on_value(RawValue::quoted(value));
            }
            previous = Some(character);
            continue;
        }

        if after_quote && character != ',' {
            return Err(unexpected(character, index, token));
        }

        match character {
            '=' => {
                if grammar == Grammar::ExtInf || index == field_start {
                    return Err(unexpected('=', index, token));
                }
                mode = Mode::List;
                let key = &input[field_start..index];
                trace!(key, "associator");
                on_key(key);
                field_start = index + 1;
            }
            ',' => {
                match mode {
                    Mode::Value | Mode::ExtInf => {
                        if grammar != Grammar::ExtInf {
                            return Err(TokenizerError::InvalidPatternInNonExtinf {
                                token: token.to_string(),
                            });
                        }
                        mode = Mode::ExtInf;
                    }
                    Mode::List => {}
                }

                if index == field_start && !after_quote {
                    return Err(unexpected(',', index, token));
                }

                if mode == Mode::ExtInf {
                    let value = &input[field_start..index];
                    trace!(value, "separator");
                    on_value(RawValue::bare(value));

                    let description = &input[index + 1..];
                    if !description.is_empty() {
                        trace!(description, "extinf description");
                        on_value(RawValue::bare(description));
                    }
                    return Ok(());
                }

                if !after_quote {
                    let value = &input[field_start..index];
                    trace!(value, "separator");
                    on_value(RawValue::bare(value));
                }
                after_quote = false;
                field_start = index + 1;
            }
            '"' => {
                if previous != Some('=') || index != field_start {
                    return Err(unexpected('"', index, token));
                }
                trace = Trace::QuotedString;
                field_start = index;
            }
            _ => {}
        }

        previous = Some(character);
    }

    if trace == Trace::QuotedString {
        // The opening quote never closed.
        return Err(unexpected('"', field_start, token));
    }

    let Some(last) = previous else {
        return Ok(());
    };
    let last_index = input.len() - last.len_utf8();

    match last {
        '=' => Err(unexpected('=', last_index, token)),
        ',' if mode != Mode::ExtInf => Err(unexpected(',', last_index, token)),
        // Already emitted when the quoted string closed.
        '"' if after_quote => Ok(()),
        _ => {
            let value = &input[field_start..];
            trace!(value, ?mode, "end of list");
            on_value(RawValue::bare(value));
            Ok(())
        }
    }
}

/// Runs [`scan`] and collects the keys and values.
pub fn scan_collect<'a>(
    input: &'a str,
    token: &str,
    grammar: Grammar,
) -> Result<Scanned<'a>, TokenizerError> {
    let mut keys = Vec::new();
    let mut values = Vec::new();
    scan(
        input,
        token,
        grammar,
        |key| keys.push(key),
        |value| values.push(value),
    )?;
    Ok(Scanned { keys, values })
}

/// Value of a single attribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// Written between double quotes; the quotes are not part of the text.
    Quoted(String),
    /// A bare token: integer, float, hex sequence, enumerated string or
    /// resolution.
    Enumerated(String),
}

impl AttributeValue {
    /// The value text without quotes.
    pub fn as_str(&self) -> &str {
        match self {
            AttributeValue::Quoted(value) | AttributeValue::Enumerated(value) => value,
        }
    }

    pub fn is_quoted(&self) -> bool {
        matches!(self, AttributeValue::Quoted(_))
    }
}

impl From<RawValue<'_>> for AttributeValue {
    fn from(raw: RawValue<'_>) -> Self {
        if raw.quoted {
            AttributeValue::Quoted(raw.text.to_string())
        } else {
            AttributeValue::Enumerated(raw.text.to_string())
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Quoted(value) => write!(f, "\"{value}\""),
            AttributeValue::Enumerated(value) => f.write_str(value),
        }
    }
}

impl PartialEq<str> for AttributeValue {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for AttributeValue {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

/// A named attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: AttributeValue,
}

/// Attributes of a tag in source order. Names are unique.
///
/// Names are stored exactly as written: they are not checked against the
/// `[A-Z0-9-]` attribute-name alphabet and surrounding whitespace is kept, so
/// `a b=1` yields an attribute named `a b`. The tag name before `:` is kept
/// verbatim too (`#EXTINF :1` is named `EXTINF `).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeList {
    attributes: Vec<Attribute>,
}

impl AttributeList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an attribute. Returns the attribute back if the name is
    /// already taken.
    pub fn insert(&mut self, name: String, value: AttributeValue) -> Result<(), Attribute> {
        if self.contains(&name) {
            return Err(Attribute { name, value });
        }
        self.attributes.push(Attribute { name, value });
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes
            .iter()
            .find(|attribute| attribute.name == name)
            .map(|attribute| &attribute.value)
    }

    /// Unquoted text of the attribute, if present.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).map(AttributeValue::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Attribute> {
        self.attributes.iter()
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

impl<'a> IntoIterator for &'a AttributeList {
    type Item = &'a Attribute;
    type IntoIter = std::slice::Iter<'a, Attribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Display for AttributeList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, attribute) in self.attributes.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}={}", attribute.name, attribute.value)?;
        }
        Ok(())
    }
}

impl Serialize for AttributeList {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.attributes.len()))?;
        for attribute in &self.attributes {
            map.serialize_entry(&attribute.name, &attribute.value)?;
        }
        map.end()
    }
}

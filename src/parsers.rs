//! Parsers for the KeyValues text format (`.vdf`, `.acf`) used by Steam.
//!
//! The format is a tree of `"key" "value"` pairs and `"key" { ... }` blocks. Keys and values
//! are normally double quoted, may contain backslash escapes, and are separated by arbitrary
//! whitespace. Line comments (`//`) and platform conditionals (`[$WIN32]`) are skipped.
use std::str::FromStr;

use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{is_not, tag, take_while1},
    character::complete::{char, digit1, multispace1, not_line_ending},
    combinator::{all_consuming, map, opt, recognize, value},
    error::{Error, ErrorKind},
    multi::many0,
    sequence::{delimited, pair, preceded, terminated},
};

use crate::error::{FieldError, ManifestParseError};

/// Value associated with a key in a KeyValues document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyValue {
    Str(String),
    Block(KeyValues),
}

/// An ordered list of key/value pairs. Duplicate keys are kept, lookups return the first match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyValues {
    entries: Vec<(String, KeyValue)>,
}

impl KeyValues {
    pub fn entries(&self) -> impl Iterator<Item = (&str, &KeyValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Keys are matched case-insensitively, as Steam itself does
    pub fn get(&self, key: &str) -> Option<&KeyValue> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v)
    }

    /// `Ok(None)` if the key is absent, an error if it holds a block instead of a string
    pub fn get_str(&self, key: &str) -> Result<Option<&str>, FieldError> {
        match self.get(key) {
            None => Ok(None),
            Some(KeyValue::Str(s)) => Ok(Some(s.as_str())),
            Some(KeyValue::Block(_)) => Err(FieldError::WrongShape(key.to_owned())),
        }
    }

    /// `Ok(None)` if the key is absent, an error if it holds a string instead of a block
    pub fn get_block(&self, key: &str) -> Result<Option<&KeyValues>, FieldError> {
        match self.get(key) {
            None => Ok(None),
            Some(KeyValue::Block(b)) => Ok(Some(b)),
            Some(KeyValue::Str(_)) => Err(FieldError::WrongShape(key.to_owned())),
        }
    }

    /// Like [`KeyValues::get_str`], additionally parsing the value
    pub fn get_parsed<T: FromStr>(&self, key: &str) -> Result<Option<T>, FieldError> {
        self.get_str(key)?
            .map(|s| {
                s.trim().parse().map_err(|_| FieldError::Invalid {
                    key: key.to_owned(),
                    value: s.to_owned(),
                })
            })
            .transpose()
    }

    /// Returns the top-level block with the given name, falling back to the first top-level
    /// block for files where the root key differs from what is expected
    pub fn root(&self, name: &str) -> Option<&KeyValues> {
        self.get_block(name).ok().flatten().or_else(|| {
            self.entries.iter().find_map(|(_, v)| match v {
                KeyValue::Block(b) => Some(b),
                KeyValue::Str(_) => None,
            })
        })
    }
}

// TOKENS -------------------------------------------------------------------------------
fn parse_comment(input: &str) -> IResult<&str, &str> {
    recognize(pair(tag("//"), not_line_ending)).parse(input)
}

/// Skips any amount of whitespace and line comments
fn parse_whitespace(input: &str) -> IResult<&str, ()> {
    value((), many0(alt((multispace1, parse_comment)))).parse(input)
}

/// Parses a double quoted string, resolving backslash escapes
pub fn parse_quoted_string(input: &str) -> IResult<&str, String> {
    let (mut rest, _) = char('"').parse(input)?;
    let mut out = String::new();

    loop {
        let mut chars = rest.chars();
        match chars.next() {
            Some('"') => return Ok((&rest[1..], out)),
            Some('\\') => {
                let Some(escaped) = chars.next() else {
                    break;
                };
                match escaped {
                    'n' => out.push('\n'),
                    't' => out.push('\t'),
                    '\\' | '"' => out.push(escaped),
                    // Unknown escapes are kept verbatim
                    other => {
                        out.push('\\');
                        out.push(other);
                    }
                }
                rest = &rest[1 + escaped.len_utf8()..];
            }
            Some(c) => {
                out.push(c);
                rest = &rest[c.len_utf8()..];
            }
            None => break,
        }
    }

    Err(nom::Err::Error(Error::new(input, ErrorKind::Char)))
}

fn parse_bare_string(input: &str) -> IResult<&str, String> {
    map(
        take_while1(|c: char| !c.is_whitespace() && !matches!(c, '{' | '}' | '"')),
        String::from,
    )
    .parse(input)
}

fn parse_token(input: &str) -> IResult<&str, String> {
    alt((parse_quoted_string, parse_bare_string)).parse(input)
}

/// Platform conditional following a value, e.g. `[$WIN32]`
fn parse_conditional(input: &str) -> IResult<&str, &str> {
    delimited(char('['), is_not("]"), char(']')).parse(input)
}

// DOCUMENT -----------------------------------------------------------------------------
fn parse_pair(input: &str) -> IResult<&str, (String, KeyValue)> {
    let (input, key) = preceded(parse_whitespace, parse_token).parse(input)?;
    let (input, value) = preceded(
        parse_whitespace,
        alt((
            map(parse_block, KeyValue::Block),
            map(parse_token, KeyValue::Str),
        )),
    )
    .parse(input)?;
    let (input, _) = opt(preceded(parse_whitespace, parse_conditional)).parse(input)?;

    Ok((input, (key, value)))
}

fn parse_pairs(input: &str) -> IResult<&str, KeyValues> {
    map(many0(parse_pair), |entries| KeyValues { entries }).parse(input)
}

fn parse_block(input: &str) -> IResult<&str, KeyValues> {
    delimited(
        char('{'),
        parse_pairs,
        preceded(parse_whitespace, char('}')),
    )
    .parse(input)
}

/// Parses a complete KeyValues document
pub fn parse_key_values(file_content: &str) -> Result<KeyValues, ManifestParseError> {
    let file_content = file_content.trim_start_matches('\u{feff}');

    let (_, document) =
        all_consuming(terminated(parse_pairs, parse_whitespace)).parse(file_content)?;

    Ok(document)
}

/// Used for checking if a file name matches the structure for an app manifest file, returning
/// the app id contained in the name
pub fn parse_manifest_filename(filename: &str) -> IResult<&str, &str> {
    all_consuming(delimited(tag("appmanifest_"), digit1, tag(".acf"))).parse(filename)
}

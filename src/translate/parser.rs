//! LogQL Parser
//!
//! Parses the supported LogQL subset into a [`SourceQuery`].
//!
//! # Supported Syntax
//!
//! ```text
//! {key=value, key="value", ...} [| json] [| logfmt] [| key="value"] ...
//! ```
//!
//! Parsing never fails. Selector pairs without `=` and stages matching
//! neither rule are dropped individually; a selector segment that is not
//! brace-enclosed yields no matchers.

use nom::{
    bytes::complete::{take_until, take_while, take_while1},
    character::complete::char,
    combinator::{all_consuming, rest},
    sequence::{delimited, separated_pair},
    IResult,
};

use crate::translate::ast::{FormatMarker, Matcher, SourceQuery, Stage};

/// Parse an already-decoded LogQL string
pub fn parse_source_query(input: &str) -> SourceQuery {
    let mut segments = input.split('|').map(str::trim);

    let selector = segments
        .next()
        .map(parse_selector)
        .unwrap_or_default();
    let stages = segments.map(parse_stage).collect();

    SourceQuery { selector, stages }
}

/// Parse the `{...}` stream selector segment
fn parse_selector(segment: &str) -> Vec<Matcher> {
    let body = match segment
        .strip_prefix('{')
        .and_then(|s| s.strip_suffix('}'))
    {
        Some(body) => body,
        None => return Vec::new(),
    };

    body.split(',')
        .filter_map(|pair| parse_selector_pair(pair).ok().map(|(_, m)| m))
        .collect()
}

/// Parse one `key=value` selector pair, splitting on the first `=`
fn parse_selector_pair(input: &str) -> IResult<&str, Matcher> {
    let (remaining, (key, value)) = separated_pair(take_until("="), char('='), rest)(input)?;
    Ok((
        remaining,
        Matcher::new(key.trim(), strip_quotes(value.trim())),
    ))
}

/// Strip at most one leading and one trailing double quote
fn strip_quotes(value: &str) -> &str {
    let value = value.strip_prefix('"').unwrap_or(value);
    value.strip_suffix('"').unwrap_or(value)
}

/// Classify a single pipeline stage
fn parse_stage(segment: &str) -> Stage {
    if let Some(marker) = FormatMarker::from_stage(segment) {
        return Stage::Format(marker);
    }

    match all_consuming(parse_stage_filter)(segment) {
        Ok((_, matcher)) => Stage::Filter(matcher),
        Err(_) => Stage::Unsupported(segment.to_string()),
    }
}

/// Parse a stage filter like `level = "error"`
fn parse_stage_filter(input: &str) -> IResult<&str, Matcher> {
    let (input, name) = parse_identifier(input)?;
    let (input, _) = whitespace(input)?;
    let (input, _) = char('=')(input)?;
    let (input, _) = whitespace(input)?;
    let (input, value) = parse_quoted_value(input)?;
    Ok((input, Matcher::new(name, value)))
}

/// Parse identifier (word characters only)
fn parse_identifier(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_alphanumeric() || c == '_')(input)
}

/// Parse a non-empty double-quoted value without escapes
fn parse_quoted_value(input: &str) -> IResult<&str, &str> {
    delimited(char('"'), take_while1(|c: char| c != '"'), char('"'))(input)
}

fn whitespace(input: &str) -> IResult<&str, &str> {
    take_while(char::is_whitespace)(input)
}

//! Nom-based IRC message parsing.
//!
//! The wire grammar is:
//!
//! ```text
//! [@tags] [:prefix] <command> [params...] [:trailing]
//! ```
//!
//! [`Message::from_str`] is the strict entry point; [`decode_relaxed`] is the
//! engine's wire-path entry and never fails.

use std::str::FromStr;

use nom::{
    bytes::complete::take_while1,
    character::complete::{char, space0},
    combinator::opt,
    sequence::preceded,
    IResult,
};

use crate::error::{MessageParseError, ProtocolError};
use crate::message::tags::parse_tag_block;
use crate::message::{Message, Tag};
use crate::prefix::Prefix;

type ParseResult<'a, O> = IResult<&'a str, O>;

/// The raw tag block: `@` followed by everything up to the first space.
fn tag_block(input: &str) -> ParseResult<'_, &str> {
    preceded(char('@'), take_while1(|c| c != ' '))(input)
}

/// The raw prefix: `:` followed by everything up to the first space.
fn prefix_block(input: &str) -> ParseResult<'_, &str> {
    preceded(char(':'), take_while1(|c| c != ' '))(input)
}

/// The command token: a verb or numeric.
fn command_token(input: &str) -> ParseResult<'_, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric())(input)
}

/// Split the remainder of a line into parameters.
///
/// A parameter starting with `:` is the trailing parameter: it runs to the
/// end of the line and may contain spaces or be empty. Runs of separating
/// spaces are tolerated.
fn split_params(mut rest: &str) -> (&str, Vec<String>) {
    let mut params = Vec::new();
    loop {
        let skipped = rest.trim_start_matches(' ');
        if skipped.len() == rest.len() {
            break;
        }
        rest = skipped;

        if let Some(trailing) = rest.strip_prefix(':') {
            let end = trailing.find(['\r', '\n']).unwrap_or(trailing.len());
            params.push(trailing[..end].to_string());
            rest = &trailing[end..];
            break;
        }

        let end = rest.find([' ', '\r', '\n']).unwrap_or(rest.len());
        if end == 0 {
            break;
        }
        params.push(rest[..end].to_string());
        rest = &rest[end..];
    }
    (rest, params)
}

fn message(input: &str) -> ParseResult<'_, Message> {
    let (input, raw_tags) = opt(tag_block)(input)?;
    let (input, _) = space0(input)?;
    let (input, raw_prefix) = opt(prefix_block)(input)?;
    let (input, _) = space0(input)?;
    let (input, command) = command_token(input)?;
    let (rest, params) = split_params(input);

    let tags: Option<Vec<Tag>> = raw_tags.map(parse_tag_block);

    Ok((
        rest,
        Message {
            tags,
            prefix: raw_prefix.map(Prefix::new_from_str),
            command: command.to_string(),
            params,
        },
    ))
}

impl FromStr for Message {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Message, Self::Err> {
        if s.trim_end_matches(['\r', '\n']).is_empty() {
            return Err(ProtocolError::InvalidMessage {
                string: s.to_owned(),
                cause: MessageParseError::EmptyMessage,
            });
        }

        match message(s) {
            Ok((_rest, msg)) => Ok(msg),
            Err(_) => Err(ProtocolError::InvalidMessage {
                string: s.to_owned(),
                cause: MessageParseError::InvalidCommand,
            }),
        }
    }
}

/// Decode one wire line, degrading instead of failing.
///
/// Lines the strict parser rejects come back with an empty command and the
/// raw text as the sole parameter, so the dispatcher can surface them as
/// opaque status. An empty line decodes to an empty message.
pub fn decode_relaxed(line: &str) -> Message {
    let trimmed = line.trim_end_matches(['\r', '\n']);
    if trimmed.is_empty() {
        return Message::new("", Vec::<String>::new());
    }
    match trimmed.parse::<Message>() {
        Ok(msg) => msg,
        Err(_) => Message::new("", vec![trimmed.to_string()]),
    }
}

use crate::error::ParseVariablesError;
use nom::branch::alt;
use nom::bytes::complete::{tag, take_until, take_while1};
use nom::character::complete::{char, line_ending, multispace1, not_line_ending, space0};
use nom::combinator::eof;
use nom::error::{Error, ErrorKind};
use nom::sequence::delimited;
use nom::{IResult, Slice};
use nom_locate::LocatedSpan;

pub(crate) type Span<'a> = LocatedSpan<&'a str>;

#[derive(Debug)]
pub(crate) struct Token<'a> {
    pub key: Span<'a>,
    pub value: Span<'a>,
}

fn multiline_comment(i: Span) -> IResult<Span, Span> {
    delimited(tag("/*"), take_until("*/"), tag("*/"))(i)
}

fn single_comment(i: Span) -> IResult<Span, Span> {
    delimited(
        alt((tag("//"), tag("#"))),
        not_line_ending,
        alt((line_ending, eof)),
    )(i)
}

fn is_comment(fragment: &str) -> bool {
    fragment.starts_with("//") || fragment.starts_with('#')
}

fn parse_key(input: Span) -> IResult<Span, Span> {
    take_while1(|c: char| c.is_alphanumeric() || c == '_' || c == '-' || c == '.')(input)
}

fn parse_assignment(input: Span) -> IResult<Span, ()> {
    let (input, _) = space0(input)?;
    let (input, _) = tag("=")(input)?;
    let (input, _) = space0(input)?;
    Ok((input, ()))
}

fn quoted_value(input: Span) -> IResult<Span, Span> {
    let (input, value) = delimited(char('"'), take_until("\""), char('"'))(input)?;
    let (input, rest) = not_line_ending(input)?;

    let rest_fragment = rest.fragment().trim_start();
    if !rest_fragment.is_empty() && !is_comment(rest_fragment) {
        return Err(nom::Err::Failure(Error::new(rest, ErrorKind::Verify)));
    }

    Ok((input, value))
}

fn bare_value(input: Span) -> IResult<Span, Span> {
    let (input, line) = not_line_ending(input)?;
    let fragment = *line.fragment();

    // comments run to the end of the line
    let end = [fragment.find("//"), fragment.find('#')]
        .into_iter()
        .flatten()
        .min()
        .unwrap_or(fragment.len());
    let end = fragment[..end].trim_end().len();

    Ok((input, line.slice(..end)))
}

fn parse_key_value(input: Span) -> IResult<Span, Token> {
    let (input, key) = parse_key(input)?;
    let (input, _) = parse_assignment(input)?;
    let (input, value) = alt((quoted_value, bare_value))(input)?;
    Ok((input, Token { key, value }))
}

fn parse_tokens(mut span: Span) -> IResult<Span, Vec<Token>> {
    let mut values = Vec::new();
    while !span.is_empty() {
        if let Ok((input, _)) = multispace1::<Span, Error<Span>>(span) {
            span = input;
            continue;
        }
        if let Ok((input, _)) = multiline_comment(span) {
            span = input;
            continue;
        }
        if let Ok((input, _)) = single_comment(span) {
            span = input;
            continue;
        }
        let (input, token) = parse_key_value(span)?;
        span = input;
        values.push(token)
    }
    Ok((span, values))
}

pub(crate) fn do_lex(input: &str) -> Result<Vec<Token>, ParseVariablesError> {
    let span = Span::new(input.trim_end());
    let (_, tokens) = parse_tokens(span).map_err(|e| match e {
        nom::Err::Error(e) | nom::Err::Failure(e) => {
            let input: Span = e.input;
            ParseVariablesError::LexerError {
                offset: input.location_offset(),
                row: input.location_line(),
                col: input.get_column(),
            }
        }
        _ => ParseVariablesError::LexerError {
            offset: 0,
            row: 0,
            col: 0,
        },
    })?;
    Ok(tokens)
}

use crate::model::{TypeTag, TypedArgument, Value};

use super::error::{ParseError, ParseErrorKind};

const ARRAY_PREFIX: &str = "[]";
const MAP_PREFIX: &str = "{}";
const SET_PREFIX: &str = "()";
const ARROW: &str = "=>";

/// Parse a whole argument specification, one `<literal> => <type>` record
/// per line. Blank lines are skipped; the result keeps input order, which
/// later becomes positional argument order.
pub fn parse(input: &str) -> Result<Vec<TypedArgument>, ParseError> {
    let mut arguments = Vec::new();
    for (index, raw) in input.lines().enumerate() {
        if raw.trim().is_empty() {
            continue;
        }
        arguments.push(parse_record(raw, index + 1)?);
    }
    Ok(arguments)
}

/// Parse a single record. `line` is only used for error reporting.
pub fn parse_record(record: &str, line: usize) -> Result<TypedArgument, ParseError> {
    // Split at the last arrow: annotations never contain one, string
    // literals might.
    let Some((literal, annotation)) = record.rsplit_once(ARROW) else {
        return Err(ParseError::new(
            ParseErrorKind::MissingArrow,
            line,
            format!("expected `<literal> => <type>`, got `{}`", record.trim()),
        ));
    };
    let literal = literal.trim();

    match parse_annotation(annotation.trim(), line)? {
        Annotation::Scalar(tag) => Ok(TypedArgument::Scalar {
            value: parse_scalar(literal, tag, line)?,
        }),
        Annotation::Array(element_type) => {
            let body = enclosed(literal, '[', ']', "array", line)?;
            Ok(TypedArgument::Array {
                elements: parse_elements(body, element_type, line)?,
                element_type,
            })
        }
        Annotation::Set(element_type) => {
            let body = enclosed(literal, '(', ')', "set", line)?;
            Ok(TypedArgument::Set {
                elements: parse_elements(body, element_type, line)?,
                element_type,
            })
        }
        Annotation::Map(key_type, value_type) => {
            let body = enclosed(literal, '{', '}', "map", line)?;
            Ok(TypedArgument::Map {
                pairs: parse_pairs(body, key_type, value_type, line)?,
                key_type,
                value_type,
            })
        }
    }
}

// ── Type annotations ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Annotation {
    Scalar(TypeTag),
    Array(TypeTag),
    Set(TypeTag),
    Map(TypeTag, TypeTag),
}

fn parse_annotation(annotation: &str, line: usize) -> Result<Annotation, ParseError> {
    if let Some(rest) = annotation.strip_prefix(ARRAY_PREFIX) {
        return Ok(Annotation::Array(type_name(rest, line)?));
    }
    if let Some(rest) = annotation.strip_prefix(SET_PREFIX) {
        return Ok(Annotation::Set(type_name(rest, line)?));
    }
    if let Some(rest) = annotation.strip_prefix(MAP_PREFIX) {
        let Some((key, value)) = rest.split_once(',') else {
            return Err(ParseError::new(
                ParseErrorKind::UnknownType,
                line,
                format!("map type `{annotation}` must name `<keyType>,<valueType>`"),
            ));
        };
        return Ok(Annotation::Map(type_name(key, line)?, type_name(value, line)?));
    }
    Ok(Annotation::Scalar(type_name(annotation, line)?))
}

fn type_name(name: &str, line: usize) -> Result<TypeTag, ParseError> {
    let name = name.trim();
    TypeTag::from_name(name).ok_or_else(|| {
        ParseError::new(
            ParseErrorKind::UnknownType,
            line,
            format!("unknown type `{name}`"),
        )
    })
}

// ── Composite literals ────────────────────────────────────────────

fn enclosed<'a>(
    literal: &'a str,
    open: char,
    close: char,
    shape: &str,
    line: usize,
) -> Result<&'a str, ParseError> {
    literal
        .strip_prefix(open)
        .and_then(|rest| rest.strip_suffix(close))
        .ok_or_else(|| {
            ParseError::new(
                ParseErrorKind::MalformedComposite,
                line,
                format!("{shape} literal must be enclosed in `{open}{close}`, got `{literal}`"),
            )
        })
}

fn parse_elements(body: &str, tag: TypeTag, line: usize) -> Result<Vec<Value>, ParseError> {
    split_members(body, line)?
        .into_iter()
        .map(|token| parse_scalar(token, tag, line))
        .collect()
}

fn parse_pairs(
    body: &str,
    key_type: TypeTag,
    value_type: TypeTag,
    line: usize,
) -> Result<Vec<(Value, Value)>, ParseError> {
    split_members(body, line)?
        .into_iter()
        .map(|entry| {
            let Some(at) = find_unquoted(entry, ':') else {
                return Err(ParseError::new(
                    ParseErrorKind::MissingSeparator,
                    line,
                    format!("map entry `{entry}` is missing `:`"),
                ));
            };
            let (key, value) = entry.split_at(at);
            let value = value.strip_prefix(':').unwrap_or(value);
            Ok((
                parse_scalar(key, key_type, line)?,
                parse_scalar(value, value_type, line)?,
            ))
        })
        .collect()
}

/// Split a composite body on commas that are not inside double quotes.
/// An all-whitespace body is the empty composite.
fn split_members(body: &str, line: usize) -> Result<Vec<&str>, ParseError> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }
    if !quotes_balanced(body) {
        return Err(ParseError::new(
            ParseErrorKind::MalformedComposite,
            line,
            format!("unterminated string in `{body}`"),
        ));
    }

    let mut members = Vec::new();
    let mut rest = body;
    while let Some(at) = find_unquoted(rest, ',') {
        let (member, tail) = rest.split_at(at);
        members.push(member);
        rest = tail.strip_prefix(',').unwrap_or(tail);
    }
    members.push(rest);

    members
        .into_iter()
        .enumerate()
        .map(|(position, member)| {
            let member = member.trim();
            if member.is_empty() {
                Err(ParseError::new(
                    ParseErrorKind::MalformedComposite,
                    line,
                    format!("empty member at position {position} in `{body}`"),
                ))
            } else {
                Ok(member)
            }
        })
        .collect()
}

fn find_unquoted(s: &str, target: char) -> Option<usize> {
    let mut quotes = QuoteState::default();
    s.char_indices()
        .find(|&(_, ch)| quotes.step(ch) && ch == target)
        .map(|(i, _)| i)
}

fn quotes_balanced(s: &str) -> bool {
    let mut quotes = QuoteState::default();
    s.chars().for_each(|ch| {
        quotes.step(ch);
    });
    !quotes.in_string
}

/// Tracks whether a scan is inside a double-quoted string.
#[derive(Default)]
struct QuoteState {
    in_string: bool,
    escaped: bool,
}

impl QuoteState {
    /// Feed one character; returns true if it sits outside any string.
    fn step(&mut self, ch: char) -> bool {
        if self.in_string {
            if self.escaped {
                self.escaped = false;
            } else if ch == '\\' {
                self.escaped = true;
            } else if ch == '"' {
                self.in_string = false;
            }
            false
        } else if ch == '"' {
            self.in_string = true;
            false
        } else {
            true
        }
    }
}

// ── Scalar tokens ─────────────────────────────────────────────────

fn parse_scalar(token: &str, tag: TypeTag, line: usize) -> Result<Value, ParseError> {
    let token = token.trim();
    if tag == TypeTag::Integer && token.parse::<i128>().is_ok() && parse_int(token).is_none() {
        return Err(ParseError::new(
            ParseErrorKind::InvalidLiteral,
            line,
            format!("`{token}` is out of range for int ({} to {})", i32::MIN, i32::MAX),
        ));
    }
    let parsed = match tag {
        TypeTag::Integer => parse_int(token),
        TypeTag::Float => parse_float(token),
        TypeTag::Boolean => parse_bool(token),
        TypeTag::String => Some(parse_string(token)),
    };
    parsed.ok_or_else(|| {
        ParseError::new(
            ParseErrorKind::InvalidLiteral,
            line,
            format!("`{token}` is not a valid {tag}"),
        )
    })
}

fn parse_int(token: &str) -> Option<Value> {
    token.parse::<i32>().ok().map(Value::Int)
}

fn parse_float(token: &str) -> Option<Value> {
    token
        .parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .map(Value::Float)
}

fn parse_bool(token: &str) -> Option<Value> {
    match token {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(Value::Bool(true)),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(Value::Bool(false)),
        _ => None,
    }
}

/// Bare tokens are taken verbatim; one pair of surrounding double quotes is
/// removed and its `\"`, `\\`, `\n`, `\t` escapes resolved.
fn parse_string(token: &str) -> Value {
    let Some(inner) = token
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    else {
        return Value::Str(token.to_string());
    };

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other @ ('"' | '\\')) => out.push(other),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    Value::Str(out)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::panic)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn one(record: &str) -> TypedArgument {
        parse_record(record, 1).unwrap()
    }

    fn err(record: &str) -> ParseErrorKind {
        parse_record(record, 1).unwrap_err().kind
    }

    #[test]
    fn scalar_int() {
        assert_eq!(one("5 => int"), TypedArgument::scalar(Value::Int(5)));
    }

    #[test]
    fn scalars_of_every_type() {
        assert_eq!(one("-3 => int"), TypedArgument::scalar(Value::Int(-3)));
        assert_eq!(one("2.5 => float"), TypedArgument::scalar(Value::Float(2.5)));
        assert_eq!(one("True => bool"), TypedArgument::scalar(Value::Bool(true)));
        assert_eq!(one("0 => bool"), TypedArgument::scalar(Value::Bool(false)));
        assert_eq!(
            one("  hello world   => string"),
            TypedArgument::scalar(Value::Str("hello world".into()))
        );
    }

    #[test]
    fn int_array() {
        assert_eq!(
            one("[1,3,5] => []int"),
            TypedArgument::Array {
                elements: vec![Value::Int(1), Value::Int(3), Value::Int(5)],
                element_type: TypeTag::Integer,
            }
        );
    }

    #[test]
    fn whitespace_inside_composites_is_ignored() {
        assert_eq!(one("[1, 3 , 5]   =>   []int"), one("[1,3,5] => []int"));
    }

    #[test]
    fn int_map() {
        assert_eq!(
            one("{1:2,3:4} => {}int,int"),
            TypedArgument::Map {
                pairs: vec![
                    (Value::Int(1), Value::Int(2)),
                    (Value::Int(3), Value::Int(4)),
                ],
                key_type: TypeTag::Integer,
                value_type: TypeTag::Integer,
            }
        );
    }

    #[test]
    fn float_set() {
        assert_eq!(
            one("(3.4, 5.6) => ()float"),
            TypedArgument::Set {
                elements: vec![Value::Float(3.4), Value::Float(5.6)],
                element_type: TypeTag::Float,
            }
        );
    }

    #[test]
    fn every_map_key_value_combination() {
        let samples = [
            (TypeTag::Integer, "7"),
            (TypeTag::Float, "1.5"),
            (TypeTag::Boolean, "true"),
            (TypeTag::String, "abc"),
        ];
        for (key_type, key) in samples {
            for (value_type, value) in samples {
                let record = format!("{{{key}:{value}}} => {{}}{key_type},{value_type}");
                match one(&record) {
                    TypedArgument::Map {
                        pairs,
                        key_type: k,
                        value_type: v,
                    } => {
                        assert_eq!(k, key_type, "{record}");
                        assert_eq!(v, value_type, "{record}");
                        assert_eq!(pairs.len(), 1);
                        assert_eq!(pairs[0].0.tag(), key_type);
                        assert_eq!(pairs[0].1.tag(), value_type);
                    }
                    other => panic!("expected map for {record}, got {other:?}"),
                }
            }
        }
    }

    #[test]
    fn empty_composites() {
        assert!(one("[] => []int").is_empty());
        assert!(one("() => ()string").is_empty());
        assert!(one("{} => {}string,bool").is_empty());
        assert!(one("[   ] => []float").is_empty());
    }

    #[test]
    fn quoted_strings_keep_commas_and_colons() {
        assert_eq!(
            one(r#"{"foo": false, "a,b:c": true} => {}string,bool"#),
            TypedArgument::Map {
                pairs: vec![
                    (Value::Str("foo".into()), Value::Bool(false)),
                    (Value::Str("a,b:c".into()), Value::Bool(true)),
                ],
                key_type: TypeTag::String,
                value_type: TypeTag::Boolean,
            }
        );
        assert_eq!(
            one(r#""say \"hi\"" => string"#),
            TypedArgument::scalar(Value::Str("say \"hi\"".into()))
        );
    }

    #[test]
    fn string_literal_may_contain_arrow() {
        assert_eq!(
            one("a => b => string"),
            TypedArgument::scalar(Value::Str("a => b".into()))
        );
    }

    #[test]
    fn rejects_unknown_types() {
        assert_eq!(err("5 => integer"), ParseErrorKind::UnknownType);
        assert_eq!(err("[1] => []long"), ParseErrorKind::UnknownType);
        assert_eq!(err("{1:2} => {}int"), ParseErrorKind::UnknownType);
        assert_eq!(err("{1:2} => {}int,char"), ParseErrorKind::UnknownType);
    }

    #[test]
    fn rejects_bad_literals() {
        assert_eq!(err("five => int"), ParseErrorKind::InvalidLiteral);
        assert_eq!(err("1.5 => int"), ParseErrorKind::InvalidLiteral);
        assert_eq!(err("yes => bool"), ParseErrorKind::InvalidLiteral);
        assert_eq!(err("inf => float"), ParseErrorKind::InvalidLiteral);
        assert_eq!(err("[1,x] => []int"), ParseErrorKind::InvalidLiteral);
    }

    #[test]
    fn int_range_is_32_bit() {
        assert_eq!(one("2147483647 => int"), TypedArgument::scalar(Value::Int(i32::MAX)));
        assert_eq!(one("-2147483648 => int"), TypedArgument::scalar(Value::Int(i32::MIN)));
        assert_eq!(err("2147483648 => int"), ParseErrorKind::InvalidLiteral);
        assert_eq!(err("-2147483649 => int"), ParseErrorKind::InvalidLiteral);
        assert_eq!(err("[1, 9999999999] => []int"), ParseErrorKind::InvalidLiteral);
        let e = parse_record("9999999999 => int", 1).unwrap_err();
        assert!(e.message.contains("out of range"), "{}", e.message);
    }

    #[test]
    fn rejects_malformed_composites() {
        assert_eq!(err("1,2 => []int"), ParseErrorKind::MalformedComposite);
        assert_eq!(err("(1,2) => []int"), ParseErrorKind::MalformedComposite);
        assert_eq!(err("[1,,2] => []int"), ParseErrorKind::MalformedComposite);
        assert_eq!(err("[1,2,] => []int"), ParseErrorKind::MalformedComposite);
        assert_eq!(err(r#"["a,b] => []string"#), ParseErrorKind::MalformedComposite);
        assert_eq!(err("{1:2,3} => {}int,int"), ParseErrorKind::MissingSeparator);
    }

    #[test]
    fn spec_keeps_order_and_skips_blank_lines() {
        let args = parse("\n5 => int\n\n   \n[1,2] => []int\n(a) => ()string\n").unwrap();
        assert_eq!(args.len(), 3);
        assert_eq!(args[0].annotation(), "int");
        assert_eq!(args[1].annotation(), "[]int");
        assert_eq!(args[2].annotation(), "()string");
    }

    #[test]
    fn errors_report_the_line_number() {
        let e = parse("5 => int\n\nnope => int\n").unwrap_err();
        assert_eq!(e.line, 3);
        assert_eq!(e.kind, ParseErrorKind::InvalidLiteral);
        assert_eq!(e.to_string(), "line 3: `nope` is not a valid int");

        let e = parse("5 => int\njust words\n").unwrap_err();
        assert_eq!(e.line, 2);
        assert_eq!(e.kind, ParseErrorKind::MissingArrow);
    }

    // ── Properties ────────────────────────────────────────────────

    fn literal(value: &Value) -> String {
        match value {
            Value::Int(i) => i.to_string(),
            Value::Float(f) => format!("{f:?}"),
            Value::Bool(b) => b.to_string(),
            Value::Str(s) => format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\"")),
        }
    }

    fn value_of(tag: TypeTag) -> BoxedStrategy<Value> {
        match tag {
            TypeTag::Integer => any::<i32>().prop_map(Value::Int).boxed(),
            TypeTag::Float => (-1.0e9..1.0e9f64).prop_map(Value::Float).boxed(),
            TypeTag::Boolean => any::<bool>().prop_map(Value::Bool).boxed(),
            TypeTag::String => "[a-zA-Z0-9_ ,:\"]{0,8}".prop_map(Value::Str).boxed(),
        }
    }

    fn tag() -> impl Strategy<Value = TypeTag> {
        prop_oneof![
            Just(TypeTag::Integer),
            Just(TypeTag::Float),
            Just(TypeTag::Boolean),
            Just(TypeTag::String),
        ]
    }

    fn record() -> impl Strategy<Value = (String, TypedArgument)> {
        (tag(), tag(), 0..4usize).prop_flat_map(|(k, v, shape)| {
            let elements = prop::collection::vec(value_of(k), 0..5);
            let pairs = prop::collection::vec((value_of(k), value_of(v)), 0..5);
            match shape {
                0 => value_of(k)
                    .prop_map(move |value| {
                        (format!("{} => {k}", literal(&value)), TypedArgument::Scalar { value })
                    })
                    .boxed(),
                1 => elements
                    .prop_map(move |elements| {
                        let body: Vec<String> = elements.iter().map(literal).collect();
                        (
                            format!("[{}] => []{k}", body.join(", ")),
                            TypedArgument::Array { elements, element_type: k },
                        )
                    })
                    .boxed(),
                2 => elements
                    .prop_map(move |elements| {
                        let body: Vec<String> = elements.iter().map(literal).collect();
                        (
                            format!("({}) => (){k}", body.join(",")),
                            TypedArgument::Set { elements, element_type: k },
                        )
                    })
                    .boxed(),
                _ => pairs
                    .prop_map(move |pairs| {
                        let body: Vec<String> = pairs
                            .iter()
                            .map(|(a, b)| format!("{}: {}", literal(a), literal(b)))
                            .collect();
                        (
                            format!("{{{}}} => {{}}{k},{v}", body.join(", ")),
                            TypedArgument::Map { pairs, key_type: k, value_type: v },
                        )
                    })
                    .boxed(),
            }
        })
    }

    proptest! {
        #[test]
        fn parsing_recovers_the_written_argument((text, expected) in record()) {
            prop_assert_eq!(parse_record(&text, 1).unwrap(), expected);
        }

        #[test]
        fn parsing_is_idempotent(records in prop::collection::vec(record(), 0..6)) {
            let text: Vec<String> = records.into_iter().map(|(t, _)| t).collect();
            let text = text.join("\n");
            prop_assert_eq!(parse(&text).unwrap(), parse(&text).unwrap());
        }
    }
}

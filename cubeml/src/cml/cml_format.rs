//! Textual forms of shapes, dimension lists and value arrays in CubeML attributes.

use itertools::Itertools;

use crate::{values::Values, DataType};

/// The marker standing in for elided values.
pub(crate) const ELLIPSIS: &str = "...";

/// A shape as a tuple: `()`, `(3,)` or `(3, 73, 96)`.
pub(crate) fn format_shape(shape: &[usize]) -> String {
    match shape {
        [len] => format!("({len},)"),
        shape => format!("({})", shape.iter().join(", ")),
    }
}

pub(crate) fn parse_shape(text: &str) -> Result<Vec<usize>, String> {
    let inner = text
        .trim()
        .strip_prefix('(')
        .and_then(|text| text.strip_suffix(')'))
        .ok_or_else(|| "expected a parenthesised tuple".to_string())?;
    parse_usize_list(inner)
}

/// A list of dimension indices: `[0, 1]`.
pub(crate) fn format_dims(dims: &[usize]) -> String {
    format!("[{}]", dims.iter().join(", "))
}

pub(crate) fn parse_dims(text: &str) -> Result<Vec<usize>, String> {
    let inner = text
        .trim()
        .strip_prefix('[')
        .and_then(|text| text.strip_suffix(']'))
        .ok_or_else(|| "expected a bracketed list".to_string())?;
    parse_usize_list(inner)
}

fn parse_usize_list(inner: &str) -> Result<Vec<usize>, String> {
    inner
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| {
            item.parse::<usize>()
                .map_err(|_| format!("`{item}` is not a non-negative integer"))
        })
        .collect()
}

fn format_float(value: f64, data_type: DataType) -> String {
    if value.is_nan() {
        "nan".to_string()
    } else if value.is_infinite() {
        let sign = if value < 0.0 { "-" } else { "" };
        format!("{sign}inf")
    } else if data_type == DataType::Float32 {
        #[allow(clippy::cast_possible_truncation)]
        let value = value as f32;
        format!("{value:?}")
    } else {
        format!("{value:?}")
    }
}

fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('\'');
    for c in value.chars() {
        match c {
            '\\' => quoted.push_str("\\\\"),
            '\'' => quoted.push_str("\\'"),
            '\n' => quoted.push_str("\\n"),
            c => quoted.push(c),
        }
    }
    quoted.push('\'');
    quoted
}

/// Format each value as it appears in a value array.
pub(crate) fn format_items(values: &Values, data_type: DataType) -> Vec<String> {
    match values {
        Values::Int(values) if data_type == DataType::Bool => values
            .iter()
            .map(|value| if *value == 0 { "False" } else { "True" }.to_string())
            .collect(),
        Values::Int(values) => values.iter().map(ToString::to_string).collect(),
        Values::Float(values) => values
            .iter()
            .map(|value| format_float(*value, data_type))
            .collect(),
        Values::Text(values) => values.iter().map(|value| quote(value)).collect(),
    }
}

pub(crate) fn nest(items: &[String], shape: &[usize]) -> String {
    match shape {
        [] | [_] => format!("[{}]", items.join(", ")),
        [_, rest @ ..] => {
            let stride = rest.iter().product::<usize>().max(1);
            format!(
                "[{}]",
                items.chunks(stride).map(|chunk| nest(chunk, rest)).join(", ")
            )
        }
    }
}

/// Values nested as brackets per dimension of `shape`, in C order.
pub(crate) fn format_values(values: &Values, data_type: DataType, shape: &[usize]) -> String {
    nest(&format_items(values, data_type), shape)
}

/// Leading and trailing items as a flat list around an ellipsis.
pub(crate) fn elided_list(head: Vec<String>, tail: Vec<String>) -> String {
    let items: Vec<String> = head
        .into_iter()
        .chain(std::iter::once(ELLIPSIS.to_string()))
        .chain(tail)
        .collect();
    format!("[{}]", items.join(", "))
}

/// The first and last values of an elided sequence as a flat list around an ellipsis.
pub(crate) fn format_elided(head: &Values, tail: &Values, data_type: DataType) -> String {
    elided_list(format_items(head, data_type), format_items(tail, data_type))
}

#[derive(Debug, Clone, PartialEq)]
enum Scalar {
    Int(i64),
    Float(f64),
    Text(String),
}

/// The values of a parsed value array, with the leading and trailing values split at an ellipsis.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ParsedValues {
    pub(crate) head: Values,
    pub(crate) tail: Option<Values>,
}

struct Tokenizer<'a> {
    text: &'a str,
    position: usize,
}

impl<'a> Tokenizer<'a> {
    fn peek(&self) -> Option<char> {
        self.text[self.position..].chars().next()
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.position += c.len_utf8();
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), String> {
        self.skip_whitespace();
        match self.peek() {
            Some(c) if c == expected => {
                self.position += c.len_utf8();
                Ok(())
            }
            Some(c) => Err(format!("expected `{expected}` but found `{c}` at {}", self.position)),
            None => Err(format!("expected `{expected}` but found the end of the value")),
        }
    }

    fn quoted(&mut self) -> Result<String, String> {
        let Some(delimiter) = self.peek() else {
            return Err("unterminated string".to_string());
        };
        self.position += delimiter.len_utf8();
        let text = self.text;
        let mut value = String::new();
        let mut chars = text[self.position..].char_indices();
        while let Some((offset, c)) = chars.next() {
            match c {
                '\\' => match chars.next() {
                    Some((_, 'n')) => value.push('\n'),
                    Some((_, escaped)) => value.push(escaped),
                    None => break,
                },
                c if c == delimiter => {
                    self.position += offset + c.len_utf8();
                    return Ok(value);
                }
                c => value.push(c),
            }
        }
        Err("unterminated string".to_string())
    }

    fn word(&mut self) -> &'a str {
        let start = self.position;
        while let Some(c) = self.peek() {
            if c == ',' || c == ']' || c.is_whitespace() {
                break;
            }
            self.position += c.len_utf8();
        }
        let text = self.text;
        &text[start..self.position]
    }

    fn scalar(&mut self) -> Result<Option<Scalar>, String> {
        if matches!(self.peek(), Some('\'' | '"')) {
            return self.quoted().map(|text| Some(Scalar::Text(text)));
        }
        let word = self.word();
        let scalar = match word {
            "" => return Err(format!("expected a value at {}", self.position)),
            ELLIPSIS => return Ok(None),
            "True" | "true" => Scalar::Int(1),
            "False" | "false" => Scalar::Int(0),
            "nan" | "NaN" => Scalar::Float(f64::NAN),
            "inf" => Scalar::Float(f64::INFINITY),
            "-inf" => Scalar::Float(f64::NEG_INFINITY),
            word => {
                if let Ok(value) = word.parse::<i64>() {
                    Scalar::Int(value)
                } else {
                    word.parse::<f64>()
                        .map(Scalar::Float)
                        .map_err(|_| format!("`{word}` is not a number"))?
                }
            }
        };
        Ok(Some(scalar))
    }

    /// Flatten a (possibly nested) list into `items`, recording the item index of an ellipsis.
    fn list(
        &mut self,
        items: &mut Vec<Scalar>,
        ellipsis: &mut Option<usize>,
    ) -> Result<(), String> {
        self.expect('[')?;
        self.skip_whitespace();
        if self.peek() == Some(']') {
            self.position += 1;
            return Ok(());
        }
        loop {
            self.skip_whitespace();
            if self.peek() == Some('[') {
                self.list(items, ellipsis)?;
            } else if let Some(scalar) = self.scalar()? {
                items.push(scalar);
            } else if ellipsis.replace(items.len()).is_some() {
                return Err("more than one ellipsis".to_string());
            }
            self.skip_whitespace();
            match self.peek() {
                Some(',') => self.position += 1,
                Some(']') => {
                    self.position += 1;
                    return Ok(());
                }
                Some(c) => return Err(format!("unexpected `{c}` at {}", self.position)),
                None => return Err("unterminated list".to_string()),
            }
        }
    }
}

fn to_values(items: Vec<Scalar>, text: bool) -> Result<Values, String> {
    if text {
        items
            .into_iter()
            .map(|item| match item {
                Scalar::Text(value) => Ok(value),
                _ => Err("mixed text and numeric values".to_string()),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Values::Text)
    } else if items.iter().any(|item| matches!(item, Scalar::Float(_))) {
        #[allow(clippy::cast_precision_loss)]
        let values = items
            .into_iter()
            .map(|item| match item {
                Scalar::Int(value) => Ok(value as f64),
                Scalar::Float(value) => Ok(value),
                Scalar::Text(_) => Err("mixed text and numeric values".to_string()),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Values::Float(values))
    } else {
        items
            .into_iter()
            .map(|item| match item {
                Scalar::Int(value) => Ok(value),
                _ => Err("mixed text and numeric values".to_string()),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Values::Int)
    }
}

/// Parse a value array such as `[[1.0, 2.0], [3.0, 4.0]]` or `[1, 2, ..., 9, 10]` into flat values.
///
/// Values after an ellipsis are returned as the tail.
pub(crate) fn parse_values(text: &str) -> Result<ParsedValues, String> {
    let mut tokenizer = Tokenizer { text, position: 0 };
    let mut items = Vec::new();
    let mut ellipsis = None;
    tokenizer.list(&mut items, &mut ellipsis)?;
    tokenizer.skip_whitespace();
    if tokenizer.position != text.len() {
        return Err(format!("trailing characters at {}", tokenizer.position));
    }

    let text = items.iter().any(|item| matches!(item, Scalar::Text(_)));
    match ellipsis {
        None => Ok(ParsedValues {
            head: to_values(items, text)?,
            tail: None,
        }),
        Some(index) => {
            let tail = items.split_off(index);
            Ok(ParsedValues {
                head: to_values(items, text)?,
                tail: Some(to_values(tail, text)?),
            })
        }
    }
}

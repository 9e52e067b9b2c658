//! Parser for permissive structured literals.
//!
//! Accepts JSON plus the literal syntax commonly produced by scripting
//! languages when they print a mapping: single-quoted strings, `u`/`r`
//! string prefixes, tuples, `True`/`False`/`None`, trailing commas and
//! `#` comments. Nothing is evaluated; the grammar only builds data.
//!
//! ```text
//! value   := mapping | list | tuple | string+ | number | constant
//! mapping := '{' (key ':' value (',' key ':' value)* ','?)? '}'
//! list    := '[' (value (',' value)* ','?)? ']'
//! tuple   := '(' (value ',' (value (',' value)* ','?)?)? ')' | '(' value ')'
//! key     := string+ | number
//! ```

use serde_json::{Map, Number, Value};
use thiserror::Error;

/// Deepest container nesting accepted before parsing gives up.
const MAX_DEPTH: usize = 128;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at position {position}")]
pub struct LiteralError {
    /// Character offset into the input.
    pub position: usize,
    pub message: String,
}

/// Parse a complete literal. Trailing non-whitespace input is an error.
pub fn parse(input: &str) -> Result<Value, LiteralError> {
    let mut parser = Parser::new(input);
    let value = parser.parse_value()?;
    parser.skip_trivia();
    if parser.peek().is_some() {
        return Err(parser.error("unexpected trailing input"));
    }
    Ok(value)
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
            depth: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn error(&self, message: impl Into<String>) -> LiteralError {
        LiteralError {
            position: self.pos,
            message: message.into(),
        }
    }

    fn expect(&mut self, wanted: char) -> Result<(), LiteralError> {
        self.skip_trivia();
        match self.peek() {
            Some(c) if c == wanted => {
                self.pos += 1;
                Ok(())
            }
            Some(c) => Err(self.error(format!("expected '{wanted}', found '{c}'"))),
            None => Err(self.error(format!("expected '{wanted}', found end of input"))),
        }
    }

    /// Skip whitespace and `#` line comments.
    fn skip_trivia(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.pos += 1;
            } else if c == '#' {
                while let Some(c) = self.bump() {
                    if c == '\n' {
                        break;
                    }
                }
            } else {
                break;
            }
        }
    }

    fn parse_value(&mut self) -> Result<Value, LiteralError> {
        self.skip_trivia();
        match self.peek() {
            None => Err(self.error("unexpected end of input")),
            Some(open @ ('{' | '[' | '(')) => {
                if self.depth == MAX_DEPTH {
                    return Err(self.error("nesting too deep"));
                }
                self.depth += 1;
                let value = match open {
                    '{' => self.parse_mapping(),
                    '[' => {
                        self.pos += 1;
                        self.parse_sequence(']').map(Value::Array)
                    }
                    _ => self.parse_tuple(),
                };
                self.depth -= 1;
                value
            }
            Some('\'' | '"') => self.parse_strings().map(Value::String),
            Some(c) if c.is_ascii_digit() || matches!(c, '-' | '+' | '.') => self.parse_number(),
            Some(c) if c.is_alphabetic() || c == '_' => {
                if self.string_prefix_len().is_some() {
                    self.parse_strings().map(Value::String)
                } else {
                    self.parse_constant()
                }
            }
            Some(c) => Err(self.error(format!("unexpected character '{c}'"))),
        }
    }

    fn parse_mapping(&mut self) -> Result<Value, LiteralError> {
        self.pos += 1;
        let mut map = Map::new();
        loop {
            self.skip_trivia();
            if self.peek() == Some('}') {
                self.pos += 1;
                return Ok(Value::Object(map));
            }

            let key_pos = self.pos;
            let key = match self.parse_value()? {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                _ => {
                    return Err(LiteralError {
                        position: key_pos,
                        message: "mapping keys must be strings or numbers".to_string(),
                    });
                }
            };
            self.expect(':')?;
            let value = self.parse_value()?;
            map.insert(key, value);

            self.skip_trivia();
            match self.bump() {
                Some(',') => continue,
                Some('}') => return Ok(Value::Object(map)),
                Some(c) => {
                    self.pos -= 1;
                    return Err(self.error(format!("expected ',' or '}}', found '{c}'")));
                }
                None => return Err(self.error("unterminated mapping")),
            }
        }
    }

    /// Items up to `close`; the opening bracket is already consumed.
    fn parse_sequence(&mut self, close: char) -> Result<Vec<Value>, LiteralError> {
        let mut items = Vec::new();
        loop {
            self.skip_trivia();
            if self.peek() == Some(close) {
                self.pos += 1;
                return Ok(items);
            }
            items.push(self.parse_value()?);

            self.skip_trivia();
            match self.bump() {
                Some(',') => continue,
                Some(c) if c == close => return Ok(items),
                Some(c) => {
                    self.pos -= 1;
                    return Err(self.error(format!("expected ',' or '{close}', found '{c}'")));
                }
                None => return Err(self.error("unterminated sequence")),
            }
        }
    }

    fn parse_tuple(&mut self) -> Result<Value, LiteralError> {
        self.pos += 1;
        self.skip_trivia();
        if self.peek() == Some(')') {
            self.pos += 1;
            return Ok(Value::Array(Vec::new()));
        }

        let first = self.parse_value()?;
        self.skip_trivia();
        match self.bump() {
            // Plain parentheses around a single value.
            Some(')') => Ok(first),
            Some(',') => {
                let mut items = vec![first];
                items.extend(self.parse_sequence(')')?);
                Ok(Value::Array(items))
            }
            Some(c) => {
                self.pos -= 1;
                Err(self.error(format!("expected ',' or ')', found '{c}'")))
            }
            None => Err(self.error("unterminated tuple")),
        }
    }

    /// Length of a `u`/`r`/`b` style prefix directly followed by a quote.
    fn string_prefix_len(&self) -> Option<usize> {
        let mut len = 0;
        while let Some(c) = self.peek_at(len) {
            if matches!(c, 'u' | 'U' | 'r' | 'R' | 'b' | 'B') && len < 2 {
                len += 1;
            } else {
                break;
            }
        }
        match self.peek_at(len) {
            Some('\'' | '"') => Some(len),
            _ => None,
        }
    }

    /// One or more adjacent string literals, concatenated.
    fn parse_strings(&mut self) -> Result<String, LiteralError> {
        let mut out = self.parse_string()?;
        loop {
            let save = self.pos;
            self.skip_trivia();
            if matches!(self.peek(), Some('\'' | '"')) || self.string_prefix_len().is_some() {
                out.push_str(&self.parse_string()?);
            } else {
                self.pos = save;
                return Ok(out);
            }
        }
    }

    fn parse_string(&mut self) -> Result<String, LiteralError> {
        let mut raw = false;
        while let Some(c) = self.peek() {
            match c {
                'r' | 'R' => raw = true,
                'u' | 'U' | 'b' | 'B' => {}
                _ => break,
            }
            self.pos += 1;
        }

        let start = self.pos;
        let quote = match self.bump() {
            Some(q @ ('\'' | '"')) => q,
            _ => return Err(self.error("expected string")),
        };

        let mut out = String::new();
        loop {
            match self.bump() {
                None => {
                    return Err(LiteralError {
                        position: start,
                        message: "unterminated string".to_string(),
                    });
                }
                Some(c) if c == quote => return Ok(out),
                Some('\\') if raw => {
                    out.push('\\');
                    if let Some(next) = self.bump() {
                        out.push(next);
                    }
                }
                Some('\\') => self.parse_escape(&mut out)?,
                Some(c) => out.push(c),
            }
        }
    }

    fn parse_escape(&mut self, out: &mut String) -> Result<(), LiteralError> {
        let Some(c) = self.bump() else {
            return Err(self.error("unterminated escape sequence"));
        };
        match c {
            '\\' => out.push('\\'),
            '\'' => out.push('\''),
            '"' => out.push('"'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            '0' => out.push('\0'),
            '/' => out.push('/'),
            // Line continuation
            '\n' => {}
            'x' => out.push(self.parse_code_point(2)?),
            'u' => out.push(self.parse_code_point(4)?),
            'U' => out.push(self.parse_code_point(8)?),
            other => {
                // Unknown escapes are kept verbatim.
                out.push('\\');
                out.push(other);
            }
        }
        Ok(())
    }

    fn parse_code_point(&mut self, digits: usize) -> Result<char, LiteralError> {
        let start = self.pos;
        let mut code = self.parse_hex(digits, start)?;

        // UTF-16 surrogate pair spelled as two \u escapes.
        if digits == 4
            && (0xD800..0xDC00).contains(&code)
            && self.peek() == Some('\\')
            && self.peek_at(1) == Some('u')
        {
            self.pos += 2;
            let low = self.parse_hex(4, start)?;
            if (0xDC00..0xE000).contains(&low) {
                code = 0x10000 + ((code - 0xD800) << 10) + (low - 0xDC00);
            }
        }

        char::from_u32(code).ok_or_else(|| LiteralError {
            position: start,
            message: format!("invalid code point {code:#x}"),
        })
    }

    fn parse_hex(&mut self, digits: usize, start: usize) -> Result<u32, LiteralError> {
        let mut code = 0u32;
        for _ in 0..digits {
            let digit = self
                .bump()
                .and_then(|c| c.to_digit(16))
                .ok_or_else(|| LiteralError {
                    position: start,
                    message: format!("expected {digits} hex digits"),
                })?;
            code = code * 16 + digit;
        }
        Ok(code)
    }

    fn parse_number(&mut self) -> Result<Value, LiteralError> {
        let start = self.pos;
        let mut text = String::new();
        if let Some(sign @ ('-' | '+')) = self.peek() {
            self.pos += 1;
            if sign == '-' {
                text.push('-');
            }
        }

        let mut is_float = false;
        while let Some(c) = self.peek() {
            match c {
                '0'..='9' => text.push(c),
                '_' => {}
                '.' => {
                    is_float = true;
                    text.push(c);
                }
                'e' | 'E' => {
                    is_float = true;
                    text.push('e');
                    if let Some(sign @ ('-' | '+')) = self.peek_at(1) {
                        text.push(sign);
                        self.pos += 1;
                    }
                }
                _ => break,
            }
            self.pos += 1;
        }

        let invalid = || LiteralError {
            position: start,
            message: format!("invalid number '{text}'"),
        };

        if !is_float {
            if let Ok(n) = text.parse::<i64>() {
                return Ok(Value::Number(n.into()));
            }
            if let Ok(n) = text.parse::<u64>() {
                return Ok(Value::Number(n.into()));
            }
        }

        // Python accepts "1." and ".5"; Rust's float parser does too.
        let f: f64 = text.parse().map_err(|_| invalid())?;
        Number::from_f64(f).map(Value::Number).ok_or_else(invalid)
    }

    fn parse_constant(&mut self) -> Result<Value, LiteralError> {
        let start = self.pos;
        let mut word = String::new();
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' {
                word.push(c);
                self.pos += 1;
            } else {
                break;
            }
        }
        match word.as_str() {
            "True" | "true" => Ok(Value::Bool(true)),
            "False" | "false" => Ok(Value::Bool(false)),
            "None" | "null" => Ok(Value::Null),
            _ => Err(LiteralError {
                position: start,
                message: format!("unknown identifier '{word}'"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parses_json() {
        let value = parse(r#"{"title": "hello", "tags": ["a", "b"], "n": 3, "ok": true}"#).unwrap();
        assert_eq!(
            value,
            json!({ "title": "hello", "tags": ["a", "b"], "n": 3, "ok": true })
        );
    }

    #[test]
    fn test_parses_single_quoted_mapping() {
        let value = parse("{'user': 'kimchy', 'post_date': '2009-11-15', 'likes': 12}").unwrap();
        assert_eq!(
            value,
            json!({ "user": "kimchy", "post_date": "2009-11-15", "likes": 12 })
        );
    }

    #[test]
    fn test_parses_scripting_constants_and_prefixes() {
        let value = parse("{u'a': True, 'b': False, 'c': None, r'd': r'\\d+'}").unwrap();
        assert_eq!(
            value,
            json!({ "a": true, "b": false, "c": null, "d": "\\d+" })
        );
    }

    #[test]
    fn test_tuples_become_arrays() {
        assert_eq!(parse("(1, 2, 3)").unwrap(), json!([1, 2, 3]));
        assert_eq!(parse("(1,)").unwrap(), json!([1]));
        assert_eq!(parse("()").unwrap(), json!([]));
        assert_eq!(parse("(42)").unwrap(), json!(42));
    }

    #[test]
    fn test_trailing_commas_and_comments() {
        let value = parse(
            "{\n  'a': [1, 2,],  # first\n  'b': {'c': 'd',},\n}\n",
        )
        .unwrap();
        assert_eq!(value, json!({ "a": [1, 2], "b": { "c": "d" } }));
    }

    #[test]
    fn test_numbers() {
        assert_eq!(parse("-7").unwrap(), json!(-7));
        assert_eq!(parse("+7").unwrap(), json!(7));
        assert_eq!(parse("1_000").unwrap(), json!(1000));
        assert_eq!(parse("2.5").unwrap(), json!(2.5));
        assert_eq!(parse("1e3").unwrap(), json!(1000.0));
        assert_eq!(parse("18446744073709551615").unwrap(), json!(u64::MAX));
    }

    #[test]
    fn test_numeric_keys_are_stringified() {
        assert_eq!(parse("{1: 'one'}").unwrap(), json!({ "1": "one" }));
    }

    #[test]
    fn test_escapes() {
        assert_eq!(
            parse(r#"'it\'s\n\t\x41é'"#).unwrap(),
            json!("it's\n\tAé")
        );
        assert_eq!(parse(r#""\ud83d\ude00""#).unwrap(), json!("\u{1F600}"));
        assert_eq!(parse(r"'\q'").unwrap(), json!("\\q"));
    }

    #[test]
    fn test_adjacent_strings_concatenate() {
        assert_eq!(parse("'foo' \"bar\"").unwrap(), json!("foobar"));
    }

    #[test]
    fn test_rejects_code() {
        let err = parse("__import__('os').system('ls')").unwrap_err();
        assert_eq!(err.position, 0);
        assert!(err.message.contains("unknown identifier"));
    }

    #[test]
    fn test_rejects_bad_structure() {
        assert!(parse("{'a' 1}").is_err());
        assert!(parse("{'a': 1").is_err());
        assert!(parse("['a' 'b' 1]").is_err());
        assert!(parse("{[1]: 2}").is_err());
        assert!(parse("'open").is_err());
        assert!(parse("").is_err());
        assert!(parse("{} {}").is_err());
        assert!(parse("{1, 2}").is_err());
    }

    #[test]
    fn test_error_position_points_at_problem() {
        let err = parse("{'a': 1, 'b': @}").unwrap_err();
        assert_eq!(err.position, 14);
    }

    #[test]
    fn test_deep_nesting_is_an_error_not_a_crash() {
        let err = parse(&"[".repeat(200_000)).unwrap_err();
        assert_eq!(err.message, "nesting too deep");
        assert_eq!(err.position, MAX_DEPTH);

        let err = parse(&"{'a': (".repeat(1_000)).unwrap_err();
        assert_eq!(err.message, "nesting too deep");
    }

    #[test]
    fn test_nesting_up_to_the_limit_parses() {
        let input = format!("{}{}", "[".repeat(MAX_DEPTH), "]".repeat(MAX_DEPTH));
        let mut value = parse(&input).unwrap();
        let mut levels = 1;
        while let Value::Array(mut items) = value {
            match items.pop() {
                Some(inner) => {
                    value = inner;
                    levels += 1;
                }
                None => break,
            }
        }
        assert_eq!(levels, MAX_DEPTH);
    }
}

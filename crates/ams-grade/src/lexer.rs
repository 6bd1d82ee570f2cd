use ams_core::errors::{ErrorInfo, GradeError};

/// Reserved words of the assertion language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    /// `and`
    And,
    /// `or`
    Or,
    /// `not`
    Not,
    /// `in`
    In,
    /// `is`
    Is,
    /// `for`
    For,
    /// `if`
    If,
    /// `True`
    True,
    /// `False`
    False,
    /// `None`
    None,
}

impl Keyword {
    fn from_word(word: &str) -> Option<Self> {
        Some(match word {
            "and" => Keyword::And,
            "or" => Keyword::Or,
            "not" => Keyword::Not,
            "in" => Keyword::In,
            "is" => Keyword::Is,
            "for" => Keyword::For,
            "if" => Keyword::If,
            "True" => Keyword::True,
            "False" => Keyword::False,
            "None" => Keyword::None,
            _ => return None,
        })
    }
}

/// Lexical token.
#[derive(Debug, Clone, PartialEq)]
pub enum Tok {
    /// Identifier.
    Name(String),
    /// Reserved word.
    Keyword(Keyword),
    /// Integer literal.
    Int(i64),
    /// Float literal.
    Float(f64),
    /// String literal with escapes resolved.
    Str(String),
    /// `...`
    Ellipsis,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `,`
    Comma,
    /// `.`
    Dot,
    /// `=`
    Assign,
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `**`
    DoubleStar,
    /// `/`
    Slash,
    /// `//`
    DoubleSlash,
    /// `%`
    Percent,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `==`
    EqEq,
    /// `!=`
    NotEq,
}

/// Token with its byte offset in the source.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    /// The token.
    pub tok: Tok,
    /// Byte offset of the first character.
    pub offset: usize,
}

pub(crate) fn syntax_error(code: &str, message: impl Into<String>, offset: usize) -> GradeError {
    GradeError::Syntax(
        ErrorInfo::new(code, message.into()).with_context("offset", offset.to_string()),
    )
}

/// Splits a statement into tokens. Comments run to the end of the line and
/// newlines count as whitespace.
pub fn tokenize(source: &str) -> Result<Vec<Spanned>, GradeError> {
    let chars: Vec<(usize, char)> = source.char_indices().collect();
    let mut tokens = Vec::new();
    let mut pos = 0;
    while pos < chars.len() {
        let (offset, ch) = chars[pos];
        let next = chars.get(pos + 1).map(|(_, c)| *c);
        if ch.is_whitespace() {
            pos += 1;
            continue;
        }
        if ch == '#' {
            while pos < chars.len() && chars[pos].1 != '\n' {
                pos += 1;
            }
            continue;
        }
        if ch.is_ascii_digit() || (ch == '.' && next.is_some_and(|c| c.is_ascii_digit())) {
            let (tok, consumed) = lex_number(&chars[pos..], offset)?;
            tokens.push(Spanned { tok, offset });
            pos += consumed;
            continue;
        }
        if ch.is_alphabetic() || ch == '_' {
            let start = pos;
            while pos < chars.len() && (chars[pos].1.is_alphanumeric() || chars[pos].1 == '_') {
                pos += 1;
            }
            let word: String = chars[start..pos].iter().map(|(_, c)| *c).collect();
            let tok = match Keyword::from_word(&word) {
                Some(keyword) => Tok::Keyword(keyword),
                None => Tok::Name(word),
            };
            tokens.push(Spanned { tok, offset });
            continue;
        }
        if ch == '\'' || ch == '"' {
            let (text, consumed) = lex_string(&chars[pos..], offset)?;
            tokens.push(Spanned {
                tok: Tok::Str(text),
                offset,
            });
            pos += consumed;
            continue;
        }
        let third = chars.get(pos + 2).map(|(_, c)| *c);
        let (tok, width) = match (ch, next) {
            ('.', Some('.')) if third == Some('.') => (Tok::Ellipsis, 3),
            ('*', Some('*')) => (Tok::DoubleStar, 2),
            ('/', Some('/')) => (Tok::DoubleSlash, 2),
            ('<', Some('=')) => (Tok::Le, 2),
            ('>', Some('=')) => (Tok::Ge, 2),
            ('=', Some('=')) => (Tok::EqEq, 2),
            ('!', Some('=')) => (Tok::NotEq, 2),
            ('(', _) => (Tok::LParen, 1),
            (')', _) => (Tok::RParen, 1),
            ('[', _) => (Tok::LBracket, 1),
            (']', _) => (Tok::RBracket, 1),
            (',', _) => (Tok::Comma, 1),
            ('.', _) => (Tok::Dot, 1),
            ('=', _) => (Tok::Assign, 1),
            ('+', _) => (Tok::Plus, 1),
            ('-', _) => (Tok::Minus, 1),
            ('*', _) => (Tok::Star, 1),
            ('/', _) => (Tok::Slash, 1),
            ('%', _) => (Tok::Percent, 1),
            ('<', _) => (Tok::Lt, 1),
            ('>', _) => (Tok::Gt, 1),
            _ => {
                return Err(syntax_error(
                    "invalid-character",
                    format!("invalid character {ch:?}"),
                    offset,
                ))
            }
        };
        tokens.push(Spanned { tok, offset });
        pos += width;
    }
    Ok(tokens)
}

fn lex_number(chars: &[(usize, char)], offset: usize) -> Result<(Tok, usize), GradeError> {
    let mut text = String::new();
    let mut pos = 0;
    let mut is_float = false;
    let digits = |pos: &mut usize, text: &mut String| {
        while *pos < chars.len() && (chars[*pos].1.is_ascii_digit() || chars[*pos].1 == '_') {
            if chars[*pos].1 != '_' {
                text.push(chars[*pos].1);
            }
            *pos += 1;
        }
    };
    digits(&mut pos, &mut text);
    if pos < chars.len() && chars[pos].1 == '.' {
        // `1..` never appears, but `x.sum` must not be eaten as a float.
        let after = chars.get(pos + 1).map(|(_, c)| *c);
        if !after.is_some_and(|c| c.is_alphabetic() || c == '_' || c == '.') {
            is_float = true;
            text.push('.');
            pos += 1;
            digits(&mut pos, &mut text);
        }
    }
    if pos < chars.len() && matches!(chars[pos].1, 'e' | 'E') {
        let mut look = pos + 1;
        let mut exponent = String::from("e");
        if look < chars.len() && matches!(chars[look].1, '+' | '-') {
            exponent.push(chars[look].1);
            look += 1;
        }
        if look < chars.len() && chars[look].1.is_ascii_digit() {
            is_float = true;
            pos = look;
            text.push_str(&exponent);
            digits(&mut pos, &mut text);
        }
    }
    let tok = if is_float {
        Tok::Float(
            text.parse()
                .map_err(|_| syntax_error("invalid-number", format!("bad float {text}"), offset))?,
        )
    } else {
        Tok::Int(text.parse().map_err(|_| {
            syntax_error("invalid-number", format!("integer {text} out of range"), offset)
        })?)
    };
    Ok((tok, pos))
}

fn lex_string(chars: &[(usize, char)], offset: usize) -> Result<(String, usize), GradeError> {
    let quote = chars[0].1;
    let mut text = String::new();
    let mut pos = 1;
    while pos < chars.len() {
        let ch = chars[pos].1;
        if ch == quote {
            return Ok((text, pos + 1));
        }
        if ch == '\n' {
            break;
        }
        if ch == '\\' {
            let escaped = chars.get(pos + 1).map(|(_, c)| *c).ok_or_else(|| {
                syntax_error("unterminated-string", "unterminated string literal", offset)
            })?;
            match escaped {
                'n' => text.push('\n'),
                't' => text.push('\t'),
                '\\' | '\'' | '"' => text.push(escaped),
                other => {
                    text.push('\\');
                    text.push(other);
                }
            }
            pos += 2;
            continue;
        }
        text.push(ch);
        pos += 1;
    }
    Err(syntax_error(
        "unterminated-string",
        "unterminated string literal",
        offset,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(source: &str) -> Vec<Tok> {
        tokenize(source)
            .unwrap()
            .into_iter()
            .map(|spanned| spanned.tok)
            .collect()
    }

    #[test]
    fn method_chains_are_not_floats() {
        assert_eq!(
            toks("x.sum(axis=1)"),
            vec![
                Tok::Name("x".into()),
                Tok::Dot,
                Tok::Name("sum".into()),
                Tok::LParen,
                Tok::Name("axis".into()),
                Tok::Assign,
                Tok::Int(1),
                Tok::RParen,
            ]
        );
    }

    #[test]
    fn numbers_ellipsis_and_comments() {
        assert_eq!(
            toks("0 <= 0.01 is not ... # trailing"),
            vec![
                Tok::Int(0),
                Tok::Le,
                Tok::Float(0.01),
                Tok::Keyword(Keyword::Is),
                Tok::Keyword(Keyword::Not),
                Tok::Ellipsis,
            ]
        );
        assert_eq!(toks("1e-3"), vec![Tok::Float(0.001)]);
        assert_eq!(toks("1_000"), vec![Tok::Int(1000)]);
    }

    #[test]
    fn unterminated_strings_fail() {
        let err = tokenize("'Had AMS").unwrap_err();
        assert_eq!(err.code(), "unterminated-string");
    }
}

//! Tokenizer for the stat language
//!
//! Every token records the byte offset where it ends so parse errors can
//! quote the input up to the offending token.

use crate::errors::EvalError;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Num(f64),
    Str(String),
    Ident(String),
    True,
    False,
    Null,

    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    Colon,
    Modulo, // %%
    Bang,

    LArrow, // <-
    Assign, // =

    EqEq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,

    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Semi,

    Eof,
}

impl TokenKind {
    /// How a parse error names this token
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Num(_) => "numeric constant".into(),
            TokenKind::Str(_) => "string constant".into(),
            TokenKind::Ident(_) | TokenKind::True | TokenKind::False | TokenKind::Null => "symbol".into(),
            TokenKind::Eof => "end of input".into(),
            other => format!("'{}'", other.symbol()),
        }
    }

    fn symbol(&self) -> &'static str {
        match self {
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Caret => "^",
            TokenKind::Colon => ":",
            TokenKind::Modulo => "%%",
            TokenKind::Bang => "!",
            TokenKind::LArrow => "<-",
            TokenKind::Assign => "=",
            TokenKind::EqEq => "==",
            TokenKind::NotEq => "!=",
            TokenKind::Lt => "<",
            TokenKind::Le => "<=",
            TokenKind::Gt => ">",
            TokenKind::Ge => ">=",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::Comma => ",",
            TokenKind::Semi => ";",
            _ => "",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Byte offset just past the token
    pub end: usize,
}

pub fn tokenize(source: &str) -> Result<Vec<Token>, EvalError> {
    let mut tokens = Vec::new();
    let mut chars = source.char_indices().peekable();

    while let Some(&(start, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }
        if c == '#' {
            break;
        }

        let kind = if c.is_ascii_digit() || (c == '.' && next_is_digit(source, start + 1)) {
            let mut end = start;
            let mut prev = '\0';
            while let Some(&(i, d)) = chars.peek() {
                let exponent_sign = (d == '+' || d == '-') && (prev == 'e' || prev == 'E');
                if d.is_ascii_digit() || d == '.' || d == 'e' || d == 'E' || exponent_sign {
                    prev = d;
                    end = i + d.len_utf8();
                    chars.next();
                } else {
                    break;
                }
            }
            let text = &source[start..end];
            let n = text.parse::<f64>().map_err(|_| {
                EvalError::recognized(format!("unexpected input in \"{}\"", &source[..end]))
            })?;
            TokenKind::Num(n)
        } else if c.is_alphabetic() || c == '.' {
            let mut end = start;
            while let Some(&(i, d)) = chars.peek() {
                if d.is_alphanumeric() || d == '.' || d == '_' {
                    end = i + d.len_utf8();
                    chars.next();
                } else {
                    break;
                }
            }
            match &source[start..end] {
                "TRUE" | "T" => TokenKind::True,
                "FALSE" | "F" => TokenKind::False,
                "NULL" => TokenKind::Null,
                "Inf" => TokenKind::Num(f64::INFINITY),
                "NaN" => TokenKind::Num(f64::NAN),
                ident => TokenKind::Ident(ident.to_string()),
            }
        } else if c == '"' || c == '\'' {
            chars.next();
            let mut s = String::new();
            let mut closed = false;
            while let Some((_, d)) = chars.next() {
                match d {
                    '\\' => match chars.next() {
                        Some((_, 'n')) => s.push('\n'),
                        Some((_, 't')) => s.push('\t'),
                        Some((_, e)) => s.push(e),
                        None => break,
                    },
                    d if d == c => {
                        closed = true;
                        break;
                    }
                    d => s.push(d),
                }
            }
            if !closed {
                return Err(EvalError::recognized(format!(
                    "unexpected INCOMPLETE_STRING in \"{}\"",
                    source
                )));
            }
            TokenKind::Str(s)
        } else {
            chars.next();
            let next = chars.peek().map(|&(_, d)| d);
            let mut two = |kind: TokenKind| {
                chars.next();
                kind
            };
            match (c, next) {
                ('<', Some('-')) => two(TokenKind::LArrow),
                ('<', Some('=')) => two(TokenKind::Le),
                ('>', Some('=')) => two(TokenKind::Ge),
                ('=', Some('=')) => two(TokenKind::EqEq),
                ('!', Some('=')) => two(TokenKind::NotEq),
                ('%', Some('%')) => two(TokenKind::Modulo),
                ('<', _) => TokenKind::Lt,
                ('>', _) => TokenKind::Gt,
                ('=', _) => TokenKind::Assign,
                ('!', _) => TokenKind::Bang,
                ('+', _) => TokenKind::Plus,
                ('-', _) => TokenKind::Minus,
                ('*', _) => TokenKind::Star,
                ('/', _) => TokenKind::Slash,
                ('^', _) => TokenKind::Caret,
                (':', _) => TokenKind::Colon,
                ('(', _) => TokenKind::LParen,
                (')', _) => TokenKind::RParen,
                ('[', _) => TokenKind::LBracket,
                (']', _) => TokenKind::RBracket,
                (',', _) => TokenKind::Comma,
                (';', _) => TokenKind::Semi,
                _ => {
                    return Err(EvalError::recognized(format!(
                        "unexpected input in \"{}\"",
                        &source[..start + c.len_utf8()]
                    )))
                }
            }
        };

        let end = chars.peek().map(|&(i, _)| i).unwrap_or(source.len());
        tokens.push(Token { kind, end });
    }

    tokens.push(Token { kind: TokenKind::Eof, end: source.len() });
    Ok(tokens)
}

fn next_is_digit(source: &str, at: usize) -> bool {
    source[at..].chars().next().is_some_and(|c| c.is_ascii_digit())
}

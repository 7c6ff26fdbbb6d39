//! Tokenizer for the Go-subset grammar `dingo-goast` understands.

use crate::position::{FileSet, Position};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Ident(String),
    Int(String),
    Float(String),
    String(String),
    Comment(String),
    // keywords
    Package,
    Import,
    Func,
    Type,
    Struct,
    Interface,
    Map,
    Chan,
    Var,
    Const,
    Return,
    If,
    Else,
    Switch,
    Case,
    Default,
    // punctuation
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Dot,
    Colon,
    Semi,
    Assign,
    Define,
    Arrow,
    Star,
    Amp,
    Bang,
    Plus,
    Minus,
    Slash,
    Percent,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    AndAnd,
    OrOr,
    Ellipsis,
    Eof,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub pos: Position,
}

#[derive(Debug, thiserror::Error)]
#[error("lex error at {pos:?}: {message}")]
pub struct LexError {
    pub pos: Position,
    pub message: String,
}

pub fn lex(source: &str) -> Result<Vec<Token>, LexError> {
    let fs = FileSet::new(source);
    let bytes = source.as_bytes();
    let mut i = 0usize;
    let mut tokens = Vec::new();
    let mut last_significant: Option<TokenKind> = None;

    while i < bytes.len() {
        let c = bytes[i];
        if c == b'\n' {
            // Go-style automatic semicolon insertion after certain tokens,
            // simplified to the subset this grammar needs.
            if matches!(
                last_significant,
                Some(
                    TokenKind::Ident(_)
                        | TokenKind::Int(_)
                        | TokenKind::Float(_)
                        | TokenKind::String(_)
                        | TokenKind::RParen
                        | TokenKind::RBrace
                        | TokenKind::RBracket
                        | TokenKind::Return
                )
            ) {
                tokens.push(Token {
                    kind: TokenKind::Semi,
                    pos: fs.position(i),
                });
                last_significant = Some(TokenKind::Semi);
            }
            i += 1;
            continue;
        }
        if c.is_ascii_whitespace() {
            i += 1;
            continue;
        }
        if bytes[i..].starts_with(b"//") {
            let start = i;
            while i < bytes.len() && bytes[i] != b'\n' {
                i += 1;
            }
            let text = source[start..i].to_string();
            tokens.push(Token {
                kind: TokenKind::Comment(text.clone()),
                pos: fs.position(start),
            });
            continue;
        }
        if bytes[i..].starts_with(b"/*") {
            let start = i;
            i += 2;
            while i + 1 < bytes.len() && !bytes[i..].starts_with(b"*/") {
                i += 1;
            }
            i = (i + 2).min(bytes.len());
            let text = source[start..i].to_string();
            tokens.push(Token {
                kind: TokenKind::Comment(text),
                pos: fs.position(start),
            });
            continue;
        }
        if c == b'"' || c == b'`' {
            let quote = c;
            let start = i;
            let pos = fs.position(i);
            i += 1;
            while i < bytes.len() && bytes[i] != quote {
                if bytes[i] == b'\\' && quote == b'"' {
                    i += 1;
                }
                i += 1;
            }
            i = (i + 1).min(bytes.len());
            let text = source[start..i].to_string();
            push(&mut tokens, &mut last_significant, TokenKind::String(text), pos);
            continue;
        }
        if c.is_ascii_digit() {
            let start = i;
            let pos = fs.position(i);
            let mut is_float = false;
            while i < bytes.len()
                && (bytes[i].is_ascii_digit() || bytes[i] == b'.' || bytes[i] == b'_')
            {
                if bytes[i] == b'.' {
                    is_float = true;
                }
                i += 1;
            }
            let text = source[start..i].to_string();
            let kind = if is_float {
                TokenKind::Float(text)
            } else {
                TokenKind::Int(text)
            };
            push(&mut tokens, &mut last_significant, kind, pos);
            continue;
        }
        if c.is_ascii_alphabetic() || c == b'_' {
            let start = i;
            let pos = fs.position(i);
            while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                i += 1;
            }
            let text = &source[start..i];
            let kind = match text {
                "package" => TokenKind::Package,
                "import" => TokenKind::Import,
                "func" => TokenKind::Func,
                "type" => TokenKind::Type,
                "struct" => TokenKind::Struct,
                "interface" => TokenKind::Interface,
                "map" => TokenKind::Map,
                "chan" => TokenKind::Chan,
                "var" => TokenKind::Var,
                "const" => TokenKind::Const,
                "return" => TokenKind::Return,
                "if" => TokenKind::If,
                "else" => TokenKind::Else,
                "switch" => TokenKind::Switch,
                "case" => TokenKind::Case,
                "default" => TokenKind::Default,
                _ => TokenKind::Ident(text.to_string()),
            };
            push(&mut tokens, &mut last_significant, kind, pos);
            continue;
        }
        let pos = fs.position(i);
        macro_rules! two {
            ($a:expr, $b:expr, $two:expr, $one:expr) => {{
                if i + 1 < bytes.len() && bytes[i + 1] == $b {
                    i += 2;
                    $two
                } else {
                    i += 1;
                    $one
                }
            }};
        }
        let kind = match c {
            b'(' => {
                i += 1;
                TokenKind::LParen
            }
            b')' => {
                i += 1;
                TokenKind::RParen
            }
            b'{' => {
                i += 1;
                TokenKind::LBrace
            }
            b'}' => {
                i += 1;
                TokenKind::RBrace
            }
            b'[' => {
                i += 1;
                TokenKind::LBracket
            }
            b']' => {
                i += 1;
                TokenKind::RBracket
            }
            b',' => {
                i += 1;
                TokenKind::Comma
            }
            b'.' => {
                if bytes[i..].starts_with(b"...") {
                    i += 3;
                    TokenKind::Ellipsis
                } else {
                    i += 1;
                    TokenKind::Dot
                }
            }
            b':' => two!(b':', b'=', { TokenKind::Define }, TokenKind::Colon),
            b';' => {
                i += 1;
                TokenKind::Semi
            }
            b'=' => two!(b'=', b'=', { TokenKind::Eq }, TokenKind::Assign),
            b'!' => two!(b'!', b'=', { TokenKind::Ne }, TokenKind::Bang),
            b'<' => two!(b'<', b'=', { TokenKind::Le }, TokenKind::Lt),
            b'>' => two!(b'>', b'=', { TokenKind::Ge }, TokenKind::Gt),
            b'&' => two!(b'&', b'&', { TokenKind::AndAnd }, TokenKind::Amp),
            b'|' => {
                if i + 1 < bytes.len() && bytes[i + 1] == b'|' {
                    i += 2;
                    TokenKind::OrOr
                } else {
                    return Err(LexError {
                        pos,
                        message: "bare '|' is not supported".to_string(),
                    });
                }
            }
            b'+' => {
                i += 1;
                TokenKind::Plus
            }
            b'-' => {
                if i + 1 < bytes.len() && bytes[i + 1] == b'>' {
                    i += 2;
                    TokenKind::Arrow
                } else {
                    i += 1;
                    TokenKind::Minus
                }
            }
            b'*' => {
                i += 1;
                TokenKind::Star
            }
            b'/' => {
                i += 1;
                TokenKind::Slash
            }
            b'%' => {
                i += 1;
                TokenKind::Percent
            }
            other => {
                return Err(LexError {
                    pos,
                    message: format!("unexpected byte {:?}", other as char),
                })
            }
        };
        push(&mut tokens, &mut last_significant, kind, pos);
    }
    tokens.push(Token {
        kind: TokenKind::Eof,
        pos: fs.position(bytes.len()),
    });
    Ok(tokens)
}

fn push(tokens: &mut Vec<Token>, last: &mut Option<TokenKind>, kind: TokenKind, pos: Position) {
    if !matches!(kind, TokenKind::Comment(_)) {
        *last = Some(kind.clone());
    }
    tokens.push(Token { kind, pos });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        lex(src).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn lexes_package_clause() {
        let k = kinds("package main\n");
        assert_eq!(
            k,
            vec![
                TokenKind::Package,
                TokenKind::Ident("main".into()),
                TokenKind::Semi,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn lexes_define_vs_assign() {
        let k = kinds("x := 1\ny = 2");
        assert!(k.contains(&TokenKind::Define));
        assert!(k.contains(&TokenKind::Assign));
    }

    #[test]
    fn lexes_string_and_comment() {
        let k = kinds("\"hi\" // trailing\n");
        assert!(matches!(k[0], TokenKind::String(_)));
        assert!(matches!(k[1], TokenKind::Comment(_)));
    }
}

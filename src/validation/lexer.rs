//! Tokenizer for validation snippets.
//!
//! Follows the same peekable-character approach as the rest of the
//! codebase's small parsers. Newlines are significant: they separate
//! statements, like `;`.

use super::SnippetError;

/// A token in the snippet language.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Ident(String),
    Number(f64),
    Str(String),
    True,
    False,
    Null,
    Let,
    Debug,
    Return,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Dot,
    Comma,
    /// Statement separator: `;` or a newline.
    Separator,
    Assign,
    Bang,
    Plus,
    Minus,
    Star,
    Slash,
    Lt,
    Le,
    Gt,
    Ge,
    EqEq,
    NotEq,
    AndAnd,
    OrOr,
}

/// Tokenizes a snippet.
pub fn tokenize(input: &str) -> Result<Vec<Token>, SnippetError> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            ' ' | '\t' | '\r' => {
                chars.next();
            }
            '\n' | ';' => {
                chars.next();
                tokens.push(Token::Separator);
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            '[' => {
                chars.next();
                tokens.push(Token::LBracket);
            }
            ']' => {
                chars.next();
                tokens.push(Token::RBracket);
            }
            '.' => {
                chars.next();
                tokens.push(Token::Dot);
            }
            ',' => {
                chars.next();
                tokens.push(Token::Comma);
            }
            '+' => {
                chars.next();
                tokens.push(Token::Plus);
            }
            '-' => {
                chars.next();
                tokens.push(Token::Minus);
            }
            '*' => {
                chars.next();
                tokens.push(Token::Star);
            }
            '/' => {
                chars.next();
                if chars.peek() == Some(&'/') {
                    // Line comment: skip to end of line, keep the newline
                    // so it still separates statements.
                    while let Some(&n) = chars.peek() {
                        if n == '\n' {
                            break;
                        }
                        chars.next();
                    }
                } else {
                    tokens.push(Token::Slash);
                }
            }
            '!' => {
                chars.next();
                if chars.peek() == Some(&'=') {
                    chars.next();
                    tokens.push(Token::NotEq);
                } else {
                    tokens.push(Token::Bang);
                }
            }
            '=' => {
                chars.next();
                if chars.peek() == Some(&'=') {
                    chars.next();
                    tokens.push(Token::EqEq);
                } else {
                    tokens.push(Token::Assign);
                }
            }
            '<' => {
                chars.next();
                if chars.peek() == Some(&'=') {
                    chars.next();
                    tokens.push(Token::Le);
                } else {
                    tokens.push(Token::Lt);
                }
            }
            '>' => {
                chars.next();
                if chars.peek() == Some(&'=') {
                    chars.next();
                    tokens.push(Token::Ge);
                } else {
                    tokens.push(Token::Gt);
                }
            }
            '&' => {
                chars.next();
                if chars.peek() == Some(&'&') {
                    chars.next();
                    tokens.push(Token::AndAnd);
                } else {
                    return Err(SnippetError::new("unexpected character '&' (use '&&')"));
                }
            }
            '|' => {
                chars.next();
                if chars.peek() == Some(&'|') {
                    chars.next();
                    tokens.push(Token::OrOr);
                } else {
                    return Err(SnippetError::new("unexpected character '|' (use '||')"));
                }
            }
            '"' | '\'' => {
                chars.next();
                tokens.push(Token::Str(collect_string(&mut chars, c)?));
            }
            _ if c.is_ascii_digit() => {
                tokens.push(Token::Number(collect_number(&mut chars)?));
            }
            _ if c.is_alphabetic() || c == '_' => {
                let word = collect_ident(&mut chars);
                tokens.push(keyword_or_ident(word));
            }
            _ => {
                return Err(SnippetError::new(format!("unexpected character '{c}'")));
            }
        }
    }

    Ok(tokens)
}

/// Collects a quoted string, handling escape sequences.
fn collect_string(
    chars: &mut std::iter::Peekable<std::str::Chars>,
    quote: char,
) -> Result<String, SnippetError> {
    let mut s = String::new();

    while let Some(c) = chars.next() {
        if c == quote {
            return Ok(s);
        }
        if c == '\\' {
            match chars.next() {
                Some('n') => s.push('\n'),
                Some('t') => s.push('\t'),
                Some(other) => s.push(other),
                None => break,
            }
        } else {
            s.push(c);
        }
    }

    Err(SnippetError::new("unterminated string literal"))
}

/// Collects a number literal (integer or decimal).
fn collect_number(
    chars: &mut std::iter::Peekable<std::str::Chars>,
) -> Result<f64, SnippetError> {
    let mut s = String::new();

    while let Some(&c) = chars.peek() {
        if c.is_ascii_digit() {
            s.push(c);
            chars.next();
        } else if c == '.' {
            // Only consume the dot when a digit follows; otherwise it is
            // member access on a number-ish identifier and the parser
            // will reject it.
            let mut lookahead = chars.clone();
            lookahead.next();
            match lookahead.peek() {
                Some(d) if d.is_ascii_digit() => {
                    if s.contains('.') {
                        return Err(SnippetError::new(format!(
                            "malformed number literal '{s}.'"
                        )));
                    }
                    s.push('.');
                    chars.next();
                }
                _ => break,
            }
        } else {
            break;
        }
    }

    s.parse::<f64>()
        .map_err(|_| SnippetError::new(format!("malformed number literal '{s}'")))
}

/// Collects an identifier.
fn collect_ident(chars: &mut std::iter::Peekable<std::str::Chars>) -> String {
    let mut s = String::new();

    while let Some(&c) = chars.peek() {
        if c.is_alphanumeric() || c == '_' {
            s.push(c);
            chars.next();
        } else {
            break;
        }
    }

    s
}

/// Maps reserved words onto keyword tokens.
fn keyword_or_ident(word: String) -> Token {
    match word.as_str() {
        "let" => Token::Let,
        "debug" => Token::Debug,
        "return" => Token::Return,
        "true" => Token::True,
        "false" => Token::False,
        "null" => Token::Null,
        _ => Token::Ident(word),
    }
}

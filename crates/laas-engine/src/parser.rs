// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Parser for the textual formula syntax.
//!
//! ```text
//! equiv := impl ("<=>" equiv)?
//! impl  := or ("=>" impl)?
//! or    := and ("|" and)*
//! and   := unary ("&" unary)*
//! unary := "~" unary | atom
//! atom  := "$true" | "$false" | "(" equiv ")" | pbc | VAR
//! pbc   := term ("+" term)* CMP INT
//! term  := (INT "*")? "~"? VAR
//! ```
//!
//! A pseudo-Boolean constraint is recognised by lookahead: an integer, or a
//! (possibly negated) variable directly followed by `+` or a comparator.
//!
//! Input that parses but is out of bounds is rejected rather than reported
//! as a syntax error: operators nested deeper than [`MAX_NESTING`], and
//! constraints outside [`Pbc::MAX_MAGNITUDE`].

use thiserror::Error;

use crate::error::{EngineError, Result};
use crate::formula::{Comparator, Formula, Literal, Pbc};

/// Deepest accepted chain of negations, parentheses and binary operators.
pub const MAX_NESTING: usize = 128;

/// Syntax error with the byte offset where it was detected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at position {position}")]
pub struct ParseError {
    /// What went wrong.
    pub message: String,
    /// Byte offset into the input.
    pub position: usize,
}

impl ParseError {
    fn new(message: impl Into<String>, position: usize) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }
}

/// Parse formula text.
pub fn parse(input: &str) -> Result<Formula> {
    parse_syntax(input).map_err(|failure| match failure {
        Failure::Syntax(source) => EngineError::Parse {
            input: input.to_string(),
            source,
        },
        Failure::OutOfBounds(message) => EngineError::Rejected(message),
    })
}

/// Parse every text, failing on the first that does not parse.
pub fn parse_all<'a>(inputs: impl IntoIterator<Item = &'a str>) -> Result<Vec<Formula>> {
    inputs.into_iter().map(parse).collect()
}

enum Failure {
    Syntax(ParseError),
    OutOfBounds(String),
}

impl From<ParseError> for Failure {
    fn from(err: ParseError) -> Self {
        Failure::Syntax(err)
    }
}

fn parse_syntax(input: &str) -> Parsed<Formula> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err(ParseError::new("empty formula", 0).into());
    }
    let mut parser = Parser {
        tokens,
        pos: 0,
        end: input.len(),
        depth: 0,
    };
    let formula = parser.equivalence()?;
    match parser.tokens.get(parser.pos) {
        None => Ok(formula),
        Some((token, at)) => Err(ParseError::new(format!("unexpected {token:?}"), *at).into()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Var(String),
    Int(i64),
    True,
    False,
    Not,
    And,
    Or,
    Impl,
    Equiv,
    LParen,
    RParen,
    Plus,
    Star,
    Cmp(Comparator),
}

fn is_var_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '@'
}

fn is_var_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '@' || c == '#'
}

fn tokenize(input: &str) -> std::result::Result<Vec<(Token, usize)>, ParseError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(at, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }
        if is_var_start(c) || c == '$' {
            let mut word = String::new();
            word.push(c);
            chars.next();
            while let Some(&(_, c)) = chars.peek() {
                if !is_var_char(c) {
                    break;
                }
                word.push(c);
                chars.next();
            }
            let token = match word.as_str() {
                "$true" => Token::True,
                "$false" => Token::False,
                w if w.starts_with('$') => {
                    return Err(ParseError::new(format!("unknown constant '{w}'"), at));
                }
                _ => Token::Var(word),
            };
            tokens.push((token, at));
            continue;
        }
        if c.is_ascii_digit() || c == '-' {
            let mut digits = String::new();
            digits.push(c);
            chars.next();
            while let Some(&(_, c)) = chars.peek() {
                if !c.is_ascii_digit() {
                    break;
                }
                digits.push(c);
                chars.next();
            }
            let value = digits
                .parse::<i64>()
                .map_err(|_| ParseError::new(format!("invalid number '{digits}'"), at))?;
            tokens.push((Token::Int(value), at));
            continue;
        }

        chars.next();
        let next = chars.peek().map(|&(_, c)| c);
        let token = match (c, next) {
            ('~', _) => Token::Not,
            ('&', _) => Token::And,
            ('|', _) => Token::Or,
            ('(', _) => Token::LParen,
            (')', _) => Token::RParen,
            ('+', _) => Token::Plus,
            ('*', _) => Token::Star,
            ('=', Some('>')) => {
                chars.next();
                Token::Impl
            }
            ('=', _) => Token::Cmp(Comparator::Eq),
            ('<', Some('=')) => {
                chars.next();
                if chars.peek().map(|&(_, c)| c) == Some('>') {
                    chars.next();
                    Token::Equiv
                } else {
                    Token::Cmp(Comparator::Le)
                }
            }
            ('<', _) => Token::Cmp(Comparator::Lt),
            ('>', Some('=')) => {
                chars.next();
                Token::Cmp(Comparator::Ge)
            }
            ('>', _) => Token::Cmp(Comparator::Gt),
            (other, _) => {
                return Err(ParseError::new(format!("unexpected character '{other}'"), at));
            }
        };
        tokens.push((token, at));
    }
    Ok(tokens)
}

struct Parser {
    tokens: Vec<(Token, usize)>,
    pos: usize,
    end: usize,
    depth: usize,
}

type Parsed<T> = std::result::Result<T, Failure>;

impl Parser {
    fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.pos + offset).map(|(t, _)| t)
    }

    fn peek(&self) -> Option<&Token> {
        self.peek_at(0)
    }

    fn position(&self) -> usize {
        self.tokens.get(self.pos).map_or(self.end, |(_, at)| *at)
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn error<T>(&self, expected: &str) -> Parsed<T> {
        let found = match self.peek() {
            Some(token) => format!("{token:?}"),
            None => "end of input".to_string(),
        };
        Err(ParseError::new(
            format!("expected {expected}, found {found}"),
            self.position(),
        )
        .into())
    }

    /// Run `rule` one nesting level deeper.
    fn nested<T>(&mut self, rule: fn(&mut Self) -> Parsed<T>) -> Parsed<T> {
        if self.depth >= MAX_NESTING {
            return Err(Failure::OutOfBounds(format!(
                "formula is nested deeper than {MAX_NESTING} levels"
            )));
        }
        self.depth += 1;
        let result = rule(self);
        self.depth -= 1;
        result
    }

    fn equivalence(&mut self) -> Parsed<Formula> {
        let left = self.implication()?;
        if self.eat(&Token::Equiv) {
            let right = self.nested(Self::equivalence)?;
            return Ok(Formula::equivalence(left, right));
        }
        Ok(left)
    }

    fn implication(&mut self) -> Parsed<Formula> {
        let left = self.disjunction()?;
        if self.eat(&Token::Impl) {
            let right = self.nested(Self::implication)?;
            return Ok(Formula::implication(left, right));
        }
        Ok(left)
    }

    fn disjunction(&mut self) -> Parsed<Formula> {
        let mut operands = vec![self.conjunction()?];
        while self.eat(&Token::Or) {
            operands.push(self.conjunction()?);
        }
        Ok(Formula::or(operands))
    }

    fn conjunction(&mut self) -> Parsed<Formula> {
        let mut operands = vec![self.unary()?];
        while self.eat(&Token::And) {
            operands.push(self.unary()?);
        }
        Ok(Formula::and(operands))
    }

    fn unary(&mut self) -> Parsed<Formula> {
        if self.peek() == Some(&Token::Not) {
            if matches!(self.peek_at(1), Some(Token::Var(_))) && self.continues_pbc(2) {
                return self.pbc();
            }
            self.pos += 1;
            return Ok(Formula::not(self.nested(Self::unary)?));
        }
        self.atom()
    }

    fn continues_pbc(&self, offset: usize) -> bool {
        matches!(self.peek_at(offset), Some(Token::Plus | Token::Cmp(_)))
    }

    fn atom(&mut self) -> Parsed<Formula> {
        match self.peek().cloned() {
            Some(Token::True) => {
                self.pos += 1;
                Ok(Formula::True)
            }
            Some(Token::False) => {
                self.pos += 1;
                Ok(Formula::False)
            }
            Some(Token::LParen) => {
                self.pos += 1;
                let inner = self.nested(Self::equivalence)?;
                if !self.eat(&Token::RParen) {
                    return self.error("')'");
                }
                Ok(inner)
            }
            Some(Token::Int(_)) => self.pbc(),
            Some(Token::Var(_)) if self.continues_pbc(1) => self.pbc(),
            Some(Token::Var(name)) => {
                self.pos += 1;
                Ok(Formula::var(name))
            }
            _ => self.error("a formula"),
        }
    }

    fn pbc(&mut self) -> Parsed<Formula> {
        let mut terms = vec![self.term()?];
        while self.eat(&Token::Plus) {
            terms.push(self.term()?);
        }
        let comparator = match self.peek() {
            Some(Token::Cmp(c)) => *c,
            _ => return self.error("a comparator"),
        };
        self.pos += 1;
        let rhs = match self.peek() {
            Some(Token::Int(v)) => *v,
            _ => return self.error("an integer"),
        };
        self.pos += 1;
        if !Pbc::in_range(terms.iter().map(|(c, _)| *c), rhs) {
            return Err(Failure::OutOfBounds(format!(
                "pseudo-Boolean constraint exceeds the coefficient range of {}",
                Pbc::MAX_MAGNITUDE
            )));
        }
        Ok(Formula::pbc(terms, comparator, rhs))
    }

    fn term(&mut self) -> Parsed<(i64, Literal)> {
        let coefficient = match self.peek() {
            Some(Token::Int(c)) => {
                let c = *c;
                self.pos += 1;
                if !self.eat(&Token::Star) {
                    return self.error("'*'");
                }
                c
            }
            _ => 1,
        };
        let phase = !self.eat(&Token::Not);
        match self.peek().cloned() {
            Some(Token::Var(name)) => {
                self.pos += 1;
                Ok((coefficient, Literal::new(name, phase)))
            }
            _ => self.error("a variable"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(text: &str) -> String {
        parse(text).unwrap().to_string()
    }

    #[test]
    fn test_parse_prints_back() {
        for text in [
            "~(A & B) => C | ~D",
            "~(A & B => ~C <=> D)",
            "A & (B | C) & ~D",
            "(A <=> B) => C",
            "$true",
            "~A",
        ] {
            assert_eq!(roundtrip(text), text);
        }
    }

    #[test]
    fn test_precedence() {
        let f = parse("A | B & C => D <=> E").unwrap();
        assert!(matches!(f, Formula::Equiv(..)));
        assert_eq!(f.to_string(), "A | B & C => D <=> E");
    }

    #[test]
    fn test_implication_is_right_associative() {
        assert_eq!(roundtrip("A => B => C"), "A => B => C");
        assert!(matches!(parse("A => B => C").unwrap(), Formula::Impl(_, r) if matches!(*r, Formula::Impl(..))));
    }

    #[test]
    fn test_parse_pbc() {
        assert_eq!(roundtrip("A + B + C <= 1"), "A + B + C <= 1");
        assert_eq!(roundtrip("2*A + 3*B >= 2"), "2*A + 3*B >= 2");
        assert_eq!(roundtrip("~A + B = 1"), "~A + B = 1");
        assert_eq!(roundtrip("-2*A + B > -1"), "-2*A + B > -1");
        assert_eq!(roundtrip("(A + B < 2) & C"), "(A + B < 2) & C");
    }

    #[test]
    fn test_variable_names() {
        assert_eq!(roundtrip("@RESERVED_CC_0 | x_1 | v01"), "@RESERVED_CC_0 | x_1 | v01");
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse("").is_err());
        assert!(parse("A &").is_err());
        assert!(parse("(A | B").is_err());
        assert!(parse("A B").is_err());
        assert!(parse("$maybe").is_err());
        assert!(parse("A + B").is_err());
        assert!(parse("A ? B").is_err());
    }

    #[test]
    fn test_error_reports_position() {
        match parse("A & & B") {
            Err(EngineError::Parse { source, .. }) => assert_eq!(source.position, 4),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_nesting_limit() {
        let nested = |n: usize| format!("{}A{}", "(".repeat(n), ")".repeat(n));
        assert!(parse(&nested(MAX_NESTING)).is_ok());
        let err = parse(&nested(MAX_NESTING + 1)).unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("formula is nested deeper than {MAX_NESTING} levels")
        );
        assert!(parse(&"~".repeat(100_000)).is_err());
        let chain = vec!["A"; 10_000].join(" => ");
        assert!(matches!(parse(&chain), Err(EngineError::Rejected(_))));
        let wide = vec!["A"; 10_000].join(" & ");
        assert!(parse(&wide).is_ok());
    }

    #[test]
    fn test_pbc_coefficient_range() {
        for text in [
            "9223372036854775807*A + 9223372036854775807*B <= 0",
            "2*A + B >= -9223372036854775808",
            "-9223372036854775808*A >= 0",
        ] {
            let err = parse(text).unwrap_err();
            assert!(
                err.to_string().starts_with("pseudo-Boolean constraint exceeds"),
                "{text}: {err}"
            );
        }
        assert!(parse("1000000*A + 2000000*B <= 3000000").is_ok());
    }

    #[test]
    fn test_parser_simplifies() {
        assert_eq!(parse("A & ~A").unwrap(), Formula::False);
        assert_eq!(parse("A | $true").unwrap(), Formula::True);
        assert_eq!(parse("~~A").unwrap(), Formula::var("A"));
    }
}

use super::ast::*;
use super::lexer::{tokenize, DiceLit, SidesLit, Span, TokenKind};
use crate::common::*;
use crate::roll::Number;
use std::fmt;

type PResult<T> = Result<T, ParseError>;

pub fn parse(source: &str) -> Result<Expr, ParseError> {
    Parser::new(source).parse()
}

#[derive(thiserror::Error, Debug, PartialEq)]
#[error("error at position {} ({slice:?}): {kind}", .span.start)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: Span,
    pub slice: String,
}

#[derive(Debug, PartialEq)]
pub enum ParseErrorKind {
    UnexpectedToken {
        found: Option<TokenKind>,
        expected: Vec<&'static str>,
        hint: Option<&'static str>,
    },
    UnexpectedString {
        expected: Vec<&'static str>,
    },
    ExpectedEof {
        found: TokenKind,
    },
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedToken {
                found,
                expected,
                hint,
            } => {
                match found {
                    Some(found) => write!(f, "unexpected {}, ", found)?,
                    None => f.write_str("unexpected end of input, ")?,
                }
                fmt_expected(expected, f)?;
                if let Some(hint) = hint {
                    write!(f, " -- {}", hint)?;
                }
                Ok(())
            }
            Self::UnexpectedString { expected } => {
                f.write_str("unrecognised input, ")?;
                fmt_expected(expected, f)
            }
            Self::ExpectedEof { found } => {
                write!(f, "expected end of input, found {}", found)
            }
        }
    }
}

fn fmt_expected(expected: &[&'static str], f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if expected.is_empty() {
        f.write_str("expected nothing further")
    } else if expected.len() == 1 {
        write!(f, "expected {}", expected[0])
    } else {
        write!(f, "expected one of ({})", expected.join(", "))
    }
}

pub struct Parser<'a> {
    source: &'a str,
    tokens: Vec<(TokenKind, Span)>,
    pos: usize,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            tokens: tokenize(source),
            pos: 0,
        }
    }

    pub fn parse(mut self) -> Result<Expr, ParseError> {
        let expr = self.parse_sum()?;
        match self.peek() {
            None => Ok(expr),
            Some(TokenKind::Error) => self.unexpected(vec![]),
            Some(found) => self.error(ParseErrorKind::ExpectedEof { found }),
        }
    }

    fn peek(&self) -> Option<TokenKind> {
        self.tokens.get(self.pos).map(|(kind, _)| *kind)
    }

    fn peek2(&self) -> Option<TokenKind> {
        self.tokens.get(self.pos + 1).map(|(kind, _)| *kind)
    }

    fn peek_span(&self) -> Span {
        self.tokens
            .get(self.pos)
            .map_or(self.source.len()..self.source.len(), |(_, span)| {
                span.clone()
            })
    }

    fn prev_end(&self) -> usize {
        if self.pos == 0 {
            0
        } else {
            self.tokens[self.pos - 1].1.end
        }
    }

    /// No whitespace between the previous token and the current one.
    fn glued(&self) -> bool {
        self.pos > 0 && self.peek_span().start == self.prev_end()
    }

    /// No whitespace between the current token and the next one.
    fn glued2(&self) -> bool {
        match (self.tokens.get(self.pos), self.tokens.get(self.pos + 1)) {
            (Some((_, a)), Some((_, b))) => a.end == b.start,
            _ => false,
        }
    }

    fn advance(&mut self) -> Option<TokenKind> {
        let token = self.peek();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn consume(&mut self, expected: TokenKind) -> PResult<()> {
        if self.peek() == Some(expected) {
            self.pos += 1;
            Ok(())
        } else {
            self.unexpected(vec![expected.describe()])
        }
    }

    fn error<T>(&self, kind: ParseErrorKind) -> PResult<T> {
        let span = self.peek_span();
        let slice = self.source[span.clone()].to_string();
        Err(ParseError { kind, span, slice })
    }

    fn unexpected<T>(&self, expected: Vec<&'static str>) -> PResult<T> {
        self.unexpected_with_hint(expected, None)
    }

    fn unexpected_with_hint<T>(
        &self,
        expected: Vec<&'static str>,
        hint: Option<&'static str>,
    ) -> PResult<T> {
        match self.peek() {
            Some(TokenKind::Error) => self.error(ParseErrorKind::UnexpectedString { expected }),
            found => self.error(ParseErrorKind::UnexpectedToken {
                found,
                expected,
                hint,
            }),
        }
    }

    fn parse_sum(&mut self) -> PResult<Expr> {
        let mut lhs = self.parse_product()?;
        loop {
            let op = match self.peek() {
                Some(TokenKind::Plus) => BinaryOperator::Add,
                Some(TokenKind::Minus) => BinaryOperator::Sub,
                Some(TokenKind::Percent) => BinaryOperator::Rem,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_product()?;
            lhs = bin_expr(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_product(&mut self) -> PResult<Expr> {
        let mut lhs = self.parse_power()?;
        loop {
            let op = match self.peek() {
                Some(TokenKind::Star) => BinaryOperator::Mul,
                Some(TokenKind::Slash) => BinaryOperator::Div,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_power()?;
            lhs = bin_expr(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_power(&mut self) -> PResult<Expr> {
        let mut lhs = self.parse_atom()?;
        while self.peek() == Some(TokenKind::StarStar) {
            self.advance();
            let rhs = self.parse_atom()?;
            lhs = bin_expr(BinaryOperator::Pow, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_atom(&mut self) -> PResult<Expr> {
        match self.peek() {
            Some(TokenKind::Integer(n)) => self.parse_integer_atom(n),
            Some(TokenKind::Decimal(x)) => {
                let loc = self.token_loc();
                self.advance();
                Ok(num_expr(Number::Float(x), loc))
            }
            Some(TokenKind::Minus) => self.parse_negative_number(),
            Some(TokenKind::DiceLit(lit)) => self.parse_dice_atom(lit),
            Some(TokenKind::Func(func)) => self.parse_call(func),
            Some(TokenKind::LeftParen) => self.parse_parens(),
            Some(TokenKind::LeftBrace) => self.parse_group(),
            _ => self.unexpected(vec!["a number", "a dice", "'('", "'{'"]),
        }
    }

    /// A plain integer literal, or the count of a computed-sides dice
    /// (`8d(2+3)`). The specifier must follow the count with no whitespace.
    fn parse_integer_atom(&mut self, n: Int) -> PResult<Expr> {
        let start = self.peek_span().start;
        let loc = self.token_loc();
        self.advance();

        if self.peek() == Some(TokenKind::DiceSep) && self.glued() {
            self.advance();
            let sides = self.parse_computed_sides()?;
            return self.finish_dice(start, CountSpec::Literal(n), sides);
        }
        Ok(num_expr(Number::Int(n), loc))
    }

    fn parse_negative_number(&mut self) -> PResult<Expr> {
        let start = self.peek_span().start;
        self.advance();
        if !self.glued() {
            return self.unexpected(vec!["a number"]);
        }
        match self.peek() {
            Some(TokenKind::Integer(n)) => {
                let end = self.peek_span().end;
                self.advance();
                Ok(num_expr(Number::Int(-n), Location::new(start, end)))
            }
            Some(TokenKind::Decimal(x)) => {
                let end = self.peek_span().end;
                self.advance();
                Ok(num_expr(Number::Float(-x), Location::new(start, end)))
            }
            _ => self.unexpected(vec!["a number"]),
        }
    }

    fn parse_dice_atom(&mut self, lit: DiceLit) -> PResult<Expr> {
        let start = self.peek_span().start;
        self.advance();
        let count = CountSpec::Literal(lit.count.unwrap_or(1));
        let sides = match lit.sides {
            SidesLit::Faces(n) => SidesSpec::Faces(n),
            SidesLit::Fate => SidesSpec::Fate,
        };
        self.finish_dice(start, count, sides)
    }

    fn parse_call(&mut self, func: Function) -> PResult<Expr> {
        let start = self.peek_span().start;
        self.advance();
        if self.peek() != Some(TokenKind::LeftParen) || !self.glued() {
            return self.unexpected_with_hint(
                vec!["'('"],
                Some("no whitespace is allowed between a function name and its argument"),
            );
        }
        self.advance();
        let arg = self.parse_sum()?;
        self.consume(TokenKind::RightParen)?;
        Ok(Expr::Call(Box::new(CallExpr {
            func,
            arg,
            loc: Location::new(start, self.prev_end()),
        })))
    }

    /// A parenthesized sub-expression, possibly acting as the computed count
    /// of a dice (`(2+3)d8`, `(2+3)d(1+5)`). The specifier must follow the
    /// closing parenthesis with no whitespace.
    fn parse_parens(&mut self) -> PResult<Expr> {
        let start = self.peek_span().start;
        self.advance();
        let expr = self.parse_sum()?;
        self.consume(TokenKind::RightParen)?;

        match self.peek() {
            Some(TokenKind::DiceLit(lit)) if self.glued() && lit.count.is_none() => {
                self.advance();
                let sides = match lit.sides {
                    SidesLit::Faces(n) => SidesSpec::Faces(n),
                    SidesLit::Fate => SidesSpec::Fate,
                };
                self.finish_dice(start, CountSpec::Computed(expr), sides)
            }
            Some(TokenKind::DiceSep) if self.glued() => {
                self.advance();
                let sides = self.parse_computed_sides()?;
                self.finish_dice(start, CountSpec::Computed(expr), sides)
            }
            _ => Ok(expr),
        }
    }

    fn parse_computed_sides(&mut self) -> PResult<SidesSpec> {
        if self.peek() != Some(TokenKind::LeftParen) || !self.glued() {
            return self.unexpected(vec!["'('"]);
        }
        self.advance();
        let expr = self.parse_sum()?;
        self.consume(TokenKind::RightParen)?;
        Ok(SidesSpec::Computed(expr))
    }

    fn finish_dice(&mut self, start: usize, count: CountSpec, sides: SidesSpec) -> PResult<Expr> {
        let mods = self.parse_dice_mods()?;
        Ok(Expr::Dice(Box::new(DiceExpr {
            count,
            sides,
            mods,
            loc: Location::new(start, self.prev_end()),
        })))
    }

    /// The repeated-choice modifier sub-grammar. Each modifier class is
    /// offered only while unsatisfied; a repeated class simply stops the
    /// loop, and the leftover token surfaces as an `ExpectedEof` error.
    fn parse_dice_mods(&mut self) -> PResult<DiceMods> {
        let mut mods = DiceMods::default();
        loop {
            match self.peek() {
                Some(TokenKind::Less | TokenKind::Equal | TokenKind::Greater)
                    if mods.success.is_none() =>
                {
                    mods.success = Some(self.parse_compare_point()?);
                }
                Some(TokenKind::Failure) if mods.failure.is_none() => {
                    if mods.success.is_none() {
                        return self.unexpected_with_hint(
                            vec!["'>'", "'<'", "'='"],
                            Some("a failure modifier requires a success modifier"),
                        );
                    }
                    self.advance();
                    mods.failure = Some(self.parse_compare_point()?);
                }
                Some(TokenKind::Bang | TokenKind::BangBang | TokenKind::BangP)
                    if mods.explode.is_none() =>
                {
                    mods.explode = Some(self.parse_explode()?);
                }
                Some(TokenKind::Keep | TokenKind::DiceSep) if mods.select.is_none() => {
                    mods.select = Some(self.parse_selection()?);
                }
                Some(TokenKind::DiceLit(lit)) if mods.select.is_none() => {
                    match self.drop_shorthand(lit)? {
                        Some(sel) => mods.select = Some(sel),
                        None => break,
                    }
                }
                Some(TokenKind::RerollOnce) if mods.reroll_once.is_none() => {
                    self.advance();
                    let point = self.parse_opt_compare_point()?;
                    mods.reroll_once = Some(point.unwrap_or_else(ComparePoint::dice_min));
                }
                Some(TokenKind::Reroll) => {
                    self.advance();
                    let point = self.parse_opt_compare_point()?;
                    mods.reroll.push(point.unwrap_or_else(ComparePoint::dice_min));
                }
                Some(TokenKind::Sort(dir)) if mods.sort.is_none() => {
                    self.advance();
                    mods.sort = Some(dir);
                }
                _ => break,
            }
        }
        Ok(mods)
    }

    fn parse_group(&mut self) -> PResult<Expr> {
        let start = self.peek_span().start;
        self.advance();
        let first = self.parse_sum()?;
        let mut elements = vec1![first];
        while self.peek() == Some(TokenKind::Comma) {
            self.advance();
            if self.peek() == Some(TokenKind::RightBrace) {
                break;
            }
            elements.push(self.parse_sum()?);
        }
        self.consume(TokenKind::RightBrace)?;

        let mods = self.parse_group_mods()?;
        Ok(Expr::Group(Box::new(GroupExpr {
            elements,
            mods,
            loc: Location::new(start, self.prev_end()),
        })))
    }

    fn parse_group_mods(&mut self) -> PResult<GroupMods> {
        let mut mods = GroupMods::default();
        loop {
            match self.peek() {
                Some(TokenKind::Less | TokenKind::Equal | TokenKind::Greater)
                    if mods.success.is_none() =>
                {
                    mods.success = Some(self.parse_compare_point()?);
                }
                Some(TokenKind::Failure) if mods.failure.is_none() => {
                    if mods.success.is_none() {
                        return self.unexpected_with_hint(
                            vec!["'>'", "'<'", "'='"],
                            Some("a failure modifier requires a success modifier"),
                        );
                    }
                    self.advance();
                    mods.failure = Some(self.parse_compare_point()?);
                }
                Some(TokenKind::Keep | TokenKind::DiceSep) if mods.select.is_none() => {
                    mods.select = Some(self.parse_selection()?);
                }
                Some(TokenKind::DiceLit(lit)) if mods.select.is_none() => {
                    match self.drop_shorthand(lit)? {
                        Some(sel) => mods.select = Some(sel),
                        None => break,
                    }
                }
                _ => break,
            }
        }
        Ok(mods)
    }

    /// A compare point with an optional operator (defaulting to `=`) and a
    /// required number: the form taken by success and failure modifiers.
    fn parse_compare_point(&mut self) -> PResult<ComparePoint> {
        let op = self.parse_compare_op().unwrap_or(CompareOp::Equal);
        let n = self.parse_compare_number()?;
        Ok(ComparePoint::new(op, CompareTo::Value(n)))
    }

    /// A fully optional compare point: the form taken by explosion and
    /// reroll modifiers, whose targets default to a side-set sentinel.
    fn parse_opt_compare_point(&mut self) -> PResult<Option<ComparePoint>> {
        if let Some(op) = self.parse_compare_op() {
            let n = self.parse_compare_number()?;
            return Ok(Some(ComparePoint::new(op, CompareTo::Value(n))));
        }
        Ok(self.try_compare_number().map(ComparePoint::equal_to))
    }

    fn parse_compare_op(&mut self) -> Option<CompareOp> {
        let op = match self.peek()? {
            TokenKind::Less => CompareOp::Less,
            TokenKind::Equal => CompareOp::Equal,
            TokenKind::Greater => CompareOp::Greater,
            _ => return None,
        };
        self.advance();
        Some(op)
    }

    fn parse_compare_number(&mut self) -> PResult<Int> {
        match self.try_compare_number() {
            Some(n) => Ok(n),
            None => self.unexpected(vec!["a number"]),
        }
    }

    /// An integer, possibly negative (`4dF>-1`). The sign must be glued to
    /// the digits, which keeps `3d8! - 2` a subtraction.
    fn try_compare_number(&mut self) -> Option<Int> {
        match self.peek() {
            Some(TokenKind::Integer(n)) => {
                self.advance();
                Some(n)
            }
            Some(TokenKind::Minus) => match self.peek2() {
                Some(TokenKind::Integer(n)) if self.glued2() => {
                    self.advance();
                    self.advance();
                    Some(-n)
                }
                _ => None,
            },
            _ => None,
        }
    }

    fn parse_explode(&mut self) -> PResult<Explode> {
        let kind = match self.advance() {
            Some(TokenKind::Bang) => ExplodeKind::Exploding,
            Some(TokenKind::BangBang) => ExplodeKind::Compounding,
            Some(TokenKind::BangP) => ExplodeKind::Penetrating,
            _ => unreachable!(),
        };
        let point = self.parse_opt_compare_point()?;
        Ok(Explode::new(kind, point.unwrap_or_else(ComparePoint::dice_max)))
    }

    /// `k`/`d` with an optional direction and a required count. The `dN`
    /// spelling arrives as a countless dice literal and is handled by
    /// [`Self::drop_shorthand`].
    fn parse_selection(&mut self) -> PResult<Selection> {
        let kind = match self.advance() {
            Some(TokenKind::Keep) => SelectKind::Keep,
            Some(TokenKind::DiceSep) => SelectKind::Drop,
            _ => unreachable!(),
        };
        let dir = match self.peek() {
            Some(TokenKind::High) => {
                self.advance();
                SelectDir::High
            }
            Some(TokenKind::Low) => {
                self.advance();
                SelectDir::Low
            }
            _ => match kind {
                SelectKind::Keep => SelectDir::High,
                SelectKind::Drop => SelectDir::Low,
            },
        };
        let count = self.parse_select_count()?;
        Ok(Selection { kind, dir, count })
    }

    /// In modifier position `d2` lexes as a dice literal with no count;
    /// reinterpret it as a drop-lowest modifier.
    fn drop_shorthand(&mut self, lit: DiceLit) -> PResult<Option<Selection>> {
        let n = match (lit.count, lit.sides) {
            (None, SidesLit::Faces(n)) => n,
            _ => return Ok(None),
        };
        match UInt::try_from(n) {
            Ok(count) => {
                self.advance();
                Ok(Some(Selection::drop(SelectDir::Low, count)))
            }
            Err(_) => {
                self.unexpected_with_hint(vec!["a number"], Some("the count is out of range"))
            }
        }
    }

    fn parse_select_count(&mut self) -> PResult<UInt> {
        match self.peek() {
            Some(TokenKind::Integer(n)) => match UInt::try_from(n) {
                Ok(count) => {
                    self.advance();
                    Ok(count)
                }
                Err(_) => self
                    .unexpected_with_hint(vec!["a number"], Some("the count is out of range")),
            },
            _ => self.unexpected(vec!["a number"]),
        }
    }

    fn token_loc(&self) -> Location {
        let span = self.peek_span();
        Location::new(span.start, span.end)
    }
}

fn num_expr(value: Number, loc: Location) -> Expr {
    Expr::Number(NumberLit { value, loc })
}

fn bin_expr(op: BinaryOperator, lhs: Expr, rhs: Expr) -> Expr {
    let loc = Location::new(lhs.loc().start, rhs.loc().end);
    Expr::BinOp(Box::new(BinExpr { op, lhs, rhs, loc }))
}

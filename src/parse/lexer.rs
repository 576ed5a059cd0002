use crate::common::*;
use logos::Logos;
use std::fmt;

pub type Span = std::ops::Range<usize>;

/// Lexes the whole input up front. The parser works over this buffer so it
/// can look ahead freely and compare token spans: the grammar is
/// whitespace-sensitive around the dice specifier and function calls.
pub fn tokenize(s: &str) -> Vec<(TokenKind, Span)> {
    let mut lexer = TokenKind::lexer(s);
    let mut tokens = Vec::new();
    while let Some(kind) = lexer.next() {
        tokens.push((kind, lexer.span()));
    }
    tokens
}

/// A dice literal such as `3d6`, `d20`, `0d5` or `4dF`, matched as a single
/// token. The count is absent when the source omits it (`d6`).
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct DiceLit {
    pub count: Option<Int>,
    pub sides: SidesLit,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SidesLit {
    Faces(Int),
    Fate,
}

#[derive(Logos, Debug, Copy, Clone, PartialEq)]
pub enum TokenKind {
    #[regex(r"[0-9]+", |lex| lex.slice().parse())]
    Integer(Int),
    #[regex(r"([0-9]+\.[0-9]*|\.[0-9]+)([eE][0-9]+)?", |lex| lex.slice().parse())]
    #[regex(r"[0-9]+[eE][0-9]+", |lex| lex.slice().parse())]
    Decimal(Float),

    #[regex(r"[0-9]*d([0-9]+|F)", |lex| parse_dice_lit(lex.slice()))]
    DiceLit(DiceLit),
    // `d` on its own: computed-sides dice (`8d(2+3)`) or a drop modifier
    // with an explicit direction (`dh2`, `dl2`).
    #[token("d")]
    DiceSep,

    #[token("floor", |_| Function::Floor)]
    #[token("ceil", |_| Function::Ceil)]
    #[token("round", |_| Function::Round)]
    #[token("abs", |_| Function::Abs)]
    Func(Function),

    #[token("(")]
    LeftParen,
    #[token(")")]
    RightParen,
    #[token("{")]
    LeftBrace,
    #[token("}")]
    RightBrace,
    #[token(",")]
    Comma,

    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("**")]
    StarStar,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,

    #[token("<")]
    Less,
    #[token("=")]
    Equal,
    #[token(">")]
    Greater,

    #[token("!p")]
    BangP,
    #[token("!!")]
    BangBang,
    #[token("!")]
    Bang,
    #[token("k")]
    Keep,
    #[token("f")]
    Failure,
    #[token("h")]
    High,
    #[token("l")]
    Low,
    #[token("ro")]
    RerollOnce,
    #[token("r")]
    Reroll,
    #[regex(r"s[ad]?", |lex| match lex.slice() {
        "sd" => SortDir::Desc,
        _ => SortDir::Asc,
    })]
    Sort(SortDir),

    #[regex(r"[ \t\r\n]+", logos::skip)]
    #[error]
    Error,
}

impl TokenKind {
    pub fn describe(&self) -> &'static str {
        use TokenKind::*;

        match self {
            Integer(_) | Decimal(_) => "a number",
            DiceLit(_) => "a dice",
            DiceSep => "'d'",
            Func(_) => "a function name",
            LeftParen => "'('",
            RightParen => "')'",
            LeftBrace => "'{'",
            RightBrace => "'}'",
            Comma => "','",
            Plus => "'+'",
            Minus => "'-'",
            StarStar => "'**'",
            Star => "'*'",
            Slash => "'/'",
            Percent => "'%'",
            Less => "'<'",
            Equal => "'='",
            Greater => "'>'",
            BangP => "'!p'",
            BangBang => "'!!'",
            Bang => "'!'",
            Keep => "'k'",
            Failure => "'f'",
            High => "'h'",
            Low => "'l'",
            RerollOnce => "'ro'",
            Reroll => "'r'",
            Sort(_) => "'s'",
            Error => "<error>",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

// `unwrap` is fine here: logos has already verified the slice shape.
fn parse_dice_lit(s: &str) -> Option<DiceLit> {
    let (count, sides) = s.split_once('d').unwrap();
    let count = if count.is_empty() {
        None
    } else {
        Some(count.parse().ok()?)
    };
    let sides = if sides == "F" {
        SidesLit::Fate
    } else {
        SidesLit::Faces(sides.parse().ok()?)
    };
    Some(DiceLit { count, sides })
}

//! A tabletop dice-notation language: parser, static kind checker and
//! evaluator.
//!
//! Expressions mix arithmetic with dice (`3d6`, `d20`, `4dF`), modifiers
//! (success counting, explosions, keep/drop, rerolls) and braced groups.
//! The one-call entry point parses, checks and rolls with the thread-local
//! generator:
//!
//! ```
//! let outcome = dicelang::roll("3d6 + 2").unwrap();
//! println!("{}", outcome);
//! ```
//!
//! For control over randomness and the roll budget, drive the pieces
//! yourself:
//!
//! ```
//! use dicelang::{check, parse, Evaluator};
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let expr = parse("4d6k3").unwrap();
//! let kind = check(&expr).unwrap();
//! let outcome = Evaluator::with_random(StdRng::seed_from_u64(7))
//!     .max_rolls(100)
//!     .evaluate(&expr)
//!     .unwrap();
//! assert_eq!(outcome.kind, kind);
//! ```

mod common;
pub use common::*;

pub mod check;
pub mod parse;
pub mod random;
pub mod roll;

pub use check::{check, CheckError, Kind};
pub use parse::{parse, ParseError};
pub use random::{Randomiser, RefreshRandom};
pub use roll::{Evaluated, EvalError, Evaluator, Number, Outcome, ResultNode};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("{}", join_errors(.0))]
    Check(Vec<CheckError>),
    #[error(transparent)]
    Eval(#[from] EvalError),
}

fn join_errors(errors: &[CheckError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Parses, checks and evaluates `source` with the thread-local generator
/// and the default roll budget.
pub fn roll(source: &str) -> Result<Evaluated, Error> {
    let expr = parse::parse(source)?;
    check::check(&expr).map_err(Error::Check)?;
    Ok(Evaluator::new().evaluate(&expr)?)
}

mod classify;
mod ctx;
mod error;
mod explode;
mod num;
mod select;
mod tree;

pub use classify::SideSet;
pub use ctx::{Evaluated, Evaluator, DEFAULT_MAX_ROLLS};
pub use error::EvalError;
pub use num::Number;
pub use tree::{
    BinOpResult, CallResult, Crit, DiceResult, Family, GroupElement, GroupResult, NumberResult,
    Outcome, ResultNode, RollRecord, RollStatus, SuccessMark,
};

pub(crate) type EResult<T> = Result<T, EvalError>;

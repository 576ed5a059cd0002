use crate::common::Location;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("exceeded the limit of {max} dice rolled by one expression")]
    TooManyRolls { max: u32 },
    #[error("cannot roll a die with no sides (at {loc})")]
    EmptySides { loc: Location },
}

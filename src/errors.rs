//! Error taxonomy of the calculator.
//!
//! Every error is recovered at the component that produced it and turned into a
//! user-visible message:
//! - [`ParseError`] is shown inline by the live preview and closes the submit gate
//! - [`DifferentiationError`] becomes a single result entry and stops the pipeline
//! - [`PlotError`] is shown as an overlay over the plot area
//! - [`EvalError`] is raised by compiled expressions and reported as a [`PlotError`]
//!   by the plot surface
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("empty expression")]
    Empty,
    #[error("unexpected end of input")]
    UnexpectedEnd,
    #[error("unexpected character '{found}' at position {position}")]
    UnexpectedChar { found: char, position: usize },
    #[error("parenthesis opened at position {position} is never closed")]
    UnclosedParenthesis { position: usize },
    #[error("unmatched ')' at position {position}")]
    UnmatchedParenthesis { position: usize },
    #[error("expression is nested deeper than {max} levels")]
    TooDeeplyNested { max: usize },
    #[error("unknown function '{0}'")]
    UnknownFunction(String),
    #[error("invalid number '{0}'")]
    InvalidNumber(String),
    #[error("order of differentiation must be a positive integer, got '{0}'")]
    InvalidOrder(String),
    #[error("'{0}' is not a valid variable of differentiation")]
    InvalidVariable(String),
    #[error("malformed differentiation operator '{0}'")]
    MalformedOperator(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DifferentiationError {
    #[error("'{0}' is not a valid variable of differentiation")]
    InvalidVariable(String),
    #[error("cannot differentiate with respect to the constant '{0}'")]
    ReservedSymbol(String),
    #[error("order of differentiation must be at least 1")]
    ZeroOrder,
    #[error("order {order} exceeds the supported maximum of {max}")]
    OrderTooLarge { order: usize, max: usize },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("Undefined symbol {0}")]
    UnboundVariable(String),
    #[error("expression is not a real number at this point (got {value})")]
    NonFinite { value: f64 },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlotError {
    #[error("the plot board has not been initialised")]
    NotInitialized,
    #[error("function produces no real values in the visible range")]
    NoRealValues,
    #[error(transparent)]
    Eval(#[from] EvalError),
}

#[derive(Debug, Error)]
pub enum CalcError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Differentiation(#[from] DifferentiationError),
    #[error(transparent)]
    Eval(#[from] EvalError),
    #[error(transparent)]
    Plot(#[from] PlotError),
    #[error("simplification failed: {0}")]
    Simplify(String),
    #[error("submission is disabled until the input is valid")]
    SubmitDisabled,
    #[error("configuration error: {0}")]
    Config(String),
    #[error("unknown form input: {0}")]
    UnknownField(String),
    #[error("logger error: {0}")]
    Logger(String),
    #[error("rendering failed: {0}")]
    Render(String),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type CalcResult<T> = Result<T, CalcError>;

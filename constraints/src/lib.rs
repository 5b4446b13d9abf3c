pub mod html;
pub mod logs;
pub mod r1cs;
pub mod serialize;
pub mod term;

pub use logs::LogEntry;
pub use r1cs::{CurveId, Hint, HintId, LinearExpression, LogSink, R1cs, R1C};
pub use serialize::{SerializeError, MAX_SEQUENCE_ELEMENTS};
pub use term::{
    Term, Visibility, COEFF_ID_MINUS_ONE, COEFF_ID_ONE, COEFF_ID_TWO, COEFF_ID_ZERO,
};

use std::fmt;

use constraints::HintId;

use crate::hints::HintError;

/// Errors emitted while solving a witness.
///
/// Every failure aborts the solve; deferred circuit logs are still flushed
/// before the error is returned.
#[derive(Debug)]
pub enum SolverError {
    /// The witness length disagrees with the compiled sizes.
    InvalidWitnessSize {
        got: usize,
        expected: usize,
        public: usize,
        secret: usize,
    },
    /// A caller-provided buffer has the wrong length.
    InvalidBufferSize {
        buffer: &'static str,
        got: usize,
        expected: usize,
    },
    /// Two hint functions registered under the same id (built-ins included).
    DuplicateHint { id: HintId },
    /// A hint function was called with the wrong number of inputs.
    InvalidHintSignature {
        id: HintId,
        expected: usize,
        got: usize,
    },
    /// A hint function rejected its inputs.
    HintFailed { id: HintId, err: HintError },
    /// A hint wire references a function id with no registered function.
    MissingHintFunction { id: HintId },
    /// A hint input references a wire that is not yet instantiated.
    HintPrerequisiteMissing { hint_wire: usize, input_wire: usize },
    /// A computational constraint has more than one uninstantiated wire;
    /// the compiled system is mis-ordered.
    MultipleUnknowns { constraint: usize, wire: usize },
    /// `a · b != c` for some constraint. `debug` carries the compiler's
    /// diagnostic with wire values substituted (unset wires render as
    /// `"???"`), when the compiled system ships one.
    UnsatisfiedConstraint {
        constraint: usize,
        debug: Option<String>,
    },
    /// A wire was never instantiated even though every constraint passed.
    UninstantiatedWire { wire: usize },
}

impl fmt::Display for SolverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverError::InvalidWitnessSize {
                got,
                expected,
                public,
                secret,
            } => {
                write!(
                    f,
                    "invalid witness size, got {got}, expected {expected} = {public} (public - ONE_WIRE) + {secret} (secret)"
                )
            }
            SolverError::InvalidBufferSize {
                buffer,
                got,
                expected,
            } => {
                write!(f, "invalid {buffer} size, got {got}, expected {expected}")
            }
            SolverError::DuplicateHint { id } => {
                write!(f, "duplicate hint function with id {id}")
            }
            SolverError::InvalidHintSignature { id, expected, got } => {
                write!(
                    f,
                    "invalid hint function signature with id {id}: expected {expected} inputs, got {got}"
                )
            }
            SolverError::HintFailed { id, err } => {
                write!(f, "hint function with id {id} failed: {err}")
            }
            SolverError::MissingHintFunction { id } => {
                write!(f, "missing hint function with id {id}")
            }
            SolverError::HintPrerequisiteMissing {
                hint_wire,
                input_wire,
            } => {
                write!(
                    f,
                    "input wire {input_wire} of the hint computing wire {hint_wire} is not instantiated"
                )
            }
            SolverError::MultipleUnknowns { constraint, wire } => {
                write!(
                    f,
                    "constraint {constraint} has more than one wire to instantiate (wire {wire})"
                )
            }
            SolverError::UnsatisfiedConstraint { constraint, debug } => {
                match debug {
                    Some(msg) => write!(f, "constraint {constraint} is not satisfied: {msg}"),
                    None => write!(f, "constraint {constraint} is not satisfied"),
                }
            }
            SolverError::UninstantiatedWire { wire } => {
                write!(f, "wire {wire} was never instantiated")
            }
        }
    }
}

impl std::error::Error for SolverError {}

/// Compiled R1CS constraint system.
///
/// An R1CS (Rank-1 Constraint System) represents computation as a set of
/// constraints of the form A · B = C, where A, B, C are linear combinations
/// of wires. This module holds the immutable record emitted by a frontend
/// compiler: constraint triples over packed terms, the shared coefficient
/// table, hint records, deferred logs and failure diagnostics.
///
/// Wire layout:
///   Index 0       = ONE (constant wire, always 1)
///   1..n_pub      = public inputs
///   n_pub..+n_sec = secret inputs
///   remainder     = internal wires, computed by the solver

use std::collections::HashMap;
use std::fmt;
use std::io::{self, Write};
use std::sync::Mutex;

use ark_bn254::Fr;
use ark_ff::{BigInteger, Field, PrimeField, Zero};
use serde::{Deserialize, Serialize};

use crate::logs::LogEntry;
use crate::term::{
    Term, COEFF_ID_MINUS_ONE, COEFF_ID_ONE, COEFF_ID_TWO, COEFF_ID_ZERO,
};

// ============================================================================
// Linear expressions and constraints
// ============================================================================

/// An ordered sequence of terms interpreted as Σ coeff_i · wire_i.
///
/// Order never changes the value, but it is preserved for stable
/// diagnostics and deterministic serialization.
pub type LinearExpression = Vec<Term>;

/// A single constraint: eval(l) · eval(r) = eval(o) in the field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct R1C {
    pub l: LinearExpression,
    pub r: LinearExpression,
    pub o: LinearExpression,
}

// ============================================================================
// Hints
// ============================================================================

/// Identifier of a hint function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HintId(pub u32);

impl HintId {
    /// Built-in: `is_zero(x) = 1 - x^(p-1)`.
    pub const IS_ZERO: HintId = HintId(1);
    /// Built-in: `ith_bit(value, position)` over the canonical representative.
    pub const ITH_BIT: HintId = HintId(2);
}

impl fmt::Display for HintId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A wire whose value is supplied by a hint function instead of a
/// constraint: the solver evaluates `inputs` and feeds them to the function
/// registered under `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hint {
    pub wire_id: usize,
    pub id: HintId,
    pub inputs: Vec<LinearExpression>,
}

// ============================================================================
// Introspection
// ============================================================================

/// The elliptic curve whose scalar field the system is compiled over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurveId {
    Bn254,
}

impl fmt::Display for CurveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CurveId::Bn254 => write!(f, "bn254"),
        }
    }
}

// ============================================================================
// Log sink
// ============================================================================

/// Destination for resolved circuit logs. Defaults to stdout; `Discard`
/// drops the output.
pub enum LogSink {
    Stdout,
    Discard,
    Writer(Box<dyn Write + Send>),
}

impl Default for LogSink {
    fn default() -> LogSink {
        LogSink::Stdout
    }
}

impl fmt::Debug for LogSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogSink::Stdout => f.write_str("Stdout"),
            LogSink::Discard => f.write_str("Discard"),
            LogSink::Writer(_) => f.write_str("Writer"),
        }
    }
}

// ============================================================================
// R1cs
// ============================================================================

/// The compiled constraint system.
///
/// The first `nb_co_constraints` entries of `constraints` are computational:
/// each introduces at most one wire the solver has not seen yet. The
/// remainder are assertions, checked once every wire is known.
///
/// Contracts with the frontend (not re-verified here): every wire id is
/// `< nb_wires()`, every coefficient id is `< coefficients.len()`, and the
/// first four coefficients are 0, 1, 2, -1.
#[derive(Debug, Serialize, Deserialize)]
pub struct R1cs {
    pub nb_public_variables: usize,
    pub nb_secret_variables: usize,
    pub nb_internal_variables: usize,
    pub nb_constraints: usize,
    pub nb_co_constraints: usize,
    pub constraints: Vec<R1C>,
    pub hints: Vec<Hint>,
    pub logs: Vec<LogEntry>,
    pub debug_info_computation: Vec<LogEntry>,
    pub debug_info_assertion: Vec<LogEntry>,
    #[serde(with = "crate::serialize::fr_vec")]
    pub coefficients: Vec<Fr>,
    /// Wire id -> index into `hints`. Derived, never serialized: rebuilt
    /// from the ordered `hints` sequence so the wire format stays free of
    /// map iteration order.
    #[serde(skip)]
    m_hints: HashMap<usize, usize>,
    #[serde(skip)]
    logger: Mutex<LogSink>,
}

impl PartialEq for R1cs {
    fn eq(&self, other: &Self) -> bool {
        self.nb_public_variables == other.nb_public_variables
            && self.nb_secret_variables == other.nb_secret_variables
            && self.nb_internal_variables == other.nb_internal_variables
            && self.nb_constraints == other.nb_constraints
            && self.nb_co_constraints == other.nb_co_constraints
            && self.constraints == other.constraints
            && self.hints == other.hints
            && self.logs == other.logs
            && self.debug_info_computation == other.debug_info_computation
            && self.debug_info_assertion == other.debug_info_assertion
            && self.coefficients == other.coefficients
    }
}

impl R1cs {
    /// Build a compiled system from the frontend's output.
    ///
    /// `nb_public_variables` counts the ONE wire. `nb_constraints` is taken
    /// from `constraints`; the first `nb_co_constraints` of them are the
    /// computational ones.
    pub fn new(
        nb_public_variables: usize,
        nb_secret_variables: usize,
        nb_internal_variables: usize,
        nb_co_constraints: usize,
        constraints: Vec<R1C>,
        coefficients: Vec<Fr>,
    ) -> R1cs {
        R1cs {
            nb_public_variables,
            nb_secret_variables,
            nb_internal_variables,
            nb_constraints: constraints.len(),
            nb_co_constraints,
            constraints,
            hints: Vec::new(),
            logs: Vec::new(),
            debug_info_computation: Vec::new(),
            debug_info_assertion: Vec::new(),
            coefficients,
            m_hints: HashMap::new(),
            logger: Mutex::new(LogSink::default()),
        }
    }

    /// Attach hint records and rebuild the wire -> hint map.
    pub fn with_hints(mut self, hints: Vec<Hint>) -> R1cs {
        self.hints = hints;
        self.init_hints();
        self
    }

    /// Attach deferred log entries.
    pub fn with_logs(mut self, logs: Vec<LogEntry>) -> R1cs {
        self.logs = logs;
        self
    }

    /// Attach the per-constraint failure diagnostics: `computation` is
    /// indexed by the running division counter of the computational phase,
    /// `assertion` by (constraint index - nb_co_constraints).
    pub fn with_debug_info(
        mut self,
        computation: Vec<LogEntry>,
        assertion: Vec<LogEntry>,
    ) -> R1cs {
        self.debug_info_computation = computation;
        self.debug_info_assertion = assertion;
        self
    }

    /// Rebuild the wire id -> hint index map from the ordered `hints`
    /// sequence. Called on construction and after deserialization.
    pub(crate) fn init_hints(&mut self) {
        self.m_hints = HashMap::with_capacity(self.hints.len());
        for (i, hint) in self.hints.iter().enumerate() {
            self.m_hints.insert(hint.wire_id, i);
        }
    }

    /// The hint record driving `wire_id`, if any.
    pub fn hint_for_wire(&self, wire_id: usize) -> Option<&Hint> {
        self.m_hints.get(&wire_id).map(|&i| &self.hints[i])
    }

    // --- Introspection ---

    /// Total wire count, ONE wire included.
    pub fn nb_wires(&self) -> usize {
        self.nb_public_variables + self.nb_secret_variables + self.nb_internal_variables
    }

    /// Number of unique coefficients in the shared table.
    pub fn nb_coefficients(&self) -> usize {
        self.coefficients.len()
    }

    /// Byte size of one field element (limbs × 8).
    pub fn fr_size(&self) -> usize {
        <Fr as PrimeField>::BigInt::NUM_LIMBS * 8
    }

    /// The curve fixing the scalar-field modulus.
    pub fn curve_id(&self) -> CurveId {
        CurveId::Bn254
    }

    // --- Log sink ---

    /// Replace the log sink. `None` discards log output; the default is
    /// stdout.
    pub fn set_logger_output(&self, w: Option<Box<dyn Write + Send>>) {
        if let Ok(mut sink) = self.logger.lock() {
            *sink = match w {
                Some(w) => LogSink::Writer(w),
                None => LogSink::Discard,
            };
        }
    }

    /// Resolve every deferred log entry against the wire vector and write
    /// it to the configured sink, in stored order. Write failures are
    /// swallowed: logging must never change the solve outcome.
    pub fn flush_logs(&self, wire_values: &[Fr], instantiated: &[bool]) {
        if self.logs.is_empty() {
            return;
        }
        let Ok(mut sink) = self.logger.lock() else {
            return;
        };
        for entry in &self.logs {
            let line = entry.resolve(wire_values, instantiated);
            match &mut *sink {
                LogSink::Stdout => {
                    let _ = io::stdout().write_all(line.as_bytes());
                }
                LogSink::Discard => {}
                LogSink::Writer(w) => {
                    let _ = w.write_all(line.as_bytes());
                }
            }
        }
    }

    // --- Term and expression evaluation ---

    /// `acc += coeff(t) · value`, with the reserved-id shortcuts skipping
    /// the table lookup and multiplication.
    pub fn add_term(&self, acc: &mut Fr, t: Term, value: Fr) {
        match t.coeff_id() {
            COEFF_ID_ONE => *acc += value,
            COEFF_ID_MINUS_ONE => *acc -= value,
            COEFF_ID_ZERO => {}
            COEFF_ID_TWO => *acc += value.double(),
            cid => *acc += self.coefficients[cid] * value,
        }
    }

    /// `x *= coeff(t)^-1`. Returns false when the coefficient has no
    /// inverse (id zero); the caller treats the wire as unsolved.
    ///
    /// The unknown term of a constraint contributes `coeff · wire` to its
    /// side, so recovering the wire value divides by the coefficient. The
    /// reserved ids keep their shortcuts: one is the identity, minus one
    /// negates, two halves.
    pub fn mul_by_coeff_inverse(&self, x: &mut Fr, t: Term) -> bool {
        match t.coeff_id() {
            COEFF_ID_ONE => true,
            COEFF_ID_MINUS_ONE => {
                *x = -*x;
                true
            }
            COEFF_ID_ZERO => false,
            COEFF_ID_TWO => match Fr::from(2u64).inverse() {
                Some(half) => {
                    *x *= half;
                    true
                }
                None => false,
            },
            cid => match self.coefficients[cid].inverse() {
                Some(inv) => {
                    *x *= inv;
                    true
                }
                None => false,
            },
        }
    }

    /// Evaluate a linear expression against the wire vector.
    pub fn eval(&self, lin: &[Term], wire_values: &[Fr]) -> Fr {
        let mut acc = Fr::zero();
        for &t in lin {
            self.add_term(&mut acc, t, wire_values[t.wire_id()]);
        }
        acc
    }

    /// Evaluate the three sides of a constraint. Called once all wires of
    /// the constraint are known.
    pub fn instantiate(&self, c: &R1C, wire_values: &[Fr]) -> (Fr, Fr, Fr) {
        (
            self.eval(&c.l, wire_values),
            self.eval(&c.r, wire_values),
            self.eval(&c.o, wire_values),
        )
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::Visibility;
    use ark_ff::One;

    fn coefficients(extra: &[u64]) -> Vec<Fr> {
        let mut v = vec![Fr::zero(), Fr::one(), Fr::from(2u64), -Fr::one()];
        v.extend(extra.iter().map(|&x| Fr::from(x)));
        v
    }

    fn cs_with_coefficients(extra: &[u64]) -> R1cs {
        R1cs::new(1, 0, 0, 0, Vec::new(), coefficients(extra))
    }

    #[test]
    fn test_add_term_shortcuts() {
        let cs = cs_with_coefficients(&[5]);
        let value = Fr::from(7u64);

        let mut acc = Fr::zero();
        cs.add_term(&mut acc, Term::new(COEFF_ID_ONE, 0, Visibility::Public), value);
        assert_eq!(acc, Fr::from(7u64));

        cs.add_term(&mut acc, Term::new(COEFF_ID_MINUS_ONE, 0, Visibility::Public), value);
        assert_eq!(acc, Fr::zero());

        cs.add_term(&mut acc, Term::new(COEFF_ID_ZERO, 0, Visibility::Public), value);
        assert_eq!(acc, Fr::zero());

        cs.add_term(&mut acc, Term::new(COEFF_ID_TWO, 0, Visibility::Public), value);
        assert_eq!(acc, Fr::from(14u64));

        // generic path: 5 * 7 on top of 14
        cs.add_term(&mut acc, Term::new(4, 0, Visibility::Public), value);
        assert_eq!(acc, Fr::from(49u64));
    }

    #[test]
    fn test_mul_by_coeff_inverse_shortcuts() {
        let cs = cs_with_coefficients(&[5]);

        let mut x = Fr::from(12u64);
        assert!(cs.mul_by_coeff_inverse(&mut x, Term::new(COEFF_ID_ONE, 0, Visibility::Public)));
        assert_eq!(x, Fr::from(12u64));

        assert!(cs.mul_by_coeff_inverse(&mut x, Term::new(COEFF_ID_MINUS_ONE, 0, Visibility::Public)));
        assert_eq!(x, -Fr::from(12u64));

        let mut x = Fr::from(12u64);
        assert!(cs.mul_by_coeff_inverse(&mut x, Term::new(COEFF_ID_TWO, 0, Visibility::Public)));
        assert_eq!(x, Fr::from(6u64));

        // dividing 35 by the generic coefficient 5
        let mut x = Fr::from(35u64);
        assert!(cs.mul_by_coeff_inverse(&mut x, Term::new(4, 0, Visibility::Public)));
        assert_eq!(x, Fr::from(7u64));

        let mut x = Fr::from(12u64);
        assert!(!cs.mul_by_coeff_inverse(&mut x, Term::new(COEFF_ID_ZERO, 0, Visibility::Public)));
    }

    #[test]
    fn test_eval_and_instantiate() {
        // l = 3*w1 + w2, r = ONE, o = 2*w1
        let cs = cs_with_coefficients(&[3]);
        let c = R1C {
            l: vec![
                Term::new(4, 1, Visibility::Public),
                Term::new(COEFF_ID_ONE, 2, Visibility::Secret),
            ],
            r: vec![Term::new(COEFF_ID_ONE, 0, Visibility::Public)],
            o: vec![Term::new(COEFF_ID_TWO, 1, Visibility::Public)],
        };
        let wires = vec![Fr::one(), Fr::from(10u64), Fr::from(4u64)];
        let (a, b, o) = cs.instantiate(&c, &wires);
        assert_eq!(a, Fr::from(34u64));
        assert_eq!(b, Fr::one());
        assert_eq!(o, Fr::from(20u64));
    }

    #[test]
    fn test_eval_empty_expression_is_zero() {
        let cs = cs_with_coefficients(&[]);
        assert_eq!(cs.eval(&[], &[Fr::one()]), Fr::zero());
    }

    #[test]
    fn test_hint_map_rebuild() {
        let cs = cs_with_coefficients(&[]).with_hints(vec![
            Hint {
                wire_id: 7,
                id: HintId::IS_ZERO,
                inputs: vec![vec![Term::new(COEFF_ID_ONE, 1, Visibility::Secret)]],
            },
            Hint {
                wire_id: 9,
                id: HintId::ITH_BIT,
                inputs: Vec::new(),
            },
        ]);
        assert_eq!(cs.hint_for_wire(7).map(|h| h.id), Some(HintId::IS_ZERO));
        assert_eq!(cs.hint_for_wire(9).map(|h| h.id), Some(HintId::ITH_BIT));
        assert!(cs.hint_for_wire(8).is_none());
    }

    #[test]
    fn test_introspection() {
        let cs = R1cs::new(2, 3, 4, 0, Vec::new(), coefficients(&[]));
        assert_eq!(cs.nb_wires(), 9);
        assert_eq!(cs.nb_coefficients(), 4);
        assert_eq!(cs.fr_size(), 32);
        assert_eq!(cs.curve_id(), CurveId::Bn254);
    }
}

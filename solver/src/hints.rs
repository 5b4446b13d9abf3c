/// Hint functions.
///
/// A hint lets the prover compute a wire with arbitrary native code instead
/// of a constraint; the surrounding constraints still pin the result down.
/// Two hints ship built in: `is_zero` and `ith_bit`. User hints register
/// under fresh ids; collisions, including with the built-ins, are rejected
/// when the dispatch map is assembled at the start of a solve.

use std::collections::HashMap;
use std::fmt;

use ark_bn254::Fr;
use ark_ff::{BigInteger, Field, One, PrimeField, Zero};
use constraints::HintId;

use crate::error::SolverError;

// ============================================================================
// Hint function type
// ============================================================================

/// Why a hint function rejected its inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HintError {
    /// Called with the wrong number of inputs.
    InputCount { expected: usize, got: usize },
    /// The bit position does not fit in one machine word.
    BitPositionTooLarge,
}

impl fmt::Display for HintError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HintError::InputCount { expected, got } => {
                write!(f, "expected {expected} inputs, got {got}")
            }
            HintError::BitPositionTooLarge => {
                write!(f, "bit position does not fit in one machine word")
            }
        }
    }
}

/// A pure function from evaluated input expressions to one wire value.
/// Purity is a contract: re-running a hint on the same inputs must yield
/// the same output, or solving stops being deterministic.
pub type HintFunction = fn(&[Fr]) -> Result<Fr, HintError>;

/// A user hint offered to the solver: the id the compiled system refers
/// to, and the function to dispatch to.
#[derive(Clone, Copy)]
pub struct HintRegistration {
    pub id: HintId,
    pub f: HintFunction,
}

// ============================================================================
// Built-ins
// ============================================================================

/// `is_zero(x) = 1 - x^(p-1)`.
///
/// By Fermat's little theorem `x^(p-1)` is 1 for every non-zero `x` and 0
/// for `x = 0`, so the result is 1 iff the input is zero.
pub fn is_zero(inputs: &[Fr]) -> Result<Fr, HintError> {
    if inputs.len() != 1 {
        return Err(HintError::InputCount {
            expected: 1,
            got: inputs.len(),
        });
    }
    let mut exp = Fr::MODULUS;
    exp.sub_with_borrow(&<Fr as PrimeField>::BigInt::from(1u64));
    Ok(Fr::one() - inputs[0].pow(exp))
}

/// `ith_bit(value, position)`: the bit at `position` of the canonical
/// (non-Montgomery) integer representative of `value`.
///
/// Positions past the modulus width yield 0; a position that does not fit
/// in one machine word is an error.
pub fn ith_bit(inputs: &[Fr]) -> Result<Fr, HintError> {
    if inputs.len() != 2 {
        return Err(HintError::InputCount {
            expected: 2,
            got: inputs.len(),
        });
    }
    let position = inputs[1].into_bigint();
    let limbs = position.as_ref();
    if limbs[1..].iter().any(|&l| l != 0) {
        return Err(HintError::BitPositionTooLarge);
    }
    let bit = match usize::try_from(limbs[0]) {
        Ok(pos) => inputs[0].into_bigint().get_bit(pos),
        Err(_) => false,
    };
    Ok(if bit { Fr::one() } else { Fr::zero() })
}

// ============================================================================
// Dispatch map
// ============================================================================

/// Assemble the id -> function map for one solve: built-ins first, then the
/// user's registrations. Any id collision is rejected.
pub(crate) fn build_registry(
    user: &[HintRegistration],
) -> Result<HashMap<HintId, HintFunction>, SolverError> {
    let mut registry: HashMap<HintId, HintFunction> = HashMap::with_capacity(user.len() + 2);
    registry.insert(HintId::IS_ZERO, is_zero);
    registry.insert(HintId::ITH_BIT, ith_bit);
    for reg in user {
        if registry.contains_key(&reg.id) {
            return Err(SolverError::DuplicateHint { id: reg.id });
        }
        registry.insert(reg.id, reg.f);
    }
    Ok(registry)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_zero_of_zero() {
        assert_eq!(is_zero(&[Fr::zero()]).unwrap(), Fr::one());
    }

    #[test]
    fn test_is_zero_of_nonzero() {
        assert_eq!(is_zero(&[Fr::from(17u64)]).unwrap(), Fr::zero());
        assert_eq!(is_zero(&[-Fr::one()]).unwrap(), Fr::zero());
    }

    #[test]
    fn test_is_zero_arity() {
        let err = is_zero(&[Fr::one(), Fr::one()]).unwrap_err();
        assert_eq!(err, HintError::InputCount { expected: 1, got: 2 });
    }

    #[test]
    fn test_ith_bit_of_13() {
        // 13 = 0b1101
        let value = Fr::from(13u64);
        for (pos, expected) in [(0u64, 1u64), (1, 0), (2, 1), (3, 1), (4, 0)] {
            let bit = ith_bit(&[value, Fr::from(pos)]).unwrap();
            assert_eq!(bit, Fr::from(expected), "bit {pos}");
        }
    }

    #[test]
    fn test_ith_bit_past_modulus_width_is_zero() {
        let bit = ith_bit(&[Fr::from(13u64), Fr::from(1000u64)]).unwrap();
        assert_eq!(bit, Fr::zero());
    }

    #[test]
    fn test_ith_bit_position_overflow() {
        // 2^64 does not fit in one machine word
        let position = Fr::from(u64::MAX) + Fr::one();
        let err = ith_bit(&[Fr::from(13u64), position]).unwrap_err();
        assert_eq!(err, HintError::BitPositionTooLarge);
    }

    #[test]
    fn test_ith_bit_arity() {
        let err = ith_bit(&[Fr::one()]).unwrap_err();
        assert_eq!(err, HintError::InputCount { expected: 2, got: 1 });
    }

    #[test]
    fn test_registry_rejects_builtin_collision() {
        let err = build_registry(&[HintRegistration {
            id: HintId::IS_ZERO,
            f: is_zero,
        }])
        .unwrap_err();
        assert!(matches!(err, SolverError::DuplicateHint { id } if id == HintId::IS_ZERO));
    }

    #[test]
    fn test_registry_rejects_user_duplicate() {
        fn noop(_: &[Fr]) -> Result<Fr, HintError> {
            Ok(Fr::zero())
        }
        let reg = HintRegistration { id: HintId(40), f: noop };
        let err = build_registry(&[reg, reg]).unwrap_err();
        assert!(matches!(err, SolverError::DuplicateHint { id } if id == HintId(40)));
    }

    #[test]
    fn test_registry_accepts_fresh_ids() {
        fn noop(_: &[Fr]) -> Result<Fr, HintError> {
            Ok(Fr::zero())
        }
        let registry = build_registry(&[HintRegistration { id: HintId(40), f: noop }]).unwrap();
        assert_eq!(registry.len(), 3);
        assert!(registry.contains_key(&HintId::IS_ZERO));
        assert!(registry.contains_key(&HintId::ITH_BIT));
        assert!(registry.contains_key(&HintId(40)));
    }
}

/// Packed term representation.
///
/// A term is a (coefficient id, wire id, visibility) triple packed into a
/// single `u64` so that linear expressions stay dense in memory. The
/// coefficient id indexes the shared coefficient table of the compiled
/// system; the first four ids are reserved for constants the evaluator
/// special-cases to skip a field multiplication.

use serde::{Deserialize, Serialize};

// ============================================================================
// Reserved coefficient ids
// ============================================================================

/// Coefficient id of the constant zero.
pub const COEFF_ID_ZERO: usize = 0;
/// Coefficient id of the constant one.
pub const COEFF_ID_ONE: usize = 1;
/// Coefficient id of the constant two.
pub const COEFF_ID_TWO: usize = 2;
/// Coefficient id of the constant minus one.
pub const COEFF_ID_MINUS_ONE: usize = 3;

// ============================================================================
// Visibility
// ============================================================================

/// Wire visibility, as assigned by the frontend compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    Unset = 0,
    Internal = 1,
    Public = 2,
    Secret = 3,
    Virtual = 4,
}

impl Visibility {
    fn from_bits(bits: u64) -> Visibility {
        match bits {
            1 => Visibility::Internal,
            2 => Visibility::Public,
            3 => Visibility::Secret,
            4 => Visibility::Virtual,
            _ => Visibility::Unset,
        }
    }
}

// ============================================================================
// Term
// ============================================================================

// Bit layout, least significant first:
//   [0, 32)  wire id
//   [32, 60) coefficient id
//   [60, 64) visibility
const WIRE_BITS: u32 = 32;
const COEFF_BITS: u32 = 28;
const WIRE_MASK: u64 = (1 << WIRE_BITS) - 1;
const COEFF_MASK: u64 = (1 << COEFF_BITS) - 1;

/// An immutable `coefficient * wire` factor of a linear expression.
///
/// All three fields are extracted in O(1) with shifts and masks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Term(u64);

impl Term {
    pub fn new(coeff_id: usize, wire_id: usize, visibility: Visibility) -> Term {
        debug_assert!(wire_id as u64 <= WIRE_MASK, "wire id overflows term packing");
        debug_assert!(coeff_id as u64 <= COEFF_MASK, "coefficient id overflows term packing");
        Term(
            ((visibility as u64) << (WIRE_BITS + COEFF_BITS))
                | ((coeff_id as u64 & COEFF_MASK) << WIRE_BITS)
                | (wire_id as u64 & WIRE_MASK),
        )
    }

    #[inline]
    pub fn coeff_id(&self) -> usize {
        ((self.0 >> WIRE_BITS) & COEFF_MASK) as usize
    }

    #[inline]
    pub fn wire_id(&self) -> usize {
        (self.0 & WIRE_MASK) as usize
    }

    #[inline]
    pub fn visibility(&self) -> Visibility {
        Visibility::from_bits(self.0 >> (WIRE_BITS + COEFF_BITS))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_unpack() {
        let t = Term::new(5, 42, Visibility::Secret);
        assert_eq!(t.coeff_id(), 5);
        assert_eq!(t.wire_id(), 42);
        assert_eq!(t.visibility(), Visibility::Secret);
    }

    #[test]
    fn test_pack_extremes() {
        let t = Term::new(COEFF_MASK as usize, WIRE_MASK as usize, Visibility::Virtual);
        assert_eq!(t.coeff_id(), COEFF_MASK as usize);
        assert_eq!(t.wire_id(), WIRE_MASK as usize);
        assert_eq!(t.visibility(), Visibility::Virtual);
    }

    #[test]
    fn test_all_visibilities_roundtrip() {
        for vis in [
            Visibility::Unset,
            Visibility::Internal,
            Visibility::Public,
            Visibility::Secret,
            Visibility::Virtual,
        ] {
            assert_eq!(Term::new(0, 0, vis).visibility(), vis);
        }
    }

    #[test]
    fn test_reserved_ids_are_distinct() {
        let ids = [COEFF_ID_ZERO, COEFF_ID_ONE, COEFF_ID_TWO, COEFF_ID_MINUS_ONE];
        for (i, a) in ids.iter().enumerate() {
            for b in &ids[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}

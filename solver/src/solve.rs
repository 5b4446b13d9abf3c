/// Witness solving.
///
/// A single ordered pass over the computational constraints discovers the
/// value of every internal wire: each constraint carries at most one wire
/// the solver has not seen, so solving `L · R = O` for the missing side
/// pins it down. Hint wires are resolved in-pass by dispatching to the
/// registered hint functions. A second pass checks the assertion
/// constraints, by which point every wire must be known.

use std::collections::HashMap;

use ark_bn254::Fr;
use ark_ff::{Field, One, Zero};
use constraints::{HintId, LogEntry, R1cs, Term, R1C};

use crate::error::SolverError;
use crate::hints::{build_registry, HintError, HintFunction, HintRegistration};

// Side markers for the unknown term of a constraint.
const LOC_NONE: u8 = 0;
const LOC_L: u8 = 1;
const LOC_R: u8 = 2;
const LOC_O: u8 = 3;

// ============================================================================
// Entry points
// ============================================================================

/// Check that `witness` solves the system, allocating the working buffers
/// internally.
pub fn is_solved(
    cs: &R1cs,
    witness: &[Fr],
    hint_functions: &[HintRegistration],
) -> Result<(), SolverError> {
    let mut a = vec![Fr::zero(); cs.nb_constraints];
    let mut b = vec![Fr::zero(); cs.nb_constraints];
    let mut c = vec![Fr::zero(); cs.nb_constraints];
    let mut wire_values = vec![Fr::zero(); cs.nb_wires()];
    solve(cs, witness, &mut a, &mut b, &mut c, &mut wire_values, hint_functions)
}

/// Compute all wires and fill the per-constraint `a`, `b`, `c` vectors.
///
/// `witness` holds the public inputs (without the ONE wire) followed by the
/// secret inputs. `a`, `b`, `c` must each have length `nb_constraints` and
/// `wire_values` length `nb_wires()`; all four are written in place.
///
/// Deferred circuit logs are flushed to the configured sink on every exit
/// path, success or failure.
pub fn solve(
    cs: &R1cs,
    witness: &[Fr],
    a: &mut [Fr],
    b: &mut [Fr],
    c: &mut [Fr],
    wire_values: &mut [Fr],
    hint_functions: &[HintRegistration],
) -> Result<(), SolverError> {
    let mut instantiated = vec![false; wire_values.len()];
    let result = solve_inner(cs, witness, a, b, c, wire_values, &mut instantiated, hint_functions);
    cs.flush_logs(wire_values, &instantiated);
    result
}

#[allow(clippy::too_many_arguments)]
fn solve_inner(
    cs: &R1cs,
    witness: &[Fr],
    a: &mut [Fr],
    b: &mut [Fr],
    c: &mut [Fr],
    wire_values: &mut [Fr],
    instantiated: &mut [bool],
    hint_functions: &[HintRegistration],
) -> Result<(), SolverError> {
    let expected_witness = (cs.nb_public_variables + cs.nb_secret_variables).saturating_sub(1);
    if witness.len() != expected_witness {
        return Err(SolverError::InvalidWitnessSize {
            got: witness.len(),
            expected: expected_witness,
            public: cs.nb_public_variables.saturating_sub(1),
            secret: cs.nb_secret_variables,
        });
    }
    for (buffer, got) in [("a", a.len()), ("b", b.len()), ("c", c.len())] {
        if got != cs.nb_constraints {
            return Err(SolverError::InvalidBufferSize {
                buffer,
                got,
                expected: cs.nb_constraints,
            });
        }
    }
    if wire_values.len() != cs.nb_wires() {
        return Err(SolverError::InvalidBufferSize {
            buffer: "wire_values",
            got: wire_values.len(),
            expected: cs.nb_wires(),
        });
    }

    // Seed the ONE wire and the caller's inputs; internal wires start
    // uninstantiated.
    wire_values[0] = Fr::one();
    instantiated[0] = true;
    wire_values[1..1 + witness.len()].copy_from_slice(witness);
    for flag in &mut instantiated[1..1 + witness.len()] {
        *flag = true;
    }

    let registry = build_registry(hint_functions)?;

    // Index into debug_info_computation; advances by one for each division
    // performed while solving a constraint.
    let mut debug_offset: usize = 0;

    // Computational phase: solve, then re-evaluate and check.
    for i in 0..cs.nb_co_constraints {
        let r1c = &cs.constraints[i];
        debug_offset += solve_r1c(cs, i, r1c, instantiated, wire_values, &registry)?;

        let (ai, bi, ci) = cs.instantiate(r1c, wire_values);
        a[i] = ai;
        b[i] = bi;
        c[i] = ci;
        if ai * bi != ci {
            return Err(unsatisfied(
                i,
                cs.debug_info_computation.get(debug_offset),
                wire_values,
                instantiated,
            ));
        }
    }

    // Assertion phase: every wire referenced here is already known.
    for i in cs.nb_co_constraints..cs.nb_constraints {
        let (ai, bi, ci) = cs.instantiate(&cs.constraints[i], wire_values);
        a[i] = ai;
        b[i] = bi;
        c[i] = ci;
        if ai * bi != ci {
            return Err(unsatisfied(
                i,
                cs.debug_info_assertion.get(i - cs.nb_co_constraints),
                wire_values,
                instantiated,
            ));
        }
    }

    if let Some(wire) = instantiated.iter().position(|&set| !set) {
        return Err(SolverError::UninstantiatedWire { wire });
    }

    Ok(())
}

fn unsatisfied(
    constraint: usize,
    entry: Option<&LogEntry>,
    wire_values: &[Fr],
    instantiated: &[bool],
) -> SolverError {
    SolverError::UnsatisfiedConstraint {
        constraint,
        debug: entry.map(|e| e.resolve(wire_values, instantiated)),
    }
}

// ============================================================================
// solve_r1c
// ============================================================================

/// Solve one computational constraint.
///
/// Walks L, R, then O. Known wires accumulate into the side value; an
/// uninstantiated hint wire is computed in-pass; any other uninstantiated
/// wire is the constraint's single unknown, recovered by solving
/// `L · R = O` for the side holding it.
///
/// Returns 1 when a field division was performed (unknown in L or R with a
/// non-zero denominator), 0 otherwise; the caller uses the running sum to
/// index the computational debug info. A zero denominator or a
/// non-invertible coefficient leaves the wire uninstantiated so the
/// caller's `a · b == c` check reports the failure.
fn solve_r1c(
    cs: &R1cs,
    constraint: usize,
    r1c: &R1C,
    instantiated: &mut [bool],
    wire_values: &mut [Fr],
    registry: &HashMap<HintId, HintFunction>,
) -> Result<usize, SolverError> {
    let mut loc = LOC_NONE;
    let mut term_to_compute = None;
    let mut acc = [Fr::zero(); 3];

    for (side, terms) in [(LOC_L, &r1c.l), (LOC_R, &r1c.r), (LOC_O, &r1c.o)] {
        for &t in terms {
            process_term(
                cs,
                constraint,
                t,
                side,
                &mut acc[(side - 1) as usize],
                &mut loc,
                &mut term_to_compute,
                instantiated,
                wire_values,
                registry,
            )?;
        }
    }

    // No unknown left: every wire was already known or resolved by hints.
    let Some(term) = term_to_compute else {
        return Ok(0);
    };

    let [av, bv, cv] = acc;
    let wire = term.wire_id();
    let mut offset = 0;
    let mut value = None;

    match loc {
        LOC_L => {
            if let Some(b_inv) = bv.inverse() {
                value = Some(cv * b_inv - av);
                offset = 1;
            }
        }
        LOC_R => {
            if let Some(a_inv) = av.inverse() {
                value = Some(cv * a_inv - bv);
                offset = 1;
            }
        }
        _ => {
            value = Some(av * bv - cv);
        }
    }

    // The unknown term contributes coeff * wire to its side, so the wire is
    // the computed value divided by the coefficient.
    if let Some(mut v) = value {
        if cs.mul_by_coeff_inverse(&mut v, term) {
            wire_values[wire] = v;
            instantiated[wire] = true;
        }
    }

    Ok(offset)
}

#[allow(clippy::too_many_arguments)]
fn process_term(
    cs: &R1cs,
    constraint: usize,
    t: Term,
    side: u8,
    acc: &mut Fr,
    loc: &mut u8,
    term_to_compute: &mut Option<Term>,
    instantiated: &mut [bool],
    wire_values: &mut [Fr],
    registry: &HashMap<HintId, HintFunction>,
) -> Result<(), SolverError> {
    let wire = t.wire_id();

    // Already computed: just accumulate.
    if instantiated[wire] {
        cs.add_term(acc, t, wire_values[wire]);
        return Ok(());
    }

    // Hint wire: evaluate the input expressions, dispatch, accumulate.
    if let Some(hint) = cs.hint_for_wire(wire) {
        let mut inputs = Vec::with_capacity(hint.inputs.len());
        for input in &hint.inputs {
            let mut value = Fr::zero();
            for &it in input {
                let input_wire = it.wire_id();
                if !instantiated[input_wire] {
                    return Err(SolverError::HintPrerequisiteMissing {
                        hint_wire: wire,
                        input_wire,
                    });
                }
                cs.add_term(&mut value, it, wire_values[input_wire]);
            }
            inputs.push(value);
        }

        let Some(f) = registry.get(&hint.id) else {
            return Err(SolverError::MissingHintFunction { id: hint.id });
        };
        wire_values[wire] = f(&inputs).map_err(|err| match err {
            HintError::InputCount { expected, got } => SolverError::InvalidHintSignature {
                id: hint.id,
                expected,
                got,
            },
            other => SolverError::HintFailed { id: hint.id, err: other },
        })?;
        instantiated[wire] = true;
        cs.add_term(acc, t, wire_values[wire]);
        return Ok(());
    }

    // The constraint's single unknown.
    if *loc != LOC_NONE {
        return Err(SolverError::MultipleUnknowns { constraint, wire });
    }
    *term_to_compute = Some(t);
    *loc = side;
    Ok(())
}

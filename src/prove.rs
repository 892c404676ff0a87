//! # Prove: Certificate Construction
//!
//! Builds generalized Pocklington certificates for probable primes and whole
//! dependency-closed certificate chains.
//!
//! ## Strategy
//!
//! 1. Reject composites with the probabilistic test. Without this pre-filter
//!    the base search below would never find a witness for a composite.
//! 2. Factor `N-1` partially with `find_a`: trial division until the
//!    remaining cofactor is a probable prime. Either the cofactor alone
//!    exceeds `√(N-1)` and becomes `A`, or the smooth part does.
//! 3. Try bases 2, 3, … until `check_gen` produces unit residues for every
//!    prime of `A`. For a prime `N` almost every base works, so the search
//!    normally ends at 2 or 3.
//!
//! If the probabilistic test accepted a composite, step 3 finds nothing and
//! the search stops at `ProverConfig::max_base` with `NoWitnessFound`.
//! Step 2 stops at `ProverConfig::max_trial_divisor` with
//! `TrialDivisionExhausted` when `N-1` has two large prime factors.

use std::collections::HashSet;

use rug::Integer;
use tracing::debug;

use crate::certificate::{FactorEntry, FactoredInt, GeneralizedPocklingtonProof, Inverse, Proof};
use crate::config::ProverConfig;
use crate::error::CertError;
use crate::registry::Registry;
use crate::{fermat_holds, is_probable_prime, proth, witness_residue};

/// Partially factor `m` (normally `N-1`) into a part usable as Pocklington's `A`.
///
/// Trial-divides by 2, 3, 4, … until the remainder is 1 or a probable prime.
/// If that remainder `rem` satisfies `rem² > m` it is returned alone as
/// `{rem, [(rem, 1)]}`; otherwise the smooth part `m / rem` with the
/// accumulated factors is returned.
///
/// Returns `None` if the divisor passes `max_divisor` while the remainder is
/// still composite.
pub fn find_a(m: &Integer, mr_rounds: u32, max_divisor: u64) -> Option<FactoredInt> {
    let mut p = Integer::from(2);
    let mut rem = m.clone();
    let mut factors = Vec::new();
    while rem > 1 && !is_probable_prime(&rem, mr_rounds) {
        if p > max_divisor {
            debug!(%m, cofactor = %rem, max_divisor, "find_a: trial division exhausted");
            return None;
        }
        let mut e = 0u32;
        while rem.is_divisible(&p) {
            rem.div_exact_mut(&p);
            e += 1;
        }
        if e > 0 {
            factors.push(FactorEntry {
                prime: p.clone(),
                exponent: e,
            });
        }
        p += 1u32;
    }
    if rem > 1 && *m < Integer::from(rem.square_ref()) {
        debug!(%m, cofactor = %rem, "find_a: using probable-prime cofactor");
        return Some(FactoredInt {
            value: rem.clone(),
            factorization: vec![FactorEntry {
                prime: rem,
                exponent: 1,
            }],
        });
    }
    debug!(%m, factors = factors.len(), cofactor = %rem, "find_a: using smooth part");
    Some(FactoredInt {
        value: Integer::from(m / &rem),
        factorization: factors,
    })
}

/// Try `base` as the witness for `n` with factored part `a`.
///
/// On success returns one `Inverse` per distinct residue
/// `base^((n-1)/p) - 1 mod n`. Fails with `NoWitness` if some residue is not
/// a unit or `base^(n-1) ≢ 1 (mod n)`.
pub fn check_gen(n: &Integer, a: &FactoredInt, base: &Integer) -> Result<Vec<Inverse>, CertError> {
    let no_witness = || CertError::NoWitness {
        n: n.clone(),
        base: base.clone(),
    };
    let n_minus_1 = Integer::from(n - 1u32);
    if !fermat_holds(base, &n_minus_1, n) {
        return Err(no_witness());
    }
    let mut seen = HashSet::new();
    let mut inverses = Vec::new();
    for entry in &a.factorization {
        let value = witness_residue(base, &n_minus_1, &entry.prime, n);
        let inverse = value.clone().invert(n).map_err(|_| no_witness())?;
        if seen.insert(value.clone()) {
            inverses.push(Inverse {
                modulus: n.clone(),
                value,
                inverse,
            });
        }
    }
    Ok(inverses)
}

/// Search bases `first..=last` for a witness and assemble the proof.
pub(crate) fn search_base(
    n: &Integer,
    a: FactoredInt,
    first: u64,
    last: u64,
) -> Result<Proof, CertError> {
    for b in first..=last {
        let base = Integer::from(b);
        match check_gen(n, &a, &base) {
            Ok(inverses) => {
                debug!(%n, base = b, "witness found");
                return Ok(Proof::pocklington(
                    n.clone(),
                    GeneralizedPocklingtonProof { a, base, inverses },
                ));
            }
            Err(e) => debug!(%n, base = b, error = %e, "base rejected"),
        }
    }
    Err(CertError::NoWitnessFound {
        n: n.clone(),
        first_base: first,
        last_base: last,
    })
}

/// Construct a generalized Pocklington certificate for `n`.
///
/// The returned proof passes `Proof::check`; its dependencies still need
/// certificates of their own (see `prove_chain`).
pub fn prove(n: &Integer, config: &ProverConfig) -> Result<Proof, CertError> {
    if *n == 2 {
        return Ok(Proof::two());
    }
    if *n < 2 {
        return Err(CertError::NotPrimeCandidate { n: n.clone() });
    }
    if !is_probable_prime(n, config.mr_rounds) {
        return Err(CertError::LikelyComposite { n: n.clone() });
    }
    let n_minus_1 = Integer::from(n - 1u32);
    let a = find_a(&n_minus_1, config.mr_rounds, config.max_trial_divisor).ok_or_else(|| {
        CertError::TrialDivisionExhausted {
            n: n.clone(),
            limit: config.max_trial_divisor,
        }
    })?;
    search_base(n, a, 2, config.max_base)
}

/// Prove one node, trying the Proth fast path first when configured.
fn prove_node(n: &Integer, config: &ProverConfig) -> Result<Proof, CertError> {
    if config.try_proth && *n != 2 {
        match proth::prove_proth(n, config) {
            Ok(proof) => return Ok(proof),
            Err(CertError::NotProthShape { .. }) | Err(CertError::NoWitnessFound { .. }) => {}
            Err(e) => return Err(e),
        }
    }
    prove(n, config)
}

/// Prove `n` and, recursively, every prime its certificates depend on.
///
/// Each distinct integer is proved once. Proofs are listed leaves first, so
/// the registry reads bottom-up from 2 to `n`.
pub fn prove_chain(n: &Integer, config: &ProverConfig) -> Result<Registry, CertError> {
    let mut seen: HashSet<Integer> = HashSet::new();
    let mut stack = vec![n.clone()];
    let mut proofs = Vec::new();
    while let Some(current) = stack.pop() {
        if !seen.insert(current.clone()) {
            continue;
        }
        let proof = prove_node(&current, config)?;
        stack.extend(proof.dep().into_iter().cloned());
        proofs.push(proof);
    }
    proofs.reverse();
    debug!(%n, proofs = proofs.len(), "certificate chain complete");
    Ok(Registry { proofs })
}

//! # Pocklington: Certificate Verification
//!
//! Pure checks that a proof node is internally consistent. A passing node
//! proves `n` prime *provided* every prime returned by `dep()` is prime; the
//! registry closure pass (`registry.rs`) discharges those obligations.
//!
//! ## Generalized Pocklington Criterion
//!
//! Let `N - 1 = A·B` with `gcd(A, B) = 1` and `B < A` (so `A > √N`). If there
//! is a base `b` with `b^(N-1) ≡ 1 (mod N)` and, for every prime `p | A`,
//! `gcd(b^((N-1)/p) - 1, N) = 1`, then every prime factor of `N` is
//! `≡ 1 (mod A)`, hence exceeds `√N`, hence `N` is prime.
//!
//! The gcd conditions are witnessed by explicit inverses: the proof carries
//! one `Inverse` per distinct residue and the verifier recomputes the residue
//! set from the base and compares.
//!
//! ## References
//!
//! - H.C. Pocklington, "The Determination of the Prime or Composite Nature
//!   of Large Numbers by Fermat's Theorem", Proc. Cambridge Phil. Soc., 1914.
//! - D.J. Bernstein, T. Lange, "SafeCurves": primality proofs for curve
//!   parameters, <https://safecurves.cr.yp.to/proof.html>.

use std::collections::HashSet;

use rug::Integer;

use crate::certificate::{GeneralizedPocklingtonProof, Proof};
use crate::error::CertError;
use crate::{fermat_holds, witness_residue};

impl GeneralizedPocklingtonProof {
    /// Verify this proof for the claimed prime `n`.
    ///
    /// Beyond the structural steps (A divides N-1, A > B, gcd(A, B) = 1, one
    /// unit witness per residue) this also requires `base^(N-1) ≡ 1 (mod N)`,
    /// checked last. Records that omit it, such as N = 9 with base 3, fail
    /// here with `FermatFailure` although they pass every earlier step.
    pub fn check(&self, n: &Integer) -> Result<(), CertError> {
        if *n < 2 {
            return Err(CertError::NotPrimeCandidate { n: n.clone() });
        }
        self.a.check().map_err(|e| CertError::InvalidA {
            n: n.clone(),
            source: Box::new(e),
        })?;

        let a = &self.a.value;
        let n_minus_1 = Integer::from(n - 1u32);
        let (b, rem) = n_minus_1.clone().div_rem(a.clone());
        if rem != 0 {
            return Err(CertError::NotDivisible {
                a: a.clone(),
                n_minus_1,
            });
        }
        if b >= *a {
            return Err(CertError::InsufficientA { a: a.clone(), b });
        }
        if b.clone().invert(a).is_err() {
            return Err(CertError::NotCoprime { a: a.clone(), b });
        }

        let mut from_inverses = HashSet::new();
        for inv in &self.inverses {
            inv.check()?;
            if inv.modulus != *n {
                return Err(CertError::WrongModulus {
                    expected: n.clone(),
                    found: inv.modulus.clone(),
                });
            }
            if !from_inverses.insert(&inv.value) {
                return Err(CertError::DuplicateWitness {
                    value: inv.value.clone(),
                });
            }
        }

        let from_base: HashSet<Integer> = self
            .a
            .factorization
            .iter()
            .map(|entry| witness_residue(&self.base, &n_minus_1, &entry.prime, n))
            .collect();
        let matches = from_inverses.len() == from_base.len()
            && from_base.iter().all(|r| from_inverses.contains(r));
        if !matches {
            return Err(CertError::WitnessSetMismatch);
        }

        if !fermat_holds(&self.base, &n_minus_1, n) {
            return Err(CertError::FermatFailure {
                n: n.clone(),
                base: self.base.clone(),
            });
        }
        Ok(())
    }

    /// Primes whose own certificates this proof relies on.
    pub fn dep(&self) -> Vec<&Integer> {
        self.a.factorization.iter().map(|entry| &entry.prime).collect()
    }
}

impl Proof {
    /// Check the proof per se. Dependencies are not followed; see
    /// `Registry::check` for that.
    pub fn check(&self) -> Result<(), CertError> {
        if self.n == 2 {
            return Ok(());
        }
        match &self.inner {
            Some(inner) => inner.check(&self.n),
            None => Err(CertError::MissingProof { n: self.n.clone() }),
        }
    }

    /// Primes this proof depends on; empty for `n = 2`.
    pub fn dep(&self) -> Vec<&Integer> {
        if self.n == 2 {
            return Vec::new();
        }
        self.inner.as_ref().map(|p| p.dep()).unwrap_or_default()
    }
}

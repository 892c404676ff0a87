//! # Proth: Fast-Path Certificates for k·2^m + 1
//!
//! For a Proth number `N = k·2^m + 1` with odd `k < 2^m`, the power of two
//! `A = 2^m` already exceeds `√N`, so `N-1` needs no trial division: the
//! certificate's factored part is simply `{2^m, [(2, m)]}` and the only
//! dependency is 2. A single witness base is searched over a small fixed
//! range (2..100 by default); for a prime `N` half of all bases are
//! quadratic non-residues and work.
//!
//! No probabilistic test runs here. A composite of Proth shape simply has no
//! witness (the Fermat condition fails) and the search reports
//! `NoWitnessFound`.
//!
//! ## References
//!
//! - François Proth, "Théorèmes sur les nombres premiers", 1878.
//! - <https://en.wikipedia.org/wiki/Proth%27s_theorem>

use rug::Integer;

use crate::certificate::{FactorEntry, FactoredInt, Proof};
use crate::config::ProverConfig;
use crate::error::CertError;
use crate::prove::search_base;

/// Split `n - 1` as `k·2^m` with `k` odd. Returns `None` unless `n` has
/// Proth shape (`n` odd, `n > 1`, `k < 2^m`).
pub fn proth_split(n: &Integer) -> Option<(Integer, u32)> {
    if *n <= 1 || n.is_even() {
        return None;
    }
    let n_minus_1 = Integer::from(n - 1u32);
    let m = n_minus_1.find_one(0)?;
    let k = n_minus_1 >> m;
    if k.significant_bits() > m {
        return None;
    }
    Some((k, m))
}

/// Construct a certificate for a Proth number using bases
/// `2..config.proth_max_base`.
pub fn prove_proth(n: &Integer, config: &ProverConfig) -> Result<Proof, CertError> {
    if *n <= 1 {
        return Err(CertError::NotPrimeCandidate { n: n.clone() });
    }
    let (_, apow) = proth_split(n).ok_or_else(|| CertError::NotProthShape { n: n.clone() })?;
    let a = FactoredInt {
        value: Integer::from(1) << apow,
        factorization: vec![FactorEntry {
            prime: Integer::from(2),
            exponent: apow,
        }],
    };
    search_base(n, a, 2, config.proth_max_base.saturating_sub(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::is_probable_prime;

    fn int(v: u64) -> Integer {
        Integer::from(v)
    }

    #[test]
    fn split_known_shapes() {
        assert_eq!(proth_split(&int(3)), Some((int(1), 1)));
        assert_eq!(proth_split(&int(13)), Some((int(3), 2)));
        assert_eq!(proth_split(&int(257)), Some((int(1), 8)));
        assert_eq!(proth_split(&int(998_244_353)), Some((int(119), 23)));
    }

    #[test]
    fn split_rejects_non_proth() {
        // 7 - 1 = 3 * 2, 3 > 2
        assert_eq!(proth_split(&int(7)), None);
        // 11 - 1 = 5 * 2
        assert_eq!(proth_split(&int(11)), None);
        assert_eq!(proth_split(&int(2)), None);
        assert_eq!(proth_split(&int(1)), None);
        assert_eq!(proth_split(&int(0)), None);
    }

    #[test]
    fn split_boundary() {
        // 5 * 2^2 + 1 = 21: 5 > 4
        assert_eq!(proth_split(&int(21)), None);
        // 3 * 2^2 + 1 = 13: 3 < 4
        assert!(proth_split(&int(13)).is_some());
    }

    #[test]
    fn proves_known_proth_primes() {
        let config = ProverConfig::default();
        for n in [3u64, 5, 13, 17, 97, 257, 65537, 786_433, 998_244_353, 2_013_265_921] {
            let proof = prove_proth(&int(n), &config).unwrap();
            assert_eq!(proof.check(), Ok(()), "self-check failed for {}", n);
            assert_eq!(proof.dep(), vec![&int(2)]);
        }
    }

    #[test]
    fn fermat_prime_f4() {
        let proof = prove_proth(&int(65537), &ProverConfig::default()).unwrap();
        let inner = proof.inner.as_ref().unwrap();
        assert_eq!(inner.a.value, 65536);
        assert_eq!(inner.a.factorization, vec![FactorEntry::new(2, 16)]);
        assert_eq!(inner.base, 3);
    }

    #[test]
    fn even_and_small_inputs() {
        let config = ProverConfig::default();
        assert!(matches!(
            prove_proth(&int(1), &config),
            Err(CertError::NotPrimeCandidate { .. })
        ));
        assert!(matches!(
            prove_proth(&Integer::from(-7), &config),
            Err(CertError::NotPrimeCandidate { .. })
        ));
        assert!(matches!(
            prove_proth(&int(2), &config),
            Err(CertError::NotProthShape { .. })
        ));
        assert!(matches!(
            prove_proth(&int(64), &config),
            Err(CertError::NotProthShape { .. })
        ));
    }

    #[test]
    fn non_proth_prime_is_not_applicable() {
        assert_eq!(
            prove_proth(&int(7), &ProverConfig::default()),
            Err(CertError::NotProthShape { n: int(7) })
        );
    }

    #[test]
    fn never_certifies_composites_below_100() {
        let config = ProverConfig::default();
        for n in 2u64..100 {
            let n = int(n);
            if is_probable_prime(&n, 20) {
                continue;
            }
            match prove_proth(&n, &config) {
                Err(CertError::NotProthShape { .. }) | Err(CertError::NoWitnessFound { .. }) => {}
                other => panic!("unexpected result for composite {}: {:?}", n, other),
            }
        }
    }

    #[test]
    fn composite_proth_numbers_exhaust_range() {
        let config = ProverConfig::default();
        for n in [9u64, 25, 33, 49, 57, 65, 81] {
            assert_eq!(
                prove_proth(&int(n), &config),
                Err(CertError::NoWitnessFound {
                    n: int(n),
                    first_base: 2,
                    last_base: 99,
                })
            );
        }
    }

    #[test]
    fn narrow_base_range() {
        // 257: base 2 fails (2 is a square mod 257), base 3 works
        let config = ProverConfig {
            proth_max_base: 3,
            ..ProverConfig::default()
        };
        assert!(matches!(
            prove_proth(&int(257), &config),
            Err(CertError::NoWitnessFound { last_base: 2, .. })
        ));
    }
}

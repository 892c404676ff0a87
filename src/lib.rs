pub mod certificate;
pub mod config;
pub mod error;
pub mod expr;
pub mod pocklington;
pub mod proth;
pub mod prove;
pub mod registry;
pub mod scrape;

pub use certificate::{FactorEntry, FactoredInt, GeneralizedPocklingtonProof, Inverse, Proof};
pub use config::ProverConfig;
pub use error::CertError;
pub use registry::Registry;

use rug::integer::IsPrime;
use rug::Integer;

/// Miller-Rabin rounds used when no configuration overrides it (error ≈ 2^-40).
pub const DEFAULT_MR_ROUNDS: u32 = 20;

/// Two-round Miller-Rabin pre-screening: run 2 fast rounds first, full rounds only for survivors.
/// Most composites fail within the first two rounds.
pub fn is_probable_prime(candidate: &Integer, mr_rounds: u32) -> bool {
    if mr_rounds > 2 && candidate.is_probably_prime(2) == IsPrime::No {
        return false;
    }
    candidate.is_probably_prime(mr_rounds) != IsPrime::No
}

/// `(base^((n-1)/q) - 1) mod n`, the residue a Pocklington witness must make a unit.
pub(crate) fn witness_residue(
    base: &Integer,
    n_minus_1: &Integer,
    q: &Integer,
    n: &Integer,
) -> Integer {
    let exp = Integer::from(n_minus_1 / q);
    let power = base
        .pow_mod_ref(&exp, n)
        .map(Integer::from)
        .unwrap_or_default();
    (power - 1u32).rem_euc(n)
}

/// Fermat condition of Pocklington's theorem: `base^(n-1) ≡ 1 (mod n)`.
pub(crate) fn fermat_holds(base: &Integer, n_minus_1: &Integer, n: &Integer) -> bool {
    base.pow_mod_ref(n_minus_1, n)
        .map(|power| Integer::from(power) == 1)
        .unwrap_or(false)
}

//! Error taxonomy for certificate verification and construction.
//!
//! Every variant is terminal for the record being checked: nothing retries
//! internally. Callers that want a different outcome (another base range, a
//! different prover) re-run with different parameters.

use rug::Integer;

/// Failure while checking or constructing a primality certificate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CertError {
    /// Product of `prime^exponent` does not reproduce the claimed value.
    #[error("factorization is incorrect: {product} != {value}")]
    FactorizationMismatch { product: Integer, value: Integer },

    /// A factorization lists an entry that cannot be a prime.
    #[error("factorization lists {prime}, which is not >= 2")]
    InvalidFactor { prime: Integer },

    /// The factored part A of a Pocklington proof is itself malformed.
    #[error("invalid A in verifying {n}: {source}")]
    InvalidA {
        n: Integer,
        #[source]
        source: Box<CertError>,
    },

    #[error("inverse is incorrect: {value} * {inverse} != 1 (mod {modulus})")]
    InvalidInverse {
        modulus: Integer,
        value: Integer,
        inverse: Integer,
    },

    #[error("invalid modulus in inverse: expected {expected}, found {found}")]
    WrongModulus { expected: Integer, found: Integer },

    #[error("duplicate inverse for witness value {value}")]
    DuplicateWitness { value: Integer },

    #[error("pocklington: N-1 is not divisible by A: not ({a} | {n_minus_1})")]
    NotDivisible { a: Integer, n_minus_1: Integer },

    /// B = (N-1)/A is not strictly below A, so A^2 > N does not hold.
    #[error("A^2 > N must hold (A = {a}, B = {b})")]
    InsufficientA { a: Integer, b: Integer },

    #[error("pocklington: gcd(A, B) != 1 (A = {a}, B = {b})")]
    NotCoprime { a: Integer, b: Integer },

    #[error("set of inverses is not correct")]
    WitnessSetMismatch,

    /// `base^(N-1) mod N` is not 1, so the base witnesses compositeness.
    #[error("pocklington: {base}^(N-1) != 1 (mod {n})")]
    FermatFailure { n: Integer, base: Integer },

    #[error("missing Pocklington proof for {n}")]
    MissingProof { n: Integer },

    #[error("{n} is composite according to the probabilistic test")]
    LikelyComposite { n: Integer },

    /// A single base failed to produce unit residues.
    #[error("base {base} is not a witness for {n}")]
    NoWitness { n: Integer, base: Integer },

    /// Every base in the searched range failed.
    #[error("no witness for {n} among bases {first_base}..={last_base}")]
    NoWitnessFound {
        n: Integer,
        first_base: u64,
        last_base: u64,
    },

    /// `find_a` reached its divisor cap with `N-1` still not split.
    #[error("trial division of {n}-1 exhausted all divisors up to {limit}")]
    TrialDivisionExhausted { n: Integer, limit: u64 },

    #[error("{n} is not a Proth number")]
    NotProthShape { n: Integer },

    #[error("{n} cannot be prime")]
    NotPrimeCandidate { n: Integer },

    #[error("error in verifying {n} (missing dependency: {dependency})")]
    MissingDependency { n: Integer, dependency: Integer },

    #[error("circular dependency through {n}")]
    CircularDependency { n: Integer },

    #[error("malformed certificate: {0}")]
    Deserialization(String),
}

impl CertError {
    /// The innermost error, looking through `InvalidA` context.
    pub fn root_cause(&self) -> &CertError {
        match self {
            CertError::InvalidA { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

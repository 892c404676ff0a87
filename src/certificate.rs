//! # Certificate: Pocklington Proof Records
//!
//! Value types for a primality certificate chain and their wire encoding.
//!
//! ## Records
//!
//! - **FactoredInt**: an integer together with a claimed factorization.
//! - **Inverse**: a modular inverse witnessing that a residue is a unit.
//! - **GeneralizedPocklingtonProof**: the factored part `A` of `N-1`, a base,
//!   and one inverse per distinct residue `base^((N-1)/p) - 1 mod N`.
//! - **Proof**: a claimed prime `n` with its Pocklington proof (absent for
//!   `n = 2`, the axiomatic leaf of every chain).
//!
//! Verification of proofs lives in `pocklington.rs`; only the two primitive
//! record checks are here.
//!
//! ## Serialization
//!
//! Every integer is encoded as a base-10 string so arbitrary-precision values
//! survive JSON untouched:
//!
//! ```json
//! { "n": "257",
//!   "proof": { "a": { "int": "256", "factorization": [{ "prime": "2", "exponent": 8 }] },
//!              "base": "3",
//!              "inverses": [{ "mod": "257", "value": "255", "inv": "128" }] } }
//! ```
//!
//! Malformed decimal text is rejected during decoding, before any arithmetic.

use rug::ops::Pow;
use rug::Integer;
use serde::{Deserialize, Serialize};

use crate::error::CertError;

/// Parse a wire decimal: an optional `-` followed by one or more ASCII digits.
pub fn parse_decimal(text: &str) -> Result<Integer, CertError> {
    let digits = text.strip_prefix('-').unwrap_or(text);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CertError::Deserialization(format!(
            "invalid decimal integer: {:?}",
            text
        )));
    }
    Integer::from_str_radix(text, 10)
        .map_err(|e| CertError::Deserialization(format!("invalid decimal integer {:?}: {}", text, e)))
}

/// Serde adapter encoding `rug::Integer` as a decimal string.
pub(crate) mod decimal {
    use rug::Integer;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Integer, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Integer, D::Error> {
        let text = String::deserialize(deserializer)?;
        super::parse_decimal(&text).map_err(serde::de::Error::custom)
    }
}

/// One `prime^exponent` term of a factorization.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactorEntry {
    #[serde(with = "decimal")]
    pub prime: Integer,
    pub exponent: u32,
}

impl FactorEntry {
    pub fn new(prime: impl Into<Integer>, exponent: u32) -> Self {
        FactorEntry {
            prime: prime.into(),
            exponent,
        }
    }
}

/// An integer with a claimed factorization.
///
/// The primes are *not* certified here: each one needs its own `Proof`
/// elsewhere in the registry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactoredInt {
    #[serde(rename = "int", with = "decimal")]
    pub value: Integer,
    pub factorization: Vec<FactorEntry>,
}

impl FactoredInt {
    pub fn new(value: impl Into<Integer>, factorization: Vec<FactorEntry>) -> Self {
        FactoredInt {
            value: value.into(),
            factorization,
        }
    }

    /// Check that the product of `prime^exponent` equals `value` exactly.
    ///
    /// The product is never built past the size of `value`: once a term or
    /// the running product is provably larger, the check fails with the
    /// partial product accumulated so far.
    pub fn check(&self) -> Result<(), CertError> {
        let limit = u64::from(self.value.significant_bits());
        let mismatch = |product: Integer| CertError::FactorizationMismatch {
            product,
            value: self.value.clone(),
        };
        let mut product = Integer::from(1);
        for entry in &self.factorization {
            if entry.prime < 2 {
                return Err(CertError::InvalidFactor {
                    prime: entry.prime.clone(),
                });
            }
            // prime^e >= 2^((bits(prime) - 1) * e)
            let floor_bits =
                u64::from(entry.prime.significant_bits() - 1) * u64::from(entry.exponent);
            if entry.exponent > 0 && floor_bits >= limit {
                return Err(mismatch(product));
            }
            product *= Integer::from((&entry.prime).pow(entry.exponent));
            if u64::from(product.significant_bits()) > limit {
                return Err(mismatch(product));
            }
        }
        if product != self.value {
            return Err(mismatch(product));
        }
        Ok(())
    }
}

/// Witness that `value` is a unit modulo `modulus`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inverse {
    #[serde(rename = "mod", with = "decimal")]
    pub modulus: Integer,
    #[serde(with = "decimal")]
    pub value: Integer,
    #[serde(rename = "inv", with = "decimal")]
    pub inverse: Integer,
}

impl Inverse {
    pub fn new(
        modulus: impl Into<Integer>,
        value: impl Into<Integer>,
        inverse: impl Into<Integer>,
    ) -> Self {
        Inverse {
            modulus: modulus.into(),
            value: value.into(),
            inverse: inverse.into(),
        }
    }

    /// Check `value * inverse ≡ 1 (mod modulus)`.
    pub fn check(&self) -> Result<(), CertError> {
        let holds = self.modulus != 0
            && Integer::from(&self.value * &self.inverse).rem_euc(&self.modulus) == 1;
        if !holds {
            return Err(CertError::InvalidInverse {
                modulus: self.modulus.clone(),
                value: self.value.clone(),
                inverse: self.inverse.clone(),
            });
        }
        Ok(())
    }
}

/// Generalized Pocklington witness: `A | N-1`, `B = (N-1)/A < A`,
/// `gcd(A, B) = 1`, and for every prime `p | A` the residue
/// `base^((N-1)/p) - 1` is a unit modulo `N`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneralizedPocklingtonProof {
    pub a: FactoredInt,
    #[serde(with = "decimal")]
    pub base: Integer,
    pub inverses: Vec<Inverse>,
}

/// A claimed prime and its certificate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proof {
    #[serde(with = "decimal")]
    pub n: Integer,
    #[serde(rename = "proof", default, skip_serializing_if = "Option::is_none")]
    pub inner: Option<GeneralizedPocklingtonProof>,
}

impl Proof {
    /// The leaf of every chain: 2 is prime by definition.
    pub fn two() -> Self {
        Proof {
            n: Integer::from(2),
            inner: None,
        }
    }

    pub fn pocklington(n: impl Into<Integer>, inner: GeneralizedPocklingtonProof) -> Self {
        Proof {
            n: n.into(),
            inner: Some(inner),
        }
    }
}

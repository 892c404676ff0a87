//! Parser for factorization expressions such as `"3^2 * 5"`.
//!
//! Grammar (LL(1), parsed by recursive descent):
//!
//! ```text
//! <expr> ::= <pow> | <pow> " * " <expr>
//! <pow>  ::= <num> | <num> "^" <num>
//! <num>  ::= [0-9]+
//! ```

use anyhow::{anyhow, bail, Result};
use rug::ops::Pow;
use rug::Integer;

use crate::certificate::{FactorEntry, FactoredInt};

/// Largest `prime^exponent` term accepted, in bits.
const MAX_TERM_BITS: u64 = 1 << 24;

/// Parse a whole expression into a `FactoredInt`. Trailing input is an error.
pub fn parse_expr(s: &str) -> Result<FactoredInt> {
    let (consumed, factored) = parse_product(s)?;
    if consumed != s.len() {
        bail!("unexpected input at byte {} in {:?}", consumed, s);
    }
    Ok(factored)
}

fn parse_product(s: &str) -> Result<(usize, FactoredInt)> {
    let (mut i, mut value, first) = parse_pow(s)?;
    let mut factorization = vec![first];
    while s[i..].starts_with(" * ") {
        i += 3;
        let (j, term, entry) = parse_pow(&s[i..])?;
        i += j;
        value *= term;
        factorization.push(entry);
    }
    Ok((i, FactoredInt { value, factorization }))
}

/// Returns (bytes consumed, prime^exponent, entry).
fn parse_pow(s: &str) -> Result<(usize, Integer, FactorEntry)> {
    let (mut i, prime) = parse_num(s)?;
    let mut exponent = 1u32;
    if s[i..].starts_with('^') {
        i += 1;
        let (j, exp) = parse_num(&s[i..])?;
        i += j;
        exponent = exp
            .to_u32()
            .ok_or_else(|| anyhow!("exponent {} does not fit in u32", exp))?;
    }
    let floor_bits = u64::from(prime.significant_bits().saturating_sub(1)) * u64::from(exponent);
    if floor_bits > MAX_TERM_BITS {
        bail!("{}^{} is too large", prime, exponent);
    }
    let term = Integer::from((&prime).pow(exponent));
    Ok((i, term, FactorEntry { prime, exponent }))
}

fn parse_num(s: &str) -> Result<(usize, Integer)> {
    let len = s.bytes().take_while(|b| b.is_ascii_digit()).count();
    if len == 0 {
        bail!("not a number: {:?}", s);
    }
    let value = Integer::from_str_radix(&s[..len], 10)?;
    Ok((len, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_product_of_powers() {
        let f = parse_expr("3^2 * 5").unwrap();
        assert_eq!(
            f,
            FactoredInt::new(45, vec![FactorEntry::new(3, 2), FactorEntry::new(5, 1)])
        );
        assert!(f.check().is_ok());
    }

    #[test]
    fn parses_single_number() {
        assert_eq!(
            parse_expr("2").unwrap(),
            FactoredInt::new(2, vec![FactorEntry::new(2, 1)])
        );
    }

    #[test]
    fn parses_single_power() {
        assert_eq!(
            parse_expr("2^8").unwrap(),
            FactoredInt::new(256, vec![FactorEntry::new(2, 8)])
        );
    }

    #[test]
    fn parses_large_factor() {
        let big = "74058212732561358302231226437062788676166966415465897661863160754340907";
        let f = parse_expr(big).unwrap();
        assert_eq!(f.value.to_string(), big);
        assert_eq!(f.factorization.len(), 1);
    }

    #[test]
    fn keeps_insertion_order_and_duplicates() {
        let f = parse_expr("5 * 2^2 * 5").unwrap();
        assert_eq!(f.value, 100);
        let primes: Vec<String> = f.factorization.iter().map(|e| e.prime.to_string()).collect();
        assert_eq!(primes, vec!["5", "2", "5"]);
    }

    #[test]
    fn rejects_malformed_expressions() {
        for bad in ["", "x", "3^", "3 *", "3 * ", "3*5", "3^2*5", "^2", "3 * x", "3^2 ", "-3"] {
            assert!(parse_expr(bad).is_err(), "accepted {:?}", bad);
        }
    }

    #[test]
    fn rejects_oversized_exponent() {
        assert!(parse_expr("2^99999999999").is_err());
        assert!(parse_expr("18446744073709551617^4294967295").is_err());
        assert!(parse_expr("3 * 2^4294967295").is_err());
        assert!(parse_expr("2^16777216").is_ok());
    }
}

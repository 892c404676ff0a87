//! Import of published certificates from SafeCurves-style proof pages.
//!
//! The index page (`primeproofs.html`) has one table row per curve listing
//! links to every prime in that curve's certificate chain. Each proof page
//! (`proof/<n>.html`) is a short narrative:
//!
//! ```text
//! Primality proof for n = 7:
//! Take b = 2.
//! b^(n-1) mod n = 1.
//! 3 is prime.
//! b^((n-1)/3)-1 mod n = 3, which is a unit, inverse 5.
//! (3) divides n-1.
//! (3)^2 > n.
//! n is prime by Pocklington's theorem.
//! ```
//!
//! or just `2 is prime.` for the leaf. Pages are fetched with blocking
//! `ureq`, reduced to text with `scraper`, and translated into `Proof`s which
//! the caller then verifies like any other registry.

use anyhow::{anyhow, bail, Context, Result};
use scraper::{Html, Selector};
use tracing::info;

use crate::certificate::{parse_decimal, GeneralizedPocklingtonProof, Inverse, Proof};
use crate::expr::parse_expr;
use crate::registry::Registry;

pub const SAFECURVES_URL: &str = "https://safecurves.cr.yp.to";

const PROOF_HEADER: &str = "Primality proof for n = ";
const TAKE_BASE: &str = "Take b = ";
const DIVIDES: &str = ") divides n-1";
const UNIT_INVERSE: &str = ", which is a unit, inverse ";

/// Textual content of one proof page, before any arithmetic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawProofPage {
    /// The `2 is prime.` leaf.
    Two,
    Pocklington {
        n: String,
        a_expr: String,
        base: String,
        /// `(value, inverse)` pairs, in page order.
        inverses: Vec<(String, String)>,
    },
}

impl RawProofPage {
    /// Convert the page into a `Proof`. Every inverse is taken modulo `n`.
    pub fn translate(&self) -> Result<Proof> {
        let (n, a_expr, base, inverses) = match self {
            RawProofPage::Two => return Ok(Proof::two()),
            RawProofPage::Pocklington {
                n,
                a_expr,
                base,
                inverses,
            } => (n, a_expr, base, inverses),
        };
        let n = parse_decimal(n)?;
        let a = parse_expr(a_expr).with_context(|| format!("invalid A for {}", n))?;
        let base = parse_decimal(base)?;
        let inverses = inverses
            .iter()
            .map(|(value, inverse)| -> Result<Inverse> {
                Ok(Inverse {
                    modulus: n.clone(),
                    value: parse_decimal(value)?,
                    inverse: parse_decimal(inverse)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Proof::pocklington(
            n,
            GeneralizedPocklingtonProof { a, base, inverses },
        ))
    }
}

fn digits_prefix(s: &str) -> Option<&str> {
    let len = s.bytes().take_while(|b| b.is_ascii_digit()).count();
    (len > 0).then(|| &s[..len])
}

fn digits_suffix(s: &str) -> Option<&str> {
    let len = s.bytes().rev().take_while(|b| b.is_ascii_digit()).count();
    (len > 0).then(|| &s[s.len() - len..])
}

fn digits_after<'a>(text: &'a str, marker: &str) -> Option<&'a str> {
    let start = text.find(marker)? + marker.len();
    digits_prefix(&text[start..])
}

/// Parse the text of a proof page.
pub fn parse_raw_proof_page(text: &str) -> Result<RawProofPage> {
    let Some(n) = digits_after(text, PROOF_HEADER) else {
        if text.contains("2 is prime.") {
            return Ok(RawProofPage::Two);
        }
        bail!("no primality proof header found");
    };
    let base = digits_after(text, TAKE_BASE).ok_or_else(|| anyhow!("no base for n = {}", n))?;

    let end = text
        .find(DIVIDES)
        .ok_or_else(|| anyhow!("no \"divides n-1\" line for n = {}", n))?;
    let head = &text[..end];
    let open = head
        .rfind(|c: char| !(c.is_ascii_digit() || c == '^' || c == '*' || c == ' '))
        .filter(|&i| head[i..].starts_with('('))
        .ok_or_else(|| anyhow!("malformed factorization for n = {}", n))?;
    let a_expr = head[open + 1..].to_string();

    let mut inverses = Vec::new();
    for (pos, _) in text.match_indices(UNIT_INVERSE) {
        let value = digits_suffix(&text[..pos]);
        let inverse = digits_prefix(&text[pos + UNIT_INVERSE.len()..]);
        match (value, inverse) {
            (Some(v), Some(i)) => inverses.push((v.to_string(), i.to_string())),
            _ => bail!("malformed inverse line for n = {}", n),
        }
    }

    Ok(RawProofPage::Pocklington {
        n: n.to_string(),
        a_expr,
        base: base.to_string(),
        inverses,
    })
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow!("invalid selector {:?}: {:?}", css, e))
}

/// The integers linked from the index-table row whose first cell names `curve`.
pub fn parse_prime_proofs_page(html: &str, curve: &str) -> Result<Vec<String>> {
    let document = Html::parse_document(html);
    let row_sel = selector("tr")?;
    let cell_sel = selector("td")?;
    let link_sel = selector("a")?;

    for row in document.select(&row_sel) {
        let Some(first) = row.select(&cell_sel).next() else {
            continue;
        };
        if first.text().collect::<String>().contains(curve) {
            return Ok(row
                .select(&link_sel)
                .map(|a| a.text().collect::<String>().trim().to_string())
                .collect());
        }
    }
    Ok(Vec::new())
}

/// Visible text of an HTML page.
pub fn page_text(html: &str) -> String {
    Html::parse_document(html).root_element().text().collect()
}

fn get_text(url: &str) -> Result<String> {
    let mut response = ureq::get(url)
        .call()
        .with_context(|| format!("GET {}", url))?;
    let body = response
        .body_mut()
        .read_to_string()
        .with_context(|| format!("reading body of {}", url))?;
    Ok(body)
}

/// Fetch and translate every proof listed for `curve`.
///
/// The returned registry is *not* verified; run `Registry::check` on it.
pub fn fetch_registry(url_base: &str, curve: &str) -> Result<Registry> {
    let index = get_text(&format!("{}/primeproofs.html", url_base))?;
    let numbers = parse_prime_proofs_page(&index, curve)?;
    if numbers.is_empty() {
        bail!("no proofs listed for curve {:?}", curve);
    }
    info!(curve, count = numbers.len(), "fetching proof pages");
    let mut proofs = Vec::with_capacity(numbers.len());
    for number in &numbers {
        let html = get_text(&format!("{}/proof/{}.html", url_base, number))?;
        let page = parse_raw_proof_page(&page_text(&html))
            .with_context(|| format!("parsing proof page for {}", number))?;
        let proof = page.translate()?;
        if proof.n != parse_decimal(number)? {
            bail!("proof page for {} certifies {}", number, proof.n);
        }
        proofs.push(proof);
    }
    Ok(Registry { proofs })
}

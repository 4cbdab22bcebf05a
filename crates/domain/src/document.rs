//! CPF/CNPJ document validation and classification.
//!
//! Brazilian tax documents carry two check digits computed from weighted
//! digit sums modulo 11. CPF (individuals) is 11 digits, CNPJ (companies)
//! is 14. All functions here are pure; formatting characters are stripped
//! before validation.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Classification of a producer document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    /// Pessoa física (individual, CPF).
    Pf,
    /// Pessoa jurídica (company, CNPJ).
    Pj,
}

impl DocumentType {
    /// Infers the document type from the cleaned document length:
    /// 11 digits is a CPF (pf), anything else is treated as a CNPJ (pj).
    pub fn infer(document: &str) -> Self {
        if clean_document(document).len() == 11 {
            DocumentType::Pf
        } else {
            DocumentType::Pj
        }
    }

    /// Returns the wire representation (`"pf"` / `"pj"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Pf => "pf",
            DocumentType::Pj => "pj",
        }
    }
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DocumentType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pf" => Ok(DocumentType::Pf),
            "pj" => Ok(DocumentType::Pj),
            other => Err(DomainError::InvalidDocumentType(other.to_string())),
        }
    }
}

/// Strips every non-digit character from a document string.
pub fn clean_document(document: &str) -> String {
    document.chars().filter(char::is_ascii_digit).collect()
}

fn digits_of(cleaned: &str) -> Vec<u32> {
    cleaned.chars().filter_map(|c| c.to_digit(10)).collect()
}

fn all_digits_equal(cleaned: &str) -> bool {
    let mut chars = cleaned.chars();
    match chars.next() {
        Some(first) => chars.all(|c| c == first),
        None => false,
    }
}

/// Validates an 11-digit CPF, including both check digits.
pub fn is_valid_cpf(cpf: &str) -> bool {
    let cleaned = clean_document(cpf);

    if cleaned.len() != 11 || all_digits_equal(&cleaned) {
        return false;
    }

    let digits = digits_of(&cleaned);

    // First check digit: weights 10..2 over the first nine digits.
    let sum: u32 = digits[..9]
        .iter()
        .enumerate()
        .map(|(i, d)| d * (10 - i as u32))
        .sum();
    let remainder = 11 - (sum % 11);
    let digit1 = if remainder >= 10 { 0 } else { remainder };

    // Second check digit: weights 11..2 over the first ten digits.
    let sum: u32 = digits[..10]
        .iter()
        .enumerate()
        .map(|(i, d)| d * (11 - i as u32))
        .sum();
    let remainder = 11 - (sum % 11);
    let digit2 = if remainder >= 10 { 0 } else { remainder };

    digits[9] == digit1 && digits[10] == digit2
}

const CNPJ_WEIGHTS_1: [u32; 12] = [5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];
const CNPJ_WEIGHTS_2: [u32; 13] = [6, 5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];

/// Validates a 14-digit CNPJ, including both check digits.
pub fn is_valid_cnpj(cnpj: &str) -> bool {
    let cleaned = clean_document(cnpj);

    if cleaned.len() != 14 || all_digits_equal(&cleaned) {
        return false;
    }

    let digits = digits_of(&cleaned);

    let sum: u32 = digits[..12]
        .iter()
        .zip(CNPJ_WEIGHTS_1)
        .map(|(d, w)| d * w)
        .sum();
    let remainder = sum % 11;
    let digit1 = if remainder < 2 { 0 } else { 11 - remainder };

    let sum: u32 = digits[..13]
        .iter()
        .zip(CNPJ_WEIGHTS_2)
        .map(|(d, w)| d * w)
        .sum();
    let remainder = sum % 11;
    let digit2 = if remainder < 2 { 0 } else { 11 - remainder };

    digits[12] == digit1 && digits[13] == digit2
}

/// Validates a document as either CPF or CNPJ based on its cleaned length.
pub fn is_valid_document(document: &str) -> bool {
    match clean_document(document).len() {
        11 => is_valid_cpf(document),
        14 => is_valid_cnpj(document),
        _ => false,
    }
}

/// Masks a document for log output so raw tax IDs never reach log storage.
///
/// CPF keeps the first three and last two digits, CNPJ keeps the company
/// prefix and check digits; anything else is masked generically.
pub fn mask_document(document: &str) -> String {
    let cleaned = clean_document(document);

    match cleaned.len() {
        0 => "N/A".to_string(),
        11 => format!("{}.***.***-{}", &cleaned[..3], &cleaned[9..]),
        14 => format!(
            "{}.{}.***/**{}-{}",
            &cleaned[..2],
            &cleaned[2..5],
            &cleaned[10..12],
            &cleaned[12..]
        ),
        n if n <= 4 => "*".repeat(n),
        n => format!("{}***{}", &cleaned[..2], &cleaned[n - 2..]),
    }
}

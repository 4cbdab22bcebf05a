//! Domain error types.

use thiserror::Error;

/// Errors produced by domain validation rules.
///
/// Messages are the Portuguese user-facing texts surfaced to API clients
/// on validation failure.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    /// The document failed CPF/CNPJ checksum validation.
    #[error("Documento deve ser um CPF ou CNPJ válido")]
    InvalidDocument,

    /// A document type string other than "pf" or "pj" was supplied.
    #[error("Tipo de documento inválido: {0}")]
    InvalidDocumentType(String),

    /// One of the area fields is negative.
    #[error("As áreas agricultável e de vegetação devem ser valores positivos")]
    NegativeArea,

    /// Agricultural plus vegetation area exceeds the total area.
    #[error("A soma das áreas ({sum}) não pode ultrapassar a área total ({total})")]
    AreaSumExceedsTotal { sum: f64, total: f64 },
}

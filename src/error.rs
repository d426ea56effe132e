use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Score matrix has shape {found:?}, expected {expected:?} (references, queries)")]
    ShapeMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },
    #[error("Similarity function failed: {0}")]
    Similarity(Box<dyn std::error::Error + Send + Sync>),
    #[error("m/z ({0}) and intensities ({1}) arrays must have the same length")]
    PeakShape(usize, usize),
    #[error("m/z values must be sorted ascending (violated at index {0})")]
    UnsortedMz(usize),
    #[error("No monoisotopic mass available for element {0}")]
    UnknownElementMass(String),
    #[error("File extension '.{0}' not allowed")]
    ForbiddenFileExtension(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

use ark_serialize::SerializationError;

/// Coarse classification of [`KzgError`] variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Rejected at construction time, before any computation.
    Config,
    /// Caller supplied inconsistent inputs; no work was performed.
    InputValidation,
    /// A proof did not verify, or the data cannot be reconstructed.
    VerificationFailure,
    /// An internal step failed mid-algorithm.
    Internal,
}

#[derive(Debug, thiserror::Error)]
pub enum KzgError {
    #[error("{what} must be a positive power of two, got {size}")]
    NotPowerOfTwo { what: &'static str, size: usize },
    #[error("domain of size 2^{log_size} exceeds the field two-adicity {two_adicity}")]
    DomainTooLarge { log_size: u32, two_adicity: u32 },
    #[error("invalid fixed-base window size {0}")]
    InvalidWindowSize(usize),
    #[error("SRS has {available} points, {required} are required")]
    SrsTooSmall { required: usize, available: usize },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("length mismatch: expected {expected}, got {got}")]
    LengthMismatch { expected: usize, got: usize },
    #[error("requested {requested} workers, at most {max} are allowed")]
    TooManyWorkers { requested: isize, max: usize },
    #[error("polynomial of size {size} is not in [1, {max}]")]
    InvalidPolynomialSize { size: usize, max: usize },
    #[error("polynomial of size {got} does not match domain of size {domain}")]
    DomainMismatch { domain: usize, got: usize },
    #[error("at least one polynomial is required")]
    EmptyPolynomialSet,
    #[error("verification failed")]
    VerificationFailed,
    #[error("{available} blocks available, {required} needed to reconstruct")]
    InsufficientBlocks { available: usize, required: usize },
    #[error("block index {index} is out of range for {num_blocks} blocks")]
    InvalidBlockIndex { index: usize, num_blocks: usize },
    #[error("block index {0} listed more than once")]
    DuplicateBlockIndex(usize),
    #[error(transparent)]
    Serialization(#[from] SerializationError),
}

impl KzgError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            KzgError::NotPowerOfTwo { .. }
            | KzgError::DomainTooLarge { .. }
            | KzgError::InvalidWindowSize(_)
            | KzgError::SrsTooSmall { .. }
            | KzgError::InvalidConfig(_) => ErrorKind::Config,
            KzgError::LengthMismatch { .. }
            | KzgError::TooManyWorkers { .. }
            | KzgError::InvalidPolynomialSize { .. }
            | KzgError::DomainMismatch { .. }
            | KzgError::EmptyPolynomialSet
            | KzgError::InvalidBlockIndex { .. }
            | KzgError::DuplicateBlockIndex(_) => ErrorKind::InputValidation,
            KzgError::VerificationFailed | KzgError::InsufficientBlocks { .. } => {
                ErrorKind::VerificationFailure
            }
            KzgError::Serialization(_) => ErrorKind::Internal,
        }
    }

    pub fn is_verification_failure(&self) -> bool {
        self.kind() == ErrorKind::VerificationFailure
    }
}

pub type Result<T> = std::result::Result<T, KzgError>;

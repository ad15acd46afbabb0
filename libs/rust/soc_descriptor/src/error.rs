use thiserror::Error;

/// Why a descriptor could not be turned into a [`Descriptor`](crate::descriptor::Descriptor).
#[derive(Debug, Error)]
pub enum DescriptorError {
    #[error("invalid descriptor: {0}")]
    Json(serde_json::Error),
    #[error("missing memory region `memories.{0}`")]
    MissingMemory(&'static str),
    #[error("memory region `memories.{0}` has zero size")]
    EmptyMemory(&'static str),
    #[error("memory region `memories.{0}` wraps around the address space")]
    MemoryOverflow(&'static str),
}

impl From<serde_json::Error> for DescriptorError {
    fn from(err: serde_json::Error) -> Self {
        DescriptorError::Json(err)
    }
}

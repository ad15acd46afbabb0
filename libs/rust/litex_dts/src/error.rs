use soc_descriptor::error::DescriptorError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("malformed descriptor: {0}")]
    MalformedDescriptor(#[from] DescriptorError),
    #[error("{peripheral}: missing constant `constants.{constant}`")]
    MissingDependentConstant {
        peripheral: &'static str,
        constant: &'static str,
    },
    #[error("{peripheral}: constant `constants.{constant}` is not a 32-bit unsigned integer")]
    InvalidConstant {
        peripheral: &'static str,
        constant: &'static str,
    },
    #[error("{peripheral}: missing CSR bank `csr_bases.{csr}`")]
    MissingDependentCsr {
        peripheral: &'static str,
        csr: &'static str,
    },
    #[error("{peripheral}: missing memory region `memories.{region}`")]
    MissingDependentMemory {
        peripheral: &'static str,
        region: &'static str,
    },
    #[error("patch refers to unknown label `{0}`")]
    DanglingPatch(alloc::string::String),
}

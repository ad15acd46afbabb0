use alloc::string::String;
use alloc::string::ToString;

use hashbrown::HashMap;
use serde::Deserialize;
use serde_json::Value;

use crate::error::DescriptorError;

/// The memory region Linux runs from. Every SoC has one.
pub const MAIN_RAM: &str = "main_ram";

/// The constant LiteX defines when the SoC is built for simulation.
pub const SIM_FLAG: &str = "sim";

/// A named region of the SoC address space.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryRegion {
    pub base: u64,
    pub size: u64,
}

impl MemoryRegion {
    pub const fn new(base: u64, size: u64) -> Self {
        Self { base, size }
    }
}

/// A build-time constant. Most are integers, a few are strings, and flags
/// such as `sim` are `null`.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum Constant {
    Unsigned(u64),
    Signed(i64),
    Text(String),
    Other(Value),
}

impl Constant {
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Constant::Unsigned(value) => Some(*value),
            _ => None,
        }
    }
}

impl From<u64> for Constant {
    fn from(value: u64) -> Self {
        Constant::Unsigned(value)
    }
}

impl From<&str> for Constant {
    fn from(value: &str) -> Self {
        Constant::Text(value.to_string())
    }
}

/// The on-disk shape of `csr.json`. Keys we do not consume (`csr_registers`,
/// `interrupts`, ...) are skipped by serde.
#[derive(Deserialize, Debug)]
struct RawDescriptor {
    memories: HashMap<String, MemoryRegion>,
    #[serde(default)]
    csr_bases: HashMap<String, u32>,
    #[serde(default)]
    constants: HashMap<String, Constant>,
}

/// The SoC descriptor: memory map, CSR bank bases and build constants.
#[derive(Debug, Clone)]
pub struct Descriptor {
    main_ram: MemoryRegion,
    memories: HashMap<String, MemoryRegion>,
    csr_bases: HashMap<String, u32>,
    constants: HashMap<String, Constant>,
}

impl Descriptor {
    /// Creates a descriptor with only `main_ram` and nothing else.
    pub fn new(main_ram: MemoryRegion) -> Result<Self, DescriptorError> {
        let mut memories = HashMap::new();
        memories.insert(MAIN_RAM.to_string(), main_ram);
        Self::from_raw(RawDescriptor {
            memories,
            csr_bases: HashMap::new(),
            constants: HashMap::new(),
        })
    }

    /// Parses the JSON descriptor emitted by LiteX (`csr.json`).
    pub fn from_json(json: &str) -> Result<Self, DescriptorError> {
        let raw: RawDescriptor = serde_json::from_str(json)?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawDescriptor) -> Result<Self, DescriptorError> {
        let main_ram = *raw
            .memories
            .get(MAIN_RAM)
            .ok_or(DescriptorError::MissingMemory(MAIN_RAM))?;

        if main_ram.size == 0 {
            return Err(DescriptorError::EmptyMemory(MAIN_RAM));
        }

        if main_ram.base.checked_add(main_ram.size).is_none() {
            return Err(DescriptorError::MemoryOverflow(MAIN_RAM));
        }

        Ok(Self {
            main_ram,
            memories: raw.memories,
            csr_bases: raw.csr_bases,
            constants: raw.constants,
        })
    }

    pub fn with_memory(mut self, name: &str, region: MemoryRegion) -> Self {
        // main_ram was validated once and stays fixed.
        if name != MAIN_RAM {
            self.memories.insert(name.to_string(), region);
        }
        self
    }

    pub fn with_csr_base(mut self, name: &str, base: u32) -> Self {
        self.csr_bases.insert(name.to_string(), base);
        self
    }

    pub fn with_constant(mut self, name: &str, value: impl Into<Constant>) -> Self {
        self.constants.insert(name.to_string(), value.into());
        self
    }

    pub fn with_flag(mut self, name: &str) -> Self {
        self.constants
            .insert(name.to_string(), Constant::Other(Value::Null));
        self
    }

    pub const fn main_ram(&self) -> &MemoryRegion {
        &self.main_ram
    }

    pub fn memory(&self, name: &str) -> Option<&MemoryRegion> {
        self.memories.get(name)
    }

    pub fn csr_base(&self, name: &str) -> Option<u32> {
        self.csr_bases.get(name).copied()
    }

    pub fn csr_names(&self) -> impl Iterator<Item = &str> {
        self.csr_bases.keys().map(String::as_str)
    }

    pub fn constant(&self, name: &str) -> Option<&Constant> {
        self.constants.get(name)
    }

    /// Whether the SoC was elaborated for the simulator rather than real
    /// hardware. Only the presence of the flag matters, not its value.
    pub fn is_simulation(&self) -> bool {
        self.constants.contains_key(SIM_FLAG)
    }
}

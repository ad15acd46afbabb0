//! Node emitters. Each one looks at the descriptor and produces nodes; none
//! of them depends on another having run.

use alloc::borrow::ToOwned;
use alloc::string::String;
use alloc::vec::Vec;

use soc_descriptor::descriptor::Descriptor;

use crate::error::Error;
use crate::options::Options;
use crate::tree::Node;
use crate::tree::Property;

mod chosen;
mod cpu;
mod memory;
mod peripherals;

pub use chosen::bootargs;
pub use chosen::chosen;
pub use chosen::initrd_window;
pub use cpu::cpus;
pub use cpu::timebase_frequency;
pub use memory::memory;
pub(crate) use peripherals::PERIPHERALS;

pub(crate) struct Context<'a> {
    pub descriptor: &'a Descriptor,
    pub options: &'a Options,
}

/// What the peripheral emitters contribute to the document besides their
/// own nodes.
#[derive(Debug, Default)]
pub(crate) struct Fragments {
    pub nodes: Vec<Node>,
    /// `(alias, label)` in registration order.
    pub aliases: Vec<(&'static str, String)>,
    /// `(label, properties)` in registration order.
    pub patches: Vec<(String, Vec<Property>)>,
}

impl Fragments {
    pub fn add_node(&mut self, node: Node) {
        self.nodes.push(node);
    }

    pub fn add_alias(&mut self, alias: &'static str, label: &str) {
        self.aliases.push((alias, label.to_owned()));
    }

    pub fn queue_patch(&mut self, label: &str, properties: Vec<Property>) {
        self.patches.push((label.to_owned(), properties));
    }
}

/// Looks up a constant that `peripheral` cannot be described without.
pub(crate) fn required_u32(
    descriptor: &Descriptor,
    peripheral: &'static str,
    constant: &'static str,
) -> Result<u32, Error> {
    let value = descriptor
        .constant(constant)
        .ok_or(Error::MissingDependentConstant {
            peripheral,
            constant,
        })?;

    value
        .as_u64()
        .and_then(|value| u32::try_from(value).ok())
        .ok_or(Error::InvalidConstant {
            peripheral,
            constant,
        })
}

//! Puts the emitted fragments together into one document.

use alloc::string::String;
use alloc::string::ToString;

use log::debug;
use log::trace;
use soc_descriptor::descriptor::Descriptor;
use soc_descriptor::peripheral::unrecognized_csrs;
use soc_descriptor::peripheral::Capabilities;

use crate::emit;
use crate::emit::Context;
use crate::emit::Fragments;
use crate::emit::PERIPHERALS;
use crate::error::Error;
use crate::options::Options;
use crate::tree::DeviceTree;
use crate::tree::Node;

/// Builds the device tree for `descriptor`.
///
/// Patch blocks are left queued on the returned tree; see
/// [`DeviceTree::apply_patches`].
pub fn build(descriptor: &Descriptor, options: &Options) -> Result<DeviceTree, Error> {
    for name in unrecognized_csrs(descriptor) {
        debug!("no device-tree node for CSR bank `{}`", name);
    }

    let main_ram = descriptor.main_ram();
    let fragments = emit_peripherals(descriptor, options)?;

    let mut soc = Node::new("soc");
    soc.property_u32("#address-cells", 0x2)
        .property_u32("#size-cells", 0x2)
        .property_string("compatible", "simple-bus")
        .property_null("ranges");
    for node in fragments.nodes {
        soc.add_child(node);
    }

    let mut root = Node::new("/");
    root.property_u32("#address-cells", 0x2)
        .property_u32("#size-cells", 0x2)
        .property_string("compatible", "enjoy-digital,litex-vexriscv-soclinux")
        .property_string("model", "VexRiscv SoCLinux")
        .add_child(emit::chosen(main_ram))
        .add_child(emit::cpus(descriptor)?)
        .add_child(emit::memory(main_ram))
        .add_child(soc);

    if !fragments.aliases.is_empty() {
        let mut aliases = Node::new("aliases");
        for (alias, label) in &fragments.aliases {
            aliases.property_reference(alias, label);
        }
        root.add_child(aliases);
    }

    let mut tree = DeviceTree::new(root);
    for (label, properties) in fragments.patches {
        tree.patch(&label, properties);
    }

    Ok(tree)
}

fn emit_peripherals(descriptor: &Descriptor, options: &Options) -> Result<Fragments, Error> {
    let ctx = Context {
        descriptor,
        options,
    };
    let capabilities = Capabilities::from_descriptor(descriptor);

    let mut fragments = Fragments::default();
    for (peripheral, emitter) in PERIPHERALS {
        let Some(base) = capabilities.csr_base(peripheral) else {
            trace!("{}: not present", peripheral);
            continue;
        };

        debug!("{}: csr base {:#x}", peripheral, base);
        emitter(&ctx, peripheral, base, &mut fragments)?;
    }

    Ok(fragments)
}

/// Renders the DTS document for `descriptor`. Nothing is returned unless
/// every node could be emitted.
pub fn generate(descriptor: &Descriptor, options: &Options) -> Result<String, Error> {
    let mut tree = build(descriptor, options)?;
    if options.inline_patches {
        tree.apply_patches()?;
    }

    Ok(tree.to_string())
}

/// Parses `csr.json` and renders its DTS document. A descriptor that does
/// not parse is reported as [`Error::MalformedDescriptor`].
pub fn generate_from_json(json: &str, options: &Options) -> Result<String, Error> {
    let descriptor = Descriptor::from_json(json)?;
    generate(&descriptor, options)
}

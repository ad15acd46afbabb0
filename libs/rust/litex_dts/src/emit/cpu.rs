use soc_descriptor::descriptor::Descriptor;

use super::required_u32;
use crate::error::Error;
use crate::tree::Node;

/// The timer frequency the simulator runs at, whatever the SoC clock.
pub const SIM_TIMEBASE_FREQUENCY: u32 = 50_000_000;

const CLOCK_FREQUENCY: &str = "config_clock_frequency";

pub fn timebase_frequency(descriptor: &Descriptor) -> Result<u32, Error> {
    if descriptor.is_simulation() {
        return Ok(SIM_TIMEBASE_FREQUENCY);
    }

    required_u32(descriptor, "cpu", CLOCK_FREQUENCY)
}

/// The `cpus` node with its single VexRiscv core. Everything except the
/// timebase is fixed by the core configuration.
pub fn cpus(descriptor: &Descriptor) -> Result<Node, Error> {
    let mut cpu = Node::new("cpu").with_unit_address(0);
    cpu.property_u32("clock-frequency", 0x0)
        .property_string_list(
            "compatible",
            &["spinalhdl,vexriscv", "sifive,rocket0", "riscv"],
        )
        .property_u32("d-cache-block-size", 0x40)
        .property_u32("d-cache-sets", 0x40)
        .property_u32("d-cache-size", 0x8000)
        .property_u32("d-tlb-sets", 0x1)
        .property_u32("d-tlb-size", 0x20)
        .property_string("device_type", "cpu")
        .property_u32("i-cache-block-size", 0x40)
        .property_u32("i-cache-sets", 0x40)
        .property_u32("i-cache-size", 0x8000)
        .property_u32("i-tlb-sets", 0x1)
        .property_u32("i-tlb-size", 0x20)
        .property_string("mmu-type", "riscv,sv32")
        .property_u32("reg", 0x0)
        .property_string("riscv,isa", "rv32ima")
        .property_u32("sifive,itim", 0x1)
        .property_string("status", "okay")
        .property_null("tlb-split");

    let mut cpus = Node::new("cpus");
    cpus.property_u32("#address-cells", 0x1)
        .property_u32("#size-cells", 0x0)
        .property_decimal("timebase-frequency", timebase_frequency(descriptor)?)
        .add_child(cpu);
    Ok(cpus)
}

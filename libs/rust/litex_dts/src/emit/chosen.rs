use alloc::format;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use soc_descriptor::descriptor::MemoryRegion;

use crate::tree::Cell;
use crate::tree::Node;

const MIB: u64 = 1024 * 1024;
const INITRD_START_OFFSET: u64 = 8 * MIB;
const INITRD_END_OFFSET: u64 = 16 * MIB;

/// The kernel command line. `mem=` limits Linux to `main_ram`.
pub fn bootargs(main_ram: &MemoryRegion) -> String {
    format!(
        "mem={}M@{:#x} rootwait console=liteuart earlycon=sbi root=/dev/ram0 init=/sbin/init swiotlb=32",
        main_ram.size / MIB,
        main_ram.base
    )
}

/// Where the boot loader places the initrd: 8 to 16 MiB into `main_ram`.
///
/// This is a fixed window. The initrd image must fit in 8 MiB; nothing
/// here checks it.
pub fn initrd_window(main_ram: &MemoryRegion) -> (u64, u64) {
    (
        main_ram.base.saturating_add(INITRD_START_OFFSET),
        main_ram.base.saturating_add(INITRD_END_OFFSET),
    )
}

/// One cell when the address fits in 32 bits, two otherwise.
fn address_cells(address: u64) -> Vec<Cell> {
    match u32::try_from(address) {
        Ok(address) => vec![Cell::Hex(address)],
        Err(_) => vec![Cell::Hex((address >> 32) as u32), Cell::Hex(address as u32)],
    }
}

pub fn chosen(main_ram: &MemoryRegion) -> Node {
    let (initrd_start, initrd_end) = initrd_window(main_ram);

    let mut node = Node::new("chosen");
    node.property_string("bootargs", &bootargs(main_ram))
        .property_cells("linux,initrd-start", &address_cells(initrd_start))
        .property_cells("linux,initrd-end", &address_cells(initrd_end));
    node
}

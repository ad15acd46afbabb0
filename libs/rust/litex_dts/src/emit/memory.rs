use soc_descriptor::descriptor::MemoryRegion;

use crate::tree::Node;
use crate::tree::RegEntry;

/// Set in the upper size cell when the RAM size fits in 32 bits. Linux
/// takes the usable size from the `mem=` boot argument instead.
const SIZE_HIGH_MARK: u64 = 1 << 32;

/// The size as written to `reg`. Sizes of 4 GiB and above already use the
/// upper cell and are emitted as they are.
fn reg_size(size: u64) -> u64 {
    if size < SIZE_HIGH_MARK {
        size | SIZE_HIGH_MARK
    } else {
        size
    }
}

pub fn memory(main_ram: &MemoryRegion) -> Node {
    let mut node = Node::new("memory").with_unit_address(main_ram.base);
    node.property_string("device_type", "memory")
        .property_reg(&[RegEntry::new(main_ram.base, reg_size(main_ram.size))]);
    node
}

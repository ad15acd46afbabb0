use alloc::vec::Vec;
use core::fmt;

use crate::descriptor::Descriptor;

/// CSR banks that only ever accompany another peripheral. They never
/// trigger a node on their own.
const COMPANION_CSRS: &[&str] = &["ethphy"];

/// An optional hardware block that maps to a device-tree node.
///
/// Declaration order is the order the nodes appear under `soc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Peripheral {
    Uart,
    Ethmac,
    Leds,
    RgbLedR0,
    RgbLedG0,
    RgbLedB0,
    Switches,
    Spi,
    I2c0,
    Xadc,
    Framebuffer,
}

impl Peripheral {
    pub const ALL: [Peripheral; 11] = [
        Peripheral::Uart,
        Peripheral::Ethmac,
        Peripheral::Leds,
        Peripheral::RgbLedR0,
        Peripheral::RgbLedG0,
        Peripheral::RgbLedB0,
        Peripheral::Switches,
        Peripheral::Spi,
        Peripheral::I2c0,
        Peripheral::Xadc,
        Peripheral::Framebuffer,
    ];

    /// The `csr_bases` key whose presence enables this peripheral.
    pub const fn csr_name(self) -> &'static str {
        match self {
            Peripheral::Uart => "uart",
            Peripheral::Ethmac => "ethmac",
            Peripheral::Leds => "leds",
            Peripheral::RgbLedR0 => "rgb_led_r0",
            Peripheral::RgbLedG0 => "rgb_led_g0",
            Peripheral::RgbLedB0 => "rgb_led_b0",
            Peripheral::Switches => "switches",
            Peripheral::Spi => "spi",
            Peripheral::I2c0 => "i2c0",
            Peripheral::Xadc => "xadc",
            Peripheral::Framebuffer => "framebuffer",
        }
    }

    pub fn from_csr_name(name: &str) -> Option<Peripheral> {
        Peripheral::ALL
            .iter()
            .copied()
            .find(|peripheral| peripheral.csr_name() == name)
    }
}

impl fmt::Display for Peripheral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.csr_name())
    }
}

/// The peripherals a descriptor enables, with their CSR bases, in
/// canonical order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capabilities {
    present: Vec<(Peripheral, u32)>,
}

impl Capabilities {
    pub fn from_descriptor(descriptor: &Descriptor) -> Capabilities {
        let present = Peripheral::ALL
            .iter()
            .filter_map(|&peripheral| {
                descriptor
                    .csr_base(peripheral.csr_name())
                    .map(|base| (peripheral, base))
            })
            .collect();

        Capabilities { present }
    }

    pub fn csr_base(&self, peripheral: Peripheral) -> Option<u32> {
        self.present
            .iter()
            .find(|(p, _)| *p == peripheral)
            .map(|(_, base)| *base)
    }
}

/// CSR banks in `descriptor` that no node is generated for, sorted by name.
pub fn unrecognized_csrs(descriptor: &Descriptor) -> Vec<&str> {
    let mut names: Vec<&str> = descriptor
        .csr_names()
        .filter(|name| Peripheral::from_csr_name(name).is_none())
        .filter(|name| !COMPANION_CSRS.contains(name))
        .collect();
    names.sort_unstable();
    names
}

use alloc::vec;

use log::debug;
use log::warn;
use soc_descriptor::peripheral::Peripheral;

use super::required_u32;
use super::Context;
use super::Fragments;
use crate::error::Error;
use crate::options::Framebuffer;
use crate::tree::Cell;
use crate::tree::Node;
use crate::tree::Property;
use crate::tree::RegEntry;

type Emitter = fn(&Context<'_>, Peripheral, u32, &mut Fragments) -> Result<(), Error>;

/// One emitter per peripheral, in the order their nodes appear under `soc`.
pub(crate) const PERIPHERALS: [(Peripheral, Emitter); 11] = [
    (Peripheral::Uart, uart),
    (Peripheral::Ethmac, ethmac),
    (Peripheral::Leds, gpio),
    (Peripheral::RgbLedR0, pwm),
    (Peripheral::RgbLedG0, pwm),
    (Peripheral::RgbLedB0, pwm),
    (Peripheral::Switches, gpio),
    (Peripheral::Spi, spi),
    (Peripheral::I2c0, i2c),
    (Peripheral::Xadc, xadc),
    (Peripheral::Framebuffer, framebuffer),
];

const ETHPHY: &str = "ethphy";
const ETHMAC_BUFFERS: &str = "ethmac";
const GPIO_LINES: u32 = 4;
const PWM_CLOCK: u32 = 100_000_000;
const SPI_FREQUENCY: u32 = 1_000_000;

fn csr_reg(base: u32, size: u64) -> RegEntry {
    RegEntry::new(u64::from(base), size)
}

fn uart(_ctx: &Context<'_>, _: Peripheral, base: u32, out: &mut Fragments) -> Result<(), Error> {
    let mut node = Node::labelled("liteuart0", "serial", base.into());
    node.property_string("device_type", "serial")
        .property_string("compatible", "litex,liteuart")
        .property_reg(&[csr_reg(base, 0x100)])
        .property_string("status", "okay");

    out.add_node(node);
    out.add_alias("serial0", "liteuart0");
    Ok(())
}

/// The MAC needs its PHY bank and the packet buffer region besides its own
/// CSRs.
fn ethmac(ctx: &Context<'_>, p: Peripheral, base: u32, out: &mut Fragments) -> Result<(), Error> {
    let name = p.csr_name();
    let tx_slots = required_u32(ctx.descriptor, name, "ethmac_tx_slots")?;
    let rx_slots = required_u32(ctx.descriptor, name, "ethmac_rx_slots")?;
    let phy = ctx
        .descriptor
        .csr_base(ETHPHY)
        .ok_or(Error::MissingDependentCsr {
            peripheral: name,
            csr: ETHPHY,
        })?;
    let buffers = ctx
        .descriptor
        .memory(ETHMAC_BUFFERS)
        .ok_or(Error::MissingDependentMemory {
            peripheral: name,
            region: ETHMAC_BUFFERS,
        })?;

    let mut node = Node::labelled("mac0", "mac", base.into());
    node.property_string("compatible", "litex,liteeth")
        .property_reg(&[
            csr_reg(base, 0x7c),
            csr_reg(phy, 0x0a),
            RegEntry::new(buffers.base, 0x2000),
        ])
        .property_decimal("tx-fifo-depth", tx_slots)
        .property_decimal("rx-fifo-depth", rx_slots);

    out.add_node(node);
    Ok(())
}

/// LED and switch banks start disabled; a patch sets the line count and
/// enables them.
fn gpio(_ctx: &Context<'_>, p: Peripheral, base: u32, out: &mut Fragments) -> Result<(), Error> {
    let label = p.csr_name();
    let direction = match p {
        Peripheral::Switches => "in",
        _ => "out",
    };

    let mut node = Node::labelled(label, "gpio", base.into());
    node.property_string("compatible", "litex,gpio")
        .property_reg(&[csr_reg(base, 0x4)])
        .property_string("litex,direction", direction)
        .property_string("status", "disabled");

    out.add_node(node);
    out.queue_patch(
        label,
        vec![
            Property::decimal("litex,ngpio", GPIO_LINES),
            Property::string("status", "okay"),
        ],
    );
    Ok(())
}

fn pwm(_ctx: &Context<'_>, p: Peripheral, base: u32, out: &mut Fragments) -> Result<(), Error> {
    let mut node = Node::labelled(p.csr_name(), "pwm", base.into());
    node.property_string("compatible", "litex,pwm")
        .property_reg(&[csr_reg(base, 0x24)])
        .property_decimal("clock", PWM_CLOCK)
        .property_decimal("#pwm-cells", 3)
        .property_string("status", "okay");

    out.add_node(node);
    Ok(())
}

fn spi(_ctx: &Context<'_>, _: Peripheral, base: u32, out: &mut Fragments) -> Result<(), Error> {
    let mut spidev = Node::labelled("spidev0", "spidev", 0);
    spidev
        .property_string("compatible", "linux,spidev")
        .property_cells("reg", &[Cell::Dec(0), Cell::Dec(0)])
        .property_decimal("spi-max-frequency", SPI_FREQUENCY)
        .property_string("status", "okay");

    let mut node = Node::labelled("litespi0", "spi", base.into());
    node.property_string("compatible", "litex,litespi")
        .property_reg(&[csr_reg(base, 0x100)])
        .property_string("status", "okay")
        .property_decimal("litespi,max-bpw", 8)
        .property_decimal("litespi,sck-frequency", SPI_FREQUENCY)
        .property_decimal("litespi,num-cs", 1)
        .property_u32("#address-cells", 0x1)
        .property_u32("#size-cells", 0x1)
        .add_child(spidev);

    out.add_node(node);
    out.add_alias("spi0", "litespi0");
    Ok(())
}

fn i2c(_ctx: &Context<'_>, _: Peripheral, base: u32, out: &mut Fragments) -> Result<(), Error> {
    let mut node = Node::labelled("i2c0", "i2c", base.into());
    node.property_string("compatible", "litex,i2c")
        .property_reg(&[csr_reg(base, 0x5)])
        .property_string("status", "okay");

    out.add_node(node);
    Ok(())
}

fn xadc(_ctx: &Context<'_>, _: Peripheral, base: u32, out: &mut Fragments) -> Result<(), Error> {
    let mut node = Node::labelled("hwmon0", "xadc", base.into());
    node.property_string("compatible", "litex,hwmon-xadc")
        .property_reg(&[csr_reg(base, 0x20)])
        .property_string("status", "okay");

    out.add_node(node);
    Ok(())
}

/// The framebuffer node describes the pixel memory, not the CSR bank.
fn framebuffer(
    ctx: &Context<'_>,
    _: Peripheral,
    base: u32,
    out: &mut Fragments,
) -> Result<(), Error> {
    let fb = match ctx.options.framebuffer {
        Some(fb) => fb,
        None => {
            #[allow(deprecated)]
            let fallback = Framebuffer::FALLBACK;
            warn!(
                "framebuffer geometry not given, assuming {}x{} at {:#x}",
                fallback.width(),
                fallback.height(),
                fallback.base()
            );
            fallback
        }
    };
    debug!("framebuffer: csr bank at {:#x}", base);

    // Named after the pixel memory rather than a fixed `framebuffer@f0000000`
    // so the unit address matches the first `reg` entry.
    let mut node = Node::labelled("framebuffer0", "framebuffer", fb.base());
    node.property_string("compatible", "simple-framebuffer")
        .property_reg(&[RegEntry::new(fb.base(), fb.size())])
        .property_decimal("width", fb.width())
        .property_decimal("height", fb.height())
        .property_decimal("stride", fb.stride())
        .property_string("format", "a8b8g8r8");

    out.add_node(node);
    Ok(())
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;
    use alloc::vec::Vec;

    use soc_descriptor::descriptor::Descriptor;
    use soc_descriptor::descriptor::MemoryRegion;

    use super::*;
    use crate::options::Options;
    use crate::tree::Value;

    fn descriptor() -> Descriptor {
        Descriptor::new(MemoryRegion::new(0xc000_0000, 0x0800_0000)).unwrap()
    }

    fn emit(
        descriptor: &Descriptor,
        options: &Options,
        peripheral: Peripheral,
    ) -> Result<Fragments, Error> {
        let ctx = Context {
            descriptor,
            options,
        };
        let (_, emitter) = PERIPHERALS
            .iter()
            .find(|(p, _)| *p == peripheral)
            .unwrap();
        let base = descriptor.csr_base(peripheral.csr_name()).unwrap();
        let mut out = Fragments::default();
        emitter(&ctx, peripheral, base, &mut out)?;
        Ok(out)
    }

    fn reg(node: &Node) -> &[RegEntry] {
        match node.property("reg") {
            Some(Value::Reg(entries)) => entries,
            other => panic!("unexpected reg: {:?}", other),
        }
    }

    fn ethernet() -> Descriptor {
        descriptor()
            .with_csr_base("ethmac", 0xf000_1000)
            .with_csr_base("ethphy", 0xf000_1800)
            .with_memory("ethmac", MemoryRegion::new(0xb000_0000, 0x2000))
            .with_constant("ethmac_tx_slots", 2u64)
            .with_constant("ethmac_rx_slots", 2u64)
    }

    #[test]
    fn table_follows_canonical_order() {
        let order: Vec<_> = PERIPHERALS.iter().map(|(p, _)| *p).collect();
        assert_eq!(order, Peripheral::ALL);
    }

    #[test]
    fn uart_registers_alias() {
        let descriptor = descriptor().with_csr_base("uart", 0xf000_0800);
        let out = emit(&descriptor, &Options::default(), Peripheral::Uart).unwrap();

        assert_eq!(out.nodes.len(), 1);
        assert_eq!(out.nodes[0].label(), Some("liteuart0"));
        assert_eq!(reg(&out.nodes[0]), [RegEntry::new(0xf000_0800, 0x100)]);
        assert_eq!(out.aliases, [("serial0", "liteuart0".to_string())]);
        assert!(out.patches.is_empty());
    }

    #[test]
    fn ethmac_has_three_regions() {
        let out = emit(&ethernet(), &Options::default(), Peripheral::Ethmac).unwrap();
        let mac = &out.nodes[0];

        assert_eq!(
            reg(mac),
            [
                RegEntry::new(0xf000_1000, 0x7c),
                RegEntry::new(0xf000_1800, 0x0a),
                RegEntry::new(0xb000_0000, 0x2000),
            ]
        );
        assert_eq!(
            mac.property("tx-fifo-depth"),
            Some(&Value::Cells(vec![Cell::Dec(2)]))
        );
    }

    #[test]
    fn ethmac_without_slots() {
        let descriptor = descriptor()
            .with_csr_base("ethmac", 0xf000_1000)
            .with_csr_base("ethphy", 0xf000_1800)
            .with_memory("ethmac", MemoryRegion::new(0xb000_0000, 0x2000));
        assert!(matches!(
            emit(&descriptor, &Options::default(), Peripheral::Ethmac),
            Err(Error::MissingDependentConstant {
                peripheral: "ethmac",
                constant: "ethmac_tx_slots",
            })
        ));
    }

    #[test]
    fn ethmac_without_phy() {
        let descriptor = descriptor()
            .with_csr_base("ethmac", 0xf000_1000)
            .with_memory("ethmac", MemoryRegion::new(0xb000_0000, 0x2000))
            .with_constant("ethmac_tx_slots", 2u64)
            .with_constant("ethmac_rx_slots", 2u64);
        assert!(matches!(
            emit(&descriptor, &Options::default(), Peripheral::Ethmac),
            Err(Error::MissingDependentCsr { csr: "ethphy", .. })
        ));
    }

    #[test]
    fn ethmac_without_buffers() {
        let descriptor = descriptor()
            .with_csr_base("ethmac", 0xf000_1000)
            .with_csr_base("ethphy", 0xf000_1800)
            .with_constant("ethmac_tx_slots", 2u64)
            .with_constant("ethmac_rx_slots", 2u64);
        assert!(matches!(
            emit(&descriptor, &Options::default(), Peripheral::Ethmac),
            Err(Error::MissingDependentMemory {
                region: "ethmac",
                ..
            })
        ));
    }

    #[test]
    fn gpio_direction_and_patch() {
        let descriptor = descriptor()
            .with_csr_base("leds", 0xf000_2000)
            .with_csr_base("switches", 0xf000_3800);

        let leds = emit(&descriptor, &Options::default(), Peripheral::Leds).unwrap();
        assert_eq!(
            leds.nodes[0].property("litex,direction"),
            Some(&Value::Strings(vec!["out".to_string()]))
        );
        assert_eq!(leds.patches.len(), 1);
        assert_eq!(leds.patches[0].0, "leds");

        let switches = emit(&descriptor, &Options::default(), Peripheral::Switches).unwrap();
        assert_eq!(switches.nodes[0].label(), Some("switches"));
        assert_eq!(
            switches.nodes[0].property("litex,direction"),
            Some(&Value::Strings(vec!["in".to_string()]))
        );
        assert_eq!(
            switches.patches[0].1,
            [
                Property::decimal("litex,ngpio", 4),
                Property::string("status", "okay"),
            ]
        );
    }

    #[test]
    fn pwm_label_is_the_csr_name() {
        let descriptor = descriptor().with_csr_base("rgb_led_g0", 0xf000_3000);
        let out = emit(&descriptor, &Options::default(), Peripheral::RgbLedG0).unwrap();
        assert_eq!(out.nodes[0].label(), Some("rgb_led_g0"));
        assert_eq!(out.nodes[0].name(), "pwm");
    }

    #[test]
    fn spi_has_spidev_child() {
        let descriptor = descriptor().with_csr_base("spi", 0xf000_4000);
        let out = emit(&descriptor, &Options::default(), Peripheral::Spi).unwrap();

        let spidev = out.nodes[0].child("spidev").unwrap();
        assert_eq!(spidev.label(), Some("spidev0"));
        assert_eq!(spidev.unit_address(), Some(0));
        assert_eq!(
            spidev.property("reg"),
            Some(&Value::Cells(vec![Cell::Dec(0), Cell::Dec(0)]))
        );
        assert_eq!(out.aliases, [("spi0", "litespi0".to_string())]);
    }

    #[test]
    fn framebuffer_geometry_from_options() {
        let descriptor = descriptor().with_csr_base("framebuffer", 0xf000_6000);
        let options = Options {
            framebuffer: Framebuffer::new(0x4100_0000, 640, 480),
            ..Options::default()
        };
        let out = emit(&descriptor, &options, Peripheral::Framebuffer).unwrap();
        let node = &out.nodes[0];

        assert_eq!(node.unit_address(), Some(0x4100_0000));
        assert_eq!(reg(node), [RegEntry::new(0x4100_0000, 0x12_c000)]);
        assert_eq!(
            node.property("stride"),
            Some(&Value::Cells(vec![Cell::Dec(2560)]))
        );
    }

    #[test]
    fn framebuffer_fallback() {
        let descriptor = descriptor().with_csr_base("framebuffer", 0xf000_6000);
        let out = emit(&descriptor, &Options::default(), Peripheral::Framebuffer).unwrap();
        let node = &out.nodes[0];

        assert_eq!(node.unit_address(), Some(0xc800_0000));
        assert_eq!(reg(node), [RegEntry::new(0xc800_0000, 0x38_4000)]);
        assert_eq!(
            node.property("width"),
            Some(&Value::Cells(vec![Cell::Dec(1280)]))
        );
    }
}

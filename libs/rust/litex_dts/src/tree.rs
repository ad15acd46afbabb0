//! An in-memory device tree and its DTS serializer.
//!
//! Nodes are built bottom-up by the emitters and rendered once. Emitters
//! never write DTS text; indentation, blank lines and cell notation are
//! decided here.

use alloc::borrow::ToOwned;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::error::Error;

/// A single 32-bit cell in a `<...>` list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    /// Rendered as `0x..`.
    Hex(u32),
    /// Rendered in decimal.
    Dec(u32),
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Hex(value) => write!(f, "{:#x}", value),
            Cell::Dec(value) => write!(f, "{}", value),
        }
    }
}

/// One `reg` entry with `#address-cells = <2>` and `#size-cells = <2>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegEntry {
    pub address: u64,
    pub size: u64,
}

impl RegEntry {
    pub const fn new(address: u64, size: u64) -> Self {
        Self { address, size }
    }

    /// High word first, even when the upper cells are zero.
    pub const fn cells(&self) -> [u32; 4] {
        [
            (self.address >> 32) as u32,
            self.address as u32,
            (self.size >> 32) as u32,
            self.size as u32,
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// A boolean property such as `ranges;`.
    Empty,
    Cells(Vec<Cell>),
    Reg(Vec<RegEntry>),
    Strings(Vec<String>),
    /// A phandle reference to a labelled node (`&label`).
    Reference(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub name: String,
    pub value: Value,
}

impl Property {
    pub fn new(name: &str, value: Value) -> Self {
        Self {
            name: name.to_owned(),
            value,
        }
    }

    pub fn string(name: &str, value: &str) -> Self {
        Self::new(name, Value::Strings(alloc::vec![value.to_owned()]))
    }

    pub fn decimal(name: &str, value: u32) -> Self {
        Self::new(name, Value::Cells(alloc::vec![Cell::Dec(value)]))
    }

    fn write_to<W: fmt::Write>(&self, out: &mut W, depth: usize) -> fmt::Result {
        indent(out, depth)?;
        out.write_str(&self.name)?;
        match &self.value {
            Value::Empty => {}
            Value::Cells(cells) => {
                out.write_str(" = <")?;
                write_cells(out, cells.iter())?;
                out.write_str(">")?;
            }
            Value::Reg(entries) => {
                out.write_str(" = <")?;
                for (i, entry) in entries.iter().enumerate() {
                    if i > 0 {
                        out.write_str("\n")?;
                        indent(out, depth + 1)?;
                    }
                    write_cells(out, entry.cells().iter().map(|&cell| Cell::Hex(cell)))?;
                }
                out.write_str(">")?;
            }
            Value::Strings(strings) => {
                out.write_str(" = ")?;
                for (i, string) in strings.iter().enumerate() {
                    if i > 0 {
                        out.write_str(", ")?;
                    }
                    write!(out, "\"{}\"", string)?;
                }
            }
            Value::Reference(label) => write!(out, " = &{}", label)?,
        }
        out.write_str(";\n")
    }
}

fn write_cells<W, I, C>(out: &mut W, cells: I) -> fmt::Result
where
    W: fmt::Write,
    I: Iterator<Item = C>,
    C: core::borrow::Borrow<Cell>,
{
    for (i, cell) in cells.enumerate() {
        if i > 0 {
            out.write_str(" ")?;
        }
        write!(out, "{}", cell.borrow())?;
    }
    Ok(())
}

fn indent<W: fmt::Write>(out: &mut W, depth: usize) -> fmt::Result {
    for _ in 0..depth {
        out.write_char('\t')?;
    }
    Ok(())
}

/// Sets `property` in `properties`, replacing the value in place if a
/// property with the same name exists.
fn set_property(properties: &mut Vec<Property>, property: Property) {
    match properties.iter_mut().find(|p| p.name == property.name) {
        Some(existing) => existing.value = property.value,
        None => properties.push(property),
    }
}

/// A device-tree node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    label: Option<String>,
    name: String,
    unit_address: Option<u64>,
    properties: Vec<Property>,
    children: Vec<Node>,
}

impl Node {
    pub fn new(name: &str) -> Self {
        Self {
            label: None,
            name: name.to_owned(),
            unit_address: None,
            properties: Vec::new(),
            children: Vec::new(),
        }
    }

    /// A node referenced elsewhere by `label`, named `name@unit_address`.
    pub fn labelled(label: &str, name: &str, unit_address: u64) -> Self {
        Self::new(name)
            .with_label(label)
            .with_unit_address(unit_address)
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.to_owned());
        self
    }

    pub fn with_unit_address(mut self, unit_address: u64) -> Self {
        self.unit_address = Some(unit_address);
        self
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn unit_address(&self) -> Option<u64> {
        self.unit_address
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties
            .iter()
            .find(|p| p.name == name)
            .map(|p| &p.value)
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn child(&self, name: &str) -> Option<&Node> {
        self.children.iter().find(|child| child.name == name)
    }

    pub fn set_property(&mut self, property: Property) -> &mut Self {
        set_property(&mut self.properties, property);
        self
    }

    pub fn property_null(&mut self, name: &str) -> &mut Self {
        self.set_property(Property::new(name, Value::Empty))
    }

    pub fn property_string(&mut self, name: &str, value: &str) -> &mut Self {
        self.set_property(Property::string(name, value))
    }

    pub fn property_string_list(&mut self, name: &str, values: &[&str]) -> &mut Self {
        let values = values.iter().map(|&value| value.to_owned()).collect();
        self.set_property(Property::new(name, Value::Strings(values)))
    }

    /// A single hex cell.
    pub fn property_u32(&mut self, name: &str, value: u32) -> &mut Self {
        self.set_property(Property::new(name, Value::Cells(alloc::vec![Cell::Hex(value)])))
    }

    /// A single decimal cell.
    pub fn property_decimal(&mut self, name: &str, value: u32) -> &mut Self {
        self.set_property(Property::decimal(name, value))
    }

    pub fn property_cells(&mut self, name: &str, cells: &[Cell]) -> &mut Self {
        self.set_property(Property::new(name, Value::Cells(cells.to_vec())))
    }

    pub fn property_reg(&mut self, entries: &[RegEntry]) -> &mut Self {
        self.set_property(Property::new("reg", Value::Reg(entries.to_vec())))
    }

    pub fn property_reference(&mut self, name: &str, label: &str) -> &mut Self {
        self.set_property(Property::new(name, Value::Reference(label.to_owned())))
    }

    pub fn add_child(&mut self, child: Node) -> &mut Self {
        self.children.push(child);
        self
    }

    /// Depth-first search for the node carrying `label`.
    pub fn find_by_label_mut(&mut self, label: &str) -> Option<&mut Node> {
        if self.label.as_deref() == Some(label) {
            return Some(self);
        }

        self.children
            .iter_mut()
            .find_map(|child| child.find_by_label_mut(label))
    }

    fn write_to<W: fmt::Write>(&self, out: &mut W, depth: usize) -> fmt::Result {
        indent(out, depth)?;
        if let Some(label) = &self.label {
            write!(out, "{}: ", label)?;
        }
        out.write_str(&self.name)?;
        if let Some(unit_address) = self.unit_address {
            write!(out, "@{:x}", unit_address)?;
        }
        out.write_str(" {\n")?;

        for property in &self.properties {
            property.write_to(out, depth + 1)?;
        }

        for (i, child) in self.children.iter().enumerate() {
            if i > 0 || !self.properties.is_empty() {
                out.write_str("\n")?;
            }
            child.write_to(out, depth + 1)?;
        }

        indent(out, depth)?;
        out.write_str("};\n")
    }
}

/// Properties amending a labelled node from outside the root node
/// (`&label { ... };`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    label: String,
    properties: Vec<Property>,
}

impl Patch {
    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    fn write_to<W: fmt::Write>(&self, out: &mut W) -> fmt::Result {
        writeln!(out, "&{} {{", self.label)?;
        for property in &self.properties {
            property.write_to(out, 1)?;
        }
        out.write_str("};\n")
    }
}

/// A complete DTS document: the root node followed by label patches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceTree {
    root: Node,
    patches: Vec<Patch>,
}

impl DeviceTree {
    pub fn new(root: Node) -> Self {
        Self {
            root,
            patches: Vec::new(),
        }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn patches(&self) -> &[Patch] {
        &self.patches
    }

    /// Queues `properties` for the node labelled `label`. Patches for the
    /// same label merge: a property queued twice keeps only its last value.
    pub fn patch(&mut self, label: &str, properties: impl IntoIterator<Item = Property>) {
        let index = match self.patches.iter().position(|p| p.label == label) {
            Some(index) => index,
            None => {
                self.patches.push(Patch {
                    label: label.to_owned(),
                    properties: Vec::new(),
                });
                self.patches.len() - 1
            }
        };

        for property in properties {
            set_property(&mut self.patches[index].properties, property);
        }
    }

    /// Folds every queued patch into the node it names, in queue order.
    pub fn apply_patches(&mut self) -> Result<(), Error> {
        for patch in core::mem::take(&mut self.patches) {
            let node = self
                .root
                .find_by_label_mut(&patch.label)
                .ok_or_else(|| Error::DanglingPatch(patch.label.clone()))?;
            for property in patch.properties {
                node.set_property(property);
            }
        }

        Ok(())
    }
}

impl fmt::Display for DeviceTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("/dts-v1/;\n\n")?;
        self.root.write_to(f, 0)?;
        for patch in &self.patches {
            f.write_str("\n")?;
            patch.write_to(f)?;
        }
        Ok(())
    }
}

#![no_std]

extern crate alloc;

pub mod descriptor;
pub mod error;
pub mod peripheral;

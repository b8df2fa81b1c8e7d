#![no_std]
mod cpu;
mod display;
mod errors;
mod font;
pub mod globals;
mod utils;

pub use cpu::{Cpu, Step};
pub use errors::ChipError;

//! Built-in device drivers

pub mod ambit;

pub use ambit::AmbitDriver;

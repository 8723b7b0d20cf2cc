//! # `devicefile_core` - Device file generation for AVR device groups
//!
//! Turns the property model of a group of devices into a driver tree,
//! describing which peripheral drivers exist, with which instances and
//! parameters, and writes it as a device file. Also contains the build tool
//! side: finding the device file for a device string and resolving the
//! values that apply to one concrete device.

pub mod builder;
pub mod config;
pub mod element;
pub mod family;
pub mod lookup;
pub mod output;
pub mod policy;
pub mod resolve;
pub mod tree;

pub use builder::BuildError;
pub use builder::build_driver_tree;
pub use config::ConfigError;
pub use config::GeneratorConfig;
pub use config::GeneratorConfigBuilder;
pub use element::Element;
pub use lookup::LookupError;
pub use lookup::find_device_file;
pub use output::OutputError;
pub use resolve::DeviceProperties;
pub use resolve::ResolveError;
pub use resolve::resolve;
pub use tree::DeviceTree;
pub use tree::DriverKind;
pub use tree::DriverNode;

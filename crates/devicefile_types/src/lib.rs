//! Public types describing a group of microcontrollers for the device file
//! generator
//!
//! A device file describes several concrete chips at once (for example the
//! ATmega48, ATmega88 and ATmega168). Every property (RAM size, available
//! modules, pin map...) is stored once per distinct value together with the
//! set of chips that have that value.

pub mod attributes;
pub mod device;
pub mod gpio;
pub mod id_set;
pub mod identifier;
pub mod pins;
pub mod property;

pub use attributes::Attributes;
pub use device::Device;
pub use device::DeviceRecord;
pub use gpio::AlternateFunction;
pub use gpio::GpioPin;
pub use id_set::DiscriminatingId;
pub use id_set::IdSet;
pub use identifier::DeviceIdentifier;
pub use identifier::FormatError;
pub use identifier::IdField;
pub use identifier::Platform;
pub use pins::PinTable;
pub use pins::PinTableEntry;
pub use property::Property;
pub use property::PropertyError;
pub use property::PropertyValue;

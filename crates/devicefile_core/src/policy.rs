//! Values derived from raw device sizes

use crate::builder::BuildError;

/// Pin count per xmega package index (`a1` and `b1` have 100 pins, ...)
const XMEGA_PACKAGE_PINS: [u16; 6] = [0, 100, 0, 64, 44, 32];

/// Usable RAM after reserving space for the stack.
///
/// Large parts reserve 1 KiB, small parts half of their RAM.
pub fn ram_length(ram: u64) -> u64 {
    if ram > 2048 { ram - 1024 } else { ram / 2 }
}

/// Smallest power of two block size (at least 4) so that the number of
/// blocks fits in 7 bits
pub fn ram_block_length(ram: u64) -> u64 {
    let mut block = 4;
    while ram / block > 127 {
        block *= 2;
    }
    block
}

/// UART transmit buffer size, `None` leaves the driver default in place
pub fn tx_buffer(ram: u64) -> Option<u64> {
    match ram {
        0..1024 => Some(16),
        1024 => None,
        1025..=4096 => Some(250),
        _ => None,
    }
}

/// Pin count from an xmega type code such as `a1`
pub fn xmega_pin_count(type_: &str) -> Result<u16, BuildError> {
    let unknown = || BuildError::UnknownPackage(type_.into());
    let index: usize = type_.get(1..).ok_or_else(unknown)?.parse().map_err(|_| unknown())?;
    XMEGA_PACKAGE_PINS.get(index).copied().ok_or_else(unknown)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_ram_length() {
        assert_eq!(ram_length(2048), 1024);
        assert_eq!(ram_length(4096), 3072);
        assert_eq!(ram_length(512), 256);
        assert_eq!(ram_length(2049), 1025);
    }

    #[test]
    fn test_ram_block_length() {
        assert_eq!(ram_block_length(512), 8);
        assert_eq!(ram_block_length(508), 4);
        assert_eq!(ram_block_length(128), 4);
        assert_eq!(ram_block_length(2048), 32);
        assert_eq!(ram_block_length(16384), 256);
    }

    #[test]
    fn test_tx_buffer() {
        assert_eq!(tx_buffer(512), Some(16));
        assert_eq!(tx_buffer(1023), Some(16));
        assert_eq!(tx_buffer(1024), None);
        assert_eq!(tx_buffer(2048), Some(250));
        assert_eq!(tx_buffer(4096), Some(250));
        assert_eq!(tx_buffer(8192), None);
    }

    #[test]
    fn test_xmega_pin_count() {
        assert_eq!(xmega_pin_count("a1").unwrap(), 100);
        assert_eq!(xmega_pin_count("c3").unwrap(), 64);
        assert_eq!(xmega_pin_count("b1").unwrap(), 100);
        assert_eq!(xmega_pin_count("d4").unwrap(), 44);
        assert_eq!(xmega_pin_count("e5").unwrap(), 32);
        assert!(matches!(
            xmega_pin_count("a7"),
            Err(BuildError::UnknownPackage(t)) if t == "a7"
        ));
        assert!(xmega_pin_count("a").is_err());
        assert!(xmega_pin_count("").is_err());
    }
}

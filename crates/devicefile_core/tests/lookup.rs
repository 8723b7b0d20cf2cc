//! Finding device files on disk

use camino::Utf8Path;
use camino::Utf8PathBuf;
use devicefile_core::LookupError;
use devicefile_core::find_device_file;
use pretty_assertions::assert_eq;

fn devices_dir() -> (tempfile::TempDir, Utf8PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let root = Utf8Path::from_path(dir.path()).unwrap().to_owned();
    for (platform, file) in [
        ("avr", "atmega8_48_88-none_a_p.xml"),
        ("avr", "attiny25_45_85-none.xml"),
        ("avr", "xmega64_128-a1-u.xml"),
        ("avr", "xmega64_128-a1-none.xml"),
        ("stm32", "stm32f405_407-r_v_z-e_g.xml"),
        ("hosted", "linux.xml"),
        ("", "lpc1769.xml"),
    ] {
        let dir = root.join(platform);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(file), "<rca/>").unwrap();
    }
    (dir, root)
}

#[test]
fn test_find() {
    let (_guard, root) = devices_dir();
    let find = |device| {
        find_device_file(&root, device)
            .unwrap()
            .strip_prefix(&root)
            .unwrap()
            .to_string()
    };
    assert_eq!(find("atmega48p"), "avr/atmega8_48_88-none_a_p.xml");
    assert_eq!(find("ATtiny85"), "avr/attiny25_45_85-none.xml");
    assert_eq!(find("atxmega128a1u"), "avr/xmega64_128-a1-u.xml");
    assert_eq!(find("atxmega64a1"), "avr/xmega64_128-a1-none.xml");
    assert_eq!(find("stm32f407vg"), "stm32/stm32f405_407-r_v_z-e_g.xml");
    assert_eq!(find("linux"), "hosted/linux.xml");
    assert_eq!(find("lpc1769fbd100"), "lpc1769.xml");
}

#[test]
fn test_not_found() {
    let (_guard, root) = devices_dir();
    for device in ["atmega328p", "atxmega32c4", "stm32f100rb", "darwin", "pic16"] {
        assert!(
            matches!(
                find_device_file(&root, device),
                Err(LookupError::DeviceFileNotFound { .. })
            ),
            "{device}"
        );
    }
}

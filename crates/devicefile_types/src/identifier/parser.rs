//! Parser for device strings

use super::DeviceIdentifier;
use super::Platform;
use compact_str::CompactString;
use compact_str::format_compact;
use winnow::ModalResult;
use winnow::Parser;
use winnow::ascii::digit1;
use winnow::combinator::alt;
use winnow::combinator::preceded;
use winnow::combinator::trace;
use winnow::error::ContextError;
use winnow::error::StrContext;
use winnow::token::one_of;
use winnow::token::take_while;

/// Error for a device string that doesn't follow any known naming scheme
#[derive(Debug, PartialEq, Eq)]
pub struct FormatError {
    message: String,
    pos: usize,
    input: String,
}

impl FormatError {
    fn from_parse<'input>(
        error: &winnow::error::ParseError<&'input str, ContextError>,
        input: &'input str,
    ) -> Self {
        let message = error.inner().to_string();
        let input = input.to_owned();
        Self {
            message,
            pos: error.offset(),
            input,
        }
    }

    /// Byte offset into the device string where parsing failed
    pub fn position(&self) -> usize {
        self.pos
    }
}

impl std::fmt::Display for FormatError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let pos = self.pos;
        let input = &self.input;
        let message = &self.message;
        write!(
            f,
            "Invalid device string at position {}: {}\n{}\n{}^",
            pos,
            message,
            input,
            " ".repeat(pos)
        )
    }
}

impl std::error::Error for FormatError {}

pub(super) fn parse_identifier(input: &str) -> Result<DeviceIdentifier, FormatError> {
    let input = input.trim().to_ascii_lowercase();
    identifier
        .parse(input.as_str())
        .map_err(|error| FormatError::from_parse(&error, &input))
}

fn identifier(i: &mut &str) -> ModalResult<DeviceIdentifier> {
    alt((
        hosted.context(StrContext::Label("hosted")),
        stm32.context(StrContext::Label("stm32")),
        avr.context(StrContext::Label("avr")),
    ))
    .parse_next(i)
}

fn hosted(i: &mut &str) -> ModalResult<DeviceIdentifier> {
    let parser = alt(("linux", "darwin", "windows")).map(|family: &str| DeviceIdentifier {
        platform: Some(Platform::Hosted),
        family: Some(family.into()),
        ..Default::default()
    });
    trace("hosted", parser).parse_next(i)
}

/// `stm32f407vg`: family letter, three digit name, pin id and size id
fn stm32(i: &mut &str) -> ModalResult<DeviceIdentifier> {
    let parser = (
        "stm32",
        one_of('a'..='z'),
        take_while(3, '0'..='9'),
        one_of('a'..='z'),
        one_of(('a'..='z', '0'..='9')),
    )
        .map(
            |(_, letter, name, pin_id, size_id): (_, char, &str, char, char)| DeviceIdentifier {
                platform: Some(Platform::Stm32),
                family: Some(format_compact!("{letter}{}", &name[..1])),
                name: Some(name.into()),
                pin_id: Some(format_compact!("{pin_id}")),
                size_id: Some(format_compact!("{size_id}")),
                ..Default::default()
            },
        );
    trace("stm32", parser).parse_next(i)
}

fn avr(i: &mut &str) -> ModalResult<DeviceIdentifier> {
    let parser = preceded("at", alt((xmega, mega_or_tiny, at90)));
    trace("avr", parser).parse_next(i)
}

/// `atxmega128a1u`: the type is the package id, anything after it is the pin id
fn xmega(i: &mut &str) -> ModalResult<DeviceIdentifier> {
    let parser = (
        "xmega",
        digit1,
        one_of('a'..='z'),
        one_of('0'..='9'),
        take_while(0.., 'a'..='z'),
    )
        .map(
            |(_, name, package, index, pin_id): (_, &str, char, char, &str)| DeviceIdentifier {
                platform: Some(Platform::Avr),
                family: Some("xmega".into()),
                name: Some(name.into()),
                type_: Some(format_compact!("{package}{index}")),
                pin_id: non_empty(pin_id),
                ..Default::default()
            },
        );
    trace("xmega", parser).parse_next(i)
}

/// `atmega328p`, `attiny85`
fn mega_or_tiny(i: &mut &str) -> ModalResult<DeviceIdentifier> {
    let parser = (
        alt(("mega", "tiny")),
        digit1,
        take_while(0.., ('a'..='z', '0'..='9')),
    )
        .map(
            |(family, name, type_): (&str, &str, &str)| DeviceIdentifier {
                platform: Some(Platform::Avr),
                family: Some(format_compact!("at{family}")),
                name: Some(name.into()),
                type_: non_empty(type_),
                ..Default::default()
            },
        );
    trace("mega_or_tiny", parser).parse_next(i)
}

/// `at90can128`, `at90usb1287`: the name carries a letter prefix
fn at90(i: &mut &str) -> ModalResult<DeviceIdentifier> {
    let parser = (
        "90",
        (take_while(0.., 'a'..='z'), digit1).take(),
        take_while(0.., ('a'..='z', '0'..='9')),
    )
        .map(|(_, name, type_): (_, &str, &str)| DeviceIdentifier {
            platform: Some(Platform::Avr),
            family: Some("at90".into()),
            name: Some(name.into()),
            type_: non_empty(type_),
            ..Default::default()
        });
    trace("at90", parser).parse_next(i)
}

fn non_empty(s: &str) -> Option<CompactString> {
    (!s.is_empty()).then(|| s.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_mega() {
        assert_eq!(
            parse_identifier("ATmega328P").unwrap(),
            DeviceIdentifier {
                platform: Some(Platform::Avr),
                family: Some("atmega".into()),
                name: Some("328".into()),
                type_: Some("p".into()),
                ..Default::default()
            }
        );
        let plain = parse_identifier("atmega8").unwrap();
        assert_eq!(plain.name.as_deref(), Some("8"));
        assert_eq!(plain.type_, None);
    }

    #[test]
    fn test_mega_with_digit_type() {
        let ident = parse_identifier("atmega16m1").unwrap();
        assert_eq!(ident.name.as_deref(), Some("16"));
        assert_eq!(ident.type_.as_deref(), Some("m1"));
    }

    #[test]
    fn test_xmega() {
        assert_eq!(
            parse_identifier("atxmega128a1u").unwrap(),
            DeviceIdentifier {
                platform: Some(Platform::Avr),
                family: Some("xmega".into()),
                name: Some("128".into()),
                type_: Some("a1".into()),
                pin_id: Some("u".into()),
                ..Default::default()
            }
        );
        assert_eq!(parse_identifier("atxmega32c4").unwrap().pin_id, None);
    }

    #[test]
    fn test_at90() {
        let ident = parse_identifier("at90pwm3b").unwrap();
        assert_eq!(ident.family.as_deref(), Some("at90"));
        assert_eq!(ident.name.as_deref(), Some("pwm3"));
        assert_eq!(ident.type_.as_deref(), Some("b"));
    }

    #[test]
    fn test_stm32() {
        assert_eq!(
            parse_identifier("stm32f407vg").unwrap(),
            DeviceIdentifier {
                platform: Some(Platform::Stm32),
                family: Some("f4".into()),
                name: Some("407".into()),
                pin_id: Some("v".into()),
                size_id: Some("g".into()),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_hosted() {
        let ident = parse_identifier("linux").unwrap();
        assert_eq!(ident.platform, Some(Platform::Hosted));
        assert_eq!(ident.family.as_deref(), Some("linux"));
    }

    #[test]
    fn test_invalid() {
        assert!(parse_identifier("").is_err());
        assert!(parse_identifier("pic16f84").is_err());
        assert!(parse_identifier("atmega").is_err());
        assert!(parse_identifier("stm32f4").is_err());
        assert!(parse_identifier("atxmega128").is_err());
        let err = parse_identifier("atmega328-p").unwrap_err();
        assert_eq!(err.position(), 9);
    }
}

use image::Rgba;

use crate::error::ColorParseError;

/// Parses an RGBA color from a hex string.
///
/// Accepts `RRGGBB` or `RRGGBBAA`, with or without a leading `#`. A missing
/// alpha component means fully opaque.
///
/// # Errors
///
/// * `ColorParseError::InvalidLength` - the string does not hold 6 or 8 digits
/// * `ColorParseError::InvalidDigit` - a character is not a hex digit
///
/// # Examples
///
/// ```
/// use image::Rgba;
/// use imageops_smartcrop::parse_rgba_hex;
///
/// assert_eq!(parse_rgba_hex("#ff000080").unwrap(), Rgba([255, 0, 0, 128]));
/// assert_eq!(parse_rgba_hex("00ff00").unwrap(), Rgba([0, 255, 0, 255]));
/// ```
pub fn parse_rgba_hex(color: &str) -> Result<Rgba<u8>, ColorParseError> {
    let digits = color.strip_prefix('#').unwrap_or(color);
    if !digits.is_ascii() || (digits.len() != 6 && digits.len() != 8) {
        return Err(ColorParseError::InvalidLength(color.to_owned()));
    }

    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(ColorParseError::InvalidDigit(color.to_owned()));
    }

    let mut channels = [u8::MAX; 4];
    for (channel, pair) in channels.iter_mut().zip(digits.as_bytes().chunks(2)) {
        let high = hex_value(pair[0]);
        let low = hex_value(pair[1]);
        *channel = (high << 4) | low;
    }

    Ok(Rgba(channels))
}

const fn hex_value(digit: u8) -> u8 {
    match digit {
        b'0'..=b'9' => digit - b'0',
        b'a'..=b'f' => digit - b'a' + 10,
        _ => digit - b'A' + 10,
    }
}

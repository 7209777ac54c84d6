// 8.3 short name conversion between human-typed names and the on-disk form

use fatpeek_core::FatError;
use super::constants::{DIR_ENTRY_DELETED, DIR_ENTRY_KANJI_E5, DIR_NAME_LEN};

/// Render an on-disk 11-byte name as `NAME.EXT`.
pub fn parse_83_name(name: &[u8; DIR_NAME_LEN]) -> String {
    let mut result = String::new();

    // Base name (first 8 bytes)
    for (i, &byte) in name[0..8].iter().enumerate() {
        if byte == 0x20 || byte == 0x00 {
            break;
        }
        if i == 0 && byte == DIR_ENTRY_KANJI_E5 {
            result.push(char::from(DIR_ENTRY_DELETED));
        } else {
            result.push(char::from(byte));
        }
    }

    // Extension (last 3 bytes)
    let ext: String = name[8..11]
        .iter()
        .take_while(|&&b| b != 0x20 && b != 0x00)
        .map(|&b| char::from(b))
        .collect();
    if !ext.is_empty() {
        result.push('.');
        result.push_str(&ext);
    }

    result
}

/// Convert a human-typed filename such as `readme.txt` into the padded,
/// uppercase on-disk form `README  TXT`.
pub fn format_83_name(filename: &str) -> Result<[u8; DIR_NAME_LEN], FatError> {
    let mut result = [0x20u8; DIR_NAME_LEN];

    let upper = filename.to_ascii_uppercase();
    let (base, ext) = match upper.split_once('.') {
        Some((base, ext)) => (base, Some(ext)),
        None => (upper.as_str(), None),
    };

    if base.is_empty() || base.len() > 8 {
        return Err(FatError::InvalidName(format!("{}: base name must be 1-8 characters", filename)));
    }

    for (i, byte) in base.bytes().enumerate() {
        if !is_valid_83_char(byte) {
            return Err(FatError::InvalidName(format!("{}: invalid character {:?}", filename, char::from(byte))));
        }
        result[i] = byte;
    }

    if let Some(ext) = ext {
        if ext.len() > 3 {
            return Err(FatError::InvalidName(format!("{}: extension longer than 3 characters", filename)));
        }
        for (i, byte) in ext.bytes().enumerate() {
            if !is_valid_83_char(byte) {
                return Err(FatError::InvalidName(format!("{}: invalid character {:?}", filename, char::from(byte))));
            }
            result[8 + i] = byte;
        }
    }

    Ok(result)
}

/// Accept an already padded on-disk name verbatim (no case folding).
/// Names shorter than 11 bytes are space-padded.
pub fn raw_83_name(name: &str) -> Result<[u8; DIR_NAME_LEN], FatError> {
    let bytes = name.as_bytes();
    if bytes.is_empty() || bytes.len() > DIR_NAME_LEN {
        return Err(FatError::InvalidName(format!("{:?}: raw names are 1-11 bytes", name)));
    }

    let mut result = [0x20u8; DIR_NAME_LEN];
    result[..bytes.len()].copy_from_slice(bytes);
    Ok(result)
}

/// Check if a byte is valid in an 8.3 name
fn is_valid_83_char(c: u8) -> bool {
    matches!(c,
        b'A'..=b'Z' | b'0'..=b'9' | b'!' | b'#' | b'$' | b'%' | b'&' |
        b'\'' | b'(' | b')' | b'-' | b'@' | b'^' | b'_' | b'`' |
        b'{' | b'}' | b'~')
}

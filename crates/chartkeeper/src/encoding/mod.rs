//! Text formats used by the application's settings and job files.
//!
//! Files written before the UTF-8 migration are UTF-16LE and start with a
//! byte order mark on an otherwise blank line, followed by two explanatory
//! comment lines. Detection of those files looks at that content, not just at
//! the leading bytes.

pub mod lines;

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use crate::error::{DecodeError, IniError};

pub use lines::TextLines;

/// First explanatory line the application wrote into every legacy file.
pub const LEGACY_SIGNATURE: &str = ";Do not erase";

/// Second explanatory line of the legacy header.
pub const LEGACY_INSTRUCTIONS: &str = ";To make a new";

/// Number of leading lines searched for [`LEGACY_SIGNATURE`].
const SIGNATURE_SEARCH_LINES: usize = 6;

/// Number of leading bytes inspected by [`detect_file_format`].
const PROBE_LEN: u64 = 10;

#[cfg(windows)]
pub const LINE_SEPARATOR: &str = "\r\n";
#[cfg(not(windows))]
pub const LINE_SEPARATOR: &str = "\n";

const BOM: char = '\u{FEFF}';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextFormat {
    Utf8,
    Utf16Le,
    Utf16Be,
}

impl TextFormat {
    pub fn name(&self) -> &'static str {
        match self {
            TextFormat::Utf8 => "UTF-8",
            TextFormat::Utf16Le => "UTF-16LE",
            TextFormat::Utf16Be => "UTF-16BE",
        }
    }

    /// Decodes `bytes`. Malformed sequences become U+FFFD; a leading byte
    /// order mark is kept as a character.
    pub fn decode(&self, bytes: &[u8]) -> String {
        match self {
            TextFormat::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            TextFormat::Utf16Le => decode_utf16(bytes, u16::from_le_bytes),
            TextFormat::Utf16Be => decode_utf16(bytes, u16::from_be_bytes),
        }
    }

    /// Decodes `bytes`, failing at the first malformed sequence: invalid UTF-8,
    /// an unpaired surrogate or a dangling odd byte.
    pub fn decode_strict(&self, bytes: &[u8]) -> Result<String, DecodeError> {
        let malformed = |offset| DecodeError {
            format: self.name(),
            offset,
        };
        match self {
            TextFormat::Utf8 => {
                String::from_utf8(bytes.to_vec()).map_err(|e| malformed(e.utf8_error().valid_up_to()))
            }
            TextFormat::Utf16Le => decode_utf16_strict(bytes, u16::from_le_bytes).map_err(malformed),
            TextFormat::Utf16Be => decode_utf16_strict(bytes, u16::from_be_bytes).map_err(malformed),
        }
    }

    /// Encodes `text` without adding a byte order mark.
    pub fn encode(&self, text: &str) -> Vec<u8> {
        match self {
            TextFormat::Utf8 => text.as_bytes().to_vec(),
            TextFormat::Utf16Le => text.encode_utf16().flat_map(u16::to_le_bytes).collect(),
            TextFormat::Utf16Be => text.encode_utf16().flat_map(u16::to_be_bytes).collect(),
        }
    }
}

impl fmt::Display for TextFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TextFormat {
    type Err = IniError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "UTF-8" | "UTF8" => Ok(TextFormat::Utf8),
            "UTF-16LE" | "UTF16LE" => Ok(TextFormat::Utf16Le),
            "UTF-16BE" | "UTF16BE" => Ok(TextFormat::Utf16Be),
            _ => Err(IniError::UnknownFormat(s.to_string())),
        }
    }
}

fn decode_utf16(bytes: &[u8], from_bytes: fn([u8; 2]) -> u16) -> String {
    let units = bytes.chunks(2).map(|pair| match pair {
        [a, b] => from_bytes([*a, *b]),
        // Dangling odd byte
        _ => 0xFFFD,
    });
    char::decode_utf16(units)
        .map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

/// Returns the byte offset of the first malformed unit on failure.
fn decode_utf16_strict(bytes: &[u8], from_bytes: fn([u8; 2]) -> u16) -> Result<String, usize> {
    if bytes.len() % 2 != 0 {
        return Err(bytes.len() - 1);
    }

    let units = bytes.chunks_exact(2).map(|pair| from_bytes([pair[0], pair[1]]));
    let mut text = String::with_capacity(bytes.len() / 2);
    let mut consumed = 0;
    for decoded in char::decode_utf16(units) {
        match decoded {
            Ok(c) => {
                consumed += c.len_utf16();
                text.push(c);
            }
            Err(_) => return Err(consumed * 2),
        }
    }
    Ok(text)
}

/// Result of sniffing the leading bytes of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatProbe {
    pub format: TextFormat,
    /// The file starts with a byte order mark.
    pub has_bom: bool,
}

/// Determines the format of `path` from its first few bytes.
///
/// Byte order marks win. Without one, a zero second byte means UTF-16LE and a
/// zero first byte means UTF-16BE; everything else, empty files included, is
/// treated as UTF-8.
pub fn detect_file_format(path: &Path) -> std::io::Result<FormatProbe> {
    let mut head = Vec::with_capacity(PROBE_LEN as usize);
    File::open(path)?.take(PROBE_LEN).read_to_end(&mut head)?;
    Ok(probe_bytes(&head))
}

pub fn probe_bytes(head: &[u8]) -> FormatProbe {
    let with_bom = |format| FormatProbe {
        format,
        has_bom: true,
    };
    let without_bom = |format| FormatProbe {
        format,
        has_bom: false,
    };

    if head.starts_with(&[0xEF, 0xBB, 0xBF]) {
        return with_bom(TextFormat::Utf8);
    }
    if head.starts_with(&[0xFF, 0xFE]) {
        return with_bom(TextFormat::Utf16Le);
    }
    if head.starts_with(&[0xFE, 0xFF]) {
        return with_bom(TextFormat::Utf16Be);
    }
    if head.get(1) == Some(&0) {
        return without_bom(TextFormat::Utf16Le);
    }
    if head.first() == Some(&0) {
        return without_bom(TextFormat::Utf16Be);
    }
    without_bom(TextFormat::Utf8)
}

/// Reads and decodes the whole of `path`.
pub fn read_text(path: &Path, format: TextFormat) -> std::io::Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(format.decode(&bytes))
}

/// Reads `path` and decodes it with [`TextFormat::decode_strict`].
///
/// The outer error is the read failure, the inner one the decoding failure.
pub fn read_text_strict(
    path: &Path,
    format: TextFormat,
) -> std::io::Result<Result<String, DecodeError>> {
    let bytes = std::fs::read(path)?;
    Ok(format.decode_strict(&bytes))
}

/// True when `path` is a UTF-16LE file written by this application, i.e. one
/// of its first lines starts with [`LEGACY_SIGNATURE`] when read as UTF-16LE.
///
/// Only the signature is looked at; malformed content further down does not
/// change the answer. Read failures, a missing file included, are returned.
pub fn is_legacy_utf16le(path: &Path) -> std::io::Result<bool> {
    let text = read_text(path, TextFormat::Utf16Le)?;
    Ok(TextLines::new(&text)
        .take(SIGNATURE_SEARCH_LINES)
        .any(|line| line.starts_with(LEGACY_SIGNATURE)))
}

/// Strips a leading byte order mark character from `line`.
pub fn strip_bom(line: &str) -> &str {
    line.strip_prefix(BOM).unwrap_or(line)
}

/// True for the explanatory header comment lines of legacy files.
pub fn is_legacy_header_line(line: &str) -> bool {
    line.starts_with(LEGACY_SIGNATURE) || line.starts_with(LEGACY_INSTRUCTIONS)
}

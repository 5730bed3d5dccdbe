//! DOS 8.3 file names.

use rand::Rng;

/// Length of a generated base name.
pub const BASE_NAME_LEN: usize = 8;

const LETTERS: &[u8; 26] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Base names DOS resolves to a device, whatever the extension.
const RESERVED_DEVICES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "CLOCK$", "COM1", "COM2", "COM3", "COM4", "LPT1", "LPT2", "LPT3",
];

/// Punctuation DOS accepts in file names besides letters and digits.
const DOS_PUNCTUATION: &str = "$#@!%'`(){}~^-_&";

fn is_dos_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || DOS_PUNCTUATION.contains(c)
}

/// Whether `filename` can be used by DOS as-is: a 1-8 character base, an
/// optional 1-3 character extension, only DOS characters, and no device name.
///
/// Case is ignored, since the emulator maps host names case-insensitively.
///
/// # Examples
/// ```
/// use launcher_core::is_8_3;
/// assert!(is_8_3("hello.bas"));
/// assert!(!is_8_3("VeryLongName.bas"));
/// assert!(!is_8_3("NUL.BAS"));
/// ```
pub fn is_8_3(filename: &str) -> bool {
    let (base, ext) = match filename.split_once('.') {
        Some((base, ext)) => (base, Some(ext)),
        None => (filename, None),
    };

    let base_ok = (1..=8).contains(&base.len()) && base.chars().all(is_dos_char);
    let ext_ok = ext.map_or(true, |e| (1..=3).contains(&e.len()) && e.chars().all(is_dos_char));

    base_ok && ext_ok && !is_reserved_device(base)
}

/// Whether `base` names a DOS device such as `CON` or `LPT1`.
pub fn is_reserved_device(base: &str) -> bool {
    RESERVED_DEVICES.iter().any(|d| d.eq_ignore_ascii_case(base))
}

/// Draw an uppercase base name, each letter uniform over `A`-`Z`.
pub fn random_base_name<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..BASE_NAME_LEN)
        .map(|_| LETTERS[rng.gen_range(0..LETTERS.len())] as char)
        .collect()
}

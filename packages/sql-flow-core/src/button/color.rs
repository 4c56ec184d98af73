//! Button display colors.

/// Color used when a stored button carries none.
pub const DEFAULT_BUTTON_COLOR: &str = "#16b378";

/// Soft palette buttons are colored from.
pub const BUTTON_PALETTE: [&str; 8] = [
    "rgba(168, 230, 207, 1)", // soft green
    "rgba(255, 179, 102, 1)", // soft orange
    "rgba(248, 187, 217, 1)", // soft pink
    "rgba(168, 216, 234, 1)", // soft blue
    "rgba(209, 196, 233, 1)", // soft purple
    "rgba(255, 243, 160, 1)", // soft yellow
    "rgba(178, 223, 219, 1)", // soft teal
    "rgba(255, 205, 210, 1)", // soft coral
];

/// Picks a palette color from a button name.
///
/// The index is the sum of the name's UTF-16 code units modulo the palette
/// size, so a name always maps to the same color.
pub fn color_for_name(name: &str) -> &'static str {
    let sum: u64 = name.encode_utf16().map(u64::from).sum();
    BUTTON_PALETTE[(sum % BUTTON_PALETTE.len() as u64) as usize]
}

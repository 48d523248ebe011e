//! Hex rendering for trace diagnostics.

use std::fmt;

/// Lazy colon-separated hex rendering of a byte slice.
///
/// Implements [`Display`](fmt::Display), so a trace line can carry a payload
/// dump without paying for the formatting unless the line is actually
/// emitted.
pub struct HexDump<'a>(pub &'a [u8]);

impl fmt::Display for HexDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, byte) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(":")?;
            }
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

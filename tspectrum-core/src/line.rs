//! Raster line shared between capture and print
//!
//! A line is one printable row of the thermal head: 384 dots packed
//! MSB-first into 48 bytes, the leftmost dot in bit 7 of byte 0.

/// Line width in bytes
pub const LINE_WIDTH: usize = 48;

/// Line width in dots
pub const LINE_DOTS: usize = LINE_WIDTH * 8;

/// One fixed-width raster row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Line {
    bytes: [u8; LINE_WIDTH],
}

impl Default for Line {
    fn default() -> Self {
        Self::blank()
    }
}

impl Line {
    /// An all-white line
    pub const fn blank() -> Self {
        Self {
            bytes: [0; LINE_WIDTH],
        }
    }

    /// Create a line from raw row bytes
    pub const fn from_bytes(bytes: [u8; LINE_WIDTH]) -> Self {
        Self { bytes }
    }

    /// Create a line with every byte set to `value`
    pub const fn filled(value: u8) -> Self {
        Self {
            bytes: [value; LINE_WIDTH],
        }
    }

    /// Raw row bytes
    pub fn as_bytes(&self) -> &[u8; LINE_WIDTH] {
        &self.bytes
    }

    /// Set or clear a single dot
    ///
    /// Dots past the end of the line are ignored.
    pub fn set_dot(&mut self, dot: usize, black: bool) {
        if dot >= LINE_DOTS {
            return;
        }
        let mask = 0x80 >> (dot % 8);
        if black {
            self.bytes[dot / 8] |= mask;
        } else {
            self.bytes[dot / 8] &= !mask;
        }
    }

    /// Read a single dot, `false` past the end of the line
    pub fn dot(&self, dot: usize) -> bool {
        dot < LINE_DOTS && self.bytes[dot / 8] & (0x80 >> (dot % 8)) != 0
    }

    /// Clear every dot
    pub fn clear(&mut self) {
        self.bytes = [0; LINE_WIDTH];
    }

    /// Check if no dot is set
    pub fn is_blank(&self) -> bool {
        self.bytes.iter().all(|&b| b == 0)
    }
}

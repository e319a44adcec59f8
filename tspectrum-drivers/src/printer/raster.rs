//! Raster command encoding
//!
//! The printer takes bitmaps as `DC2 '*' rows width` followed by
//! `rows * width` bytes, MSB leftmost. Every line is sent as its own
//! one-row bitmap so the head advances exactly one dot row per line.

use tspectrum_core::line::{Line, LINE_WIDTH};

/// Device control 2
pub const DC2: u8 = 0x12;

/// Escape
pub const ESC: u8 = 0x1B;

/// Printer initialise: clears the buffer and restores defaults
pub const RESET: [u8; 2] = [ESC, b'@'];

const HEADER_LEN: usize = 4;

/// Length of one encoded raster row
pub const RASTER_ROW_LEN: usize = HEADER_LEN + LINE_WIDTH;

/// Encode a line as a one-row raster bitmap command
pub fn raster_row(line: &Line) -> [u8; RASTER_ROW_LEN] {
    let mut out = [0u8; RASTER_ROW_LEN];
    out[..HEADER_LEN].copy_from_slice(&[DC2, b'*', 1, LINE_WIDTH as u8]);
    out[HEADER_LEN..].copy_from_slice(line.as_bytes());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header() {
        let row = raster_row(&Line::blank());
        assert_eq!(&row[..4], &[0x12, 0x2A, 0x01, 0x30]);
        assert!(row[4..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_payload_follows_header() {
        let mut line = Line::blank();
        line.set_dot(0, true);
        line.set_dot(383, true);

        let row = raster_row(&line);
        assert_eq!(row[4], 0x80);
        assert_eq!(row[RASTER_ROW_LEN - 1], 0x01);
    }
}

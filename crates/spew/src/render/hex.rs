//! Classic `hexdump -C` style rendering of byte buffers.
//!
//! Output lines look like:
//!
//! ```text
//! 00000010  2e 2f 30 31 32 33 34 35  36 37 38 39 3a 3b 3c 3d  |./0123456789:;<=|
//! ^ offset                          ^ extra space              ^ ASCII of line
//! ```

use std::fmt::{self, Write};

const HEX: &[u8; 16] = b"0123456789abcdef";

/// Streaming hex dumper over a text sink.
///
/// Bytes may be written in any number of chunks; [`HexDumper::close`] pads
/// and terminates a partial final line. Writing after closing is a bug in
/// the caller and panics.
pub struct HexDumper<'a, W: Write> {
    out: &'a mut W,
    indent: &'a str,
    right: [u8; 18],
    /// Bytes in the current line.
    used: usize,
    /// Bytes written in total.
    offset: u32,
    closed: bool,
}

impl<'a, W: Write> HexDumper<'a, W> {
    /// Creates a dumper that prefixes every line with `indent`.
    pub fn new(out: &'a mut W, indent: &'a str) -> Self {
        Self {
            out,
            indent,
            right: [0; 18],
            used: 0,
            offset: 0,
            closed: false,
        }
    }

    /// Writes a chunk of bytes.
    ///
    /// # Panics
    ///
    /// Panics if the dumper has been closed.
    pub fn write(&mut self, data: &[u8]) -> fmt::Result {
        assert!(!self.closed, "hex dumper written after close");

        for &b in data {
            if self.used == 0 {
                self.out.write_str(self.indent)?;
                let o = self.offset;
                write!(self.out, "{o:08x}  ")?;
            }

            self.out.write_char(HEX[(b >> 4) as usize] as char)?;
            self.out.write_char(HEX[(b & 0x0f) as usize] as char)?;
            self.out.write_str(match self.used {
                // Extra space after the 8th byte.
                7 => "  ",
                // Extra space and the bar opening the ASCII column.
                15 => "  |",
                _ => " ",
            })?;

            self.right[self.used] = printable(b);
            self.used += 1;
            self.offset = self.offset.wrapping_add(1);
            if self.used == 16 {
                self.finish_line(16)?;
                self.used = 0;
            }
        }
        Ok(())
    }

    /// Pads and terminates a partial final line. Closing twice is a no-op.
    pub fn close(&mut self) -> fmt::Result {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        if self.used == 0 {
            return Ok(());
        }

        let n = self.used;
        for used in n..16 {
            self.out.write_str(match used {
                7 => "    ",
                15 => "    |",
                _ => "   ",
            })?;
        }
        self.finish_line(n)
    }

    fn finish_line(&mut self, n: usize) -> fmt::Result {
        self.right[n] = b'|';
        self.right[n + 1] = b'\n';
        for &c in &self.right[..n + 2] {
            self.out.write_char(c as char)?;
        }
        Ok(())
    }
}

fn printable(b: u8) -> u8 {
    if (0x20..=0x7e).contains(&b) { b } else { b'.' }
}

/// Dumps `data` in one go, prefixing every line with `indent`.
pub fn hex_dump<W: Write>(out: &mut W, data: &[u8], indent: &str) -> fmt::Result {
    let mut dumper = HexDumper::new(out, indent);
    dumper.write(data)?;
    dumper.close()
}

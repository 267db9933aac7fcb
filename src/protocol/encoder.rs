//! Screen directive encoder
//!
//! Turns cursor, color, attribute and text directives into the byte
//! sequences the terminal expects. Bytes accumulate in a buffer that the
//! owner drains with [`Encoder::take`] and hands to the transport.

use super::*;

/// Foreground restored after a colored `print`
pub const DEFAULT_FOREGROUND: Color = Color::White;

/// Output buffer for videotex directives
#[derive(Debug, Default)]
pub struct Encoder {
    buf: Vec<u8>,
}

impl Encoder {
    pub fn new() -> Self {
        Self { buf: Vec::with_capacity(256) }
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Drain all queued bytes.
    pub fn take(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.buf)
    }

    /// Queue raw bytes.
    #[inline]
    pub fn out(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    #[inline]
    pub fn out1(&mut self, v1: u8) {
        self.buf.push(v1);
    }

    fn esc(&mut self, code: u8) {
        self.buf.push(ESC);
        self.buf.push(code);
    }

    /// Clear the screen and hide the cursor.
    pub fn clear_screen(&mut self) {
        self.out1(FF);
        self.cursor(false);
    }

    /// Same as `clear_screen`; kept for screens written against the older name.
    pub fn home(&mut self) {
        self.clear_screen();
    }

    pub fn cursor(&mut self, visible: bool) {
        self.out1(if visible { CURSOR_ON } else { CURSOR_OFF });
    }

    /// Move the cursor to a 1-indexed `(line, column)`.
    pub fn position(&mut self, line: u8, column: u8) {
        if line == 1 && column == 1 {
            self.out1(RS);
        } else {
            self.buf.push(US);
            self.buf.push(ADDRESS_BASE.wrapping_add(line));
            self.buf.push(ADDRESS_BASE.wrapping_add(column));
        }
    }

    pub fn fore_color(&mut self, color: Color) {
        self.esc(FG_BASE + color.index());
    }

    pub fn back_color(&mut self, color: Color) {
        self.esc(BG_BASE + color.index());
    }

    pub fn inverse(&mut self, enable: bool) {
        self.esc(if enable { INVERSE_ON } else { INVERSE_OFF });
    }

    pub fn underline(&mut self, enable: bool) {
        self.esc(if enable { UNDERLINE_ON } else { UNDERLINE_OFF });
    }

    pub fn flash(&mut self, enable: bool) {
        self.esc(if enable { FLASH_ON } else { FLASH_OFF });
    }

    pub fn scroll(&mut self, enable: bool) {
        self.out1(ESC);
        self.out(if enable { &SCROLL_ON } else { &SCROLL_OFF });
    }

    /// Print text in the current color.
    ///
    /// Accented letters are transliterated. Each `\n` becomes an explicit
    /// line feed + carriage return; a `\r` right before it is dropped.
    pub fn print(&mut self, text: &str) {
        for (i, segment) in text.split('\n').enumerate() {
            if i > 0 {
                self.new_line();
                self.start_line();
            }
            let segment = segment.strip_suffix('\r').unwrap_or(segment);
            for ch in segment.chars() {
                accents::encode_char(ch, &mut self.buf);
            }
        }
    }

    /// Print text in `color`, then restore the default foreground.
    pub fn print_colored(&mut self, text: &str, color: Color) {
        self.fore_color(color);
        self.print(text);
        self.fore_color(DEFAULT_FOREGROUND);
    }

    /// Print `ch` `count` times.
    pub fn plot(&mut self, ch: char, count: usize) {
        for _ in 0..count {
            accents::encode_char(ch, &mut self.buf);
        }
    }

    pub fn backspace(&mut self) {
        self.out1(BS);
    }

    pub fn new_line(&mut self) {
        self.out1(LF);
    }

    pub fn start_line(&mut self) {
        self.out1(CR);
    }

    /// Erase from `(line, column)` to the end of the line.
    pub fn delete_line(&mut self, line: u8, column: u8) {
        self.position(line, column);
        self.out1(CAN);
    }

    pub fn bip(&mut self) {
        self.out1(BEL);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded(f: impl FnOnce(&mut Encoder)) -> Vec<u8> {
        let mut enc = Encoder::new();
        f(&mut enc);
        enc.take()
    }

    #[test]
    fn test_position() {
        assert_eq!(encoded(|e| e.position(1, 1)), vec![0x1E]);
        assert_eq!(encoded(|e| e.position(3, 5)), vec![0x1F, 0x43, 0x45]);
        assert_eq!(encoded(|e| e.position(1, 2)), vec![0x1F, 0x41, 0x42]);
    }

    #[test]
    fn test_clear_screen() {
        assert_eq!(encoded(|e| e.clear_screen()), vec![0x0C, 0x14]);
    }

    #[test]
    fn test_colors() {
        assert_eq!(encoded(|e| e.fore_color(Color::Green)), vec![0x1B, 0x42]);
        assert_eq!(encoded(|e| e.back_color(Color::Blue)), vec![0x1B, 0x54]);
    }

    #[test]
    fn test_attributes() {
        assert_eq!(encoded(|e| e.inverse(true)), vec![0x1B, 0x5D]);
        assert_eq!(encoded(|e| e.inverse(false)), vec![0x1B, 0x5C]);
        assert_eq!(encoded(|e| e.underline(true)), vec![0x1B, 0x5A]);
        assert_eq!(encoded(|e| e.underline(false)), vec![0x1B, 0x59]);
        assert_eq!(encoded(|e| e.flash(true)), vec![0x1B, 0x48]);
        assert_eq!(encoded(|e| e.flash(false)), vec![0x1B, 0x49]);
        assert_eq!(encoded(|e| e.scroll(true)), vec![0x1B, 0x3A, 0x6A, 0x43]);
        assert_eq!(encoded(|e| e.scroll(false)), vec![0x1B, 0x3A, 0x6B, 0x43]);
    }

    #[test]
    fn test_print_accents() {
        assert_eq!(encoded(|e| e.print("café")), b"caf\x19\x42e".to_vec());
    }

    #[test]
    fn test_print_line_breaks() {
        assert_eq!(encoded(|e| e.print("ab\ncd")), b"ab\x0A\x0Dcd".to_vec());
        assert_eq!(encoded(|e| e.print("ab\r\ncd")), b"ab\x0A\x0Dcd".to_vec());
        assert_eq!(encoded(|e| e.print("x\n")), b"x\x0A\x0D".to_vec());
    }

    #[test]
    fn test_print_colored_restores_default() {
        assert_eq!(
            encoded(|e| e.print_colored("hi", Color::Red)),
            vec![0x1B, 0x41, b'h', b'i', 0x1B, 0x47]
        );
    }

    #[test]
    fn test_delete_line() {
        assert_eq!(encoded(|e| e.delete_line(2, 3)), vec![0x1F, 0x42, 0x43, 0x18]);
    }

    #[test]
    fn test_plot() {
        assert_eq!(encoded(|e| e.plot('-', 3)), b"---".to_vec());
    }
}

use embedded_hal::serial;

/// Every debug line starts with this
pub const LINE_BREAK: &str = "\r\n";

/// Debug text sink on top of any byte-oriented serial port.
///
/// Writes block until the port has queue space. Errors are reported to the
/// caller but debug call sites drop them; a lost log line is not worth
/// stopping a measurement run for.
pub struct SerialConsole<W> {
    port: W,
}

impl<W: serial::Write<u8>> SerialConsole<W> {
    pub fn new(port: W) -> Self {
        Self { port }
    }

    pub fn write_byte(&mut self, byte: u8) -> Result<(), W::Error> {
        nb::block!(self.port.write(byte))
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), W::Error> {
        for &byte in bytes {
            self.write_byte(byte)?;
        }
        Ok(())
    }

    pub fn write_str(&mut self, s: &str) -> Result<(), W::Error> {
        self.write_bytes(s.as_bytes())
    }

    /// Line break first, then the text
    pub fn write_line(&mut self, s: &str) -> Result<(), W::Error> {
        self.write_str(LINE_BREAK)?;
        self.write_str(s)
    }

    /// Blocks until everything queued has left the port
    pub fn flush(&mut self) -> Result<(), W::Error> {
        nb::block!(self.port.flush())
    }
}

impl<W: serial::Write<u8>> ufmt::uWrite for SerialConsole<W> {
    type Error = W::Error;

    fn write_str(&mut self, s: &str) -> Result<(), Self::Error> {
        self.write_bytes(s.as_bytes())
    }
}

/// Writes one formatted debug line, dropping serial errors
#[macro_export]
macro_rules! debug {
    ($console:expr, $($arg:tt)*) => {{
        $console
            .write_str($crate::drivers::serial_console::LINE_BREAK)
            .ok();
        ufmt::uwrite!($console, $($arg)*).ok();
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal_mock::serial::{Mock as SerialMock, Transaction as SerialTransaction};

    #[test]
    fn write_line_prefixes_line_break() {
        let expectations = [SerialTransaction::write_many(b"\r\nIdling...")];
        let mut port = SerialMock::new(&expectations);

        let mut console = SerialConsole::new(port.clone());
        console.write_line("Idling...").unwrap();

        port.done();
    }

    #[test]
    fn debug_macro_formats_numbers() {
        let expectations = [SerialTransaction::write_many(b"\r\nTX_POWER: 3")];
        let mut port = SerialMock::new(&expectations);

        let mut console = SerialConsole::new(port.clone());
        let power: u8 = 3;
        debug!(console, "TX_POWER: {}", power);

        port.done();
    }

    #[test]
    fn flush_reaches_the_port() {
        let expectations = [
            SerialTransaction::write_many(b"\r\nbye"),
            SerialTransaction::flush(),
        ];
        let mut port = SerialMock::new(&expectations);

        let mut console = SerialConsole::new(port.clone());
        console.write_line("bye").unwrap();
        console.flush().unwrap();

        port.done();
    }
}

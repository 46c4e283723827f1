use core::fmt::{self, Debug};

use embedded_nal::nb::{self, block};

pub trait Write {
    type Error: Debug;

    fn write(&mut self, buffer: &[u8]) -> nb::Result<usize, Self::Error>;

    fn write_all(&mut self, mut buffer: &[u8]) -> Result<(), Self::Error> {
        while !buffer.is_empty() {
            let written = block!(self.write(buffer))?;
            buffer = &buffer[written..];
        }
        Ok(())
    }
}

/// Writer that batches small writes into a borrowed slice. Flushed on drop, ignoring errors, so
/// call [`flush`](BufWriter::flush) when the result matters.
pub struct BufWriter<'a, W>
where
    W: Write,
{
    writer: &'a mut W,
    buf: &'a mut [u8],
    filled: usize,
}

impl<'a, W> BufWriter<'a, W>
where
    W: Write,
{
    pub fn new(writer: &'a mut W, buf: &'a mut [u8]) -> Self {
        Self {
            writer,
            buf,
            filled: 0,
        }
    }

    pub fn flush(&mut self) -> Result<(), W::Error> {
        let filled = core::mem::take(&mut self.filled);
        self.writer.write_all(&self.buf[..filled])
    }

    pub fn write(&mut self, data: &[u8]) -> Result<(), W::Error> {
        if self.filled + data.len() > self.buf.len() {
            self.flush()?;
        }

        if data.len() >= self.buf.len() {
            self.writer.write_all(data)
        } else {
            self.buf[self.filled..self.filled + data.len()].copy_from_slice(data);
            self.filled += data.len();
            Ok(())
        }
    }

    /// Backs the `write!` macro. The first writer error aborts formatting and is returned.
    pub fn write_fmt(&mut self, args: fmt::Arguments<'_>) -> Result<(), W::Error> {
        struct Adapter<'w, 'a, W: Write> {
            inner: &'w mut BufWriter<'a, W>,
            error: Option<W::Error>,
        }

        impl<W: Write> fmt::Write for Adapter<'_, '_, W> {
            fn write_str(&mut self, s: &str) -> fmt::Result {
                self.inner.write(s.as_bytes()).map_err(|e| {
                    self.error = Some(e);
                    fmt::Error
                })
            }
        }

        let mut adapter = Adapter {
            inner: self,
            error: None,
        };

        match fmt::write(&mut adapter, args) {
            Ok(()) => Ok(()),
            Err(_) => match adapter.error {
                Some(e) => Err(e),
                // A `Display` impl failed on its own; nothing was lost on the wire.
                None => Ok(()),
            },
        }
    }
}

impl<'a, W> Drop for BufWriter<'a, W>
where
    W: Write,
{
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

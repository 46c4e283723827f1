//! Blocking byte I/O over `embedded-nal` sockets, with caller-provided buffers.

mod read;
pub use read::*;

mod stream;
pub use stream::*;

mod write;
pub use write::*;

/// A stream paired with the scratch buffer its readers and writers borrow.
///
/// Only one of [`BufReader`] or [`BufWriter`] may hold the buffer at a time, which matches the
/// request/reply shape of SMTP.
pub struct WithBuf<'buf, S> {
    pub inner: S,
    pub buf: &'buf mut [u8],
}

impl<'buf, S> WithBuf<'buf, S> {
    pub fn new(inner: S, buf: &'buf mut [u8]) -> Self {
        Self { inner, buf }
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<'a, 'buf, R: Read> From<&'a mut WithBuf<'buf, R>> for BufReader<'a, R> {
    fn from(value: &'a mut WithBuf<'buf, R>) -> Self {
        BufReader::new(&mut value.inner, value.buf)
    }
}

impl<'a, 'buf, W: Write> From<&'a mut WithBuf<'buf, W>> for BufWriter<'a, W> {
    fn from(value: &'a mut WithBuf<'buf, W>) -> Self {
        BufWriter::new(&mut value.inner, value.buf)
    }
}

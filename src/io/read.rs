use core::{fmt::Debug, ops::Range, str};

use embedded_nal::nb::{self, block};

pub trait Read {
    type Error: Debug;

    fn read(&mut self, buffer: &mut [u8]) -> nb::Result<usize, Self::Error>;
}

/// Line-oriented reader that buffers into a borrowed slice.
///
/// Bytes read past the returned line stay in the buffer only for the lifetime of this reader.
pub struct BufReader<'a, R>
where
    R: Read,
{
    reader: &'a mut R,
    buf: &'a mut [u8],
    filled: Range<usize>,
}

impl<'a, R> BufReader<'a, R>
where
    R: Read,
{
    pub fn new(reader: &'a mut R, buf: &'a mut [u8]) -> Self {
        Self {
            reader,
            buf,
            filled: 0..0,
        }
    }

    /// Take `amt` bytes off the front of the filled range.
    fn consume(&mut self, amt: usize) -> &[u8] {
        let start = self.filled.start;
        self.filled.start += amt;
        if self.filled.is_empty() {
            self.filled = 0..0;
        }
        &self.buf[start..start + amt]
    }

    /// Move unconsumed bytes to the front so the tail can be filled again.
    fn compact(&mut self) {
        self.buf.copy_within(self.filled.clone(), 0);
        self.filled = 0..self.filled.len();
    }

    /// Read once into the free tail of the buffer and return how many bytes arrived.
    fn fill(&mut self) -> nb::Result<usize, R::Error> {
        let amt = self.reader.read(&mut self.buf[self.filled.end..])?;
        self.filled.end += amt;
        Ok(amt)
    }

    /// Return buffered data up to and including the first byte matching `p`, reading more as
    /// needed. On EOF whatever is buffered is returned.
    ///
    /// `FullBuffer` carries the buffered data when the buffer fills up without a match.
    pub fn read_until<P>(&mut self, mut p: P) -> Result<&[u8], BufReaderError<'_, R::Error>>
    where
        P: FnMut(&u8) -> bool,
    {
        let mut searched = self.filled.start;

        loop {
            let found = self.buf[searched..self.filled.end]
                .iter()
                .position(&mut p)
                .map(|pos| searched + pos + 1 - self.filled.start);
            if let Some(amt) = found {
                return Ok(self.consume(amt));
            }

            if self.filled.end == self.buf.len() {
                if self.filled.start == 0 {
                    let amt = self.filled.len();
                    return Err(BufReaderError::FullBuffer(self.consume(amt)));
                }
                self.compact();
            }
            searched = self.filled.end;

            let amt = block!(self.fill()).map_err(BufReaderError::ReaderError)?;
            if amt == 0 {
                let amt = self.filled.len();
                return Ok(self.consume(amt));
            }
        }
    }

    pub fn read_str_until<P>(&mut self, p: P) -> Result<&str, BufReaderError<'_, R::Error>>
    where
        P: FnMut(&u8) -> bool,
    {
        let data = self.read_until(p)?;
        str::from_utf8(data).map_err(|e| BufReaderError::DecodeFailed(data, e))
    }

    /// Read one line with its `\r\n` (or bare `\n`) terminator stripped.
    pub fn read_line(&mut self) -> Result<&str, BufReaderError<'_, R::Error>> {
        self.read_str_until(|&byte| byte == b'\n')
            .map(|line| line.trim_end_matches('\n').trim_end_matches('\r'))
    }
}

#[derive(Debug, PartialEq)]
pub enum BufReaderError<'a, E>
where
    E: Debug,
{
    FullBuffer(&'a [u8]),
    ReaderError(E),
    DecodeFailed(&'a [u8], str::Utf8Error),
}

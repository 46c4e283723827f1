use core::{fmt::Debug, str};

use crate::io::{BufReader, BufReaderError, Read, WithBuf};

/// Reads one SMTP reply, line by line (https://www.rfc-editor.org/rfc/rfc5321#section-4.2).
pub struct ResponseParser<'a, R>(BufReader<'a, R>)
where
    R: Read;

impl<'a, R> ResponseParser<'a, R>
where
    R: Read,
{
    pub fn new<'buf>(stream: &'a mut WithBuf<'buf, R>) -> Self {
        Self(BufReader::from(stream))
    }

    /// Consume the whole reply, failing if any line doesn't carry `code`.
    pub fn expect_code(mut self, code: &[u8; 3]) -> Result<(), ResponseError<R::Error>> {
        loop {
            let line = self.next_line()?;
            if line.code != code {
                return Err(ResponseError::ReplyCodeError(*line.code));
            }
            if !line.has_next {
                return Ok(());
            }
        }
    }

    /// Consume the whole reply and return its code, without looking at the text.
    pub fn code(mut self) -> Result<[u8; 3], ResponseError<R::Error>> {
        loop {
            let line = self.next_line()?;
            if !line.has_next {
                return Ok(*line.code);
            }
        }
    }

    pub fn next_line(&mut self) -> Result<ReplyLine<'_>, ResponseError<R::Error>> {
        let line = self.0.read_line()?.as_bytes();

        let (code, text) = line.split_at_checked(3).ok_or(ResponseError::FormatError)?;
        let code: &[u8; 3] = code.try_into().map_err(|_| ResponseError::FormatError)?;
        if !code.iter().all(u8::is_ascii_digit) {
            return Err(ResponseError::FormatError);
        }

        let (has_next, text) = match text.split_first() {
            Some((b'-', rest)) => (true, rest),
            Some((b' ', rest)) => (false, rest),
            None => (false, text),
            Some(_) => return Err(ResponseError::FormatError),
        };

        Ok(ReplyLine {
            code,
            text: str::from_utf8(text).map_err(|_| ResponseError::FormatError)?,
            has_next,
        })
    }
}

#[derive(Debug, PartialEq)]
pub enum ResponseError<E>
where
    E: Debug,
{
    ReplyCodeError([u8; 3]),
    ReadError(E),
    NoMem,
    FormatError,
}

impl<E> From<BufReaderError<'_, E>> for ResponseError<E>
where
    E: Debug,
{
    fn from(value: BufReaderError<'_, E>) -> Self {
        match value {
            BufReaderError::FullBuffer(_) => Self::NoMem,
            BufReaderError::ReaderError(e) => Self::ReadError(e),
            BufReaderError::DecodeFailed(_, _) => Self::FormatError,
        }
    }
}

#[derive(Debug, PartialEq)]
pub struct ReplyLine<'a> {
    pub code: &'a [u8; 3],
    pub text: &'a str,
    pub has_next: bool,
}

#[cfg(test)]
mod test {
    use core::convert::Infallible;

    use embedded_nal::nb;

    use super::*;

    struct Replies<'a>(&'a [u8]);

    impl Read for Replies<'_> {
        type Error = Infallible;

        fn read(&mut self, buffer: &mut [u8]) -> nb::Result<usize, Self::Error> {
            let n = buffer.len().min(self.0.len());
            buffer[..n].copy_from_slice(&self.0[..n]);
            self.0 = &self.0[n..];
            Ok(n)
        }
    }

    #[test]
    fn multiline_reply() {
        let mut buf = [0; 128];
        let mut stream = WithBuf::new(
            Replies(b"250-smtp.test.com\r\n250-AUTH PLAIN LOGIN\r\n250 SIZE 1000\r\n"),
            &mut buf,
        );
        let mut parser = ResponseParser::new(&mut stream);

        assert_eq!(
            parser.next_line(),
            Ok(ReplyLine {
                code: b"250",
                text: "smtp.test.com",
                has_next: true
            })
        );
        assert_eq!(
            parser.next_line(),
            Ok(ReplyLine {
                code: b"250",
                text: "AUTH PLAIN LOGIN",
                has_next: true
            })
        );
        assert_eq!(
            parser.next_line(),
            Ok(ReplyLine {
                code: b"250",
                text: "SIZE 1000",
                has_next: false
            })
        );
    }

    #[test]
    fn expect_code_mismatch() {
        let mut buf = [0; 64];
        let mut stream = WithBuf::new(Replies(b"535 5.7.8 Bad credentials\r\n"), &mut buf);

        assert_eq!(
            ResponseParser::new(&mut stream).expect_code(b"235"),
            Err(ResponseError::ReplyCodeError(*b"535"))
        );
    }

    #[test]
    fn bare_code_line() {
        let mut buf = [0; 64];
        let mut stream = WithBuf::new(Replies(b"334\r\n"), &mut buf);

        assert_eq!(ResponseParser::new(&mut stream).code(), Ok(*b"334"));
    }

    #[test]
    fn malformed_lines() {
        let replies: [&[u8]; 3] = [b"25\r\n", b"abc ok\r\n", b"250?what\r\n"];
        for reply in replies {
            let mut buf = [0; 64];
            let mut stream = WithBuf::new(Replies(reply), &mut buf);

            assert_eq!(
                ResponseParser::new(&mut stream).code(),
                Err(ResponseError::FormatError),
                "{:?} should not parse",
                reply
            );
        }
    }
}

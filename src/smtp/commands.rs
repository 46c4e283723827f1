use embedded_nal::TcpClientStack;
use enumset::EnumSet;

use super::{extensions::EhloInfo, response::ResponseParser, ConnectError, SmtpExtension};
use crate::io::{BufWriter, TcpStream, WithBuf};

/// An SMTP command that can be executed (e.g., EHLO, AUTH, QUIT).
pub trait Command<T>
where
    T: TcpClientStack,
{
    type Output;
    type Error;

    fn execute(self, stream: &mut WithBuf<TcpStream<T>>) -> Result<Self::Output, Self::Error>;
}

/// Domain or address literal that identifies the client (https://www.rfc-editor.org/rfc/rfc5321#section-4.1.1.1)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(transparent)]
pub struct ClientId<'a>(&'a str);

impl<'a> ClientId<'a> {
    pub fn new(id: &'a str) -> Self {
        Self(id)
    }

    pub const fn localhost() -> Self {
        Self("localhost")
    }
}

impl Default for ClientId<'_> {
    fn default() -> Self {
        Self::localhost()
    }
}

impl<'a> From<&'a str> for ClientId<'a> {
    fn from(value: &'a str) -> Self {
        Self::new(value)
    }
}

impl core::fmt::Display for ClientId<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.0)
    }
}

/// EHLO command for greeting and registering supported SMTP extensions
/// (https://www.rfc-editor.org/rfc/rfc5321#section-4.1.1.1).
pub struct Ehlo<'a>(pub(crate) ClientId<'a>);

impl<T: TcpClientStack> Command<T> for Ehlo<'_> {
    type Output = EhloInfo;
    type Error = ConnectError<T::Error>;

    fn execute(self, stream: &mut WithBuf<TcpStream<T>>) -> Result<Self::Output, Self::Error> {
        let Self(client_id) = self;

        {
            let mut writer = BufWriter::from(&mut *stream);
            write!(writer, "EHLO {}\r\n", client_id).map_err(ConnectError::IoError)?;
            writer.flush().map_err(ConnectError::IoError)?;
        }

        let mut response = ResponseParser::new(stream);

        // first line only greets back
        let mut has_next = {
            let line = response.next_line()?;
            if line.code != b"250" {
                return Err(ConnectError::UnexpectedResponse);
            }
            line.has_next
        };

        let mut extensions = EnumSet::new();

        while has_next {
            let line = response.next_line()?;
            if line.code != b"250" {
                return Err(ConnectError::UnexpectedResponse);
            }
            extensions |= SmtpExtension::parse_ehlo_line(line.text);
            has_next = line.has_next;
        }

        Ok(EhloInfo { extensions })
    }
}

/// QUIT command. The server's reply is not awaited.
pub struct Quit;

impl<T: TcpClientStack> Command<T> for Quit {
    type Output = ();
    type Error = T::Error;

    fn execute(self, stream: &mut WithBuf<TcpStream<T>>) -> Result<Self::Output, Self::Error> {
        let mut writer = BufWriter::from(stream);
        writer.write(b"QUIT\r\n")?;
        writer.flush()
    }
}

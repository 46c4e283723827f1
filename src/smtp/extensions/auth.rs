use base64::{display::Base64Display, engine::general_purpose::STANDARD};
use embedded_nal::TcpClientStack;
use enumset::{enum_set, EnumSet};
use log::{debug, warn};

use super::SmtpExtension;
use crate::{
    auth::Credential,
    io::{BufWriter, TcpStream, WithBuf},
    smtp::{commands::Command, response::ResponseParser, ConnectError},
};

/// Mask of all AUTH extension flags. `&` with this to check if AUTH is supported.
pub const AUTH_EXTENSION_MASK: EnumSet<SmtpExtension> =
    enum_set!(SmtpExtension::AuthLogin | SmtpExtension::AuthPlain);

/// Longest authcid or password a PLAIN message may carry
/// (https://www.rfc-editor.org/rfc/rfc4616#section-2).
const PLAIN_FIELD_MAX: usize = 255;

/// Room for `\0 authcid \0 passwd` with both fields at their limit.
const PLAIN_MESSAGE_CAPACITY: usize = 2 * (PLAIN_FIELD_MAX + 1);

/// AUTH command for SMTP authentication extension (https://www.rfc-editor.org/rfc/rfc4954).
///
/// Mechanisms are tried in `SmtpExtension` order until one is accepted.
pub(crate) struct Auth<'cred> {
    pub credential: Credential<'cred>,
    pub mechanisms: EnumSet<SmtpExtension>,
}

impl<T: TcpClientStack> Command<T> for Auth<'_> {
    type Output = ();
    type Error = ConnectError<T::Error>;

    fn execute(self, stream: &mut WithBuf<TcpStream<T>>) -> Result<Self::Output, Self::Error> {
        let mechanisms = self.mechanisms & AUTH_EXTENSION_MASK;
        if mechanisms.is_empty() {
            return Err(ConnectError::AuthUnsupported);
        }

        for mech in mechanisms {
            let accepted = match mech {
                SmtpExtension::AuthPlain => plain(stream, self.credential)?,
                SmtpExtension::AuthLogin => login(stream, self.credential)?,
            };

            if accepted {
                debug!("authenticated as {:?} with {:?}", self.credential.username(), mech);
                return Ok(());
            }
            warn!("{:?} rejected for {:?}", mech, self.credential.username());
        }

        Err(ConnectError::AuthFailed)
    }
}

/// Send one line, flushing it to the socket.
fn send_line<T: TcpClientStack>(
    stream: &mut WithBuf<TcpStream<T>>,
    args: core::fmt::Arguments<'_>,
) -> Result<(), ConnectError<T::Error>> {
    let mut writer = BufWriter::from(stream);
    writer.write_fmt(args).map_err(ConnectError::IoError)?;
    writer.write(b"\r\n").map_err(ConnectError::IoError)?;
    writer.flush().map_err(ConnectError::IoError)
}

fn reply_code<T: TcpClientStack>(
    stream: &mut WithBuf<TcpStream<T>>,
) -> Result<[u8; 3], ConnectError<T::Error>> {
    Ok(ResponseParser::new(stream).code()?)
}

/// `AUTH PLAIN` with an initial response (https://www.rfc-editor.org/rfc/rfc4616).
fn plain<T: TcpClientStack>(
    stream: &mut WithBuf<TcpStream<T>>,
    credential: Credential,
) -> Result<bool, ConnectError<T::Error>> {
    let (username, password) = credential.as_pair();
    if username.len() > PLAIN_FIELD_MAX || password.len() > PLAIN_FIELD_MAX {
        warn!("credential too long for {:?}", SmtpExtension::AuthPlain);
        return Ok(false);
    }

    let mut message = heapless::Vec::<u8, PLAIN_MESSAGE_CAPACITY>::new();
    for field in [username, password] {
        message.push(0).map_err(|_| ConnectError::NoMem)?;
        message
            .extend_from_slice(field.as_bytes())
            .map_err(|_| ConnectError::NoMem)?;
    }

    send_line(
        stream,
        format_args!("AUTH PLAIN {}", Base64Display::new(&message, &STANDARD)),
    )?;

    match &reply_code(stream)? {
        b"235" => Ok(true),
        b"334" => {
            // server ignored the initial response and wants it now; cancel instead
            send_line(stream, format_args!("*"))?;
            reply_code(stream)?;
            Ok(false)
        }
        _ => Ok(false),
    }
}

/// `AUTH LOGIN`, answering the username and password prompts in turn.
fn login<T: TcpClientStack>(
    stream: &mut WithBuf<TcpStream<T>>,
    credential: Credential,
) -> Result<bool, ConnectError<T::Error>> {
    send_line(stream, format_args!("AUTH LOGIN"))?;

    for answer in [credential.username(), credential.password()] {
        // any reply but a prompt ends the exchange
        if &reply_code(stream)? != b"334" {
            return Ok(false);
        }
        send_line(
            stream,
            format_args!("{}", Base64Display::new(answer.as_bytes(), &STANDARD)),
        )?;
    }

    Ok(&reply_code(stream)? == b"235")
}

mod commands;
pub mod extensions;
mod response;

use core::fmt::Debug;
use embedded_nal::{nb::block, AddrType, Dns, SocketAddr, TcpClientStack, TcpError};
use enumset::EnumSet;
use log::debug;

pub use self::commands::ClientId;
use self::{
    commands::{Command, Ehlo, Quit},
    extensions::auth::{Auth, AUTH_EXTENSION_MASK},
    response::{ResponseError, ResponseParser},
};
pub use self::extensions::{EhloInfo, SmtpExtension};
use crate::{
    auth::CredentialSource,
    io::{TcpStream, WithBuf},
};

pub struct SmtpClient;

impl SmtpClient {
    pub fn new<'a, T>(stack: &'a mut T, buffer: &'a mut [u8]) -> SmtpClientConnector<'a, T>
    where
        T: TcpClientStack + 'a,
    {
        SmtpClientConnector {
            stack,
            buffer,
            auth: None,
            auth_mechanisms: AUTH_EXTENSION_MASK,
            client_id: None,
        }
    }
}

pub struct SmtpClientConnector<'a, T>
where
    T: TcpClientStack + 'a,
{
    stack: &'a mut T,
    buffer: &'a mut [u8],
    auth: Option<&'a dyn CredentialSource>,
    auth_mechanisms: EnumSet<SmtpExtension>,
    client_id: Option<ClientId<'a>>,
}

impl<'a, T> SmtpClientConnector<'a, T>
where
    T: TcpClientStack + 'a,
{
    /// Authenticate with the credential `source` yields when the connection is made.
    pub fn with_auth<S: CredentialSource>(mut self, source: &'a S) -> Self {
        self.auth = Some(source);
        self
    }

    pub fn without_auth(mut self) -> Self {
        self.auth = None;
        self
    }

    /// Restrict which AUTH mechanisms may be used. Defaults to every supported one.
    pub fn with_auth_mechanisms(mut self, value: impl Into<EnumSet<SmtpExtension>>) -> Self {
        self.auth_mechanisms = value.into() & AUTH_EXTENSION_MASK;
        self
    }

    pub fn with_client_id(mut self, value: impl Into<Option<ClientId<'a>>>) -> Self {
        self.client_id = value.into();
        self
    }

    /// Connect, greet the server and, if a credential source was given, authenticate.
    pub fn connect(
        self,
        remote: impl Into<SocketAddr>,
    ) -> Result<SmtpClientSession<'a, T>, ConnectError<T::Error>> {
        let Self {
            stack,
            buffer,
            auth,
            auth_mechanisms,
            client_id,
        } = self;

        let stream = TcpStream::connect(stack, remote.into()).map_err(ConnectError::IoError)?;
        let mut stream = WithBuf::new(stream, buffer);

        ResponseParser::new(&mut stream).expect_code(b"220")?;

        let ehlo_info = Ehlo(client_id.unwrap_or_default()).execute(&mut stream)?;
        debug!("server extensions: {:?}", ehlo_info.extensions);

        if let Some(source) = auth {
            Auth {
                credential: source.authentication(),
                mechanisms: ehlo_info.extensions & auth_mechanisms,
            }
            .execute(&mut stream)?;
        }

        Ok(SmtpClientSession {
            stream,
            ehlo_info,
            authenticated: auth.is_some(),
        })
    }

    pub fn connect_with_hostname<D>(
        self,
        dns: &mut D,
        hostname: &str,
        port: u16,
    ) -> Result<SmtpClientSession<'a, T>, ConnectHostnameError<D::Error, T::Error>>
    where
        D: Dns,
    {
        let addr = block!(dns.get_host_by_name(hostname, AddrType::Either))
            .map_err(ConnectHostnameError::DnsError)?;

        Ok(self.connect((addr, port))?)
    }
}

impl<'a, T> Debug for SmtpClientConnector<'a, T>
where
    T: TcpClientStack + 'a,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SmtpClientConnector")
            .field("auth", &self.auth.map(|source| source.authentication()))
            .field("auth_mechanisms", &self.auth_mechanisms)
            .field("client_id", &self.client_id)
            .finish()
    }
}

#[derive(Debug)]
pub enum ConnectError<E>
where
    E: TcpError,
{
    IoError(E),
    NoMem,
    AuthFailed,
    AuthUnsupported,
    UnexpectedResponse,
}

impl<E> From<ResponseError<E>> for ConnectError<E>
where
    E: TcpError,
{
    fn from(value: ResponseError<E>) -> Self {
        match value {
            ResponseError::ReplyCodeError(_) | ResponseError::FormatError => {
                Self::UnexpectedResponse
            }
            ResponseError::ReadError(e) => Self::IoError(e),
            ResponseError::NoMem => Self::NoMem,
        }
    }
}

#[derive(Debug)]
pub enum ConnectHostnameError<DE, E>
where
    DE: Debug,
    E: TcpError,
{
    DnsError(DE),
    ConnectError(ConnectError<E>),
}

impl<DE, E> From<ConnectError<E>> for ConnectHostnameError<DE, E>
where
    DE: Debug,
    E: TcpError,
{
    fn from(value: ConnectError<E>) -> Self {
        Self::ConnectError(value)
    }
}

/// An open connection that has passed EHLO and, when requested, AUTH.
pub struct SmtpClientSession<'a, T>
where
    T: TcpClientStack + 'a,
{
    stream: WithBuf<'a, TcpStream<'a, T>>,
    ehlo_info: EhloInfo,
    authenticated: bool,
}

impl<'a, T> SmtpClientSession<'a, T>
where
    T: TcpClientStack + 'a,
{
    pub fn ehlo_info(&self) -> &EhloInfo {
        &self.ehlo_info
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Send QUIT and close the socket.
    pub fn quit(self) -> Result<(), T::Error> {
        let Self { mut stream, .. } = self;
        Quit.execute(&mut stream)?;
        stream.into_inner().close()
    }
}

impl<'a, T> Debug for SmtpClientSession<'a, T>
where
    T: TcpClientStack + 'a,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SmtpClientSession")
            .field("ehlo_info", &self.ehlo_info)
            .field("authenticated", &self.authenticated)
            .finish()
    }
}

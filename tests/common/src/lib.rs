use std::{
    collections::VecDeque,
    env::{self, VarError},
};

use embedded_nal::{nb, AddrType, Dns, TcpClientStack, TcpError, TcpErrorKind};
pub use embedded_nal::{IpAddr, SocketAddr};

pub struct TestContext {
    pub plain_port: u16,
    pub username: String,
    pub password: String,
}

impl TestContext {
    pub fn setup() -> Self {
        const AUTH_USER_ENV: &str = "AUTH_USER";
        const AUTH_PASS_ENV: &str = "AUTH_PASS";
        const PLAIN_PORT_ENV: &str = "PLAIN_PORT";

        let user = env::var(AUTH_USER_ENV);
        let pass = env::var(AUTH_PASS_ENV);

        let (username, password) = match (user, pass) {
            (Err(VarError::NotPresent), Err(VarError::NotPresent)) => {
                ("mock".into(), "123456".into())
            }
            (Ok(user), Ok(pass)) => (user, pass),
            invalid => panic!(
                "Provide both {} and {} env, or none. Got: {:?}",
                AUTH_USER_ENV, AUTH_PASS_ENV, invalid
            ),
        };

        let plain_port = match env::var(PLAIN_PORT_ENV) {
            Err(VarError::NotPresent) => 2525,
            Ok(port) => port
                .parse()
                .unwrap_or_else(|_| panic!("{} must be a u16. Got: {}", PLAIN_PORT_ENV, port)),
            invalid => panic!("{:?}", invalid),
        };

        Self {
            plain_port,
            username,
            password,
        }
    }
}

#[derive(Debug, PartialEq)]
pub struct MockError;

impl TcpError for MockError {
    fn kind(&self) -> TcpErrorKind {
        TcpErrorKind::Other
    }
}

pub struct MockSocket;

/// In-memory SMTP server playing back a script.
///
/// The first reply is sent on connect as the greeting; every following reply is released once
/// the client finishes one more `\n`-terminated line.
#[derive(Default)]
pub struct MockStack {
    replies: VecDeque<Vec<u8>>,
    incoming: VecDeque<u8>,
    sent: Vec<u8>,
    remote: Option<SocketAddr>,
    closed: bool,
}

impl MockStack {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        Self {
            replies: replies.into_iter().map(|r| r.as_ref().to_vec()).collect(),
            ..Default::default()
        }
    }

    /// Lines the client sent, without their `\r\n`.
    pub fn sent_lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.sent)
            .split_terminator("\r\n")
            .map(String::from)
            .collect()
    }

    pub fn remote(&self) -> Option<SocketAddr> {
        self.remote
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn release_reply(&mut self) {
        if let Some(reply) = self.replies.pop_front() {
            self.incoming.extend(reply);
        }
    }
}

impl TcpClientStack for MockStack {
    type TcpSocket = MockSocket;
    type Error = MockError;

    fn socket(&mut self) -> Result<Self::TcpSocket, Self::Error> {
        Ok(MockSocket)
    }

    fn connect(
        &mut self,
        _socket: &mut Self::TcpSocket,
        remote: SocketAddr,
    ) -> nb::Result<(), Self::Error> {
        self.remote = Some(remote);
        self.release_reply();
        Ok(())
    }

    fn send(
        &mut self,
        _socket: &mut Self::TcpSocket,
        buffer: &[u8],
    ) -> nb::Result<usize, Self::Error> {
        if self.closed {
            return Err(nb::Error::Other(MockError));
        }
        self.sent.extend_from_slice(buffer);
        for _ in buffer.iter().filter(|&&b| b == b'\n') {
            self.release_reply();
        }
        Ok(buffer.len())
    }

    fn receive(
        &mut self,
        _socket: &mut Self::TcpSocket,
        buffer: &mut [u8],
    ) -> nb::Result<usize, Self::Error> {
        let n = buffer.len().min(self.incoming.len());
        for (dst, src) in buffer.iter_mut().zip(self.incoming.drain(..n)) {
            *dst = src;
        }
        Ok(n)
    }

    fn close(&mut self, _socket: Self::TcpSocket) -> Result<(), Self::Error> {
        self.closed = true;
        Ok(())
    }
}

/// Resolver that knows a fixed set of hostnames.
#[derive(Default)]
pub struct MockDns {
    hosts: Vec<(String, IpAddr)>,
}

impl MockDns {
    pub fn with_host(mut self, hostname: &str, addr: impl Into<IpAddr>) -> Self {
        self.hosts.push((hostname.into(), addr.into()));
        self
    }
}

impl Dns for MockDns {
    type Error = MockError;

    fn get_host_by_name(
        &mut self,
        hostname: &str,
        _addr_type: AddrType,
    ) -> nb::Result<IpAddr, Self::Error> {
        self.hosts
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(hostname))
            .map(|&(_, addr)| addr)
            .ok_or(nb::Error::Other(MockError))
    }

    fn get_host_by_address(
        &self,
        addr: IpAddr,
        result: &mut [u8],
    ) -> Result<usize, Self::Error> {
        let (name, _) = self
            .hosts
            .iter()
            .find(|&&(_, known)| known == addr)
            .ok_or(MockError)?;
        let name = name.as_bytes();
        let out = result
            .get_mut(..name.len())
            .ok_or(MockError)?;
        out.copy_from_slice(name);
        Ok(name.len())
    }
}

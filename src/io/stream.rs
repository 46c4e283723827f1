use embedded_nal::{nb, SocketAddr, TcpClientStack};

use super::{Read, Write};

/// A connected TCP socket borrowed together with the stack that owns it.
///
/// The socket is closed on drop; use [`close`](TcpStream::close) to observe the result.
pub struct TcpStream<'a, T>
where
    T: TcpClientStack + 'a,
{
    stack: &'a mut T,
    // `None` only once closed
    socket: Option<T::TcpSocket>,
}

impl<'a, T> TcpStream<'a, T>
where
    T: TcpClientStack + 'a,
{
    /// Open a socket and block until it is connected to `remote`.
    pub fn connect(stack: &'a mut T, remote: SocketAddr) -> Result<Self, T::Error> {
        let mut socket = stack.socket()?;
        if let Err(e) = nb::block!(stack.connect(&mut socket, remote)) {
            let _ = stack.close(socket);
            return Err(e);
        }

        Ok(Self {
            stack,
            socket: Some(socket),
        })
    }

    fn close_socket(&mut self) -> Result<(), T::Error> {
        match self.socket.take() {
            Some(socket) => self.stack.close(socket),
            None => Ok(()),
        }
    }

    pub fn close(mut self) -> Result<(), T::Error> {
        self.close_socket()
    }
}

impl<'a, T> Drop for TcpStream<'a, T>
where
    T: TcpClientStack + 'a,
{
    fn drop(&mut self) {
        let _ = self.close_socket();
    }
}

impl<'a, T> Read for TcpStream<'a, T>
where
    T: TcpClientStack + 'a,
{
    type Error = T::Error;

    fn read(&mut self, buffer: &mut [u8]) -> nb::Result<usize, Self::Error> {
        match self.socket.as_mut() {
            Some(socket) => self.stack.receive(socket, buffer),
            None => Ok(0),
        }
    }
}

impl<'a, T> Write for TcpStream<'a, T>
where
    T: TcpClientStack + 'a,
{
    type Error = T::Error;

    fn write(&mut self, buffer: &[u8]) -> nb::Result<usize, Self::Error> {
        match self.socket.as_mut() {
            Some(socket) => self.stack.send(socket, buffer),
            None => Ok(0),
        }
    }
}

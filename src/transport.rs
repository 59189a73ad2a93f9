//! Whole-message transports over TCP and UDP.
//!
//! TCP carries a byte stream, so [`Transport::recv`] reassembles exactly one frame per call:
//! the 4 byte prefix first, then precisely the number of bytes it declares, coalescing partial
//! reads. UDP carries one whole message per datagram.

use crate::error::Error;
use crate::message::{HEADER_LEN, PREFIX_LEN, SimpleMessage};
use std::io::{ErrorKind, Read, Write};
use std::net::{SocketAddr, TcpStream, UdpSocket};
use std::time::Duration;

/// Datagram receive buffer size; ample for every defined message.
pub(crate) const BUFSIZE: usize = 1024;

fn map_io(e: std::io::Error) -> Error {
    match e.kind() {
        ErrorKind::TimedOut | ErrorKind::WouldBlock => Error::Timeout,
        _ => Error::Io(e),
    }
}

/// A framed, blocking TCP connection carrying Simple Message frames.
#[derive(Debug)]
pub struct Transport {
    stream: TcpStream,
    peer: SocketAddr,
}

impl Transport {
    /// Open an outbound connection to a controller endpoint.
    ///
    /// `TCP_NODELAY` is set: requests are small and latency bound.
    pub fn connect(addr: SocketAddr, timeout: Duration) -> Result<Self, Error> {
        let stream = TcpStream::connect_timeout(&addr, timeout).map_err(|e| match e.kind() {
            ErrorKind::ConnectionRefused => Error::ConnectionRefused { addr },
            ErrorKind::TimedOut | ErrorKind::WouldBlock => Error::Timeout,
            _ => Error::Io(e),
        })?;

        stream.set_nodelay(true)?;

        log::info!("connected to {}", addr);

        Ok(Self { stream, peer: addr })
    }

    /// Wrap an accepted server-side connection.
    pub fn from_stream(stream: TcpStream) -> Result<Self, Error> {
        stream.set_nodelay(true)?;

        let peer = stream.peer_addr()?;

        Ok(Self { stream, peer })
    }

    /// The remote address.
    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// Set or clear the receive deadline applied to each [`Transport::recv`].
    pub fn set_read_timeout(&self, timeout: Option<Duration>) -> Result<(), Error> {
        self.stream.set_read_timeout(timeout).map_err(Error::Io)
    }

    /// Encode `msg` and write all of its bytes.
    pub fn send(&mut self, msg: &SimpleMessage) -> Result<(), Error> {
        self.stream
            .write_all(&msg.encode_to_vec())
            .map_err(map_io)?;

        log::trace!("sent {:?} to {}", msg.header.msg_type, self.peer);

        Ok(())
    }

    /// Read exactly one frame and decode it.
    pub fn recv(&mut self) -> Result<SimpleMessage, Error> {
        let mut frame = vec![0u8; PREFIX_LEN];

        self.stream.read_exact(&mut frame).map_err(map_io)?;

        let declared = i32::from_le_bytes([frame[0], frame[1], frame[2], frame[3]]);

        if declared < HEADER_LEN as i32 {
            return Err(Error::InvalidHeader {
                got: declared.max(0) as usize,
            });
        }

        frame.resize(PREFIX_LEN + declared as usize, 0);

        self.stream
            .read_exact(&mut frame[PREFIX_LEN..])
            .map_err(map_io)?;

        let (msg, _consumed) = SimpleMessage::decode(&frame)?;

        log::trace!("received {:?} from {}", msg.header.msg_type, self.peer);

        Ok(msg)
    }

    /// Send a request and block for the next frame on the stream.
    pub fn send_and_recv(&mut self, msg: &SimpleMessage) -> Result<SimpleMessage, Error> {
        self.send(msg)?;
        self.recv()
    }

    /// A handle that can unblock a reader parked in [`Transport::recv`] from another thread by
    /// shutting the socket down.
    pub(crate) fn shutdown_handle(&self) -> Result<ShutdownHandle, Error> {
        Ok(ShutdownHandle {
            stream: self.stream.try_clone()?,
        })
    }
}

/// Cloned handle used to tear a blocked [`Transport`] down from another thread.
#[derive(Debug)]
pub(crate) struct ShutdownHandle {
    stream: TcpStream,
}

impl ShutdownHandle {
    pub(crate) fn shutdown(&self) {
        let _ = self.stream.shutdown(std::net::Shutdown::Both);
    }
}

/// A UDP endpoint carrying one Simple Message frame per datagram.
#[derive(Debug)]
pub struct UdpEndpoint {
    socket: UdpSocket,
}

impl UdpEndpoint {
    /// Bind a datagram socket to `addr`.
    pub fn bind(addr: SocketAddr) -> Result<Self, Error> {
        let socket = UdpSocket::bind(addr)?;

        Ok(Self { socket })
    }

    /// The bound local address, useful when binding to port 0.
    pub fn local_addr(&self) -> Result<SocketAddr, Error> {
        self.socket.local_addr().map_err(Error::Io)
    }

    /// Set or clear the receive deadline applied to each [`UdpEndpoint::recv_from`].
    pub fn set_read_timeout(&self, timeout: Option<Duration>) -> Result<(), Error> {
        self.socket.set_read_timeout(timeout).map_err(Error::Io)
    }

    /// Receive one datagram and decode the message it carries.
    pub fn recv_from(&self) -> Result<(SimpleMessage, SocketAddr), Error> {
        let mut buf = [0u8; BUFSIZE];

        let (len, from) = self.socket.recv_from(&mut buf).map_err(map_io)?;

        let (msg, _consumed) = SimpleMessage::decode(&buf[0..len])?;

        Ok((msg, from))
    }

    /// Encode `msg` into one datagram addressed to `addr`.
    pub fn send_to(&self, msg: &SimpleMessage, addr: SocketAddr) -> Result<(), Error> {
        self.socket.send_to(&msg.encode_to_vec(), addr).map_err(map_io)?;

        Ok(())
    }
}

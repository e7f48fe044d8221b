//! Address parsing, network selection, and the connection wrapper returned
//! by the dialer.

use std::fmt;
use std::io;
use std::net::SocketAddr;
use std::pin::Pin;
use std::str::FromStr;
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::net::{TcpStream, UdpSocket};

use crate::error::Error;

/// The networks the dialer understands, mirroring the platform dial
/// contract. The bare variants accept both address families; the suffixed
/// variants restrict to one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Network {
    Tcp,
    Tcp4,
    Tcp6,
    Udp,
    Udp4,
    Udp6,
}

impl Network {
    pub fn is_tcp(self) -> bool {
        matches!(self, Network::Tcp | Network::Tcp4 | Network::Tcp6)
    }

    /// Whether this network admits the given address family.
    pub(crate) fn admits(self, is_ipv4: bool) -> bool {
        match self {
            Network::Tcp | Network::Udp => true,
            Network::Tcp4 | Network::Udp4 => is_ipv4,
            Network::Tcp6 | Network::Udp6 => !is_ipv4,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Network::Tcp => "tcp",
            Network::Tcp4 => "tcp4",
            Network::Tcp6 => "tcp6",
            Network::Udp => "udp",
            Network::Udp4 => "udp4",
            Network::Udp6 => "udp6",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tcp" => Ok(Network::Tcp),
            "tcp4" => Ok(Network::Tcp4),
            "tcp6" => Ok(Network::Tcp6),
            "udp" => Ok(Network::Udp),
            "udp4" => Ok(Network::Udp4),
            "udp6" => Ok(Network::Udp6),
            other => Err(Error::UnknownNetwork(other.to_string())),
        }
    }
}

fn invalid(addr: &str, reason: &str) -> Error {
    Error::InvalidAddress {
        addr: addr.to_string(),
        reason: reason.to_string(),
    }
}

/// Splits `host:port` into its parts. IPv6 hosts must be bracketed
/// (`[::1]:53`); an unbracketed colon-bearing host is rejected rather than
/// guessed at.
pub(crate) fn split_host_port(addr: &str) -> Result<(&str, u16), Error> {
    let (host, port_str) = if let Some(rest) = addr.strip_prefix('[') {
        let (host, rest) = rest
            .split_once(']')
            .ok_or_else(|| invalid(addr, "missing ']' in address"))?;
        let port_str = rest
            .strip_prefix(':')
            .ok_or_else(|| invalid(addr, "missing port after ']'"))?;
        (host, port_str)
    } else {
        let (host, port_str) = addr
            .rsplit_once(':')
            .ok_or_else(|| invalid(addr, "missing port"))?;
        if host.contains(':') {
            return Err(invalid(addr, "IPv6 address must be bracketed"));
        }
        (host, port_str)
    };

    if host.is_empty() {
        return Err(invalid(addr, "empty host"));
    }
    let port = port_str
        .parse::<u16>()
        .map_err(|_| invalid(addr, "invalid port"))?;
    Ok((host, port))
}

/// Appends `:<default_port>` to addresses that lack a port, bracketing bare
/// IPv6 addresses. Addresses that already carry a port pass through.
pub(crate) fn ensure_port(addr: &str, default_port: u16) -> String {
    if split_host_port(addr).is_ok() {
        return addr.to_string();
    }
    if addr.parse::<std::net::Ipv6Addr>().is_ok() {
        return format!("[{addr}]:{default_port}");
    }
    format!("{addr}:{default_port}")
}

/// Creates a UDP socket bound to the unspecified address of the remote's
/// family and connects it to `remote`.
pub(crate) async fn connect_udp(remote: SocketAddr) -> io::Result<UdpSocket> {
    let local: SocketAddr = if remote.is_ipv4() {
        "0.0.0.0:0".parse().unwrap()
    } else {
        "[::]:0".parse().unwrap()
    };
    let socket = UdpSocket::bind(local).await?;
    socket.connect(remote).await?;
    Ok(socket)
}

/// A dialed connection: either a TCP stream or a connected UDP socket.
///
/// Both variants implement `AsyncRead`/`AsyncWrite`, so the result can be
/// used anywhere a byte stream is expected. On the UDP variant each write
/// sends one datagram and each read receives one.
#[derive(Debug)]
pub enum Connection {
    Tcp(TcpStream),
    Udp(UdpSocket),
}

impl Connection {
    pub(crate) async fn open(network: Network, addr: SocketAddr) -> io::Result<Self> {
        if network.is_tcp() {
            Ok(Connection::Tcp(TcpStream::connect(addr).await?))
        } else {
            Ok(Connection::Udp(connect_udp(addr).await?))
        }
    }

    pub fn peer_addr(&self) -> io::Result<SocketAddr> {
        match self {
            Connection::Tcp(stream) => stream.peer_addr(),
            Connection::Udp(socket) => socket.peer_addr(),
        }
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        match self {
            Connection::Tcp(stream) => stream.local_addr(),
            Connection::Udp(socket) => socket.local_addr(),
        }
    }
}

impl AsyncRead for Connection {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Connection::Tcp(stream) => Pin::new(stream).poll_read(cx, buf),
            Connection::Udp(socket) => socket.poll_recv(cx, buf),
        }
    }
}

impl AsyncWrite for Connection {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        match self.get_mut() {
            Connection::Tcp(stream) => Pin::new(stream).poll_write(cx, buf),
            Connection::Udp(socket) => socket.poll_send(cx, buf),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Connection::Tcp(stream) => Pin::new(stream).poll_flush(cx),
            Connection::Udp(_) => Poll::Ready(Ok(())),
        }
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Connection::Tcp(stream) => Pin::new(stream).poll_shutdown(cx),
            Connection::Udp(_) => Poll::Ready(Ok(())),
        }
    }
}

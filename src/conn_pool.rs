//! Per-resolver pool of reusable UDP sockets.

use std::collections::VecDeque;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::net::UdpSocket;

use crate::error::Error;
use crate::net_util::connect_udp;

const DEFAULT_POOL_SIZE: usize = 4;

/// A bounded pool of idle UDP sockets connected to one DNS server.
///
/// Sockets are created lazily and reused across queries to avoid per-query
/// socket setup. Only the idle set is bounded: under burst load `get` keeps
/// creating sockets past `size`, and `put` sheds the excess once they come
/// back. A socket must only be returned after successful I/O; callers drop
/// (close) sockets whose last operation failed.
#[derive(Debug)]
pub(crate) struct ConnPool {
    addr: String,
    timeout: Duration,
    size: usize,
    state: Mutex<PoolState>,
}

#[derive(Debug)]
struct PoolState {
    idle: VecDeque<UdpSocket>,
    closed: bool,
}

impl ConnPool {
    /// `addr` is the server's `host:port`; hostnames are resolved with the
    /// platform resolver when a socket is created. A `size` of 0 falls back
    /// to the default of 4.
    pub(crate) fn new(addr: String, timeout: Duration, size: usize) -> Self {
        let size = if size == 0 { DEFAULT_POOL_SIZE } else { size };
        Self {
            addr,
            timeout,
            size,
            state: Mutex::new(PoolState {
                idle: VecDeque::with_capacity(size),
                closed: false,
            }),
        }
    }

    /// Pops an idle socket, or creates and connects a new one when the pool
    /// is empty. Socket creation is bounded by the pool's timeout.
    pub(crate) async fn get(&self) -> Result<UdpSocket, Error> {
        {
            let mut state = self.state.lock();
            if state.closed {
                return Err(Error::PoolClosed);
            }
            if let Some(socket) = state.idle.pop_front() {
                return Ok(socket);
            }
        }

        let connect = async {
            let mut addrs = tokio::net::lookup_host(self.addr.as_str()).await?;
            let remote = addrs.next().ok_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("no addresses for {}", self.addr),
                )
            })?;
            connect_udp(remote).await
        };

        match tokio::time::timeout(self.timeout, connect).await {
            Ok(Ok(socket)) => Ok(socket),
            Ok(Err(source)) => Err(Error::Transport {
                op: "connect",
                source,
            }),
            Err(_) => Err(Error::Timeout(self.timeout)),
        }
    }

    /// Returns a socket to the idle set. Closed pool or full queue: the
    /// socket is dropped, which closes it.
    pub(crate) fn put(&self, socket: UdpSocket) {
        let mut state = self.state.lock();
        if !state.closed && state.idle.len() < self.size {
            state.idle.push_back(socket);
        }
        // Otherwise the socket drops here and the descriptor is released.
    }

    /// Idempotent. Marks the pool closed and drops every idle socket.
    /// Checked-out sockets are closed when they come back through `put`.
    pub(crate) fn close(&self) {
        let mut state = self.state.lock();
        state.closed = true;
        state.idle.clear();
    }

    #[cfg(test)]
    pub(crate) fn idle_len(&self) -> usize {
        self.state.lock().idle.len()
    }
}

impl Drop for ConnPool {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(size: usize) -> ConnPool {
        // Nothing needs to listen: connecting a UDP socket does no I/O.
        ConnPool::new("127.0.0.1:53".to_string(), Duration::from_secs(1), size)
    }

    #[tokio::test]
    async fn get_creates_sockets_lazily() {
        let pool = pool(2);
        assert_eq!(pool.idle_len(), 0);
        let socket = pool.get().await.unwrap();
        assert_eq!(pool.idle_len(), 0);
        pool.put(socket);
        assert_eq!(pool.idle_len(), 1);
    }

    #[tokio::test]
    async fn get_reuses_idle_sockets() {
        let pool = pool(2);
        let socket = pool.get().await.unwrap();
        let local = socket.local_addr().unwrap();
        pool.put(socket);
        let socket = pool.get().await.unwrap();
        assert_eq!(socket.local_addr().unwrap(), local);
        assert_eq!(pool.idle_len(), 0);
    }

    #[tokio::test]
    async fn put_sheds_excess_sockets() {
        let pool = pool(2);
        let a = pool.get().await.unwrap();
        let b = pool.get().await.unwrap();
        let c = pool.get().await.unwrap();
        pool.put(a);
        pool.put(b);
        pool.put(c);
        assert_eq!(pool.idle_len(), 2);
    }

    #[tokio::test]
    async fn zero_size_defaults_to_four() {
        let pool = pool(0);
        let mut sockets = Vec::new();
        for _ in 0..5 {
            sockets.push(pool.get().await.unwrap());
        }
        for socket in sockets {
            pool.put(socket);
        }
        assert_eq!(pool.idle_len(), 4);
    }

    #[tokio::test]
    async fn closed_pool_rejects_get_and_sheds_put() {
        let pool = pool(2);
        let socket = pool.get().await.unwrap();
        pool.put(pool.get().await.unwrap());
        assert_eq!(pool.idle_len(), 1);

        pool.close();
        assert_eq!(pool.idle_len(), 0);
        assert!(matches!(pool.get().await, Err(Error::PoolClosed)));

        // A socket checked out before close is closed on return, not pooled.
        pool.put(socket);
        assert_eq!(pool.idle_len(), 0);

        // close is idempotent.
        pool.close();
        assert!(matches!(pool.get().await, Err(Error::PoolClosed)));
    }
}

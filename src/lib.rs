//! dnsdial - connection establishment with multi-resolver DNS.
//!
//! Instead of the system resolver, a [`Dialer`] queries several DNS servers
//! and coordinates their answers with a configurable [`Strategy`]:
//!
//! - **Race**: query all servers, take the first success (lowest latency)
//! - **Fallback**: try servers in order until one succeeds (ordered failover)
//! - **Consensus**: require N servers to agree (tolerate poisoned resolvers)
//! - **Compare**: answer immediately, report disagreement out of band
//!
//! Resolved addresses can be cached with TTL-aware expiry, and each
//! resolver reuses UDP sockets through a small connection pool.
//!
//! # Usage
//!
//! ```no_run
//! use std::time::Duration;
//! use dnsdial::{Dialer, Strategy};
//!
//! # async fn run() -> Result<(), dnsdial::Error> {
//! let dialer = Dialer::builder()
//!     .resolvers(["8.8.8.8", "1.1.1.1", "9.9.9.9"])
//!     .strategy(Strategy::Consensus { min_agreement: 2, ignore_ttl: true })
//!     .timeout(Duration::from_secs(5))
//!     .cache(1000, Duration::from_secs(1), Duration::from_secs(300))
//!     .build();
//!
//! let conn = dialer.dial("tcp", "api.example.com:443").await?;
//! # Ok(())
//! # }
//! ```
//!
//! The `network` argument mirrors the platform dial contract (`tcp`,
//! `tcp4`, `tcp6`, `udp`, `udp4`, `udp6`), so the dialer slots in anywhere
//! a custom dial function is accepted. IP-literal targets skip resolution
//! entirely.

mod cache;
pub mod catalog;
mod conn_pool;
mod dialer;
mod error;
mod logger;
mod net_util;
mod record;
mod resolver;
mod strategy;
#[cfg(test)]
mod test_util;

pub use hickory_proto::rr::RecordType;

pub use crate::dialer::{Dialer, DialerBuilder};
pub use crate::error::Error;
pub use crate::logger::{Field, LogBridge, Logger, NoopLogger};
pub use crate::net_util::{Connection, Network};
pub use crate::record::{Record, records_equal};
pub use crate::resolver::{DnsResolver, UdpResolver};
pub use crate::strategy::{DiscrepancyHandler, Strategy};

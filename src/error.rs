//! Error types for resolution and dialing.

use std::time::Duration;

use hickory_proto::error::ProtoError;
use hickory_proto::op::ResponseCode;
use thiserror::Error;

use crate::net_util::Network;

/// Errors produced by the resolution pipeline and the dialer.
///
/// Transport-level faults carry the failed operation so callers can tell a
/// socket-creation failure from a send or receive failure. Protocol-level
/// outcomes (bad RCODE, empty answer section) are distinct variants because
/// the lookup pipeline treats them differently from transport faults when
/// deciding whether another resolver is worth trying.
#[derive(Debug, Error)]
pub enum Error {
    /// The dial target was not a well-formed `host:port`.
    #[error("invalid address {addr:?}: {reason}")]
    InvalidAddress { addr: String, reason: String },

    /// The network string was not one of tcp/tcp4/tcp6/udp/udp4/udp6.
    #[error("unknown network {0:?}")]
    UnknownNetwork(String),

    /// `get()` was called on a closed connection pool.
    #[error("connection pool is closed")]
    PoolClosed,

    /// A strategy was invoked with an empty resolver list.
    #[error("no resolvers configured")]
    NoResolvers,

    /// A socket operation failed. `op` is one of "connect", "send", "recv".
    #[error("{op} failed: {source}")]
    Transport {
        op: &'static str,
        source: std::io::Error,
    },

    /// A query or connection attempt exceeded its deadline.
    #[error("operation timed out after {0:?}")]
    Timeout(Duration),

    /// DNS wire encoding or decoding failed.
    #[error("dns protocol error: {0}")]
    Proto(#[from] ProtoError),

    /// The server answered with a non-success response code.
    #[error("dns error: {0}")]
    Rcode(ResponseCode),

    /// The server answered success but the answer section was empty.
    #[error("no records found")]
    NoRecords,

    /// Not enough resolvers agreed on an answer set.
    #[error("consensus not reached: required {required} agreements")]
    ConsensusNotReached { required: usize },

    /// Resolution failed for a dialed host.
    #[error("DNS lookup failed for {host}: {source}")]
    Lookup {
        host: String,
        #[source]
        source: Box<Error>,
    },

    /// Resolution succeeded but produced no parseable addresses.
    #[error("no IP addresses found for {host}")]
    NoIpAddresses { host: String },

    /// Address-family filtering left no candidates for the requested network.
    #[error("no suitable IP addresses found for {host} (network: {network})")]
    NoSuitableIps { host: String, network: Network },

    /// Every candidate address failed to connect; carries the last failure.
    #[error("failed to connect to {host}: {source}")]
    Connect {
        host: String,
        source: std::io::Error,
    },
}

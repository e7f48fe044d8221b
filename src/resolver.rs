//! The resolver seam and its UDP implementation.
//!
//! [`DnsResolver`] abstracts a single DNS server so the strategies can
//! coordinate queries without knowing the transport. [`UdpResolver`] is the
//! wire-level implementation: it composes standard single-question queries,
//! exchanges them over pooled UDP sockets, and maps the answer section into
//! [`Record`]s.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use hickory_proto::op::{Edns, Message, MessageType, OpCode, Query, ResponseCode};
use hickory_proto::rr::{Name, RData, RecordType};
use hickory_proto::serialize::binary::{BinDecodable, BinEncodable};

use crate::conn_pool::ConnPool;
use crate::error::Error;
use crate::net_util::ensure_port;
use crate::record::Record;

/// EDNS0 advertised UDP payload size. Larger than the classic 512-byte
/// limit so servers can send bigger answer sections without truncation.
const MAX_PAYLOAD: u16 = 4096;

const DNS_PORT: u16 = 53;

/// A single DNS server that can be queried for typed records.
#[async_trait]
pub trait DnsResolver: Send + Sync + fmt::Debug {
    /// Identifier for logging and the Compare transcript, typically the
    /// server's `host:port`.
    fn name(&self) -> &str;

    /// Performs one DNS query. A successful result is always non-empty; a
    /// success response with an empty answer section reports
    /// [`Error::NoRecords`].
    async fn resolve_type(&self, host: &str, rtype: RecordType) -> Result<Vec<Record>, Error>;
}

/// DNS-over-UDP client for one server, with pooled sockets.
#[derive(Debug)]
pub struct UdpResolver {
    addr: String,
    timeout: Duration,
    pool: ConnPool,
}

impl UdpResolver {
    /// `addr` may be `ip:port`, a bare IP, or `hostname:port`; a missing
    /// port defaults to 53. `timeout` bounds each individual query.
    pub fn new(addr: impl AsRef<str>, timeout: Duration, pool_size: usize) -> Self {
        let addr = ensure_port(addr.as_ref(), DNS_PORT);
        Self {
            pool: ConnPool::new(addr.clone(), timeout, pool_size),
            addr,
            timeout,
        }
    }

    /// Closes the socket pool. Subsequent queries fail with
    /// [`Error::PoolClosed`].
    pub fn close(&self) {
        self.pool.close();
    }
}

fn build_query(host: &str, rtype: RecordType) -> Result<Message, Error> {
    let mut name = Name::from_utf8(host)?;
    name.set_fqdn(true);

    let mut edns = Edns::new();
    edns.set_max_payload(MAX_PAYLOAD);
    edns.set_version(0);

    let mut message = Message::new();
    message.set_id(rand::random());
    message.set_message_type(MessageType::Query);
    message.set_op_code(OpCode::Query);
    message.set_recursion_desired(true);
    message.add_query(Query::query(name, rtype));
    message.set_edns(edns);
    Ok(message)
}

/// Renders one answer into the canonical text forms described on
/// [`Record`]. Types without an explicit arm fall back to the wire
/// library's presentation format.
fn record_value(data: &RData) -> String {
    match data {
        RData::A(ip) => ip.0.to_string(),
        RData::AAAA(ip) => ip.0.to_string(),
        RData::CNAME(name) => name.0.to_string(),
        RData::MX(mx) => format!("{} {}", mx.preference(), mx.exchange()),
        RData::NS(ns) => ns.0.to_string(),
        RData::TXT(txt) => txt.to_string(),
        RData::SOA(soa) => format!(
            "{} {} {} {} {} {} {}",
            soa.mname(),
            soa.rname(),
            soa.serial(),
            soa.refresh(),
            soa.retry(),
            soa.expire(),
            soa.minimum()
        ),
        RData::PTR(ptr) => ptr.0.to_string(),
        RData::SRV(srv) => format!(
            "{} {} {} {}",
            srv.priority(),
            srv.weight(),
            srv.port(),
            srv.target()
        ),
        other => other.to_string(),
    }
}

fn parse_answers(response: &Message) -> Vec<Record> {
    response
        .answers()
        .iter()
        .filter_map(|answer| {
            let data = answer.data()?;
            Some(Record::new(
                answer.record_type(),
                record_value(data),
                answer.ttl(),
            ))
        })
        .collect()
}

#[async_trait]
impl DnsResolver for UdpResolver {
    fn name(&self) -> &str {
        &self.addr
    }

    async fn resolve_type(&self, host: &str, rtype: RecordType) -> Result<Vec<Record>, Error> {
        let query = build_query(host, rtype)?;
        let payload = query.to_bytes()?;

        let socket = self.pool.get().await?;

        let exchange = async {
            socket
                .send(&payload)
                .await
                .map_err(|source| Error::Transport { op: "send", source })?;
            let mut buf = vec![0u8; MAX_PAYLOAD as usize];
            let len = socket
                .recv(&mut buf)
                .await
                .map_err(|source| Error::Transport { op: "recv", source })?;
            buf.truncate(len);
            Ok::<_, Error>(buf)
        };

        let raw = match tokio::time::timeout(self.timeout, exchange).await {
            Ok(Ok(raw)) => raw,
            // Failed or timed-out I/O leaves the socket in an unknown state
            // (a late response could poison the next query), so it is
            // dropped here instead of returned to the pool.
            Ok(Err(err)) => return Err(err),
            Err(_) => return Err(Error::Timeout(self.timeout)),
        };

        // The socket is healthy again; make it available before spending
        // time on parsing.
        self.pool.put(socket);

        let response = Message::from_bytes(&raw)?;
        if response.response_code() != ResponseCode::NoError {
            return Err(Error::Rcode(response.response_code()));
        }

        let records = parse_answers(&response);
        if records.is_empty() {
            // Some servers report "name exists but has no data for this
            // type" as a success with an empty answer section. Callers need
            // to tell that apart from a transport fault.
            return Err(Error::NoRecords);
        }
        Ok(records)
    }
}

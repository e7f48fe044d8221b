//! The dialer: strategy-driven resolution plus connection establishment.

use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use hickory_proto::rr::RecordType;
use tokio::sync::mpsc;

use crate::cache::DnsCache;
use crate::error::Error;
use crate::logger::{Field, Logger, NoopLogger};
use crate::net_util::{Connection, Network, split_host_port};
use crate::record::Record;
use crate::resolver::{DnsResolver, UdpResolver};
use crate::strategy::Strategy;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);
const DEFAULT_POOL_SIZE: usize = 4;

/// Cache TTL used when a response carries no usable TTL hint.
const FALLBACK_TTL_SECS: u32 = 300;

/// Drop-in replacement for a plain socket dial that resolves hostnames
/// across multiple DNS servers with a configurable [`Strategy`].
///
/// ```no_run
/// use dnsdial::{Dialer, Strategy};
///
/// # async fn run() -> Result<(), dnsdial::Error> {
/// let dialer = Dialer::builder()
///     .resolvers(["8.8.8.8", "1.1.1.1"])
///     .strategy(Strategy::Consensus { min_agreement: 2, ignore_ttl: true })
///     .build();
///
/// let conn = dialer.dial("tcp", "api.example.com:443").await?;
/// # Ok(())
/// # }
/// ```
pub struct Dialer {
    resolvers: Vec<Arc<dyn DnsResolver>>,
    strategy: Strategy,
    logger: Arc<dyn Logger>,
    cache: DnsCache,
}

impl fmt::Debug for Dialer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let resolvers: Vec<&str> = self.resolvers.iter().map(|r| r.name()).collect();
        f.debug_struct("Dialer")
            .field("resolvers", &resolvers)
            .field("strategy", &self.strategy)
            .field("cache_enabled", &self.cache.is_enabled())
            .finish()
    }
}

impl Dialer {
    pub fn builder() -> DialerBuilder {
        DialerBuilder::new()
    }

    /// Queries A and AAAA concurrently through the configured strategy and
    /// merges whatever succeeded.
    ///
    /// A failed record type never aborts the other: hosts with a single
    /// address family are common, and some servers report the absent
    /// family as an error rather than an empty success. Deciding whether
    /// the merge is good enough is the caller's job.
    async fn lookup(&self, host: &str) -> Vec<Record> {
        const QUERY_TYPES: [RecordType; 2] = [RecordType::A, RecordType::AAAA];

        // Buffered to the number of query tasks so every task can post its
        // result without waiting on the consumer.
        let (tx, mut rx) = mpsc::channel(QUERY_TYPES.len());
        for rtype in QUERY_TYPES {
            let tx = tx.clone();
            let host = host.to_string();
            let strategy = self.strategy.clone();
            let resolvers = self.resolvers.clone();
            let logger = Arc::clone(&self.logger);
            tokio::spawn(async move {
                let outcome = strategy
                    .resolve_type(&host, rtype, &resolvers, logger.as_ref())
                    .await;
                let _ = tx.send((rtype, outcome)).await;
            });
        }
        drop(tx);

        let mut all_records = Vec::new();
        while let Some((rtype, outcome)) = rx.recv().await {
            match outcome {
                Ok(records) => all_records.extend(records),
                Err(err) => {
                    self.logger.debug(
                        "query type failed",
                        &[Field::new("type", rtype), Field::new("error", &err)],
                    );
                }
            }
        }
        all_records
    }

    /// Resolves `host` to IP addresses, consulting the cache first and
    /// writing back on a successful network lookup.
    async fn lookup_ips(&self, host: &str) -> Result<Vec<IpAddr>, Error> {
        if let Some(cached) = self.cache.get_ips(host) {
            self.logger.debug(
                "IP cache hit",
                &[Field::new("host", host), Field::new("ips", cached.len())],
            );
            return Ok(cached);
        }
        self.logger
            .debug("IP cache miss", &[Field::new("host", host)]);

        let records = self.lookup(host).await;

        let mut ips = Vec::with_capacity(records.len());
        let mut min_ttl = FALLBACK_TTL_SECS;
        for record in &records {
            if record.record_type() == RecordType::A || record.record_type() == RecordType::AAAA {
                // Non-parsable values should not happen for A/AAAA answers;
                // drop them rather than fail the whole lookup.
                if let Ok(ip) = record.value().parse::<IpAddr>() {
                    ips.push(ip);
                    min_ttl = min_ttl.min(record.ttl());
                }
            }
        }

        if ips.is_empty() {
            return Err(Error::NoIpAddresses {
                host: host.to_string(),
            });
        }

        self.cache
            .set_ips(host, ips.clone(), Duration::from_secs(u64::from(min_ttl)));
        Ok(ips)
    }

    /// Connects to `addr` (`host:port`) over `network`, one of
    /// tcp/tcp4/tcp6/udp/udp4/udp6.
    ///
    /// IP-literal hosts are dialed directly with no resolution or caching.
    /// Hostnames are resolved through the configured strategy, filtered to
    /// the network's address family (bare `tcp`/`udp` order IPv4 before
    /// IPv6 for compatibility), and tried sequentially until one connects.
    pub async fn dial(&self, network: &str, addr: &str) -> Result<Connection, Error> {
        let network: Network = network.parse()?;
        let (host, port) = split_host_port(addr)?;

        if let Ok(ip) = host.parse::<IpAddr>() {
            return Connection::open(network, SocketAddr::new(ip, port))
                .await
                .map_err(|source| Error::Connect {
                    host: host.to_string(),
                    source,
                });
        }

        let ips = self
            .lookup_ips(host)
            .await
            .map_err(|source| Error::Lookup {
                host: host.to_string(),
                source: Box::new(source),
            })?;

        let candidates = order_candidates(network, &ips);
        if candidates.is_empty() {
            return Err(Error::NoSuitableIps {
                host: host.to_string(),
                network,
            });
        }

        let mut last_err = None;
        for ip in candidates {
            match Connection::open(network, SocketAddr::new(ip, port)).await {
                Ok(conn) => return Ok(conn),
                Err(err) => {
                    self.logger.debug(
                        "connection failed, trying next IP",
                        &[Field::new("ip", ip), Field::new("error", &err)],
                    );
                    last_err = Some(err);
                }
            }
        }

        Err(Error::Connect {
            host: host.to_string(),
            source: last_err.expect("candidate list was non-empty"),
        })
    }
}

/// Filters `ips` to the families the network admits. For the bare
/// `tcp`/`udp` networks every address qualifies, IPv4 first.
fn order_candidates(network: Network, ips: &[IpAddr]) -> Vec<IpAddr> {
    match network {
        Network::Tcp | Network::Udp => {
            let mut candidates: Vec<IpAddr> = ips.iter().copied().filter(IpAddr::is_ipv4).collect();
            candidates.extend(ips.iter().copied().filter(IpAddr::is_ipv6));
            candidates
        }
        _ => ips
            .iter()
            .copied()
            .filter(|ip| network.admits(ip.is_ipv4()))
            .collect(),
    }
}

/// Configuration for a [`Dialer`].
///
/// Defaults: Race strategy, 2 s per-query timeout, no-op logger, four
/// pooled sockets per resolver, cache disabled.
pub struct DialerBuilder {
    resolver_addrs: Vec<String>,
    strategy: Strategy,
    timeout: Duration,
    logger: Arc<dyn Logger>,
    pool_size: usize,
    cache: Option<(usize, Duration, Duration)>,
}

impl Default for DialerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DialerBuilder {
    pub fn new() -> Self {
        Self {
            resolver_addrs: Vec::new(),
            strategy: Strategy::Race,
            timeout: DEFAULT_TIMEOUT,
            logger: Arc::new(NoopLogger),
            pool_size: DEFAULT_POOL_SIZE,
            cache: None,
        }
    }

    /// DNS servers to query. Each address may be `ip:port`, a bare IP, or
    /// `hostname:port`; a missing port defaults to 53. Order matters for
    /// the Fallback strategy and for Compare's baseline.
    pub fn resolvers<I>(mut self, addrs: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.resolver_addrs
            .extend(addrs.into_iter().map(|addr| addr.as_ref().to_string()));
        self
    }

    /// Coordination strategy across the resolvers. Defaults to Race.
    pub fn strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Timeout for each individual DNS query, not the overall dial.
    /// Defaults to 2 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Structured logging sink. Defaults to discarding everything.
    pub fn logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    /// Maximum idle pooled sockets per resolver. Zero is ignored and the
    /// default of 4 kept.
    pub fn conn_pool_size(mut self, size: usize) -> Self {
        if size > 0 {
            self.pool_size = size;
        }
        self
    }

    /// Enables the IP cache: up to `size` hostnames, response TTLs clamped
    /// into `[min_ttl, max_ttl]`.
    pub fn cache(mut self, size: usize, min_ttl: Duration, max_ttl: Duration) -> Self {
        self.cache = Some((size, min_ttl, max_ttl));
        self
    }

    /// Instantiates a UDP resolver per configured address, with the final
    /// timeout and pool size, and assembles the dialer.
    pub fn build(self) -> Dialer {
        let resolvers = self
            .resolver_addrs
            .iter()
            .map(|addr| {
                Arc::new(UdpResolver::new(addr, self.timeout, self.pool_size))
                    as Arc<dyn DnsResolver>
            })
            .collect();
        let cache = match self.cache {
            Some((size, min_ttl, max_ttl)) => DnsCache::new(size, min_ttl, max_ttl),
            None => DnsCache::disabled(),
        };
        Dialer {
            resolvers,
            strategy: self.strategy,
            logger: self.logger,
            cache,
        }
    }
}

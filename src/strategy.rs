//! Coordination strategies for querying multiple DNS servers.
//!
//! A [`Strategy`] decides how one typed query is distributed across the
//! configured resolvers: all at once taking the fastest answer (Race), one
//! at a time until something works (Fallback), demanding agreement before
//! trusting an answer (Consensus), or answering immediately while flagging
//! disagreement out of band (Compare).

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use hickory_proto::rr::RecordType;
use tokio::sync::mpsc;

use crate::error::Error;
use crate::logger::{Field, Logger};
use crate::record::{Record, records_equal};
use crate::resolver::DnsResolver;

/// Callback invoked by [`Strategy::Compare`] when resolvers disagree.
/// Receives the queried host, the record type, and every successful
/// response keyed by resolver name.
pub type DiscrepancyHandler =
    Arc<dyn Fn(&str, RecordType, &HashMap<String, Vec<Record>>) + Send + Sync>;

/// How to coordinate a query across the resolver list.
#[derive(Clone, Default)]
pub enum Strategy {
    /// Query all resolvers simultaneously and return the first successful
    /// response. Minimizes latency at the cost of extra network traffic.
    #[default]
    Race,

    /// Try resolvers sequentially in the configured order until one
    /// succeeds. Minimizes traffic; latency suffers when early resolvers
    /// are down.
    Fallback,

    /// Query every resolver and require `min_agreement` of them to return
    /// identical record multisets before answering.
    ///
    /// A `min_agreement` of 0 defaults to a simple majority of the
    /// *configured* resolver count (`n/2 + 1`), not of the resolvers that
    /// responded — failed resolvers count against the quorum. Tolerates up
    /// to `min_agreement - 1` compromised or divergent resolvers.
    Consensus {
        min_agreement: usize,
        /// Compare records by value alone. TTLs decay independently per
        /// resolver, so identical data rarely carries identical TTLs.
        ignore_ttl: bool,
    },

    /// Query every resolver, answer with the first successful response,
    /// and report disagreement through `on_discrepancy` without failing.
    Compare {
        on_discrepancy: Option<DiscrepancyHandler>,
        ignore_ttl: bool,
    },
}

impl fmt::Debug for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Race => f.write_str("Race"),
            Strategy::Fallback => f.write_str("Fallback"),
            Strategy::Consensus {
                min_agreement,
                ignore_ttl,
            } => f
                .debug_struct("Consensus")
                .field("min_agreement", min_agreement)
                .field("ignore_ttl", ignore_ttl)
                .finish(),
            Strategy::Compare {
                on_discrepancy,
                ignore_ttl,
            } => f
                .debug_struct("Compare")
                .field("on_discrepancy", &on_discrepancy.is_some())
                .field("ignore_ttl", ignore_ttl)
                .finish(),
        }
    }
}

impl Strategy {
    /// Resolves one record type for `host` across `resolvers` according to
    /// this strategy.
    pub async fn resolve_type(
        &self,
        host: &str,
        rtype: RecordType,
        resolvers: &[Arc<dyn DnsResolver>],
        logger: &dyn Logger,
    ) -> Result<Vec<Record>, Error> {
        match self {
            Strategy::Race => race(host, rtype, resolvers, logger).await,
            Strategy::Fallback => fallback(host, rtype, resolvers, logger).await,
            Strategy::Consensus {
                min_agreement,
                ignore_ttl,
            } => consensus(host, rtype, resolvers, logger, *min_agreement, *ignore_ttl).await,
            Strategy::Compare {
                on_discrepancy,
                ignore_ttl,
            } => {
                compare(
                    host,
                    rtype,
                    resolvers,
                    logger,
                    on_discrepancy.as_ref(),
                    *ignore_ttl,
                )
                .await
            }
        }
    }
}

async fn race(
    host: &str,
    rtype: RecordType,
    resolvers: &[Arc<dyn DnsResolver>],
    logger: &dyn Logger,
) -> Result<Vec<Record>, Error> {
    if resolvers.is_empty() {
        return Err(Error::NoResolvers);
    }

    // Buffered to the number of racers so a task can always post its result
    // and finish, even after a winner has been consumed.
    let (tx, mut rx) = mpsc::channel(resolvers.len());

    let mut tasks = Vec::with_capacity(resolvers.len());
    for resolver in resolvers {
        let resolver = Arc::clone(resolver);
        let tx = tx.clone();
        let host = host.to_string();
        tasks.push(tokio::spawn(async move {
            let start = Instant::now();
            let outcome = resolver.resolve_type(&host, rtype).await;
            let _ = tx
                .send((outcome, resolver.name().to_string(), start.elapsed()))
                .await;
        }));
    }
    drop(tx);

    // Early failures from fast-but-broken resolvers must not end the race;
    // keep consuming until a success arrives or everyone has failed.
    let mut last_err = None;
    while let Some((outcome, name, latency)) = rx.recv().await {
        match outcome {
            Ok(records) => {
                logger.debug(
                    "resolver won race",
                    &[
                        Field::new("resolver", &name),
                        Field::new("latency", format!("{latency:?}")),
                        Field::new("type", rtype),
                    ],
                );
                // The answer is in hand; the losers' responses are of no
                // further use.
                for task in &tasks {
                    task.abort();
                }
                return Ok(records);
            }
            Err(err) => last_err = Some(err),
        }
    }

    Err(last_err.expect("at least one resolver posted a result"))
}

async fn fallback(
    host: &str,
    rtype: RecordType,
    resolvers: &[Arc<dyn DnsResolver>],
    logger: &dyn Logger,
) -> Result<Vec<Record>, Error> {
    let mut last_err = None;
    for resolver in resolvers {
        match resolver.resolve_type(host, rtype).await {
            Ok(records) => {
                logger.debug(
                    "resolver succeeded",
                    &[
                        Field::new("resolver", resolver.name()),
                        Field::new("type", rtype),
                    ],
                );
                return Ok(records);
            }
            Err(err) => {
                logger.debug(
                    "resolver failed, trying next",
                    &[
                        Field::new("resolver", resolver.name()),
                        Field::new("type", rtype),
                        Field::new("error", &err),
                    ],
                );
                last_err = Some(err);
            }
        }
    }
    Err(last_err.unwrap_or(Error::NoResolvers))
}

async fn consensus(
    host: &str,
    rtype: RecordType,
    resolvers: &[Arc<dyn DnsResolver>],
    logger: &dyn Logger,
    min_agreement: usize,
    ignore_ttl: bool,
) -> Result<Vec<Record>, Error> {
    let required = if min_agreement == 0 {
        resolvers.len() / 2 + 1
    } else {
        min_agreement
    };

    // Group successful responses by multiset equality; each group keeps the
    // first response it saw as its representative. Errors are skipped, which
    // means they eat into the quorum.
    let mut groups: Vec<(Vec<Record>, usize)> = Vec::new();
    for resolver in resolvers {
        let Ok(records) = resolver.resolve_type(host, rtype).await else {
            continue;
        };
        match groups
            .iter_mut()
            .find(|(representative, _)| records_equal(representative, &records, ignore_ttl))
        {
            Some((_, count)) => *count += 1,
            None => groups.push((records, 1)),
        }
    }

    for (records, count) in groups {
        if count >= required {
            logger.debug(
                "consensus reached",
                &[
                    Field::new("agreements", count),
                    Field::new("required", required),
                    Field::new("type", rtype),
                ],
            );
            return Ok(records);
        }
    }

    Err(Error::ConsensusNotReached { required })
}

async fn compare(
    host: &str,
    rtype: RecordType,
    resolvers: &[Arc<dyn DnsResolver>],
    logger: &dyn Logger,
    on_discrepancy: Option<&DiscrepancyHandler>,
    ignore_ttl: bool,
) -> Result<Vec<Record>, Error> {
    // Sequential on purpose: the callback wants the full per-resolver
    // transcript, and "first" must mean first in configured order.
    let mut results: HashMap<String, Vec<Record>> = HashMap::new();
    let mut first: Option<Vec<Record>> = None;
    let mut all_match = true;

    for resolver in resolvers {
        if let Ok(records) = resolver.resolve_type(host, rtype).await {
            match &first {
                Some(baseline) => {
                    if !records_equal(baseline, &records, ignore_ttl) {
                        all_match = false;
                    }
                }
                None => first = Some(records.clone()),
            }
            results.insert(resolver.name().to_string(), records);
        }
    }

    if !all_match {
        logger.info(
            "discrepancy detected in record type query",
            &[Field::new("host", host), Field::new("type", rtype)],
        );
        if let Some(handler) = on_discrepancy {
            handler(host, rtype, &results);
        }
    }

    // Divergence is reported, never fatal. Callers that need to block on
    // agreement use Consensus instead.
    Ok(first.unwrap_or_default())
}

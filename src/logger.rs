//! Structured logging sink used throughout the resolution pipeline.
//!
//! The dialer never logs through a global facade directly; everything goes
//! through the [`Logger`] trait so embedders can route events wherever they
//! want. [`NoopLogger`] (the default) discards everything, [`LogBridge`]
//! forwards to the `log` crate macros.

use std::fmt;

/// A structured key-value pair attached to a log event.
///
/// Keys are stable identifiers (`resolver`, `latency`, `type`, `host`,
/// `ips`, `error`, `agreements`, `required`, `ip`); values are rendered to
/// strings at the call site.
#[derive(Debug, Clone)]
pub struct Field {
    key: &'static str,
    value: String,
}

impl Field {
    pub fn new(key: &'static str, value: impl fmt::Display) -> Self {
        Self {
            key,
            value: value.to_string(),
        }
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

/// Structured logging interface.
pub trait Logger: Send + Sync {
    fn debug(&self, msg: &str, fields: &[Field]);
    fn info(&self, msg: &str, fields: &[Field]);
    fn error(&self, msg: &str, err: &dyn std::error::Error, fields: &[Field]);
}

/// The default logger: silently discards all events.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopLogger;

impl Logger for NoopLogger {
    fn debug(&self, _msg: &str, _fields: &[Field]) {}
    fn info(&self, _msg: &str, _fields: &[Field]) {}
    fn error(&self, _msg: &str, _err: &dyn std::error::Error, _fields: &[Field]) {}
}

/// Forwards events to the `log` crate macros, rendering fields as
/// space-separated `key=value` pairs after the message.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogBridge;

fn render(msg: &str, fields: &[Field]) -> String {
    if fields.is_empty() {
        return msg.to_string();
    }
    let mut out = String::with_capacity(msg.len() + fields.len() * 16);
    out.push_str(msg);
    for field in fields {
        out.push(' ');
        out.push_str(field.key);
        out.push('=');
        out.push_str(&field.value);
    }
    out
}

impl Logger for LogBridge {
    fn debug(&self, msg: &str, fields: &[Field]) {
        log::debug!("{}", render(msg, fields));
    }

    fn info(&self, msg: &str, fields: &[Field]) {
        log::info!("{}", render(msg, fields));
    }

    fn error(&self, msg: &str, err: &dyn std::error::Error, fields: &[Field]) {
        log::error!("{}: {}", render(msg, fields), err);
    }
}

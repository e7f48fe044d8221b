//! Addresses of well-known public DNS resolvers.
//!
//! Most providers publish multiple addresses for redundancy; the slices
//! can be passed straight to [`crate::DialerBuilder::resolvers`], alone or
//! combined:
//!
//! ```no_run
//! use dnsdial::{Dialer, catalog};
//!
//! let dialer = Dialer::builder()
//!     .resolvers(catalog::GOOGLE_V4.iter().chain(catalog::CLOUDFLARE_V4))
//!     .build();
//! ```

/// Google Public DNS.
pub const GOOGLE_V4: &[&str] = &["8.8.8.8:53", "8.8.4.4:53"];
pub const GOOGLE_V6: &[&str] = &["[2001:4860:4860::8888]:53", "[2001:4860:4860::8844]:53"];

/// Cloudflare Public DNS.
pub const CLOUDFLARE_V4: &[&str] = &["1.1.1.1:53", "1.0.0.1:53"];
pub const CLOUDFLARE_V6: &[&str] = &["[2606:4700:4700::1111]:53", "[2606:4700:4700::1001]:53"];

/// Quad9 Public DNS.
pub const QUAD9_V4: &[&str] = &["9.9.9.9:53", "149.112.112.112:53"];
pub const QUAD9_V6: &[&str] = &["[2620:fe::fe]:53", "[2620:fe::9]:53"];

/// OpenDNS (Cisco).
pub const OPENDNS_V4: &[&str] = &["208.67.222.222:53", "208.67.220.220:53"];
pub const OPENDNS_V6: &[&str] = &["[2620:119:35::35]:53", "[2620:119:53::53]:53"];

/// Level 3 / CenturyLink.
pub const LEVEL3_V4: &[&str] = &["4.2.2.1:53", "4.2.2.2:53"];

/// Comodo Secure DNS.
pub const COMODO_V4: &[&str] = &["8.26.56.26:53", "8.20.247.20:53"];

/// Verisign Public DNS.
pub const VERISIGN_V4: &[&str] = &["64.6.64.6:53", "64.6.65.6:53"];

/// Dyn / Oracle Public DNS.
pub const DYN_V4: &[&str] = &["216.146.35.35:53", "216.146.36.36:53"];

/// Alibaba Public DNS.
pub const ALIDNS_V4: &[&str] = &["223.5.5.5:53", "223.6.6.6:53"];

/// NTT Public DNS.
pub const NTT_V4: &[&str] = &["129.250.35.250:53", "129.250.35.251:53"];
pub const NTT_V6: &[&str] = &["[2001:418:3ff::53]:53", "[2001:418:3ff::1:53]:53"];

/// CleanBrowsing family-safe DNS.
pub const CLEANBROWSING_V4: &[&str] = &["185.228.168.10:53", "185.228.169.11:53"];
pub const CLEANBROWSING_V6: &[&str] = &["[2a0d:2a00:1::1]:53", "[2a0d:2a00:2::1]:53"];

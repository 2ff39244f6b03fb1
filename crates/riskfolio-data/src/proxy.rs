//! Broad-market proxy indices used to back-fill short histories.
//!
//! Which proxy an instrument may borrow from is decided by its ticker suffix,
//! and suffixes differ between data sources. [`ProxyConfig::stooq`] maps
//! `.US` to the US index and unsuffixed or `.PL` tickers to the domestic
//! index; [`ProxyConfig::yahoo`] maps `.WA` to the domestic index and
//! unsuffixed tickers to the US index. Other markets and indices themselves
//! are never patched.

use crate::provider::ReturnsProvider;
use crate::series::ReturnSeries;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;
use tracing::{debug, warn};

/// Market whose broad index can stand in for an instrument's missing history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProxyKind {
    /// Home market index
    Domestic,
    /// US market index
    Us,
}

impl fmt::Display for ProxyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Domestic => write!(f, "domestic"),
            Self::Us => write!(f, "US"),
        }
    }
}

/// Proxy tickers and the suffix rules that select them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Domestic index ticker (default: `WIG20`)
    pub domestic: String,
    /// US index ticker (default: `^SPX`)
    pub us: String,
    /// Ticker suffixes of domestic listings, without the dot
    pub domestic_suffixes: Vec<String>,
    /// Ticker suffixes of US listings, without the dot
    pub us_suffixes: Vec<String>,
    /// Market of tickers without a suffix
    pub unsuffixed: Option<ProxyKind>,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self::stooq()
    }
}

impl ProxyConfig {
    /// stooq.pl conventions: `CDR.PL`, `AAPL.US`, proxies `WIG20` and `^SPX`.
    pub fn stooq() -> Self {
        Self {
            domestic: "WIG20".to_string(),
            us: "^SPX".to_string(),
            domestic_suffixes: vec!["PL".to_string()],
            us_suffixes: vec!["US".to_string()],
            unsuffixed: Some(ProxyKind::Domestic),
        }
    }

    /// Yahoo Finance conventions: `CDR.WA`, `AAPL`, proxies `WIG20.WA` and `^GSPC`.
    pub fn yahoo() -> Self {
        Self {
            domestic: "WIG20.WA".to_string(),
            us: "^GSPC".to_string(),
            domestic_suffixes: vec!["WA".to_string()],
            us_suffixes: Vec::new(),
            unsuffixed: Some(ProxyKind::Us),
        }
    }

    /// Ticker configured for `kind`.
    pub fn symbol(&self, kind: ProxyKind) -> &str {
        match kind {
            ProxyKind::Domestic => &self.domestic,
            ProxyKind::Us => &self.us,
        }
    }

    /// Proxy eligible for `symbol`, if any.
    ///
    /// Suffixes match case-insensitively. Index tickers (`^` prefix) and the
    /// proxy tickers themselves are never eligible.
    pub fn kind_for(&self, symbol: &str) -> Option<ProxyKind> {
        let symbol = symbol.trim();
        if symbol.is_empty()
            || symbol.starts_with('^')
            || symbol.eq_ignore_ascii_case(&self.domestic)
            || symbol.eq_ignore_ascii_case(&self.us)
        {
            return None;
        }

        let Some((_, suffix)) = symbol.rsplit_once('.') else {
            return self.unsuffixed;
        };
        let listed = |suffixes: &[String]| suffixes.iter().any(|s| s.eq_ignore_ascii_case(suffix));
        if listed(self.domestic_suffixes.as_slice()) {
            Some(ProxyKind::Domestic)
        } else if listed(self.us_suffixes.as_slice()) {
            Some(ProxyKind::Us)
        } else {
            None
        }
    }
}

/// Request-scoped cache of proxy series.
///
/// Each proxy kind is fetched at most once for the lifetime of the cache,
/// whether the fetch succeeds or not. A failed fetch is logged and
/// remembered as unavailable.
pub struct ProxyCache<'a, P: ?Sized> {
    provider: &'a P,
    config: &'a ProxyConfig,
    years: u32,
    entries: HashMap<ProxyKind, Option<ReturnSeries>>,
}

impl<P: ?Sized> fmt::Debug for ProxyCache<'_, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyCache")
            .field("config", self.config)
            .field("years", &self.years)
            .field("cached", &self.entries.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl<'a, P: ReturnsProvider + ?Sized> ProxyCache<'a, P> {
    /// Create an empty cache fetching `years` of proxy history from `provider`.
    pub fn new(provider: &'a P, config: &'a ProxyConfig, years: u32) -> Self {
        Self {
            provider,
            config,
            years,
            entries: HashMap::new(),
        }
    }

    /// Proxy eligible for `symbol` under the cache's configuration.
    pub fn kind_for(&self, symbol: &str) -> Option<ProxyKind> {
        self.config.kind_for(symbol)
    }

    /// Ticker configured for `kind`.
    pub fn symbol(&self, kind: ProxyKind) -> &'a str {
        let config: &'a ProxyConfig = self.config;
        config.symbol(kind)
    }

    /// Proxy series for `kind`, fetching it on first use.
    pub async fn get(&mut self, kind: ProxyKind) -> Option<&ReturnSeries> {
        let symbol = self.symbol(kind);
        match self.entries.entry(kind) {
            Entry::Occupied(entry) => entry.into_mut().as_ref(),
            Entry::Vacant(entry) => {
                debug!(%kind, symbol, years = self.years, "fetching proxy series");
                let fetched = match self.provider.fetch_returns(symbol, self.years).await {
                    Ok(series) => Some(series),
                    Err(err) => {
                        warn!(%kind, symbol, error = %err, "proxy series unavailable");
                        None
                    }
                };
                entry.insert(fetched).as_ref()
            }
        }
    }
}

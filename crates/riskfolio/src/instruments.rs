//! Instrument reference table.
//!
//! Maps human-readable instrument names to the tickers the data providers
//! understand. Tables are loaded from `name;symbol` text files, one
//! instrument per line, with a small built-in list as fallback.

use riskfolio_data::DataError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

/// One listed instrument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instrument {
    /// Display name.
    pub name: String,
    /// Ticker as used by the providers.
    pub symbol: String,
}

impl Instrument {
    /// Create a new instrument.
    pub fn new(name: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
        }
    }

    fn matches(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle) || self.symbol.to_lowercase().contains(needle)
    }
}

/// Searchable list of instruments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstrumentTable {
    instruments: Vec<Instrument>,
}

impl Default for InstrumentTable {
    fn default() -> Self {
        Self::new(Self::default_instruments())
    }
}

impl InstrumentTable {
    /// Create a table from a list of instruments.
    pub const fn new(instruments: Vec<Instrument>) -> Self {
        Self { instruments }
    }

    /// Parse `name;symbol` lines.
    ///
    /// Blank lines and lines with fewer than two fields are skipped; fields
    /// beyond the second are ignored.
    pub fn parse(contents: &str) -> Self {
        let instruments = contents
            .lines()
            .filter_map(|line| {
                let mut fields = line.split(';').map(str::trim);
                let name = fields.next().filter(|s| !s.is_empty())?;
                let symbol = fields.next().filter(|s| !s.is_empty())?;
                Some(Instrument::new(name, symbol))
            })
            .collect();
        Self::new(instruments)
    }

    /// Load a table from a `name;symbol` file.
    ///
    /// # Errors
    /// Returns [`DataError::Io`] when the file cannot be read and
    /// [`DataError::Parse`] when it lists no instruments.
    pub fn load(path: &Path) -> Result<Self, DataError> {
        let contents = std::fs::read_to_string(path)?;
        let table = Self::parse(&contents);
        if table.is_empty() {
            return Err(DataError::Parse(format!(
                "no instruments listed in {}",
                path.display()
            )));
        }
        info!(path = %path.display(), instruments = table.len(), "loaded instrument table");
        Ok(table)
    }

    /// Load a table, falling back to the built-in list on failure.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_else(|err| {
            warn!(path = %path.display(), error = %err, "using built-in instrument list");
            Self::default()
        })
    }

    /// All instruments.
    pub fn instruments(&self) -> &[Instrument] {
        &self.instruments
    }

    /// Number of instruments.
    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }

    /// Case-insensitive substring search over names and symbols.
    ///
    /// An empty or blank query returns every instrument.
    pub fn search(&self, query: &str) -> Vec<&Instrument> {
        let needle = query.trim().to_lowercase();
        self.instruments
            .iter()
            .filter(|i| needle.is_empty() || i.matches(&needle))
            .collect()
    }

    /// Resolve a name or ticker to one instrument.
    ///
    /// An exact ticker match (ignoring case) wins; otherwise the query must
    /// match exactly one instrument by substring.
    pub fn resolve(&self, query: &str) -> Option<&Instrument> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }
        if let Some(exact) = self
            .instruments
            .iter()
            .find(|i| i.symbol.eq_ignore_ascii_case(query))
        {
            return Some(exact);
        }
        match self.search(query).as_slice() {
            [only] => Some(*only),
            _ => None,
        }
    }

    /// Built-in instruments used when no table file is available.
    fn default_instruments() -> Vec<Instrument> {
        vec![
            // Warsaw
            Instrument::new("CD Projekt", "CDR.PL"),
            Instrument::new("PKO Bank Polski", "PKO.PL"),
            Instrument::new("Orlen", "PKN.PL"),
            Instrument::new("KGHM Polska Miedz", "KGH.PL"),
            Instrument::new("PZU", "PZU.PL"),
            Instrument::new("Allegro", "ALE.PL"),
            Instrument::new("Dino Polska", "DNP.PL"),
            Instrument::new("LPP", "LPP.PL"),
            // US
            Instrument::new("Apple", "AAPL.US"),
            Instrument::new("Microsoft", "MSFT.US"),
            Instrument::new("NVIDIA", "NVDA.US"),
            Instrument::new("Amazon", "AMZN.US"),
            Instrument::new("Alphabet", "GOOGL.US"),
            Instrument::new("Tesla", "TSLA.US"),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_default_table() {
        let table = InstrumentTable::default();
        assert!(table.len() >= 10);
        assert!(table.resolve("AAPL.US").is_some());
        assert!(table.resolve("CDR.PL").is_some());
    }

    #[test]
    fn test_parse_skips_malformed_lines() {
        let table = InstrumentTable::parse(
            "Apple;AAPL.US\n\
             \n\
             just a name\n\
             ;MISSING.NAME\n\
             CD Projekt ; CDR.PL ; extra\n",
        );

        assert_eq!(
            table.instruments(),
            &[
                Instrument::new("Apple", "AAPL.US"),
                Instrument::new("CD Projekt", "CDR.PL"),
            ]
        );
    }

    #[rstest]
    #[case("", 14)]
    #[case("   ", 14)]
    #[case("pl", 9)]
    #[case("APPLE", 1)]
    #[case("zzz", 0)]
    fn test_search(#[case] query: &str, #[case] expected: usize) {
        assert_eq!(InstrumentTable::default().search(query).len(), expected);
    }

    #[test]
    fn test_resolve_prefers_exact_symbol() {
        let table = InstrumentTable::new(vec![
            Instrument::new("PKO Bank Polski", "PKO.PL"),
            Instrument::new("PKO Ubezpieczenia", "PKOU.PL"),
        ]);

        assert_eq!(table.resolve("pko.pl").unwrap().symbol, "PKO.PL");
        // "pko" matches both by substring.
        assert!(table.resolve("pko").is_none());
        assert_eq!(table.resolve("ubezp").unwrap().symbol, "PKOU.PL");
        assert!(table.resolve("").is_none());
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join("riskfolio_instruments_test.txt");
        std::fs::write(&path, "Tesla;TSLA.US\nLPP;LPP.PL\n").unwrap();

        let table = InstrumentTable::load(&path).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.resolve("tesla").unwrap().symbol, "TSLA.US");

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_failures_fall_back() {
        let missing = std::env::temp_dir().join("riskfolio_instruments_missing.txt");
        assert!(matches!(InstrumentTable::load(&missing), Err(DataError::Io(_))));
        assert_eq!(
            InstrumentTable::load_or_default(&missing),
            InstrumentTable::default()
        );

        let empty = std::env::temp_dir().join("riskfolio_instruments_empty.txt");
        std::fs::write(&empty, "\n\n").unwrap();
        assert!(matches!(InstrumentTable::load(&empty), Err(DataError::Parse(_))));
        std::fs::remove_file(empty).ok();
    }
}

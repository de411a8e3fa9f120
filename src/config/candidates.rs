//! Candidate endpoint table.
//!
//! Maps a chain ID to the ordered list of endpoint URLs that may serve it.
//! Built once from configuration and read-only afterwards.

use std::collections::{BTreeMap, HashMap};

use url::Url;

use crate::blockchain::types::ChainId;
use crate::config::validation::ValidationError;

/// Validated, read-only candidate table.
#[derive(Debug, Clone, Default)]
pub struct CandidateTable {
    chains: HashMap<ChainId, Vec<Url>>,
}

impl CandidateTable {
    /// Parse the raw string-keyed table from configuration.
    ///
    /// Every bad key, empty list and unparseable URL is reported.
    pub fn parse(raw: &BTreeMap<String, Vec<String>>) -> Result<Self, Vec<ValidationError>> {
        let mut chains = HashMap::new();
        let mut errors = Vec::new();

        for (key, urls) in raw {
            let chain_id = match key.trim().parse::<u64>() {
                Ok(id) => id,
                Err(_) => {
                    errors.push(ValidationError::InvalidChainKey(key.clone()));
                    continue;
                }
            };

            if urls.is_empty() {
                errors.push(ValidationError::EmptyCandidates(chain_id));
                continue;
            }

            let mut parsed = Vec::with_capacity(urls.len());
            for url in urls {
                match parse_endpoint_url(url) {
                    Ok(u) => parsed.push(u),
                    Err(reason) => errors.push(ValidationError::InvalidUrl {
                        chain_id,
                        url: url.clone(),
                        reason,
                    }),
                }
            }
            chains.insert(ChainId(chain_id), parsed);
        }

        if errors.is_empty() {
            Ok(Self { chains })
        } else {
            Err(errors)
        }
    }

    /// Build a table directly from parsed URLs.
    pub fn from_urls(entries: impl IntoIterator<Item = (ChainId, Vec<Url>)>) -> Self {
        Self {
            chains: entries.into_iter().collect(),
        }
    }

    /// Candidates for a chain, in configured order.
    pub fn urls_for(&self, chain_id: ChainId) -> Option<&[Url]> {
        self.chains.get(&chain_id).map(Vec::as_slice)
    }

    pub fn contains(&self, chain_id: ChainId) -> bool {
        self.chains.contains_key(&chain_id)
    }
}

fn parse_endpoint_url(raw: &str) -> Result<Url, String> {
    let url = Url::parse(raw.trim()).map_err(|e| e.to_string())?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(format!("unsupported scheme '{}'", other)),
    }
}

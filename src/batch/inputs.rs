//! Wallet and proxy list loading.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::ledger::proxy::ProxyDescriptor;

/// Lines this short are treated as blank or junk.
const MIN_LINE_LEN: usize = 10;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{keys} private keys but only {proxies} proxies")]
    MissingProxies { keys: usize, proxies: usize },
}

/// A private key paired with its proxy, in file order.
#[derive(Clone)]
pub struct AccountEntry {
    /// 1-based position in the wallets file.
    pub index: usize,
    pub private_key: String,
    pub proxy: String,
}

impl std::fmt::Debug for AccountEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountEntry")
            .field("index", &self.index)
            .field("proxy", &ProxyDescriptor::parse(&self.proxy).map(|p| p.redacted()).ok())
            .finish_non_exhaustive()
    }
}

/// Trimmed lines longer than the junk threshold.
pub fn parse_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| line.chars().count() > MIN_LINE_LEN)
        .map(str::to_string)
        .collect()
}

pub fn read_lines(path: &Path) -> Result<Vec<String>, InputError> {
    let content = fs::read_to_string(path).map_err(|source| InputError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_lines(&content))
}

/// Pair keys with proxies by position. Extra proxies are ignored.
pub fn pair_accounts(
    keys: Vec<String>,
    proxies: Vec<String>,
) -> Result<Vec<AccountEntry>, InputError> {
    if proxies.len() < keys.len() {
        return Err(InputError::MissingProxies {
            keys: keys.len(),
            proxies: proxies.len(),
        });
    }

    Ok(keys
        .into_iter()
        .zip(proxies)
        .enumerate()
        .map(|(i, (private_key, proxy))| AccountEntry {
            index: i + 1,
            private_key,
            proxy,
        })
        .collect())
}

/// Read both files and pair them.
pub fn load_accounts(
    wallets_path: &Path,
    proxies_path: &Path,
) -> Result<Vec<AccountEntry>, InputError> {
    let keys = read_lines(wallets_path)?;
    let proxies = read_lines(proxies_path)?;
    pair_accounts(keys, proxies)
}

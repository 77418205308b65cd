use anyhow::{Context, Result, bail};
use bancoposta_ingest::ReaderOptions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::ofx::Account;
use crate::state::ensure_bancoposta_home;

/// `~/.bancoposta/config.toml`. Every key is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// OFX ACCTID
    pub account: String,
    /// OFX BANKID
    pub bank: String,
    pub currency: String,
    /// chrono format of the Data/Valuta columns
    pub date_format: String,
    /// CSV field delimiter, a single ASCII character
    pub delimiter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            account: "BancoPosta".to_string(),
            bank: "BancoPosta".to_string(),
            currency: "EUR".to_string(),
            date_format: "%d/%m/%y".to_string(),
            delimiter: ",".to_string(),
        }
    }
}

impl Config {
    /// Apply command-line overrides on top of the file values
    pub fn with_overrides(
        mut self,
        account: Option<String>,
        currency: Option<String>,
        date_format: Option<String>,
    ) -> Self {
        if let Some(account) = account {
            self.account = account;
        }
        if let Some(currency) = currency {
            self.currency = currency;
        }
        if let Some(date_format) = date_format {
            self.date_format = date_format;
        }
        self
    }

    pub fn reader_options(&self) -> Result<ReaderOptions> {
        let delimiter = match self.delimiter.as_bytes() {
            [b] if b.is_ascii() => *b,
            _ => bail!(
                "delimiter must be a single ASCII character, got {:?}",
                self.delimiter
            ),
        };
        Ok(ReaderOptions {
            delimiter,
            date_format: self.date_format.clone(),
            currency: self.currency.clone(),
        })
    }

    pub fn account(&self) -> Account {
        Account {
            bank_id: self.bank.clone(),
            account_id: self.account.clone(),
            currency: self.currency.clone(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_bancoposta_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    load_config_from(&config_path()?)
}

pub fn load_config_from(p: &Path) -> Result<Config> {
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn save_config_to(p: &Path, cfg: &Config) -> Result<()> {
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config_to(&p, &Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}

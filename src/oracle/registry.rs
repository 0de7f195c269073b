//! Quote source registry
//!
//! Maps each currency to the ordered list of sources quoted for it. The
//! declaration order is the order of every response array.

use anyhow::{bail, Context, Result};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::error::{QuoteError, QuoteResult};
use crate::oracle::sources::{ProviderKind, QuoteProvider, SimulationSettings};
use crate::types::Currency;

/// Name and display key of a source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDescriptor {
    /// Selects the provider implementation
    pub name: String,
    /// Opaque key used as the `source` of every quote (historically a URL)
    pub identifier: String,
}

impl SourceDescriptor {
    pub fn new(name: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            identifier: identifier.into(),
        }
    }
}

/// A descriptor with its provider already resolved
#[derive(Clone)]
pub struct RegisteredSource {
    pub descriptor: SourceDescriptor,
    pub provider: Arc<dyn QuoteProvider>,
}

impl fmt::Debug for RegisteredSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredSource")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

/// Immutable currency -> sources table
#[derive(Debug, Clone, Default)]
pub struct SourceRegistry {
    sources: HashMap<Currency, Vec<RegisteredSource>>,
}

const BUILTIN_SOURCES: &[(&str, &str, &str)] = &[
    ("ARS", "ambito", "https://www.ambito.com/contenidos/dolar.html"),
    ("ARS", "dolarhoy", "https://www.dolarhoy.com"),
    (
        "ARS",
        "cronista",
        "https://www.cronista.com/MercadosOnline/moneda.html?id=ARSB",
    ),
    ("BRL", "wise", "https://wise.com/es/currency-converter/brl-to-usd-rate"),
    ("BRL", "nubank", "https://nubank.com.br/taxas-conversao/"),
    ("BRL", "nomad", "https://www.nomadglobal.com"),
];

impl SourceRegistry {
    pub fn builder() -> SourceRegistryBuilder {
        SourceRegistryBuilder::default()
    }

    /// Default table: three exchange houses each for ARS and BRL
    pub fn builtin(settings: &SimulationSettings) -> Self {
        let mut builder = Self::builder();
        for (currency, name, identifier) in BUILTIN_SOURCES {
            let kind = match ProviderKind::from_name(name, None, None) {
                Ok(kind) => kind,
                Err(_) => continue,
            };
            builder = builder.register(
                Currency::new(*currency),
                SourceDescriptor::new(*name, *identifier),
                kind.build(settings),
            );
        }
        builder.build()
    }

    /// Build from the `[[sources]]` section, falling back to the built-in table
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let settings = config.providers.simulation();
        if config.sources.is_empty() {
            return Ok(Self::builtin(&settings));
        }

        let mut builder = Self::builder();
        for (index, source) in config.sources.iter().enumerate() {
            if source.currency.trim().is_empty() {
                bail!("sources[{}] has an empty currency", index);
            }
            let kind = ProviderKind::from_name(&source.name, source.buy_price, source.sell_price)
                .with_context(|| format!("Invalid source at sources[{}]", index))?;
            builder = builder.register(
                Currency::new(source.currency.as_str()),
                SourceDescriptor::new(source.name.as_str(), source.identifier.as_str()),
                kind.build(&settings),
            );
        }
        Ok(builder.build())
    }

    /// Ordered sources for a currency
    pub fn providers_for(&self, currency: &Currency) -> QuoteResult<&[RegisteredSource]> {
        match self.sources.get(currency) {
            Some(sources) if !sources.is_empty() => Ok(sources.as_slice()),
            _ => Err(QuoteError::UnsupportedCurrency(currency.clone())),
        }
    }

    pub fn supports(&self, currency: &Currency) -> bool {
        self.providers_for(currency).is_ok()
    }

    /// Registered currencies, sorted
    pub fn currencies(&self) -> Vec<Currency> {
        let mut currencies: Vec<Currency> = self.sources.keys().cloned().collect();
        currencies.sort();
        currencies
    }
}

#[derive(Default)]
pub struct SourceRegistryBuilder {
    sources: HashMap<Currency, Vec<RegisteredSource>>,
}

impl SourceRegistryBuilder {
    /// Append a source; order of calls is preserved per currency
    pub fn register(
        mut self,
        currency: Currency,
        descriptor: SourceDescriptor,
        provider: Arc<dyn QuoteProvider>,
    ) -> Self {
        self.sources
            .entry(currency)
            .or_default()
            .push(RegisteredSource {
                descriptor,
                provider,
            });
        self
    }

    pub fn build(self) -> SourceRegistry {
        SourceRegistry {
            sources: self.sources,
        }
    }
}

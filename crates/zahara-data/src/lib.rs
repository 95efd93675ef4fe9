//! Market data retrieval and synthetic data generation for zahara.
//!
//! Two ways to obtain a price universe:
//! - [`StooqClient`]: daily closes downloaded from Stooq as CSV, with
//!   bounded retries per symbol and skip-on-failure universe fetching
//! - [`generate_universe`]: a seeded one-factor simulator for controlled
//!   experiments and tests
//!
//! Every price series carries its [`zahara_traits::Provenance`]; a
//! universe containing any synthetic series produces a synthetic returns
//! table, so simulated results can never masquerade as live ones.
//!
//! # Usage
//!
//! ```rust,ignore
//! use zahara_data::{StooqClient, to_returns_table};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = StooqClient::from_defaults()?;
//!     let symbols = vec!["aapl.us".to_string(), "msft.us".to_string()];
//!     let universe = client.fetch_universe(&symbols, start, end).await?;
//!     let returns = to_returns_table(&universe)?;
//!     Ok(())
//! }
//! ```

mod error;
mod stooq;
mod synthetic;
mod types;

pub use error::{DataError, Result};
pub use stooq::{StooqClient, StooqConfig};
pub use synthetic::{SyntheticConfig, generate_universe};
pub use types::{PricePoint, PriceSeries, to_returns_table};

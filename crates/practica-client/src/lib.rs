//! practica-client - HTTP item bank client for practica.
//!
//! # Example
//!
//! ```ignore
//! use practica_client::ItemBankFactory;
//!
//! let bank = ItemBankFactory::remote("http://localhost:8000/api")?;
//!
//! // Falls back to the offline sample item if the service is down
//! let item = bank.next_item(Some("6.8B")).await?;
//! ```

mod factory;
mod remote;

pub use factory::ItemBankFactory;
pub use remote::RemoteItemBank;

pub mod airtable_client;

pub use airtable_client::AirtableClient;

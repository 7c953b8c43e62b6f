//! Braze web destination: forwards completed orders to the in-app SDK.

pub mod client;
pub mod track_purchase;

pub use client::{BrazeClient, BrazeSettings};
pub use track_purchase::TrackPurchase;

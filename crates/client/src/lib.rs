//! MediCart client library.
//!
//! Cart, login session, catalog and chat assistant for the MediCart
//! pharmacy, backed by a local key-value store and the MediCart REST API.
//! Front-ends (such as the `medicart` CLI) own a [`MediCart`] and render the
//! view models in [`view`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod assistant;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod error;
pub mod state;
pub mod store;
pub mod view;

#[cfg(test)]
#[allow(clippy::expect_used)]
mod testing;

pub use error::{ClientError, Result};
pub use state::MediCart;

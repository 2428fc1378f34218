//! Scripts for deploying the marketplace, WETH and NFT contracts.

#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

pub mod accounts;
pub mod artifacts;
pub mod cli;
pub mod commands;
pub mod config;
pub mod constants;
pub mod deployer;
pub mod errors;
pub mod publish;
pub mod types;
pub mod utils;

#[cfg(test)]
mod test_helpers;

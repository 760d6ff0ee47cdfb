//! Eth Fee Oracle Server - polls `eth_feeHistory` and serves EIP-1559 fee
//! recommendations over HTTP

pub mod api;
pub mod cli;
pub mod config;
pub mod output;
pub mod rpc;
pub mod server;
pub mod service;

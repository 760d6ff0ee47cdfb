//! Ethereum JSON-RPC client module for fetching fee history

mod mock_client;
mod rpc_client;
mod traits;

pub use mock_client::MockFeeHistoryClient;
pub use rpc_client::{EthRpcClient, EthRpcConfig, RpcError};
pub use traits::{FeeHistoryClient, FeeHistorySource};

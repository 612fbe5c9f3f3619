mod node_error;
mod rpc_error;

pub use node_error::{NodeError, NodeErrorKind};
pub use rpc_error::{ErrorCode, RpcError};

mod audit;
mod gateway;
mod notify;
mod signer;
mod store;

pub use audit::*;
pub use gateway::*;
pub use notify::*;
pub use signer::*;
pub use store::*;

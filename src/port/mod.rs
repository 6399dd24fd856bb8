mod audit;
mod notify;
mod repository;
mod signer;

pub use audit::*;
pub use notify::*;
pub use repository::*;
pub use signer::*;

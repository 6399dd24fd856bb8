mod boot;
mod driver;
pub mod mock;
mod review;
mod submission;

pub use boot::*;
pub use driver::*;
pub use review::*;
pub use submission::*;

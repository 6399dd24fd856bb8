mod error;
mod record;
mod request;
mod transition;

pub use error::*;
pub use record::*;
pub use request::*;
pub use transition::*;

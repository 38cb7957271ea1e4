mod command;
mod error;
mod handler;
mod identity;
mod message;
mod peer;
mod record;
mod registry;
mod store;

pub use command::*;
pub use error::*;
pub use handler::*;
pub use identity::*;
pub use message::*;
pub use peer::*;
pub use record::*;
pub use registry::*;
pub use store::*;

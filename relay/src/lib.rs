pub mod protocol;
pub mod session;
pub mod transport;

pub use protocol::{RelayMessage, Role};
pub use session::{RelayFault, RelaySession};

pub mod audit;
pub mod board;
pub mod device;
pub mod member;
pub mod ticket;

pub use audit::*;
pub use board::*;
pub use device::*;
pub use member::*;
pub use ticket::*;

pub mod stream;

pub use stream::{ConnectionManager, StreamError};

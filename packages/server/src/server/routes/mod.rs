// HTTP routes
pub mod extract;
pub mod health;
pub mod proxy;
pub mod upload;

pub use extract::*;
pub use health::*;
pub use proxy::*;
pub use upload::*;

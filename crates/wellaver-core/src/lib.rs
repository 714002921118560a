pub mod animation;
pub mod asset;
pub mod bounds;
pub mod config;
pub mod constants;
pub mod environment;
pub mod error;
pub mod fallback;
pub mod framing;
pub mod orbit;
pub mod resources;
pub mod rotation;
pub mod session;
pub mod state;

pub use animation::*;
pub use asset::*;
pub use bounds::*;
pub use config::*;
pub use environment::*;
pub use error::ViewerError;
pub use fallback::*;
pub use framing::*;
pub use orbit::*;
pub use resources::*;
pub use rotation::*;
pub use session::*;
pub use state::*;

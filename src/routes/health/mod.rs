mod handler;

pub use handler::{health, health_detailed};

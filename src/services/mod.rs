pub mod sensor_service;
pub mod user_service;

#[cfg(test)]
pub mod memory;

pub use sensor_service::{MongoSensorStore, SensorStore};
pub use user_service::{MongoUserStore, UserStore};

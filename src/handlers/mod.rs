pub mod health;
pub mod sns;

pub use health::health_check;
pub use sns::sns_notification;

pub mod sns;

pub use sns::SnsMessage;

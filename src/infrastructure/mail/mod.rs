pub mod relay;
pub mod smtp;

pub mod crop;
pub mod farmer;
pub mod user;

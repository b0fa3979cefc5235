pub mod prelude;

pub mod crops;
pub mod farmers;
pub mod users;

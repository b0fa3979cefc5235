pub use super::crops::Entity as Crops;
pub use super::farmers::Entity as Farmers;
pub use super::users::Entity as Users;

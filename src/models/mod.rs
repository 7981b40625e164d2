pub mod address;
pub mod alarm;
pub mod enums;
pub mod lookup;
pub mod patient;
pub mod person;
pub mod resource;
pub mod terminal;
pub mod user;

pub use address::*;
pub use alarm::*;
pub use enums::*;
pub use lookup::*;
pub use patient::*;
pub use person::*;
pub use resource::*;
pub use terminal::*;
pub use user::*;

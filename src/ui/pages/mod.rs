pub mod house_data;
pub mod input;

pub use house_data::HouseDataPage;
pub use input::InputPage;

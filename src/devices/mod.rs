pub mod traits;
pub mod meter;
pub mod reading;
pub mod reader;

pub use traits::Device;
pub use meter::MeterDevice;
pub use reading::{ReadOutcome, Reading};
pub use reader::read_profile;

pub mod alert;
pub mod reading;

pub use alert::{Alert, AlertType};
pub use reading::Reading;

mod params;
mod session_status;

pub use params::TwapParams;
pub use session_status::SessionStatus;

//! OTP login: issuance, verification, session introspection, logout.

mod otp;
pub mod request_otp;
pub mod session;
mod state;
mod storage;
mod tokens;
mod types;
mod utils;
pub mod verify_otp;


pub use request_otp::request_otp;
pub use session::{logout, me};
pub use state::{AuthConfig, AuthState};
pub use storage::ensure_schema;
pub use types::{
    ErrorResponse, LogoutResponse, MeResponse, MessageResponse, RequestOtpRequest, UserProfile,
    VerifyOtpRequest, VerifyOtpResponse,
};
pub use verify_otp::verify_otp;

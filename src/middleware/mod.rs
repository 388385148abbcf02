mod logging;

pub use logging::{log_request, REQUEST_ID_HEADER};

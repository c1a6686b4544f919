mod record;
mod repository;

pub use record::{classify, CheckInLog, CheckInOutcome, SUCCESS_MARKERS};
pub use repository::CheckInLogRepository;

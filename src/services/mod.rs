pub mod auth;
pub mod pricing;
pub mod salary;
pub mod work_record;

pub use auth::{Claims, UserRole};
pub use salary::SalaryService;
pub use work_record::WorkRecordService;

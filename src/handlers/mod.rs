pub mod reports;
pub mod salaries;
pub mod shared;
pub mod work_records;

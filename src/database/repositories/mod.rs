pub mod employee;
pub mod report;
pub mod salary;
pub mod work_item;
pub mod work_record;
pub mod work_type;

// Re-export all repositories for easy importing
pub use employee::EmployeeRepository;
pub use report::{ReportFilters, ReportRepository};
pub use salary::MonthlySalaryRepository;
pub use work_item::WorkItemRepository;
pub use work_record::WorkRecordRepository;
pub use work_type::WorkTypeRepository;

pub(crate) mod macros;

pub mod employee;
pub mod report;
pub mod salary;
pub mod work_item;
pub mod work_record;
pub mod work_type;

// Re-export all models for easy importing
pub use employee::*;
pub use report::*;
pub use salary::*;
pub use work_item::*;
pub use work_record::*;
pub use work_type::*;

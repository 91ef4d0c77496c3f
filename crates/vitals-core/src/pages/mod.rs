//! Dashboard pages and navigation

pub mod dashboard;
pub mod page;
pub mod page_manager;
pub mod report;

pub use dashboard::DashboardPage;
pub use page::{Page, PageWrapper};
pub use page_manager::PageManager;
pub use report::ReportPage;

pub mod attendance;
pub mod daily_report;
pub mod dashboard;
pub mod notification;
pub mod report;
pub mod settings;
pub mod users;

pub mod csv_export;
pub mod email_filter;

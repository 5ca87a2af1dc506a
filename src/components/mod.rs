pub mod calendar_view;
pub mod crm_api;
pub mod google_calendar;

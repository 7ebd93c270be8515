pub mod holiday_api;

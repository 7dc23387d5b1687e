pub mod banner;
pub mod checkin_list;
pub mod chrome;
pub mod form;
pub mod status_bar;

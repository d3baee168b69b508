//! Plain terminal rendering. Functions here build strings; `main` prints them.

pub mod chat_view;
pub mod dashboard;
pub mod login;
pub mod task_list;

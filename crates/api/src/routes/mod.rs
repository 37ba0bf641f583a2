pub mod lessons;
pub mod quiz;
pub mod root;
pub mod tutor;
pub mod users;

pub mod clock;
pub mod date;
pub mod table;
pub mod text;
pub mod time;

pub mod panels;
pub mod select;
pub mod table;

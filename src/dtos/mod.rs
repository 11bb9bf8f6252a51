pub mod chatdtos;
pub mod searchdtos;

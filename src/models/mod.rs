pub mod chatmodels;
pub mod profilemodels;
pub mod quickfixmodels;

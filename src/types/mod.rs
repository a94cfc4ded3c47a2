pub mod forms;

pub use forms::{AddModelForm, AddModelPrefill, SearchForm};

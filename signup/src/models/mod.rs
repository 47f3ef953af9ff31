pub mod settings;
pub mod values;

pub mod clip;
pub mod status;

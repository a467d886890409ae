// Interactive chart viewer
pub mod viewer;

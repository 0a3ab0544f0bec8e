pub mod app;
pub mod camera_controls;
pub mod map_view;
pub mod popup_overlay;
pub mod status_bar;
pub mod toolbar;

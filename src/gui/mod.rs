pub mod export_dialog;
pub mod plot_view;
pub mod reference_panel;
pub mod settings_panel;
pub mod theme;
pub mod toolbar;

pub mod help_modal;
pub mod share_bar;
pub mod status_bar;

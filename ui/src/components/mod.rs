//! UI Components
//!
//! The panel is a single page made of:
//! - `status_card`: engine indicator, controls and folder summary
//! - `config_form`: sync configuration editor
//! - `credentials_card`: drive credentials status and upload
//! - `activity_log`: recent panel actions
//! - `notification`: transient toast
//! - `icons`: shared SVG icons

mod activity_log;
mod config_form;
mod credentials_card;
mod icons;
mod notification;
mod status_card;

pub use activity_log::ActivityLog;
pub use config_form::ConfigForm;
pub use credentials_card::CredentialsCard;
pub use icons::*;
pub use notification::NotificationToast;
pub use status_card::StatusCard;

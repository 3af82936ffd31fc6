//! 外部服务

pub mod mailer;

pub use mailer::{LogMailer, Mail, Mailer};

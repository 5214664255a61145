//! User notifications (toasts).
//!
//! Library code never renders anything itself; it reports progress and
//! fallbacks through a [`Notifier`] handed in by the host application.

use crate::html;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Error,
    #[default]
    Info,
    Warning,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Success => "success",
            Severity::Error => "error",
            Severity::Info => "info",
            Severity::Warning => "warning",
        }
    }

    /// Glyph shown in front of the message. Warnings have no glyph of their
    /// own and share the info one.
    pub fn icon(self) -> &'static str {
        match self {
            Severity::Success => "✓",
            Severity::Error => "✗",
            Severity::Info | Severity::Warning => "ℹ",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Receiver for `(message, severity)` notifications.
pub trait Notifier {
    fn notify(&self, message: &str, severity: Severity);
}

/// Forwards notifications to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, message: &str, severity: Severity) {
        match severity {
            Severity::Error => log::error!("{}", message),
            Severity::Warning => log::warn!("{}", message),
            Severity::Success | Severity::Info => log::info!("{}", message),
        }
    }
}

/// Drops every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _message: &str, _severity: Severity) {}
}

/// A toast ready to be placed in the toast container.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Toast {
    pub message: String,
    pub severity: Severity,
}

impl Toast {
    /// How long a toast stays before it starts fading, in milliseconds.
    pub const VISIBLE_MS: u64 = 3000;
    /// Length of the fade-out before the toast is removed.
    pub const FADE_MS: u64 = 300;

    pub fn new(message: impl Into<String>, severity: Severity) -> Self {
        Toast {
            message: message.into(),
            severity,
        }
    }

    pub fn class_name(&self) -> String {
        format!("toast {}", self.severity)
    }

    pub fn inner_html(&self) -> String {
        format!(
            "<span>{}</span> {}",
            self.severity.icon(),
            html::escape(&self.message)
        )
    }
}

/// Messages shown by the export and clipboard helpers.
pub mod messages {
    pub const PDF_STARTED: &str = "جاري إنشاء ملف PDF...";
    pub const PDF_OPENED: &str = "تم فتح نافذة الطباعة";
    pub const EXCEL_STARTED: &str = "جاري تصدير ملف Excel...";
    pub const EXCEL_DONE: &str = "تم تصدير ملف Excel بنجاح";
    pub const EXCEL_FALLBACK: &str = "جاري استخدام الطريقة البديلة...";
    pub const EXCEL_LEGACY_DONE: &str = "تم تصدير ملف Excel (صيغة قديمة)";
    pub const COPY_DONE: &str = "تم نسخ الجدول بنجاح";
    pub const COPY_PLAIN_ONLY: &str = "تم نسخ الجدول (نص فقط)";
}

//! The 9 built-in rules.

pub mod browser_cache;
pub mod developer_caches;
pub mod large_caches;
pub mod low_disk_space;
pub mod mail_attachments;
pub mod old_downloads;
pub mod screenshot_cleanup;
mod support;
pub mod trash_reminder;
pub mod unused_apps;

use std::sync::Arc;

use crate::rules::Rule;

pub use browser_cache::BrowserCacheRule;
pub use developer_caches::DeveloperCachesRule;
pub use large_caches::LargeCachesRule;
pub use low_disk_space::LowDiskSpaceRule;
pub use mail_attachments::MailAttachmentsRule;
pub use old_downloads::OldDownloadsRule;
pub use screenshot_cleanup::ScreenshotCleanupRule;
pub use trash_reminder::TrashReminderRule;
pub use unused_apps::UnusedAppsRule;

/// All 9 built-in rules, in the order a fresh `RuleEngine` should register
/// them. Order has no semantic effect (the engine sorts its output), but
/// a stable order keeps `registered_ids()` predictable in logs and tests.
pub fn all() -> Vec<Arc<dyn Rule>> {
    vec![
        Arc::new(LowDiskSpaceRule),
        Arc::new(OldDownloadsRule),
        Arc::new(DeveloperCachesRule),
        Arc::new(LargeCachesRule),
        Arc::new(UnusedAppsRule),
        Arc::new(ScreenshotCleanupRule),
        Arc::new(BrowserCacheRule),
        Arc::new(TrashReminderRule),
        Arc::new(MailAttachmentsRule),
    ]
}

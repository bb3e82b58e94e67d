//! Shared UI icons and emojis.
//!
//! Each icon falls back to a plain-text tag on terminals without emoji support.

use console::Emoji;

// Status indicators
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "[OK]");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "[ERR]");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "[i]");
pub static SPARKLE: Emoji<'_, '_> = Emoji("🎉 ", "*");

// Workflow steps
pub static SEARCH: Emoji<'_, '_> = Emoji("🔍 ", "[?]");
pub static HAMMER: Emoji<'_, '_> = Emoji("🔨 ", "[BUILD]");
pub static PACKAGE: Emoji<'_, '_> = Emoji("📦 ", "[PKG]");
pub static FOLDER: Emoji<'_, '_> = Emoji("📁 ", "");
pub static UPLOAD: Emoji<'_, '_> = Emoji("📤 ", "[UP]");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", "[>]");
pub static TRASH: Emoji<'_, '_> = Emoji("🗑️  ", "-");
pub static FIRE: Emoji<'_, '_> = Emoji("🔥 ", "[!]");
pub static CLOCK: Emoji<'_, '_> = Emoji("⏳ ", "[T]");
pub static BROOM: Emoji<'_, '_> = Emoji("🧹 ", "[CLEAN]");
pub static LOCK: Emoji<'_, '_> = Emoji("🔐 ", "[KEY]");
pub static GLOBE: Emoji<'_, '_> = Emoji("🌐 ", "[URL]");
pub static PIN: Emoji<'_, '_> = Emoji("📍 ", "@");

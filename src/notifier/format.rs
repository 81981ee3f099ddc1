//! Outbound message enrichment: titling, the cancel deep-link,
//! elapsed-time annotation, and error framing.

use std::time::Duration;

use crate::executor::types::TaskContext;

/// Enrich `body` with the title, cancel deep-link, elapsed-time suffix, and
/// error framing implied by `ctx`. `title_lookup` resolves a known bot
/// command's composite title when `ctx.title` itself is unset.
pub fn enrich(ctx: &TaskContext, body: &str, title_lookup: impl FnOnce() -> Option<String>) -> String {
    let mut out = String::new();

    let title = ctx.title.clone().or_else(title_lookup);
    if let Some(title) = title {
        out.push_str(&format!("<b>【 {title} 】</b>\n\n"));
    }

    out.push_str(body);

    if let Some(instance_id) = &ctx.instance_id {
        if ctx.cancelable {
            out.push_str(&format!("\n/cancel_{instance_id}"));
        }
        if let Some(elapsed) = ctx.elapsed_time_after_run {
            if elapsed > Duration::ZERO {
                out.push_str(&format!(" ({}지남)", format_elapsed(elapsed)));
            }
        }
    }

    if ctx.error_occurred {
        out.push_str("\n\n*** 오류가 발생하였습니다. ***");
    }

    out
}

/// Render an elapsed duration as `Xh Ym Zs` using the reference chat
/// dialect's unit literals (시간/분/초), omitting zero units. A duration
/// under one second with no whole units renders as `0초` so the suffix is
/// never silently empty.
fn format_elapsed(elapsed: Duration) -> String {
    let total_secs = elapsed.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    let mut parts = Vec::new();
    if hours > 0 {
        parts.push(format!("{hours}시간"));
    }
    if minutes > 0 {
        parts.push(format!("{minutes}분"));
    }
    if seconds > 0 || parts.is_empty() {
        parts.push(format!("{seconds}초"));
    }
    parts.join(" ")
}

#![forbid(unsafe_code)]

//! Widgets for modalkit.
//!
//! The centerpiece is [`modal::ModalWidget`]: a titled dialog panel with a
//! close control, mounted into any [`modal::ModalSurface`] and reachable
//! through the process-wide [`modal::close_modal`] hook.

pub mod modal;

pub use modal::{
    CloseTrigger, ConfigError, DEFAULT_CLOSE_TEXT, Dismiss, DismissTrigger, DismissalRegistry,
    DisplacePolicy, DocumentMount, ModalConfig, ModalId, ModalState, ModalSurface, ModalView,
    ModalWidget, Screen, ScreenLayer, close_modal,
};

use std::borrow::Cow;

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Display width of a string in terminal cells.
#[inline]
pub(crate) fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Truncate `s` to `max_width` cells, ending in a single-cell ellipsis when
/// anything was cut.
pub(crate) fn ellipsize(s: &str, max_width: usize) -> Cow<'_, str> {
    if display_width(s) <= max_width {
        return Cow::Borrowed(s);
    }
    if max_width == 0 {
        return Cow::Borrowed("");
    }
    if max_width == 1 {
        return Cow::Borrowed("…");
    }

    let mut out = String::new();
    let mut used = 0usize;
    let target = max_width - 1;

    for g in s.graphemes(true) {
        let w = UnicodeWidthStr::width(g);
        if w == 0 {
            continue;
        }
        if used + w > target {
            break;
        }
        out.push_str(g);
        used += w;
    }

    out.push('…');
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ellipsize_short_is_borrowed() {
        let out = ellipsize("abc", 3);
        assert!(matches!(out, Cow::Borrowed(_)));
        assert_eq!(out, "abc");
    }

    #[test]
    fn ellipsize_truncates_with_ellipsis() {
        assert_eq!(ellipsize("abcdef", 4), "abc…");
    }

    #[test]
    fn ellipsize_tiny_widths() {
        assert_eq!(ellipsize("abcdef", 0), "");
        assert_eq!(ellipsize("abcdef", 1), "…");
    }

    #[test]
    fn ellipsize_respects_wide_graphemes() {
        // Each CJK glyph is two cells wide.
        assert_eq!(ellipsize("確認する", 5), "確認…");
        assert_eq!(display_width("確認"), 4);
    }
}

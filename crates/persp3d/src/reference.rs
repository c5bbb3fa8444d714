//! The link from a box to its perspective.
//!
//! A box names its perspective with a document reference of the form
//! `#<id>`. The resolved target is kept next to the textual reference. Only
//! the [`Scene`](crate::Scene) retargets a reference, and it pairs every
//! change with the matching update of the perspectives' membership lists.

use crate::error::{Persp3dError, Result};
use crate::keys::PerspKey;

/// Extract the element id from a `#id` reference.
pub fn parse_href(href: &str) -> Result<&str> {
    match href.trim().strip_prefix('#') {
        Some(id) if !id.is_empty() && !id.contains(char::is_whitespace) => Ok(id),
        _ => Err(Persp3dError::BadUri(href.to_string())),
    }
}

/// Format an element id as a reference.
pub fn href_for(id: &str) -> String {
    format!("#{id}")
}

/// The outcome of retargeting a reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefChange {
    /// Previously referenced perspective.
    pub old: Option<PerspKey>,
    /// Newly referenced perspective.
    pub new: Option<PerspKey>,
}

impl RefChange {
    /// Whether the target actually changed.
    pub fn is_change(&self) -> bool {
        self.old != self.new
    }
}

/// A box's link to a perspective.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PerspectiveReference {
    href: Option<String>,
    target: Option<PerspKey>,
}

impl PerspectiveReference {
    /// The textual reference as last written.
    pub fn href(&self) -> Option<&str> {
        self.href.as_deref()
    }

    /// The attached perspective.
    pub fn target(&self) -> Option<PerspKey> {
        self.target
    }

    /// Whether a perspective is attached.
    pub fn is_attached(&self) -> bool {
        self.target.is_some()
    }

    pub(crate) fn retarget(&mut self, href: Option<String>, target: Option<PerspKey>) -> RefChange {
        let old = self.target;
        self.href = href;
        self.target = target;
        RefChange { old, new: target }
    }

    pub(crate) fn detach(&mut self) -> RefChange {
        self.retarget(None, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    #[test]
    fn test_parse_href() {
        assert_eq!(parse_href("#perspective12").unwrap(), "perspective12");
        assert_eq!(parse_href("  #p ").unwrap(), "p");
        for bad in ["", "#", "perspective12", "url(#p)", "#a b"] {
            assert!(matches!(parse_href(bad), Err(Persp3dError::BadUri(_))));
        }
        assert_eq!(href_for("p3"), "#p3");
    }

    #[test]
    fn test_retarget_reports_change() {
        let mut keys: SlotMap<PerspKey, ()> = SlotMap::with_key();
        let a = keys.insert(());
        let b = keys.insert(());

        let mut r = PerspectiveReference::default();
        assert!(!r.is_attached());

        let c = r.retarget(Some("#a".into()), Some(a));
        assert_eq!(c, RefChange { old: None, new: Some(a) });
        assert!(c.is_change());

        let c = r.retarget(Some("#a".into()), Some(a));
        assert!(!c.is_change());

        let c = r.retarget(Some("#b".into()), Some(b));
        assert_eq!(c.old, Some(a));
        assert_eq!(r.href(), Some("#b"));

        let c = r.detach();
        assert_eq!(c, RefChange { old: Some(b), new: None });
        assert!(r.href().is_none());
    }
}

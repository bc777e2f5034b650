// colablint - Hook Registry
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Explicit subscription interface for host events. A host fires
// PRE_RUN_CELL with the pending cell; callbacks may rewrite it before
// the kernel executes it.

use std::collections::BTreeMap;

/// Fired before a cell is executed
pub const PRE_RUN_CELL: &str = "pre_run_cell";

/// Source text about to be executed, rewritable by hooks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingCell {
    pub source: String,
    /// Names of hooks that replaced the source, in order
    pub rewritten_by: Vec<String>,
}

impl PendingCell {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            rewritten_by: Vec::new(),
        }
    }

    /// Replace the pending source; no-op when the text is unchanged
    pub fn replace(&mut self, hook: &str, source: String) {
        if source.trim() == self.source.trim() {
            return;
        }
        self.source = source;
        self.rewritten_by.push(hook.to_string());
    }

    pub fn was_rewritten(&self) -> bool {
        !self.rewritten_by.is_empty()
    }
}

pub type HookFn = Box<dyn FnMut(&mut PendingCell)>;

struct Hook {
    name: String,
    callback: HookFn,
}

/// Callbacks keyed by event name, run in registration order
#[derive(Default)]
pub struct HookRegistry {
    events: BTreeMap<String, Vec<Hook>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback` under `name`. Re-registering a name replaces the
    /// old callback in place.
    pub fn register(&mut self, event: &str, name: &str, callback: HookFn) {
        let hooks = self.events.entry(event.to_string()).or_default();
        match hooks.iter_mut().find(|h| h.name == name) {
            Some(existing) => existing.callback = callback,
            None => hooks.push(Hook {
                name: name.to_string(),
                callback,
            }),
        }
        log::debug!("hook {} registered for {}", name, event);
    }

    /// Returns true if a hook was removed
    pub fn unregister(&mut self, event: &str, name: &str) -> bool {
        let Some(hooks) = self.events.get_mut(event) else {
            return false;
        };
        let before = hooks.len();
        hooks.retain(|h| h.name != name);
        let removed = hooks.len() != before;
        if hooks.is_empty() {
            self.events.remove(event);
        }
        removed
    }

    pub fn is_registered(&self, event: &str, name: &str) -> bool {
        self.events
            .get(event)
            .is_some_and(|hooks| hooks.iter().any(|h| h.name == name))
    }

    pub fn registered(&self, event: &str) -> Vec<&str> {
        self.events
            .get(event)
            .map(|hooks| hooks.iter().map(|h| h.name.as_str()).collect())
            .unwrap_or_default()
    }

    /// Run every hook for `event` against `cell`
    pub fn fire(&mut self, event: &str, cell: &mut PendingCell) {
        if let Some(hooks) = self.events.get_mut(event) {
            for hook in hooks.iter_mut() {
                (hook.callback)(cell);
            }
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn upper() -> HookFn {
        Box::new(|cell: &mut PendingCell| {
            let up = cell.source.to_uppercase();
            cell.replace("upper", up);
        })
    }

    #[test]
    fn hooks_run_in_registration_order() {
        let mut hooks = HookRegistry::new();
        hooks.register(PRE_RUN_CELL, "upper", upper());
        hooks.register(
            PRE_RUN_CELL,
            "suffix",
            Box::new(|cell: &mut PendingCell| {
                let s = format!("{}!", cell.source);
                cell.replace("suffix", s);
            }),
        );

        let mut cell = PendingCell::new("abc");
        hooks.fire(PRE_RUN_CELL, &mut cell);
        assert_eq!(cell.source, "ABC!");
        assert_eq!(cell.rewritten_by, vec!["upper", "suffix"]);
    }

    #[test]
    fn unregister_stops_rewrites() {
        let mut hooks = HookRegistry::new();
        hooks.register(PRE_RUN_CELL, "upper", upper());
        assert!(hooks.unregister(PRE_RUN_CELL, "upper"));
        assert!(!hooks.unregister(PRE_RUN_CELL, "upper"));

        let mut cell = PendingCell::new("abc");
        hooks.fire(PRE_RUN_CELL, &mut cell);
        assert_eq!(cell.source, "abc");
        assert!(!cell.was_rewritten());
    }

    #[test]
    fn reregistering_replaces_without_duplicating() {
        let mut hooks = HookRegistry::new();
        hooks.register(PRE_RUN_CELL, "upper", upper());
        hooks.register(PRE_RUN_CELL, "upper", upper());
        assert_eq!(hooks.registered(PRE_RUN_CELL), vec!["upper"]);
    }

    #[test]
    fn unchanged_replacement_is_not_recorded() {
        let mut cell = PendingCell::new("x = 1\n");
        cell.replace("noop", "x = 1".to_string());
        assert!(!cell.was_rewritten());
        assert_eq!(cell.source, "x = 1\n");
    }

    #[test]
    fn other_events_are_isolated() {
        let mut hooks = HookRegistry::new();
        hooks.register("post_run_cell", "upper", upper());
        let mut cell = PendingCell::new("abc");
        hooks.fire(PRE_RUN_CELL, &mut cell);
        assert_eq!(cell.source, "abc");
        assert!(hooks.is_registered("post_run_cell", "upper"));
    }
}

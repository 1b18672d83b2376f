//! Canonical key ordering
//!
//! The engine does not export dict keys in a single global order. Each kind
//! of dict has its own rule, and reproducing it exactly is what makes a
//! generated dict survive an import/export cycle byte for byte.
//!
//! | Context | Rule |
//! |---------|------|
//! | `Condition` | alphabetical, but `ConditionType` is followed immediately by the flag keys |
//! | `Action` | `MacroActionType`, then `ActionUID`, then alphabetical |
//! | `Application` | fixed priority list, then alphabetical |
//! | `Default` | alphabetical |
//!
//! Ordering is a pure function of the key set and the context.

/// Discriminant key of every condition dict
pub const CONDITION_DISCRIMINANT: &str = "ConditionType";

/// Flag keys the engine emits right after the condition discriminant
pub const CONDITION_FLAG_KEYS: &[&str] = &["IsFrontApplication", "DisplayMatches"];

/// Discriminant key of every action dict
pub const ACTION_DISCRIMINANT: &str = "MacroActionType";

/// Volatile numeric identifier of every action dict
pub const ACTION_IDENTIFIER: &str = "ActionUID";

/// Keys of an application selector, in the engine's export order
pub const APPLICATION_PRIORITY: &[&str] = &["BundleIdentifier", "Match", "Name", "NewFile", "Path"];

/// Which ordering rule a dict follows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyContext {
    Condition,
    Action,
    Application,
    #[default]
    Default,
}

/// Return `keys` in the order the engine itself would emit them
///
/// Duplicate keys are emitted once.
pub fn canonical_order<'a, I>(keys: I, context: KeyContext) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut keys: Vec<&'a str> = keys.into_iter().collect();
    keys.sort_unstable();
    keys.dedup();

    match context {
        KeyContext::Default => keys,
        KeyContext::Action => order_action(keys),
        KeyContext::Condition => order_condition(keys),
        KeyContext::Application => order_application(keys),
    }
}

fn order_action(sorted: Vec<&str>) -> Vec<&str> {
    let mut ordered = Vec::with_capacity(sorted.len());
    for leading in [ACTION_DISCRIMINANT, ACTION_IDENTIFIER] {
        if sorted.contains(&leading) {
            ordered.push(leading);
        }
    }
    ordered.extend(
        sorted
            .into_iter()
            .filter(|k| *k != ACTION_DISCRIMINANT && *k != ACTION_IDENTIFIER),
    );
    ordered
}

fn order_condition(sorted: Vec<&str>) -> Vec<&str> {
    if !sorted.contains(&CONDITION_DISCRIMINANT) {
        return sorted;
    }

    let flags: Vec<&str> = CONDITION_FLAG_KEYS
        .iter()
        .copied()
        .filter(|flag| sorted.contains(flag))
        .collect();

    let mut rest: Vec<&str> = sorted
        .into_iter()
        .filter(|k| *k != CONDITION_DISCRIMINANT && !flags.contains(k))
        .collect();

    let position = rest.partition_point(|k| *k < CONDITION_DISCRIMINANT);
    let cluster = std::iter::once(CONDITION_DISCRIMINANT).chain(flags);
    rest.splice(position..position, cluster);
    rest
}

fn order_application(sorted: Vec<&str>) -> Vec<&str> {
    let mut ordered: Vec<&str> = APPLICATION_PRIORITY
        .iter()
        .copied()
        .filter(|k| sorted.contains(k))
        .collect();
    ordered.extend(
        sorted
            .into_iter()
            .filter(|k| !APPLICATION_PRIORITY.contains(k)),
    );
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_context_is_alphabetical() {
        let keys = ["Zed", "Alpha", "Mid"];
        assert_eq!(
            canonical_order(keys, KeyContext::Default),
            vec!["Alpha", "Mid", "Zed"]
        );
    }

    #[test]
    fn test_action_context_leads_with_type_and_uid() {
        let keys = ["Time", "ActionUID", "Actions", "MacroActionType", "Abort"];
        assert_eq!(
            canonical_order(keys, KeyContext::Action),
            vec!["MacroActionType", "ActionUID", "Abort", "Actions", "Time"]
        );
    }

    #[test]
    fn test_condition_context_clusters_flags_after_discriminant() {
        let keys = [
            "FrontWindowTitle",
            "IsFrontApplication",
            "Application",
            "ConditionType",
            "FrontWindowConditionType",
        ];
        assert_eq!(
            canonical_order(keys, KeyContext::Condition),
            vec![
                "Application",
                "ConditionType",
                "IsFrontApplication",
                "FrontWindowConditionType",
                "FrontWindowTitle",
            ]
        );
    }

    #[test]
    fn test_condition_flags_follow_fixed_order() {
        let keys = ["DisplayMatches", "ConditionType", "IsFrontApplication", "Fuzz"];
        assert_eq!(
            canonical_order(keys, KeyContext::Condition),
            vec!["ConditionType", "IsFrontApplication", "DisplayMatches", "Fuzz"]
        );
    }

    #[test]
    fn test_condition_without_discriminant_is_alphabetical() {
        let keys = ["IsFrontApplication", "Alpha"];
        assert_eq!(
            canonical_order(keys, KeyContext::Condition),
            vec!["Alpha", "IsFrontApplication"]
        );
    }

    #[test]
    fn test_application_context_priority() {
        let keys = ["Path", "Extra", "Name", "BundleIdentifier", "Aardvark"];
        assert_eq!(
            canonical_order(keys, KeyContext::Application),
            vec!["BundleIdentifier", "Name", "Path", "Aardvark", "Extra"]
        );
    }

    #[test]
    fn test_ordering_is_deterministic_and_deduplicated() {
        let keys = ["B", "A", "B", "C"];
        let first = canonical_order(keys, KeyContext::Action);
        let second = canonical_order(keys.iter().rev().copied(), KeyContext::Action);
        assert_eq!(first, vec!["A", "B", "C"]);
        assert_eq!(first, second);
    }
}

//! Deterministic keyword router. This is the fallback (and the default when
//! no provider API key is configured), so it has to cover the common
//! phrasings on its own.

use tasklane_database::{TodoPriority, TodoStatus};

#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    AddTask {
        title: String,
        priority: Option<TodoPriority>,
    },
    ListTasks {
        status: Option<TodoStatus>,
    },
    CompleteTask {
        reference: String,
    },
    DeleteTask {
        reference: String,
    },
    UpdateTask {
        reference: String,
        priority: Option<TodoPriority>,
    },
    SmallTalk,
}

const ADD_PREFIXES: &[&str] = &[
    "add a task to ",
    "add a task ",
    "add task ",
    "add a todo ",
    "add todo ",
    "add ",
    "create a task to ",
    "create a task ",
    "create task ",
    "create ",
    "new task ",
    "remind me to ",
    "i need to ",
];

const COMPLETE_PREFIXES: &[&str] = &[
    "complete ",
    "finish ",
    "mark off ",
    "check off ",
    "i finished ",
    "i completed ",
    "i'm done with ",
    "im done with ",
    "done with ",
];

const DELETE_PREFIXES: &[&str] = &["delete ", "remove ", "drop ", "cancel ", "forget about "];

/// Classify a chat message into a todo intent. Works on lowercased input.
pub fn parse_intent(text: &str) -> Intent {
    let normalized = text.trim().to_lowercase();
    if normalized.is_empty() {
        return Intent::SmallTalk;
    }

    if is_list_request(&normalized) {
        return Intent::ListTasks {
            status: list_status_filter(&normalized),
        };
    }

    // "mark X as done" has the reference in the middle, so it is handled
    // before the prefix tables.
    if let Some(rest) = normalized.strip_prefix("mark ") {
        for marker in [" as done", " as complete", " as completed", " done", " complete"] {
            if let Some(reference) = rest.strip_suffix(marker) {
                return Intent::CompleteTask {
                    reference: clean_reference(reference),
                };
            }
        }
    }

    if let Some(rest) = strip_any_prefix(&normalized, COMPLETE_PREFIXES) {
        return Intent::CompleteTask {
            reference: clean_reference(rest),
        };
    }

    if let Some(rest) = strip_any_prefix(&normalized, DELETE_PREFIXES) {
        return Intent::DeleteTask {
            reference: clean_reference(rest),
        };
    }

    if let Some((reference, priority)) = parse_priority_change(&normalized) {
        return Intent::UpdateTask {
            reference,
            priority: Some(priority),
        };
    }

    if let Some(rest) = strip_any_prefix(&normalized, ADD_PREFIXES) {
        let (title, priority) = extract_priority(rest);
        let title = title.trim().trim_end_matches('.').trim().to_string();
        if !title.is_empty() {
            return Intent::AddTask {
                title,
                priority,
            };
        }
    }

    Intent::SmallTalk
}

fn is_list_request(text: &str) -> bool {
    let mentions_tasks = text.contains("task") || text.contains("todo") || text.contains("to-do");
    let asks_for_list = text.starts_with("list")
        || text.starts_with("show")
        || text.contains("what do i have")
        || text.contains("what's on my")
        || text.contains("whats on my")
        || text.contains("what are my");
    mentions_tasks && asks_for_list
}

fn list_status_filter(text: &str) -> Option<TodoStatus> {
    if text.contains("completed") || text.contains("done") || text.contains("finished") {
        Some(TodoStatus::Completed)
    } else if text.contains("pending") || text.contains("open") || text.contains("outstanding") {
        Some(TodoStatus::Pending)
    } else {
        None
    }
}

fn strip_any_prefix<'a>(text: &'a str, prefixes: &[&str]) -> Option<&'a str> {
    prefixes
        .iter()
        .find_map(|prefix| text.strip_prefix(prefix))
        .filter(|rest| !rest.trim().is_empty())
}

/// Drop filler around a task reference: articles, the word "task", quotes,
/// trailing punctuation.
fn clean_reference(reference: &str) -> String {
    let mut reference = reference.trim();
    for prefix in ["the task ", "the todo ", "task ", "todo ", "the ", "my "] {
        if let Some(rest) = reference.strip_prefix(prefix) {
            reference = rest.trim();
        }
    }
    reference
        .trim_matches(|c: char| c == '"' || c == '\'' || c == '.' || c == '!')
        .to_string()
}

/// "set priority of X to high" / "make X high priority".
fn parse_priority_change(text: &str) -> Option<(String, TodoPriority)> {
    if let Some(rest) = text.strip_prefix("set priority of ") {
        let (reference, level) = rest.rsplit_once(" to ")?;
        let priority = TodoPriority::parse(level)?;
        return Some((clean_reference(reference), priority));
    }

    if let Some(rest) = text.strip_prefix("make ") {
        for priority in [TodoPriority::Low, TodoPriority::Medium, TodoPriority::High] {
            let suffix = format!(" {} priority", priority.as_str());
            if let Some(reference) = rest.strip_suffix(&suffix) {
                return Some((clean_reference(reference), priority));
            }
        }
    }

    None
}

/// Pull a trailing priority hint out of an add-task phrase.
fn extract_priority(text: &str) -> (String, Option<TodoPriority>) {
    for priority in [TodoPriority::Low, TodoPriority::Medium, TodoPriority::High] {
        for pattern in [
            format!(" with {} priority", priority.as_str()),
            format!(", {} priority", priority.as_str()),
            format!(" ({} priority)", priority.as_str()),
            format!(" {} priority", priority.as_str()),
        ] {
            if let Some(stripped) = text.strip_suffix(&pattern) {
                return (stripped.to_string(), Some(priority));
            }
        }
    }
    (text.to_string(), None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_task_variants() {
        assert_eq!(
            parse_intent("add a task to buy milk"),
            Intent::AddTask {
                title: "buy milk".to_string(),
                priority: None,
            }
        );
        assert_eq!(
            parse_intent("Remind me to call the dentist."),
            Intent::AddTask {
                title: "call the dentist".to_string(),
                priority: None,
            }
        );
    }

    #[test]
    fn add_task_with_priority() {
        assert_eq!(
            parse_intent("add pay rent with high priority"),
            Intent::AddTask {
                title: "pay rent".to_string(),
                priority: Some(TodoPriority::High),
            }
        );
    }

    #[test]
    fn list_variants() {
        assert_eq!(
            parse_intent("list my tasks"),
            Intent::ListTasks { status: None }
        );
        assert_eq!(
            parse_intent("show me my completed todos"),
            Intent::ListTasks {
                status: Some(TodoStatus::Completed)
            }
        );
        assert_eq!(
            parse_intent("what are my open tasks?"),
            Intent::ListTasks {
                status: Some(TodoStatus::Pending)
            }
        );
    }

    #[test]
    fn complete_variants() {
        assert_eq!(
            parse_intent("mark buy milk as done"),
            Intent::CompleteTask {
                reference: "buy milk".to_string()
            }
        );
        assert_eq!(
            parse_intent("I finished the task \"pay rent\""),
            Intent::CompleteTask {
                reference: "pay rent".to_string()
            }
        );
        assert_eq!(
            parse_intent("complete #2"),
            Intent::CompleteTask {
                reference: "#2".to_string()
            }
        );
    }

    #[test]
    fn delete_variants() {
        assert_eq!(
            parse_intent("delete the task buy milk"),
            Intent::DeleteTask {
                reference: "buy milk".to_string()
            }
        );
        assert_eq!(
            parse_intent("forget about calling mom"),
            Intent::DeleteTask {
                reference: "calling mom".to_string()
            }
        );
    }

    #[test]
    fn priority_change() {
        assert_eq!(
            parse_intent("set priority of pay rent to high"),
            Intent::UpdateTask {
                reference: "pay rent".to_string(),
                priority: Some(TodoPriority::High),
            }
        );
        assert_eq!(
            parse_intent("make buy milk low priority"),
            Intent::UpdateTask {
                reference: "buy milk".to_string(),
                priority: Some(TodoPriority::Low),
            }
        );
    }

    #[test]
    fn unrelated_chatter_is_small_talk() {
        assert_eq!(parse_intent("hello there"), Intent::SmallTalk);
        assert_eq!(parse_intent(""), Intent::SmallTalk);
        assert_eq!(parse_intent("how is the weather"), Intent::SmallTalk);
    }

    #[test]
    fn bare_add_without_title_is_small_talk() {
        assert_eq!(parse_intent("add "), Intent::SmallTalk);
    }
}

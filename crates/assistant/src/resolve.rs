//! Natural-language task reference resolution. A reference can be a public
//! id, a `#n` ordinal into the user's task list as `list_tasks` prints it,
//! or a case-insensitive title fragment.

use crate::error::AssistantResult;
use tasklane_database::{Todo, TodoFilter};
use tasklane_todos::{TodoError, TodoService};

#[derive(Debug)]
pub enum Resolution {
    One(Todo),
    NotFound,
    Ambiguous(Vec<String>),
}

pub async fn resolve_reference(
    todos: &TodoService,
    user_id: i64,
    reference: &str,
) -> AssistantResult<Resolution> {
    let reference = reference.trim();
    if reference.is_empty() {
        return Ok(Resolution::NotFound);
    }

    // Exact public id.
    match todos.get(user_id, reference).await {
        Ok(todo) => return Ok(Resolution::One(todo)),
        Err(TodoError::NotFound) => {}
        Err(err) => return Err(err.into()),
    }

    let all = todos.list(user_id, &TodoFilter::default()).await?;

    // `#3` or a bare number: 1-based ordinal into the list ordering.
    if let Some(index) = parse_ordinal(reference) {
        if index == 0 {
            return Ok(Resolution::NotFound);
        }
        return Ok(match all.into_iter().nth(index - 1) {
            Some(todo) => Resolution::One(todo),
            None => Resolution::NotFound,
        });
    }

    let needle = reference.to_lowercase();
    let mut matches: Vec<Todo> = all
        .into_iter()
        .filter(|todo| todo.title.to_lowercase().contains(&needle))
        .collect();

    match matches.len() {
        0 => Ok(Resolution::NotFound),
        1 => Ok(Resolution::One(matches.remove(0))),
        _ => Ok(Resolution::Ambiguous(
            matches.into_iter().map(|todo| todo.title).collect(),
        )),
    }
}

fn parse_ordinal(reference: &str) -> Option<usize> {
    reference
        .strip_prefix('#')
        .unwrap_or(reference)
        .parse::<usize>()
        .ok()
}

//! Plain-text rendering for terminal output.

use crate::client::TodoDto;

/// Render todos as an aligned table with a header row.
pub fn todo_table(todos: &[TodoDto]) -> String {
    let mut rows = vec![[
        "ID".to_string(),
        "TITLE".to_string(),
        "PRIORITY".to_string(),
        "STATUS".to_string(),
        "DUE".to_string(),
    ]];
    for todo in todos {
        rows.push([
            todo.id.clone(),
            todo.title.clone(),
            todo.priority.clone(),
            todo.status.clone(),
            todo.due_date.clone().unwrap_or_else(|| "-".to_string()),
        ]);
    }

    let mut widths = [0usize; 5];
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    for row in &rows {
        let mut line = String::new();
        for (width, cell) in widths.iter().zip(row) {
            line.push_str(&format!("{cell:<width$}  "));
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

pub fn todo_details(todo: &TodoDto) -> String {
    let mut out = String::new();
    out.push_str(&format!("{} ({})\n", todo.title, todo.id));
    out.push_str(&format!("status:    {}\n", todo.status));
    out.push_str(&format!("priority:  {}\n", todo.priority));
    if let Some(description) = &todo.description {
        out.push_str(&format!("notes:     {description}\n"));
    }
    if let Some(due) = &todo.due_date {
        out.push_str(&format!("due:       {due}\n"));
    }
    out.push_str(&format!("created:   {}\n", todo.created_at));
    if let Some(completed) = &todo.completed_at {
        out.push_str(&format!("completed: {completed}\n"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(title: &str, due: Option<&str>) -> TodoDto {
        TodoDto {
            id: "abc123".to_string(),
            title: title.to_string(),
            description: None,
            priority: "medium".to_string(),
            status: "pending".to_string(),
            due_date: due.map(str::to_string),
            created_at: "2025-01-01T00:00:00Z".to_string(),
            completed_at: None,
        }
    }

    #[test]
    fn table_aligns_columns_and_fills_missing_due_dates() {
        let table = todo_table(&[
            sample("short", Some("2025-06-01T00:00:00Z")),
            sample("a much longer title", None),
        ]);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("ID"));
        assert!(lines[2].contains("a much longer title"));
        assert!(lines[2].contains("-"));

        // Columns line up: STATUS starts at the same offset in every row.
        let offset = lines[0].find("STATUS").unwrap();
        assert_eq!(&lines[1][offset..offset + 7], "pending");
    }

    #[test]
    fn details_include_optional_fields_only_when_present() {
        let mut todo = sample("write tests", None);
        let details = todo_details(&todo);
        assert!(details.contains("write tests (abc123)"));
        assert!(!details.contains("due:"));
        assert!(!details.contains("completed:"));

        todo.due_date = Some("2025-06-01T00:00:00Z".to_string());
        todo.completed_at = Some("2025-05-01T00:00:00Z".to_string());
        let details = todo_details(&todo);
        assert!(details.contains("due:"));
        assert!(details.contains("completed:"));
    }
}

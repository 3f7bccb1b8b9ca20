use dailytasks_core::config::Palette;
use dailytasks_core::model::{Filter, Task, TaskStats};
use dailytasks_core::storage::Storage;
use dailytasks_core::store::TaskStore;
use tabled::settings::Style;
use tabled::{Table, Tabled};

pub const EMPTY_STATE: &str = "No tasks to show.";

#[derive(Tabled)]
struct TaskRow<'a> {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "Done")]
    done: &'static str,
    #[tabled(rename = "Task")]
    text: &'a str,
}

pub fn checkbox(task: &Task) -> &'static str {
    if task.completed { "[x]" } else { "[ ]" }
}

pub fn task_table(tasks: &[&Task]) -> String {
    if tasks.is_empty() {
        return EMPTY_STATE.to_string();
    }

    let rows = tasks.iter().map(|task| TaskRow {
        id: task.id,
        done: checkbox(task),
        text: &task.text,
    });
    let mut table = Table::new(rows);
    table.with(Style::psql());
    table.to_string()
}

pub fn task_line(task: &Task) -> String {
    format!("{} {} | {}", checkbox(task), task.id, task.text)
}

pub fn stats_line(stats: TaskStats, palette: &Palette) -> String {
    palette.mutedize(&format!(
        "Total: {} | Completed: {} | Pending: {}",
        stats.total, stats.completed, stats.pending
    ))
}

/// Filter controls with the active one marked.
pub fn filter_bar(active: Filter, palette: &Palette) -> String {
    let labels: Vec<String> = Filter::ALL
        .iter()
        .map(|filter| {
            if *filter == active {
                palette.accentize(&format!("[{filter}]"))
            } else {
                filter.to_string()
            }
        })
        .collect();
    format!("Filter: {}", labels.join(" "))
}

/// One `[x] id | text` line per task, or the empty-state line.
pub fn task_lines(tasks: &[&Task]) -> String {
    if tasks.is_empty() {
        return EMPTY_STATE.to_string();
    }
    tasks
        .iter()
        .map(|task| task_line(task))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Full redraw: filter controls, the filtered list, counts, and the clear
/// hint when there is something to clear.
pub fn view<S: Storage>(store: &TaskStore<S>, palette: &Palette) -> String {
    let listing = if store.is_empty_view() {
        EMPTY_STATE.to_string()
    } else {
        task_table(&store.filtered_tasks())
    };
    let mut lines = vec![
        filter_bar(store.active_filter(), palette),
        listing,
        stats_line(store.stats(), palette),
    ];
    if store.has_completed() {
        lines.push(palette.mutedize("Run `clear` to remove completed tasks."));
    }
    lines.join("\n")
}

pub fn task_json(task: Option<&Task>) -> serde_json::Value {
    match task {
        Some(task) => serde_json::json!({
            "id": task.id,
            "text": task.text,
            "completed": task.completed,
        }),
        None => serde_json::Value::Null,
    }
}

pub fn tasks_json(tasks: &[&Task]) -> serde_json::Value {
    serde_json::Value::Array(tasks.iter().map(|task| task_json(Some(*task))).collect())
}

pub fn stats_json(stats: TaskStats) -> serde_json::Value {
    serde_json::json!({
        "total": stats.total,
        "completed": stats.completed,
        "pending": stats.pending,
    })
}

#[cfg(test)]
mod tests {
    use super::{
        EMPTY_STATE, filter_bar, stats_json, task_line, task_lines, task_table, tasks_json, view,
    };
    use dailytasks_core::config::palette_for_theme;
    use dailytasks_core::model::{Filter, Task, TaskStats};
    use dailytasks_core::storage::MemoryStorage;
    use dailytasks_core::store::TaskStore;

    fn sample() -> Vec<Task> {
        let mut done = Task::new(1, "Buy milk");
        done.completed = true;
        vec![Task::new(2, "Walk dog"), done]
    }

    #[test]
    fn empty_list_shows_empty_state() {
        assert_eq!(task_table(&[]), EMPTY_STATE);
    }

    #[test]
    fn table_lists_tasks_in_order() {
        let tasks = sample();
        let refs: Vec<&Task> = tasks.iter().collect();
        let table = task_table(&refs);

        let walk = table.find("Walk dog").expect("first task present");
        let milk = table.find("Buy milk").expect("second task present");
        assert!(walk < milk);
        assert!(table.contains("[x]"));
        assert!(table.contains("ID"));
    }

    #[test]
    fn task_line_marks_completion() {
        let tasks = sample();
        assert_eq!(task_line(&tasks[0]), "[ ] 2 | Walk dog");
        assert_eq!(task_line(&tasks[1]), "[x] 1 | Buy milk");
    }

    #[test]
    fn filter_bar_marks_active_filter() {
        let palette = palette_for_theme(None);
        assert_eq!(
            filter_bar(Filter::Active, &palette),
            "Filter: all [active] completed"
        );
    }

    #[test]
    fn plain_lines_follow_order_or_show_empty_state() {
        let tasks = sample();
        let refs: Vec<&Task> = tasks.iter().collect();

        assert_eq!(task_lines(&refs), "[ ] 2 | Walk dog\n[x] 1 | Buy milk");
        assert_eq!(task_lines(&[]), EMPTY_STATE);
    }

    #[test]
    fn view_hides_clear_hint_without_completed() {
        let palette = palette_for_theme(None);
        let store = TaskStore::new(MemoryStorage::new());
        let rendered = view(&store, &palette);

        assert!(rendered.contains(EMPTY_STATE));
        assert!(rendered.contains("Total: 0 | Completed: 0 | Pending: 0"));
        assert!(!rendered.contains("clear"));
    }

    #[test]
    fn view_shows_empty_state_when_filter_hides_everything() {
        let palette = palette_for_theme(None);
        let mut store = TaskStore::new(MemoryStorage::new());
        store.add("Walk dog").unwrap();
        store.set_filter(Filter::Completed);

        let rendered = view(&store, &palette);
        assert!(rendered.contains(EMPTY_STATE));
        assert!(!rendered.contains("Walk dog"));
        assert!(rendered.contains("Total: 1 | Completed: 0 | Pending: 1"));

        store.toggle(1).unwrap();
        let rendered = view(&store, &palette);
        assert!(rendered.contains("Walk dog"));
        assert!(rendered.contains("Run `clear`"));
    }

    #[test]
    fn json_payloads_use_wire_fields() {
        let tasks = sample();
        let refs: Vec<&Task> = tasks.iter().collect();

        assert_eq!(
            tasks_json(&refs),
            serde_json::json!([
                {"id": 2, "text": "Walk dog", "completed": false},
                {"id": 1, "text": "Buy milk", "completed": true}
            ])
        );
        assert_eq!(
            stats_json(TaskStats::from_tasks(&tasks)),
            serde_json::json!({"total": 2, "completed": 1, "pending": 1})
        );
    }
}

mod common;

use common::{Workspace, stderr, stdout};

#[test]
fn add_command_prepends_task() {
    let workspace = Workspace::new();

    let first = workspace.run(&["add", "Buy milk"]);
    let second = workspace.run(&["add", "Walk", "dog"]);

    assert!(first.status.success());
    assert!(second.status.success());
    assert!(stdout(&second).contains("Added task: Walk dog (2)"));
    assert!(stderr(&second).contains("Task added!"));

    assert_eq!(
        workspace.tasks(),
        serde_json::json!([
            {"id": 2, "text": "Walk dog", "completed": false},
            {"id": 1, "text": "Buy milk", "completed": false}
        ])
    );
}

#[test]
fn add_command_trims_text() {
    let workspace = Workspace::new();
    let output = workspace.run(&["--json", "add", "   Read   "]);

    assert!(output.status.success());
    let parsed: serde_json::Value = serde_json::from_str(&stdout(&output)).expect("json output");
    assert_eq!(parsed["text"], "Read");
    assert_eq!(parsed["id"], 1);
}

#[test]
fn blank_add_is_silent_noop() {
    let workspace = Workspace::new();
    let output = workspace.run(&["add", "   "]);

    assert!(output.status.success());
    assert!(stdout(&output).trim().is_empty());
    assert!(!stderr(&output).contains("Task added!"));
    assert!(!workspace.store_path().exists());
}

#[test]
fn add_command_requires_text_argument() {
    let workspace = Workspace::new();
    let output = workspace.run(&["add"]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("ERROR: invalid_input"));
}

#[test]
fn ids_continue_after_restored_maximum() {
    let workspace = Workspace::new();
    workspace.write_tasks(serde_json::json!([
        {"id": 7, "text": "old", "completed": true}
    ]));

    let output = workspace.run(&["--json", "add", "new"]);

    assert!(output.status.success());
    let parsed: serde_json::Value = serde_json::from_str(&stdout(&output)).expect("json output");
    assert_eq!(parsed["id"], 8);
}

#[test]
fn disabled_notifications_stay_quiet() {
    let workspace = Workspace::new();
    let output = workspace.run(&["--config-override", "notifications=off", "add", "quiet"]);

    assert!(output.status.success());
    assert!(!stderr(&output).contains("Task added!"));
}

#[test]
fn newer_storage_file_is_left_intact() {
    let workspace = Workspace::new();
    let newer = serde_json::json!({
        "schema_version": 2,
        "slots": {
            "myDailyTasks": "[{\"id\":1,\"text\":\"Buy milk\",\"completed\":false}]",
            "other": "kept"
        }
    })
    .to_string();
    std::fs::write(workspace.store_path(), &newer).expect("write store");

    let output = workspace.run(&["add", "Walk dog"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("ERROR: invalid_data - schema_version mismatch"));
    assert_eq!(
        std::fs::read_to_string(workspace.store_path()).expect("store readable"),
        newer
    );
}

#[test]
fn top_of_range_stored_id_does_not_break_add() {
    let workspace = Workspace::new();
    workspace.write_tasks(serde_json::json!([
        {"id": u64::MAX, "text": "Overflow", "completed": false},
        {"id": 1, "text": "Buy milk", "completed": false}
    ]));

    let output = workspace.run(&["add", "Walk dog"]);

    assert!(output.status.success());
    assert_eq!(
        workspace.tasks(),
        serde_json::json!([
            {"id": 2, "text": "Walk dog", "completed": false},
            {"id": 1, "text": "Buy milk", "completed": false}
        ])
    );
}

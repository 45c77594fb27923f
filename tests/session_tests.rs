//! # Session Tests
//!
//! The interaction state machine driven by messages, and the scheduler
//! feeding completions back:
//! 1. Startup and readiness
//! 2. Search / reload / paging issue scan+count pairs
//! 3. Export flow, including the written file
//! 4. Scheduler round trips against an in-memory keyspace

use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use pretty_assertions::assert_eq;
use redis_viewer::engine::{KeyCount, KeyEntry, Keyspace, ScanRequest, Standalone};
use redis_viewer::store::{MemoryNode, MemoryValue};
use redis_viewer::tui::{Command, Message, Mode, Scheduler, Session, NO_SELECTION, SEARCH_PLACEHOLDER};
use tokio::sync::mpsc;

// ============================================================================
// TEST HELPERS
// ============================================================================

fn key(code: KeyCode) -> Message {
    Message::Key(KeyEvent::new(code, KeyModifiers::NONE))
}

fn char_key(c: char) -> Message {
    key(KeyCode::Char(c))
}

fn type_text(session: &mut Session, text: &str) {
    for c in text.chars() {
        session.update(char_key(c));
    }
}

fn is_scan(command: &Command) -> bool {
    matches!(command, Command::Scan(_))
}

fn is_count(command: &Command) -> bool {
    matches!(command, Command::Count { .. })
}

/// A session that has finished its first scan/count pair.
fn ready_session(entries: Vec<KeyEntry>) -> Session {
    let mut session = Session::new(20);
    session.init();
    session.update(Message::Resize {
        width: 120,
        height: 40,
    });
    let n = entries.len();
    session.update(Message::ScanCompleted(entries));
    session.update(Message::CountCompleted(KeyCount::Exact(n)));
    session
}

fn sample_entries() -> Vec<KeyEntry> {
    vec![
        KeyEntry::loaded("k1", "string", "\"a\"".to_string()),
        KeyEntry::loaded("k2", "list", "[\n  \"1\",\n  \"2\"\n]".to_string()),
    ]
}

// ============================================================================
// STARTUP & READINESS
// ============================================================================

#[test]
fn test_init_issues_tick_spinner_scan_count() {
    let mut session = Session::new(20);
    let commands = session.init();

    assert_eq!(session.mode, Mode::Browse);
    assert!(!session.ready);
    assert!(commands.contains(&Command::Tick));
    assert!(commands.contains(&Command::Spinner));
    assert!(commands.contains(&Command::Scan(ScanRequest {
        offset: 0,
        pattern: String::new(),
        limit: 20,
    })));
    assert!(commands.contains(&Command::Count {
        pattern: String::new()
    }));
}

#[test]
fn test_scan_completion_does_not_mark_ready() {
    let mut session = Session::new(20);
    session.init();
    session.update(Message::ScanCompleted(sample_entries()));

    assert!(!session.ready);
    assert_eq!(session.entries.len(), 2);
    assert_eq!(session.selected, Some(0));
}

#[test]
fn test_count_completion_marks_ready() {
    let mut session = Session::new(20);
    session.init();
    session.update(Message::CountCompleted(KeyCount::Capped(9999)));

    assert!(session.ready);
    assert_eq!(session.status, "9999+ keys found");
}

#[test]
fn test_failure_sets_status_only() {
    let mut session = Session::new(20);
    session.init();
    session.update(Message::Failed("scan failed: boom".to_string()));

    assert!(!session.ready);
    assert_eq!(session.status, "scan failed: boom");
}

#[test]
fn test_spinner_stops_once_ready_and_restarts() {
    let mut session = ready_session(sample_entries());

    // Ready: the pending frame is the last one
    assert!(session.update(Message::SpinnerFrame).is_empty());

    // Reload re-arms it
    let commands = session.update(char_key('r'));
    assert!(commands.contains(&Command::Spinner));

    // Not ready: each frame schedules the next
    let frame = session.spinner_frame;
    assert_eq!(session.update(Message::SpinnerFrame), vec![Command::Spinner]);
    assert_eq!(session.spinner_frame, frame + 1);
}

#[test]
fn test_tick_updates_clock_and_rearms() {
    let mut session = Session::new(20);
    let commands = session.update(Message::Tick("2024-01-02 03:04:05".to_string()));
    assert_eq!(session.now, "2024-01-02 03:04:05");
    assert_eq!(commands, vec![Command::Tick]);
}

// ============================================================================
// SEARCH, RELOAD, PAGING
// ============================================================================

#[test]
fn test_search_commit_rescans_with_pattern() {
    let mut session = ready_session(sample_entries());

    session.update(char_key('s'));
    assert_eq!(session.mode, Mode::Search);
    assert_eq!(session.placeholder, SEARCH_PLACEHOLDER);

    type_text(&mut session, "user:*");
    let commands = session.update(key(KeyCode::Enter));

    assert_eq!(session.mode, Mode::Browse);
    assert_eq!(session.pattern, "user:*");
    assert_eq!(session.offset, 0);
    assert!(!session.ready);
    assert!(commands.iter().any(is_scan));
    assert!(commands.contains(&Command::Count {
        pattern: "user:*".to_string()
    }));
    assert_eq!(session.input.value(), "");
}

#[test]
fn test_empty_search_commit_matches_all() {
    let mut session = ready_session(sample_entries());
    session.update(char_key('s'));
    type_text(&mut session, "user:*");
    session.update(key(KeyCode::Enter));
    assert_eq!(session.pattern, "user:*");

    session.update(char_key('s'));
    assert_eq!(session.input.value(), "");
    let commands = session.update(key(KeyCode::Enter));

    assert_eq!(session.mode, Mode::Browse);
    assert_eq!(session.pattern, "");
    assert!(commands.contains(&Command::Scan(ScanRequest {
        offset: 0,
        pattern: String::new(),
        limit: 20,
    })));
    assert!(commands.contains(&Command::Count {
        pattern: String::new()
    }));
}

#[test]
fn test_search_escape_discards_input() {
    let mut session = ready_session(sample_entries());
    session.update(char_key('s'));
    type_text(&mut session, "abc");

    let commands = session.update(key(KeyCode::Esc));
    assert!(commands.is_empty());
    assert_eq!(session.mode, Mode::Browse);
    assert_eq!(session.pattern, "");
    assert!(session.ready);
}

#[test]
fn test_letters_in_search_are_text_not_commands() {
    let mut session = ready_session(sample_entries());
    session.update(char_key('s'));
    let commands = session.update(char_key('r'));

    assert!(commands.is_empty());
    assert_eq!(session.input.value(), "r");
    assert_eq!(session.mode, Mode::Search);
}

#[test]
fn test_reload_resets_offset() {
    let mut session = ready_session(sample_entries());
    session.update(char_key('n'));
    session.update(char_key('n'));
    assert_eq!(session.offset, 2);

    let commands = session.update(char_key('r'));
    assert_eq!(session.offset, 0);
    assert!(!session.ready);
    assert_eq!(commands.iter().filter(|c| is_scan(c)).count(), 1);
    assert_eq!(commands.iter().filter(|c| is_count(c)).count(), 1);
}

#[test]
fn test_scan_paging_never_goes_negative() {
    let mut session = ready_session(sample_entries());

    assert!(session.update(char_key('p')).is_empty());
    assert_eq!(session.offset, 0);

    let commands = session.update(char_key('n'));
    assert_eq!(session.offset, 1);
    assert!(commands.contains(&Command::Scan(ScanRequest {
        offset: 1,
        pattern: String::new(),
        limit: 20,
    })));
}

#[test]
fn test_arrow_keys_move_selection_and_reset_scroll() {
    let mut session = ready_session(sample_entries());
    session.detail_scroll = 1;

    session.update(key(KeyCode::Down));
    assert_eq!(session.selected, Some(1));
    assert_eq!(session.detail_scroll, 0);

    session.update(key(KeyCode::Down));
    assert_eq!(session.selected, Some(1));

    session.update(key(KeyCode::Up));
    session.update(key(KeyCode::Up));
    assert_eq!(session.selected, Some(0));
}

#[test]
fn test_rescan_replaces_list() {
    let mut session = ready_session(sample_entries());
    session.update(Message::ScanCompleted(vec![KeyEntry::loaded(
        "only",
        "string",
        "\"x\"".to_string(),
    )]));
    assert_eq!(session.entries.len(), 1);
    assert_eq!(session.selected_entry().unwrap().key, "only");
}

#[test]
fn test_ctrl_c_quits_from_any_mode() {
    let ctrl_c = Message::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));

    let mut browsing = ready_session(sample_entries());
    assert_eq!(browsing.update(ctrl_c), vec![Command::Quit]);
    assert!(browsing.should_quit);

    let mut searching = ready_session(sample_entries());
    searching.update(char_key('s'));
    searching.update(Message::Key(KeyEvent::new(
        KeyCode::Char('c'),
        KeyModifiers::CONTROL,
    )));
    assert!(searching.should_quit);
}

// ============================================================================
// EXPORT
// ============================================================================

#[test]
fn test_export_without_selection() {
    let mut session = ready_session(Vec::new());
    let commands = session.update(char_key('e'));

    assert!(commands.is_empty());
    assert_eq!(session.mode, Mode::Browse);
    assert_eq!(session.status, NO_SELECTION);
}

#[test]
fn test_export_preloads_file_name() {
    let mut session = ready_session(sample_entries());
    session.update(key(KeyCode::Down));
    session.update(char_key('e'));

    assert_eq!(session.mode, Mode::Export);
    assert_eq!(session.input.value(), "k2.json");
}

#[test]
fn test_export_commit_issues_write_of_value_text() {
    let mut session = ready_session(sample_entries());
    session.update(key(KeyCode::Down));
    session.update(char_key('e'));
    let commands = session.update(key(KeyCode::Enter));

    assert_eq!(session.mode, Mode::Browse);
    assert!(!session.ready);
    assert!(commands.contains(&Command::Export {
        path: "k2.json".into(),
        contents: "[\n  \"1\",\n  \"2\"\n]".to_string(),
    }));
    // No rescan after export
    assert!(!commands.iter().any(is_scan));
}

#[test]
fn test_export_outcome_sets_status_and_ready() {
    let mut session = ready_session(sample_entries());
    session.update(char_key('e'));
    session.update(key(KeyCode::Enter));

    session.update(Message::Exported(Ok("k1.json".to_string())));
    assert!(session.ready);
    assert_eq!(session.status, "export to k1.json successfully");
}

// ============================================================================
// SCHEDULER ROUND TRIPS
// ============================================================================

fn memory_keyspace() -> Arc<dyn Keyspace> {
    let node = MemoryNode::new("mem:0")
        .with("k1", MemoryValue::String("a".into()))
        .with("k2", MemoryValue::List(vec!["1".into(), "2".into()]));
    Arc::new(Standalone::new(Arc::new(node)))
}

async fn next_message(rx: &mut mpsc::Receiver<Message>) -> Message {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("scheduler did not answer in time")
        .expect("channel closed")
}

#[tokio::test]
async fn test_scheduler_scan_and_count_feed_the_session() {
    let (tx, mut rx) = mpsc::channel(16);
    let scheduler = Scheduler::new(memory_keyspace(), tx);
    let mut session = Session::new(20);

    for command in session.init() {
        if is_scan(&command) || is_count(&command) {
            scheduler.dispatch(command);
        }
    }
    for _ in 0..2 {
        let message = next_message(&mut rx).await;
        session.update(message);
    }

    assert_eq!(session.entries.len(), 2);
    assert!(session.ready);
    assert_eq!(session.status, "2 keys found");
}

#[tokio::test]
async fn test_scheduler_export_writes_exact_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("k2.json");

    let (tx, mut rx) = mpsc::channel(4);
    let scheduler = Scheduler::new(memory_keyspace(), tx);
    let mut session = ready_session(sample_entries());
    session.update(key(KeyCode::Down));
    session.update(char_key('e'));
    // Replace the suggested name with the temp path
    session.update(Message::Key(KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL)));
    type_text(&mut session, &path.display().to_string());

    for command in session.update(key(KeyCode::Enter)) {
        scheduler.dispatch(command);
    }
    loop {
        match next_message(&mut rx).await {
            message @ Message::Exported(_) => {
                session.update(message);
                break;
            }
            other => {
                session.update(other);
            }
        }
    }

    let written = std::fs::read_to_string(&path).unwrap();
    assert_eq!(written, session.entries[1].value_text);
    assert_eq!(
        session.status,
        format!("export to {} successfully", path.display())
    );
}

#[tokio::test]
async fn test_scheduler_export_failure_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing-dir").join("k.json");

    let (tx, mut rx) = mpsc::channel(4);
    let scheduler = Scheduler::new(memory_keyspace(), tx);
    scheduler.dispatch(Command::Export {
        path: path.clone(),
        contents: "x".to_string(),
    });

    let mut session = Session::new(20);
    session.update(next_message(&mut rx).await);
    assert!(session.ready);
    assert!(session
        .status
        .starts_with(&format!("RV-032: export to {}:", path.display())));
}

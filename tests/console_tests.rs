//! Console tests driven by a scripted terminal, checking the echo seen by
//! the operator byte for byte.

mod common;

use std::time::Duration;

use common::ScriptedBackend;
use dedhost::console::{ConsoleInput, TextConsole};
use dedhost::EngineStatus;

const COMMANDS: &[&str] = &["help", "map", "map_list", "maxplayers", "quit"];

fn console() -> TextConsole<ScriptedBackend> {
    let mut console = TextConsole::new(ScriptedBackend::new(80), 255, Duration::from_secs(60));
    console.init().unwrap();
    console
}

fn typed(console: &mut TextConsole<ScriptedBackend>, bytes: &[u8]) -> Option<ConsoleInput> {
    console.backend_mut().type_bytes(bytes);
    console.get_line(COMMANDS).unwrap()
}

fn output(console: &mut TextConsole<ScriptedBackend>) -> String {
    console.backend().take_output()
}

#[test]
fn test_partial_line_is_kept_between_polls() {
    let mut console = console();
    assert_eq!(typed(&mut console, b"sta"), None);
    assert_eq!(console.editor().text(), "sta");

    assert_eq!(
        typed(&mut console, b"tus\n"),
        Some(ConsoleInput::Line("status".to_string()))
    );
    assert_eq!(output(&mut console), "status\n");
}

#[test]
fn test_one_line_per_poll() {
    let mut console = console();
    assert_eq!(
        typed(&mut console, b"echo a\r\necho b\r\n"),
        Some(ConsoleInput::Line("echo a".to_string()))
    );
    assert_eq!(
        console.get_line(COMMANDS).unwrap(),
        Some(ConsoleInput::Line("echo b".to_string()))
    );
    assert_eq!(console.get_line(COMMANDS).unwrap(), None);
}

#[test]
fn test_editing_with_arrows() {
    let mut console = console();
    // "mp", Left, "a", End, " c0"
    typed(&mut console, b"mp\x1b[Da\x1b[F c0");
    assert_eq!(console.editor().text(), "map c0");

    // Home, Right, Backspace
    typed(&mut console, b"\x1b[H\x1b[C\x7f");
    assert_eq!(console.editor().text(), "ap c0");
    assert_eq!(console.editor().cursor(), 0);
}

#[test]
fn test_history_browsing() {
    let mut console = console();
    typed(&mut console, b"map de_dust\n");
    typed(&mut console, b"quit\n");
    output(&mut console);

    typed(&mut console, b"\x1b[A\x1b[A");
    assert_eq!(console.editor().text(), "map de_dust");

    typed(&mut console, b"\x1b[B");
    assert_eq!(console.editor().text(), "quit");

    assert_eq!(
        typed(&mut console, b"\n"),
        Some(ConsoleInput::Line("quit".to_string()))
    );

    // Submitting the newest entry again is not recorded twice.
    let history: Vec<_> = console.editor().history().collect();
    assert_eq!(history, vec!["map de_dust", "quit"]);
}

#[test]
fn test_tab_completes_single_command() {
    let mut console = console();
    typed(&mut console, b"he\t");
    assert_eq!(console.editor().text(), "help ");
    assert_eq!(output(&mut console), "help ");
}

#[test]
fn test_tab_lists_several_commands() {
    let mut console = console();
    typed(&mut console, b"ma\t");

    assert_eq!(console.editor().text(), "ma");
    assert_eq!(
        output(&mut console),
        "ma\x08 \x08\x08 \x08\nmap         map_list    maxplayers  \nma"
    );
}

#[test]
fn test_tab_listing_wraps_to_terminal_width() {
    let mut console = TextConsole::new(ScriptedBackend::new(24), 255, Duration::from_secs(60));
    console.init().unwrap();
    typed(&mut console, b"m\t");

    // (24 - 1) / (10 + 1) = 2 columns
    let shown = output(&mut console);
    assert!(shown.contains("\nmap         map_list    \nmaxplayers  \nma"));
    assert_eq!(console.editor().text(), "ma");
}

#[test]
fn test_interrupt() {
    let mut console = console();
    assert_eq!(typed(&mut console, b"abc\x03"), Some(ConsoleInput::Interrupt));
    assert_eq!(console.editor().text(), "abc");
}

#[test]
fn test_no_input_before_init() {
    let mut console = TextConsole::new(ScriptedBackend::new(80), 255, Duration::from_secs(60));
    console.backend_mut().type_bytes(b"quit\n");
    assert_eq!(console.get_line(COMMANDS).unwrap(), None);

    console.init().unwrap();
    assert!(console.backend().initialized);
    assert_eq!(
        console.get_line(COMMANDS).unwrap(),
        Some(ConsoleInput::Line("quit".to_string()))
    );

    console.terminate().unwrap();
    assert!(!console.backend().initialized);
    console.terminate().unwrap();
}

#[test]
fn test_status_is_throttled() {
    let mut console = console();
    let status = EngineStatus {
        fps: 250.04,
        active_players: 2,
        max_players: 16,
        map: "crossfire".to_string(),
    };

    assert!(console.update_status(&status, false).unwrap());
    assert!(!console.update_status(&status, false).unwrap());
    assert!(console.update_status(&status, true).unwrap());

    assert_eq!(
        console.backend().statuses,
        vec![
            "FPS: 250.0 | Players: 2/16 | Map: crossfire".to_string(),
            "FPS: 250.0 | Players: 2/16 | Map: crossfire".to_string(),
        ]
    );
}

#[test]
fn test_print_and_title() {
    let mut console = console();
    console.set_title("dedhost").unwrap();
    console.print("Changing map to de_dust\n").unwrap();

    assert_eq!(console.backend().title, "dedhost");
    assert_eq!(output(&mut console), "Changing map to de_dust\n");
    assert_eq!(console.width(), 80);
}

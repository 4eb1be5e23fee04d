// src/cli/chat.rs - Interactive REPL

use crate::coach::events::SessionEvent;
use crate::coach::{CoachService, Notice, NoticeLevel, Session, Turn};

/// Run the interactive chat REPL for one student.
pub async fn run_chat(service: &CoachService, mut session: Session, setup: Vec<SessionEvent>) -> anyhow::Result<()> {
    eprintln!(
        "beergame-coach v{} | {} | saving to {}\n",
        env!("CARGO_PKG_VERSION"),
        session.mode().display_name(),
        service.store_name(),
    );

    for event in setup {
        let turn = service.dispatch(&mut session, event).await;
        print_notices(&turn.notices);
    }
    print_transcript(&session);
    if !session.chat_enabled() {
        print_status(&session);
    }

    while let Some(input) = read_input() {
        let trimmed = input.trim();

        if trimmed == "quit" || trimmed == "exit" || trimmed == "/quit" {
            if session.exchange_count() > 0 {
                let turn = service
                    .dispatch(&mut session, SessionEvent::EndConversation)
                    .await;
                print_notices(&turn.notices);
            }
            break;
        }

        if trimmed.starts_with('/') {
            if let Some(event) = slash_command(trimmed, &session) {
                let welcome_before = session.welcome_role().to_string();
                let turn = service.dispatch(&mut session, event).await;
                if session.welcome_role() != welcome_before {
                    // The role change replaced the transcript.
                    print_transcript(&session);
                }
                print_turn(&turn);
            }
            continue;
        }

        if trimmed.is_empty() {
            continue;
        }

        let turn = service
            .dispatch(
                &mut session,
                SessionEvent::SubmitMessage {
                    text: trimmed.to_string(),
                },
            )
            .await;
        print_turn(&turn);
    }

    Ok(())
}

fn read_input() -> Option<String> {
    use std::io::{self, BufRead, Write};

    print!("> ");
    io::stdout().flush().ok();

    let mut line = String::new();
    match io::stdin().lock().read_line(&mut line) {
        Ok(0) => None, // EOF
        Ok(_) => Some(line),
        Err(_) => None,
    }
}

/// Translate a slash command into a session event. Informational commands
/// print directly and return `None`.
fn slash_command(input: &str, session: &Session) -> Option<SessionEvent> {
    let (cmd, arg) = match input.split_once(' ') {
        Some((c, a)) => (c, a.trim()),
        None => (input, ""),
    };

    match cmd {
        "/section" => Some(SessionEvent::SelectSection {
            section: arg.to_string(),
        }),
        "/group" => Some(SessionEvent::EnterParticipant {
            participant_id: arg.to_string(),
        }),
        "/role" => Some(SessionEvent::SelectRole {
            role: arg.to_string(),
        }),
        "/autosave" => match arg {
            "on" => Some(SessionEvent::SetAutosave { enabled: true }),
            "off" => Some(SessionEvent::SetAutosave { enabled: false }),
            _ => {
                eprintln!("  Usage: /autosave on|off");
                None
            }
        },
        "/save" => Some(SessionEvent::EndConversation),
        "/status" => {
            print_status(session);
            None
        }
        "/help" => {
            eprintln!("Slash commands:");
            eprintln!("  /section <name>    Select class section (quantitative)");
            eprintln!("  /group <number>    Enter Canvas group number");
            eprintln!("  /role <role>       Select role (locks after your first message)");
            eprintln!("  /autosave on|off   Toggle saving after every reply");
            eprintln!("  /save              End conversation and save transcript");
            eprintln!("  /status            Show session settings");
            eprintln!("  /help              Show this help");
            eprintln!("  /quit, quit, exit  Save (if you chatted) and leave");
            None
        }
        _ => {
            eprintln!("Unknown command: {}. Type /help for commands.", cmd);
            None
        }
    }
}

fn print_turn(turn: &Turn) {
    if let Some(ref reply) = turn.reply {
        println!("\n{}\n", reply);
    }
    print_notices(&turn.notices);
}

fn print_transcript(session: &Session) {
    for message in session.messages() {
        println!("[{}] {}", message.role.as_str(), message.content);
    }
}

fn print_notices(notices: &[Notice]) {
    for notice in notices {
        let tag = match notice.level {
            NoticeLevel::Info => "info",
            NoticeLevel::Success => "saved",
            NoticeLevel::Warning => "warn",
            NoticeLevel::Error => "error",
        };
        eprintln!("  [{}] {}", tag, notice.text);
    }
}

fn print_status(session: &Session) {
    eprintln!("  Mode: {}", session.mode().display_name());
    if session.mode().requires_section() {
        eprintln!(
            "  Section: {} (options: {})",
            display_or_dash(session.section()),
            session.sections().join(", ")
        );
    }
    eprintln!("  Group: {}", display_or_dash(session.participant_id()));
    eprintln!(
        "  Role: {}{}",
        display_or_dash(session.role()),
        if session.role_locked() { " (locked)" } else { "" }
    );
    eprintln!(
        "  Autosave: {}",
        if session.autosave_enabled() { "on" } else { "off" }
    );
    if !session.chat_enabled() {
        eprintln!("  Missing before chatting: {}", session.missing_fields().join(", "));
    }
}

fn display_or_dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}

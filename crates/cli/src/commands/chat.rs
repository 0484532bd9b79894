//! `cbc-tutor chat`: interactive or single-message tutoring.

use std::io::Write;
use std::path::Path;

use cbc_tutor::guidance::{self, CAPABILITIES};
use cbc_tutor::{SessionEvent, SessionState, Tutor, TurnOutcome, TypingEffect, compile_system_prompt};
use cbc_tutor_config::TutorConfig;
use cbc_tutor_core::curriculum::{self, GradeLevel, LearnerRole, Topics};
use cbc_tutor_core::message::TurnRole;
use tokio::io::{self, AsyncBufReadExt, BufReader};
use tracing::{debug, info};

/// Starting selections and mode flags from the command line.
pub struct ChatArgs {
    pub grade: Option<GradeLevel>,
    pub subject: Option<String>,
    pub role: Option<LearnerRole>,
    pub message: Option<String>,
    pub no_typing: bool,
}

/// One line of interactive input.
#[derive(Debug, PartialEq, Eq)]
enum Input {
    Message(String),
    Grade(String),
    Subject(String),
    Role(String),
    Clear,
    Stats,
    Topics,
    Subjects,
    Examples,
    Example(String),
    History,
    Prompt,
    Export,
    Help,
    Exit,
    Unknown(String),
}

/// Classify a line. Blank lines yield `None`.
fn parse_input(line: &str) -> Option<Input> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    if matches!(line, "exit" | "quit" | "/exit" | "/quit" | ":q") {
        return Some(Input::Exit);
    }
    let Some(command) = line.strip_prefix('/') else {
        return Some(Input::Message(line.to_string()));
    };

    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim().to_string()),
        None => (command, String::new()),
    };

    Some(match name.to_ascii_lowercase().as_str() {
        "grade" => Input::Grade(arg),
        "subject" => Input::Subject(arg),
        "role" => Input::Role(arg),
        "clear" => Input::Clear,
        "stats" => Input::Stats,
        "topics" => Input::Topics,
        "subjects" => Input::Subjects,
        "examples" => Input::Examples,
        "example" => Input::Example(arg),
        "history" => Input::History,
        "prompt" => Input::Prompt,
        "export" => Input::Export,
        "help" | "?" => Input::Help,
        _ => Input::Unknown(line.to_string()),
    })
}

/// Build the opening session from config defaults overlaid with flags.
///
/// When only the grade is overridden, the configured subject is kept if the
/// new tier offers it and replaced by the tier's first subject otherwise.
fn initial_session(config: &TutorConfig, args: &ChatArgs) -> Result<SessionState, Box<dyn std::error::Error>> {
    let defaults = &config.session;
    let grade = match args.grade {
        Some(grade) => grade,
        None => defaults.grade_level()?,
    };
    let role = match args.role {
        Some(role) => role,
        None => defaults.learner_role()?,
    };
    let subject = match &args.subject {
        Some(subject) => subject.clone(),
        None if curriculum::canonical_subject(&defaults.subject, grade.tier()).is_some() => {
            defaults.subject.clone()
        }
        None => grade.tier().default_subject().to_string(),
    };
    Ok(SessionState::new(grade, &subject, role)?)
}

/// Split a single-message outcome into the reply for stdout or the one
/// line reported on stderr.
fn single_reply(outcome: TurnOutcome) -> Result<String, String> {
    match outcome {
        TurnOutcome::Generated { text } => Ok(text),
        TurnOutcome::Failed { message, error } => {
            debug!(error = %error, "Single message failed");
            Err(message)
        }
        TurnOutcome::Ignored => Err("Message is empty".into()),
    }
}

pub async fn run(config_path: Option<&Path>, args: ChatArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = TutorConfig::load(config_path).map_err(|e| format!("Failed to load config: {e}"))?;
    let provider = cbc_tutor_providers::build_from_config(&config)?;
    let tutor = Tutor::from_config(provider, &config);
    let mut state = initial_session(&config, &args)?;
    info!(
        session_id = %state.id(),
        provider = tutor.provider_name(),
        grade = state.grade().number(),
        subject = state.subject(),
        "Session started"
    );

    if let Some(msg) = &args.message {
        // Single message mode
        eprint!("  Thinking...");
        let outcome = tutor.submit(&mut state, msg).await;
        eprint!("\r              \r");
        return match single_reply(outcome) {
            Ok(text) => {
                println!("{text}");
                Ok(())
            }
            Err(message) => {
                eprintln!("{message}");
                Err("no response was generated".into())
            }
        };
    }

    let typing = if args.no_typing {
        TypingEffect::disabled()
    } else {
        TypingEffect::from_config(&config.typing)
    };

    print_banner(&tutor, &state);
    print_welcome(&state);

    let mut lines = BufReader::new(io::stdin()).lines();
    loop {
        print!("  You > ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let Some(input) = parse_input(&line) else {
            continue;
        };

        match input {
            Input::Exit => break,
            Input::Message(text) => exchange(&tutor, &typing, &mut state, &text).await,
            Input::Example(arg) => {
                let examples = guidance::example_requests(state.role());
                match arg.parse::<usize>().ok().and_then(|n| n.checked_sub(1)).and_then(|i| examples.get(i)) {
                    Some(example) => {
                        println!("  You > {example}");
                        exchange(&tutor, &typing, &mut state, example).await;
                    }
                    None => println!("  ⚠️  Pick an example between 1 and {}\n", examples.len()),
                }
            }
            Input::Grade(arg) => match arg.parse::<GradeLevel>() {
                Ok(grade) => {
                    state = transition(state, SessionEvent::SelectGrade(grade));
                    print_selection(&state);
                }
                Err(e) => println!("  ⚠️  {e}\n"),
            },
            Input::Subject(arg) => {
                state = transition(state, SessionEvent::SelectSubject(arg));
                print_selection(&state);
            }
            Input::Role(arg) => match arg.parse::<LearnerRole>() {
                Ok(role) => {
                    state = transition(state, SessionEvent::SelectRole(role));
                    print_selection(&state);
                }
                Err(e) => println!("  ⚠️  {e}\n"),
            },
            Input::Clear => {
                state = transition(state, SessionEvent::Clear);
                println!("  🗑️  Chat cleared.\n");
                print_welcome(&state);
            }
            Input::Stats => print_stats(&state),
            Input::Topics => print_topics(&state),
            Input::Subjects => {
                println!("  Subjects in {}:", state.tier());
                for subject in state.tier().subjects() {
                    let marker = if *subject == state.subject() { "▸" } else { " " };
                    println!("   {marker} {subject}");
                }
                println!();
            }
            Input::Examples => {
                println!("  💡 Try asking ({}):", state.role().title());
                for (i, example) in guidance::example_requests(state.role()).iter().enumerate() {
                    println!("    {}. {example}", i + 1);
                }
                println!("  Send one with /example N\n");
            }
            Input::History => print_history(&state),
            Input::Prompt => {
                println!("{}\n", compile_system_prompt(state.grade(), state.subject(), state.role()));
            }
            Input::Export => println!("{}\n", serde_json::to_string_pretty(&state.view())?),
            Input::Help => print_help(),
            Input::Unknown(line) => println!("  ⚠️  Unknown command: {line} (try /help)\n"),
        }
    }

    info!(
        session_id = %state.id(),
        turns = state.conversation().len(),
        materials = state.counters().materials_generated,
        "Session ended"
    );
    println!();
    println!("  Kwaheri! 👋");
    println!();
    Ok(())
}

/// Apply a selection, keeping the current state when it is rejected.
fn transition(state: SessionState, event: SessionEvent) -> SessionState {
    match state.clone().apply(event) {
        Ok(next) => next,
        Err(e) => {
            println!("  ⚠️  {e}\n");
            state
        }
    }
}

/// Submit one message and reveal the assistant turn.
async fn exchange(
    tutor: &Tutor,
    typing: &TypingEffect,
    state: &mut SessionState,
    text: &str,
) {
    eprint!("  Thinking...");
    let outcome = tutor.submit(state, text).await;
    eprint!("\r              \r");

    if let Some(reply) = outcome.assistant_text() {
        println!();
        print!("  Tutor > ");
        let mut stdout = std::io::stdout();
        typing
            .play(reply, |chunk| {
                print!("{chunk}");
                if let Err(e) = stdout.flush() {
                    debug!(error = %e, "Failed to flush stdout");
                }
            })
            .await;
        println!("\n");
    }
}

fn print_banner(tutor: &Tutor, state: &SessionState) {
    println!();
    println!("  ╔══════════════════════════════════════════════╗");
    println!("  ║     🎓 CBC AI Tutor: Kenyan Curriculum        ║");
    println!("  ╚══════════════════════════════════════════════╝");
    println!();
    println!("  Provider:  {}", tutor.provider_name());
    println!("  Model:     {}", tutor.model());
    println!("  Grade:     {} ({})", state.grade(), state.tier());
    println!("  Subject:   {}", state.subject());
    println!("  Role:      {}", state.role().title());
    println!();
    println!("  Type your message and press Enter. /help lists commands.");
    println!("  Type 'exit' or Ctrl+C to quit.");
    println!();
}

fn print_welcome(state: &SessionState) {
    if !state.conversation().is_empty() {
        return;
    }
    let welcome = guidance::welcome_message(state.role(), state.grade(), state.subject());
    for line in welcome.lines() {
        println!("  {line}");
    }
    println!();
}

fn print_selection(state: &SessionState) {
    println!(
        "  📚 {} · {} · {}\n",
        state.grade(),
        state.subject(),
        state.role().title()
    );
}

fn print_stats(state: &SessionState) {
    println!("  📊 Session Stats");
    println!("  Conversations:        {}", state.conversations());
    println!("  Materials generated:  {}", state.counters().materials_generated);
    println!("  Turns:                {}", state.conversation().len());
    println!("  Estimated tokens:     ~{}", state.conversation().estimated_tokens());
    println!("  Started:              {}", state.started_at().format("%Y-%m-%d %H:%M UTC"));
    println!("  Session:              {}", state.id());
    println!();
    println!("  ✨ What I can do:");
    for capability in CAPABILITIES {
        println!("    {capability}");
    }
    println!();
}

fn print_topics(state: &SessionState) {
    match curriculum::topics_for(state.subject(), state.grade()) {
        Topics::None => println!("  No key topics listed for {}.\n", state.subject()),
        topics => {
            println!("  Key topics for {} ({}):", state.subject(), state.grade());
            for topic in topics.as_slice() {
                println!("    • {topic}");
            }
            println!();
        }
    }
}

fn print_history(state: &SessionState) {
    if state.conversation().is_empty() {
        println!("  (no messages yet)\n");
        return;
    }
    for turn in state.conversation().turns() {
        let who = match turn.role {
            TurnRole::User => "You",
            TurnRole::Assistant => "Tutor",
        };
        println!("  [{}] {who} > {}", turn.timestamp.format("%H:%M:%S"), turn.content);
    }
    println!();
}

fn print_help() {
    println!("  Commands:");
    println!("    /grade N          switch grade (1-9)");
    println!("    /subject NAME     switch subject within the current tier");
    println!("    /role R           switch between teacher and student");
    println!("    /clear            clear the chat and reset stats");
    println!("    /stats            show session statistics");
    println!("    /topics           key topics for the current subject");
    println!("    /subjects         subjects offered in the current tier");
    println!("    /examples         example requests for your role");
    println!("    /example N        send example N");
    println!("    /history          show the conversation so far");
    println!("    /prompt           show the system prompt in use");
    println!("    /export           print the session as JSON");
    println!("    exit              leave");
    println!();
}

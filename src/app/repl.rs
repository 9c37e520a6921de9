use super::App;
use crate::ui::style::Palette;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

/// One parsed line of REPL input. Anything that is not a slash command is
/// an ordinary prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand<'a> {
    Prompt(&'a str),
    Sessions,
    Session(&'a str),
    New,
    Users,
    User(&'a str),
    Interrupt,
    Theme,
    Logs,
    Help,
    Quit,
    Empty,
    Unknown(&'a str),
}

impl<'a> ReplCommand<'a> {
    #[must_use]
    pub fn parse(input: &'a str) -> Self {
        let input = input.trim();
        if input.is_empty() {
            return Self::Empty;
        }
        let Some(command) = input.strip_prefix('/') else {
            return Self::Prompt(input);
        };

        let (name, argument) = match command.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (command, ""),
        };
        match (name, argument) {
            ("sessions", _) => Self::Sessions,
            ("session", id) if !id.is_empty() => Self::Session(id),
            ("new", _) => Self::New,
            ("users", _) => Self::Users,
            ("user", id) if !id.is_empty() => Self::User(id),
            ("interrupt", _) => Self::Interrupt,
            ("theme", _) => Self::Theme,
            ("logs", _) => Self::Logs,
            ("help", _) => Self::Help,
            ("quit" | "exit", _) => Self::Quit,
            _ => Self::Unknown(command),
        }
    }
}

const HELP: &str = "\
/sessions          list sessions for the current user
/session <id>      switch to a session
/new               create a session
/users             list users
/user <id>         switch user
/interrupt         interrupt the running turn
/theme             toggle dark/light and persist it
/logs              show the session log
/help              this text
/quit              leave
anything else is sent as a prompt";

/// Interactive loop: read a line, dispatch, drain any queued question
/// presentations, repeat.
pub async fn run(app: &mut App) -> anyhow::Result<()> {
    let palette = Palette::new(app.theme());
    println!("{}", palette.dim("type /help for commands"));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("{} ", palette.accent("›"));
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        match ReplCommand::parse(&line) {
            ReplCommand::Prompt(text) => {
                // Failures are already rendered inside the conversation.
                let _ = app.submit_prompt(text).await;
                app.drain_asks().await;
            }
            ReplCommand::Sessions => report(&palette, app.load_sessions().await),
            ReplCommand::Session(id) => {
                let id = id.to_string();
                report(&palette, app.select_session(&id).await);
            }
            ReplCommand::New => report(&palette, app.create_session().await),
            ReplCommand::Users => {
                for user in app.users() {
                    println!(
                        "{}  {} (@{})",
                        palette.value(&user.id),
                        user.display_name,
                        user.username
                    );
                }
            }
            ReplCommand::User(id) => {
                let id = id.to_string();
                report(&palette, app.switch_user(&id).await);
            }
            ReplCommand::Interrupt => report(&palette, app.interrupt().await),
            ReplCommand::Theme => match app.toggle_theme() {
                Ok(theme) => println!("{}", palette.dim(&format!("theme: {theme}"))),
                Err(error) => println!("{}", palette.error(&error.to_string())),
            },
            ReplCommand::Logs => {
                for entry in app.conversation().logs() {
                    crate::ui::render::print_log(&palette, entry);
                }
            }
            ReplCommand::Help => println!("{}", palette.dim(HELP)),
            ReplCommand::Quit => break,
            ReplCommand::Empty => {}
            ReplCommand::Unknown(command) => {
                println!("{}", palette.error(&format!("unknown command: /{command}")));
            }
        }
    }
    Ok(())
}

fn report(palette: &Palette, outcome: crate::error::Result<()>) {
    if let Err(error) = outcome {
        println!("{}", palette.error(&error.to_string()));
    }
}

use clap::{Parser, Subcommand};

/// `parley` - terminal client for streaming agent chat sessions.
#[derive(Parser, Debug)]
#[command(name = "parley")]
#[command(version = "0.1.0")]
#[command(about = "Terminal client for streaming agent chat sessions.", long_about = None)]
pub struct Cli {
    /// Backend base URL (overrides the configured one)
    #[arg(long, global = true)]
    pub server: Option<String>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Interactive chat (the default)
    Chat,

    /// List sessions for a user and exit
    Sessions {
        /// User id to list sessions for
        #[arg(long)]
        user: String,
    },

    /// List users and exit
    Users,
}

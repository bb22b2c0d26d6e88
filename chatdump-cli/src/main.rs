use std::path::PathBuf;
use std::process::ExitCode;

use chatdump_core::{
    ConversationListItem, ConversationSelector, ExportBundle, ExportKind, conversation_to_raw_json,
    export_root, find_conversation, list_conversations, load_conversations, locate_bundle,
    render_export, render_terminal_view, write_export,
};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "chatdump",
    version,
    about = "Browse and export conversations from a chat data export"
)]
struct Cli {
    /// Export folder (or a parent of it); defaults to $CHATDUMP_EXPORT_DIR, then the current directory
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List conversations, newest first
    List {
        /// Only conversations whose name or message text contains this (case-insensitive)
        #[arg(long)]
        search: Option<String>,
    },

    /// Print one conversation as a markdown transcript
    Show {
        /// Conversation uuid or a unique prefix of it
        id: String,

        /// Print the condensed context brief instead of the transcript
        #[arg(long, conflicts_with_all = ["raw", "plain"])]
        brief: bool,

        /// Print the decoded conversation as JSON
        #[arg(long, conflicts_with = "plain")]
        raw: bool,

        /// Print a plain reading view with indented code blocks
        #[arg(long)]
        plain: bool,
    },

    /// Write a transcript or brief to a markdown file named after the conversation
    Export {
        /// Conversation uuid or a unique prefix of it
        id: String,

        /// Export the condensed context brief instead of the transcript
        #[arg(long)]
        brief: bool,

        /// Output directory
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },

    /// Summarize the export bundle
    Info,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli) -> chatdump_core::Result<()> {
    let root = export_root(cli.dir.as_deref())?;
    let bundle_dir = locate_bundle(&root)?;

    match cli.command {
        Command::List { search } => {
            let conversations = load_conversations(&bundle_dir)?;
            for conversation in list_conversations(&conversations, search.as_deref()) {
                let item = ConversationListItem::from_conversation(conversation);
                println!(
                    "{}  {}  {} messages  {}  {}",
                    item.uuid,
                    item.updated,
                    item.message_count,
                    item.token_label(),
                    item.name
                );
            }
        }
        Command::Show {
            id,
            brief,
            raw,
            plain,
        } => {
            let selector = ConversationSelector::parse(&id)?;
            let conversations = load_conversations(&bundle_dir)?;
            let conversation = find_conversation(&conversations, &selector)?;

            let output = if raw {
                conversation_to_raw_json(conversation)?
            } else if plain {
                render_terminal_view(conversation)
            } else {
                render_export(conversation, export_kind(brief))
            };
            print!("{output}");
        }
        Command::Export { id, brief, out } => {
            let selector = ConversationSelector::parse(&id)?;
            let conversations = load_conversations(&bundle_dir)?;
            let conversation = find_conversation(&conversations, &selector)?;

            let path = write_export(conversation, export_kind(brief), &out)?;
            println!("{}", path.display());
        }
        Command::Info => {
            let bundle = ExportBundle::load(&bundle_dir)?;
            let messages: usize = bundle
                .conversations
                .iter()
                .map(|conversation| conversation.message_count())
                .sum();

            println!("Bundle: {}", bundle.root.display());
            println!("Users: {}", bundle.users.len());
            println!("Projects: {}", bundle.projects.len());
            println!("Conversations: {}", bundle.conversations.len());
            println!("Messages: {messages}");
            println!("Memories: {}", bundle.memories.len());
        }
    }

    Ok(())
}

fn export_kind(brief: bool) -> ExportKind {
    if brief {
        ExportKind::Brief
    } else {
        ExportKind::Transcript
    }
}

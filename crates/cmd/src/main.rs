use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use cmd::commands;
use cmd::common::{ConfigOverrides, MemfsContext, read_text};
use memfs::FS;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "memfs")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// YAML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Key prefix labelling every stored key
    #[arg(long, global = true)]
    prefix: Option<String>,

    /// Tenant (agent session) whose namespace to use
    #[arg(long, global = true)]
    tenant: Option<String>,

    /// Namespace root every path must live under
    #[arg(long, global = true)]
    root: Option<String>,

    /// Sliding expiration in seconds for written files
    #[arg(long, global = true)]
    ttl: Option<u64>,

    /// JSON file holding the store contents between invocations
    #[arg(long, global = true)]
    snapshot: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a file with line numbers, or list a directory
    View {
        path: String,
        /// First line to show (1-based)
        #[arg(long, allow_negative_numbers = true)]
        start: Option<i64>,
        /// Last line to show, -1 for the end of the file
        #[arg(long, allow_negative_numbers = true)]
        end: Option<i64>,
    },
    /// Create a new file; never overwrites
    Create {
        path: String,
        /// File content
        #[arg(short, long)]
        text: Option<String>,
        /// Read file content from a host file instead
        #[arg(long, conflicts_with = "text")]
        from_file: Option<PathBuf>,
    },
    /// Replace the single occurrence of a string in a file
    StrReplace {
        path: String,
        old_str: String,
        new_str: String,
    },
    /// Insert text before a 0-based line index
    Insert {
        path: String,
        #[arg(allow_negative_numbers = true)]
        line: i64,
        #[arg(short, long)]
        text: Option<String>,
        #[arg(long, conflicts_with = "text")]
        from_file: Option<PathBuf>,
    },
    /// Delete a file or a directory and everything below it
    Delete { path: String },
    /// Move a file or directory
    Rename { old_path: String, new_path: String },
    /// Print every file path in the namespace
    Paths,
    /// Print the namespace as a tree
    Tree,
    /// Remove every file in the namespace
    Clear,
    /// Serve JSON commands from stdin, one per line, replying on stdout
    Session,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            config_file: self.config.clone(),
            prefix: self.prefix.clone(),
            tenant: self.tenant.clone(),
            root: self.root.clone(),
            ttl_seconds: self.ttl,
        }
    }
}

async fn dispatch(fs: &FS, command: Commands) -> Result<String> {
    match command {
        Commands::View { path, start, end } => {
            commands::view_command(fs, &path, commands::edit::view_range(start, end)).await
        }
        Commands::Create {
            path,
            text,
            from_file,
        } => {
            let text = read_text(text, from_file.as_deref())?;
            commands::create_command(fs, &path, &text).await
        }
        Commands::StrReplace {
            path,
            old_str,
            new_str,
        } => commands::str_replace_command(fs, &path, &old_str, &new_str).await,
        Commands::Insert {
            path,
            line,
            text,
            from_file,
        } => {
            let text = read_text(text, from_file.as_deref())?;
            commands::insert_command(fs, &path, line, &text).await
        }
        Commands::Delete { path } => commands::delete_command(fs, &path).await,
        Commands::Rename { old_path, new_path } => {
            commands::rename_command(fs, &old_path, &new_path).await
        }
        Commands::Paths => commands::paths_command(fs).await,
        Commands::Tree => commands::tree_command(fs).await,
        Commands::Clear => commands::clear_command(fs).await,
        Commands::Session => {
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            let mut stdout = tokio::io::stdout();
            _ = commands::session_command(fs, stdin, &mut stdout).await?;
            Ok(String::new())
        }
    }
}

#[allow(clippy::print_stdout)]
fn emit_output(output: &str) {
    if !output.is_empty() {
        println!("{output}");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    diagnostics::init();

    let cli = Cli::parse();
    let config = cli.overrides().resolve()?;
    let ctx = MemfsContext::new(config, cli.snapshot.clone());

    let (fs, store) = ctx.open()?;
    let result = dispatch(&fs, cli.command).await;
    ctx.finish(fs, &store).await?;

    emit_output(&result?);
    Ok(())
}

use anyhow::{Context, Result, bail};
use notebox_config::Config;
use notebox_engine::{NoteDraft, NoteId, NoteUpdate, Workspace};
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::{env, process};

const USAGE: &str = "\
Usage: notebox [--workspace <dir>] <command>

Commands:
  list                          List all notes
  show <id>                     Print a note
  new <title> [content]         Create a note (content read from stdin if omitted)
  edit <id> <title> [content]   Replace a note's title and content
  rm <id>                       Delete a note
  upload <file>                 Store an image in the workspace pictures folder
  config <dir>                  Remember <dir> as the default workspace";

/// Commands that operate on an open workspace
#[derive(Debug, PartialEq)]
enum WorkspaceCommand {
    List,
    Show(NoteId),
    New {
        title: String,
        content: Option<String>,
    },
    Edit {
        id: NoteId,
        title: String,
        content: Option<String>,
    },
    Remove(NoteId),
    Upload(PathBuf),
}

#[derive(Debug, PartialEq)]
enum Command {
    Workspace(WorkspaceCommand),
    /// Remember a default workspace; needs no workspace of its own
    SetWorkspace(PathBuf),
}

#[derive(Debug, PartialEq)]
struct Cli {
    workspace: Option<PathBuf>,
    command: Command,
}

fn parse_args(args: &[String]) -> Result<Cli> {
    let mut args = args.iter().map(String::as_str);
    let mut workspace = None;

    let mut next = args.next();
    if next == Some("--workspace") {
        let dir = args.next().context("--workspace needs a directory")?;
        workspace = Some(PathBuf::from(dir));
        next = args.next();
    }

    let rest: Vec<&str> = args.collect();
    if let (Some("config"), [dir]) = (next, rest.as_slice()) {
        return Ok(Cli {
            workspace,
            command: Command::SetWorkspace(PathBuf::from(dir)),
        });
    }

    let command = match (next, rest.as_slice()) {
        (Some("list"), []) => WorkspaceCommand::List,
        (Some("show"), [id]) => WorkspaceCommand::Show(parse_id(id)?),
        (Some("new"), [title]) => WorkspaceCommand::New {
            title: title.to_string(),
            content: None,
        },
        (Some("new"), [title, content]) => WorkspaceCommand::New {
            title: title.to_string(),
            content: Some(content.to_string()),
        },
        (Some("edit"), [id, title]) => WorkspaceCommand::Edit {
            id: parse_id(id)?,
            title: title.to_string(),
            content: None,
        },
        (Some("edit"), [id, title, content]) => WorkspaceCommand::Edit {
            id: parse_id(id)?,
            title: title.to_string(),
            content: Some(content.to_string()),
        },
        (Some("rm"), [id]) => WorkspaceCommand::Remove(parse_id(id)?),
        (Some("upload"), [file]) => WorkspaceCommand::Upload(PathBuf::from(file)),
        _ => bail!("{USAGE}"),
    };

    Ok(Cli {
        workspace,
        command: Command::Workspace(command),
    })
}

fn parse_id(arg: &str) -> Result<NoteId> {
    arg.parse()
        .with_context(|| format!("'{arg}' is not a valid note id"))
}

fn read_content(content: Option<String>, stdin: &mut impl Read) -> Result<String> {
    match content {
        Some(content) => Ok(content),
        None => {
            let mut buf = String::new();
            stdin
                .read_to_string(&mut buf)
                .context("Failed to read note content from stdin")?;
            Ok(buf)
        }
    }
}

fn run(
    workspace_root: &Path,
    command: WorkspaceCommand,
    out: &mut impl Write,
    stdin: &mut impl Read,
) -> Result<()> {
    let workspace = Workspace::open(workspace_root)
        .with_context(|| format!("Failed to open workspace {}", workspace_root.display()))?;
    let notes = workspace.notes();

    match command {
        WorkspaceCommand::List => {
            for note in notes.get_all() {
                writeln!(
                    out,
                    "{}\t{}\t{}",
                    note.id,
                    note.created_date.format("%Y-%m-%d %H:%M"),
                    note.title
                )?;
            }
        }
        WorkspaceCommand::Show(id) => {
            let note = notes
                .get_by_id(id)
                .with_context(|| format!("No note with id {id}"))?;
            writeln!(out, "# {}\n", note.title)?;
            write!(out, "{}", note.content)?;
        }
        WorkspaceCommand::New { title, content } => {
            let content = read_content(content, stdin)?;
            let note = notes.create(NoteDraft::new(title, content))?;
            writeln!(out, "Created note {}", note.id)?;
        }
        WorkspaceCommand::Edit { id, title, content } => {
            let content = read_content(content, stdin)?;
            notes.update(NoteUpdate::new(id, title, content))?;
            writeln!(out, "Updated note {id}")?;
        }
        WorkspaceCommand::Remove(id) => {
            notes.delete(id)?;
            writeln!(out, "Deleted note {id}")?;
        }
        WorkspaceCommand::Upload(path) => {
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let file = File::open(&path)
                .with_context(|| format!("Failed to open {}", path.display()))?;
            let reference = workspace.photos().upload(&file_name, file)?;
            writeln!(out, "{reference}")?;
        }
    }

    Ok(())
}

/// Saved paths are made absolute, since relative ones in the config file
/// are read relative to the file itself
fn save_workspace(dir: PathBuf) -> Result<()> {
    let cwd = env::current_dir().context("Failed to determine current directory")?;
    let config = Config::new(cwd.join(dir));
    config.save().context("Failed to save config")?;
    println!(
        "Saved workspace {} to {}",
        config.workspace_path.display(),
        Config::config_path().display()
    );
    Ok(())
}

fn try_main() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let cli = parse_args(&args)?;

    match cli.command {
        Command::SetWorkspace(dir) => save_workspace(dir),
        Command::Workspace(command) => {
            let workspace_root = Config::resolve_workspace(cli.workspace)?.path;
            run(
                &workspace_root,
                command,
                &mut io::stdout().lock(),
                &mut io::stdin().lock(),
            )
        }
    }
}

fn main() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Warn)
        .parse_default_env()
        .init();

    if let Err(e) = try_main() {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

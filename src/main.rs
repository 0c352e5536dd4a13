use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use abacus::engine::Shell;
use abacus::util::logger;

#[derive(Parser)]
#[command(name = abacus::NAME, version, about = "Interactive symbolic expression calculator")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a script file
    Run { file: PathBuf },
    /// Evaluate one submission and print its value
    Eval { code: String },
}

fn main() -> ExitCode {
    logger::init();
    let cli = Cli::parse();
    let result = match cli.command {
        Some(Commands::Run { file }) => run_script(&file),
        Some(Commands::Eval { code }) => eval_once(&code),
        None => repl(),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run_script(file: &Path) -> anyhow::Result<()> {
    let mut shell = Shell::new();
    if let Some(value) = shell.run_file(file)? {
        println!("{value}");
    }
    Ok(())
}

fn eval_once(code: &str) -> anyhow::Result<()> {
    let mut shell = Shell::new();
    if let Some(value) = shell.run(code)? {
        println!("{value}");
    }
    Ok(())
}

fn repl() -> anyhow::Result<()> {
    let mut shell = Shell::new();
    println!("{}", shell.greeting());

    let mut editor = DefaultEditor::new()?;
    let history = std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".abacus_history"));
    if let Some(path) = &history {
        // a missing history file on first start is fine
        let _ = editor.load_history(path);
    }

    loop {
        match editor.readline(":: ") {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                let _ = editor.add_history_entry(&line);
                match shell.run(&line) {
                    Ok(Some(value)) => println!("{value}"),
                    Ok(None) => {}
                    Err(err) => eprintln!("error: {err}"),
                }
            }
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(err) => return Err(err.into()),
        }
    }

    if let Some(path) = &history {
        let _ = editor.save_history(path);
    }
    Ok(())
}

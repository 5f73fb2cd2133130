use std::{error::Error, io::Write};

use clap::{Args, Parser, Subcommand};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    style::Print,
    terminal,
    terminal::ClearType,
};
use engine::{Engine, ShopInput, StageInput, WorkflowInput, users};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection, EntityTrait, Set};

/// Stages of the default workflow: name, role and semantic key.
const DEFAULT_STAGES: [(&str, &str, &str); 7] = [
    ("Idea", "pre_production", "idea"),
    ("Design", "pre_production", "design"),
    ("Materials Ready", "production", "materials_ready"),
    ("Build", "production", "build"),
    ("Finishing", "finishing", "finishing"),
    ("Completed", "fulfillment", "completed"),
    ("Cancelled", "fulfillment", "cancelled"),
];

#[derive(Parser, Debug)]
#[command(name = "shopops_admin")]
#[command(about = "Admin utilities for ShopOps (bootstrap users, shops and workflows)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./shopops.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
    Shop(Shop),
    Workflow(Workflow),
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    Create(UserCreateArgs),
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    username: String,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    first_name: Option<String>,
    #[arg(long)]
    last_name: Option<String>,
}

#[derive(Args, Debug)]
struct Shop {
    #[command(subcommand)]
    command: ShopCommand,
}

#[derive(Subcommand, Debug)]
enum ShopCommand {
    Create(ShopCreateArgs),
}

#[derive(Args, Debug)]
struct ShopCreateArgs {
    #[arg(long)]
    owner: String,
    #[arg(long)]
    name: String,
    #[arg(long, default_value = "USD")]
    currency: String,
    #[arg(long, default_value = "America/Chicago")]
    timezone: String,
}

#[derive(Args, Debug)]
struct Workflow {
    #[command(subcommand)]
    command: WorkflowCommand,
}

#[derive(Subcommand, Debug)]
enum WorkflowCommand {
    /// Creates the default workflow with its stages for the owner's shop.
    Seed(WorkflowSeedArgs),
}

#[derive(Args, Debug)]
struct WorkflowSeedArgs {
    #[arg(long)]
    owner: String,
    #[arg(long, default_value = "Default Workflow")]
    name: String,
}

struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> Result<Self, Box<dyn Error + Send + Sync>> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn prompt_password(prompt: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
    let _raw = RawModeGuard::enter()?;

    let mut out = std::io::stderr();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(prompt)
    )?;
    out.flush()?;

    let mut buf = String::new();
    loop {
        let Event::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            ..
        }) = event::read()?
        else {
            continue;
        };

        match code {
            KeyCode::Enter => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                break;
            }
            KeyCode::Backspace => {
                if buf.pop().is_some() {
                    execute!(out, cursor::MoveLeft(1), Print(" "), cursor::MoveLeft(1))?;
                    out.flush()?;
                }
            }
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                return Err("interrupted".into());
            }
            KeyCode::Char(ch) if !modifiers.contains(KeyModifiers::CONTROL) => {
                buf.push(ch);
                execute!(out, Print("*"))?;
                out.flush()?;
            }
            _ => {}
        }
    }

    Ok(buf)
}

/// Prints a one-line notice while the terminal may still be in raw mode.
fn notice(message: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
    let mut out = std::io::stderr();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(message),
        Print("\r\n")
    )?;
    out.flush()?;
    Ok(())
}

fn prompt_password_twice() -> Result<String, Box<dyn Error + Send + Sync>> {
    for _ in 0..3 {
        let first = prompt_password("Password: ")?;
        if first.trim().is_empty() {
            notice("Password must not be blank.")?;
            continue;
        }

        if prompt_password("Confirm password: ")? == first {
            return Ok(first);
        }
        notice("Passwords do not match, try again.")?;
    }

    Err("too many attempts".into())
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

fn default_workflow(name: String) -> WorkflowInput {
    WorkflowInput {
        name: Some(name),
        description: Some("Basic woodworking workflow".to_string()),
        is_default: Some(true),
        is_active: Some(true),
        stages: Some(
            DEFAULT_STAGES
                .iter()
                .zip(0..)
                .map(|(&(name, role, key), order)| StageInput {
                    role: Some(role.to_string()),
                    ..StageInput::new(name, order, key)
                })
                .collect(),
        ),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;

    match cli.command {
        Command::User(User {
            command: UserCommand::Create(args),
        }) => {
            let password = prompt_password_twice()?;

            if users::Entity::find_by_id(args.username.clone())
                .one(&db)
                .await?
                .is_some()
            {
                eprintln!("user already exists: {}", args.username);
                std::process::exit(1);
            }

            let user = users::ActiveModel {
                username: Set(args.username.clone()),
                password: Set(password),
                email: Set(args.email),
                first_name: Set(args.first_name),
                last_name: Set(args.last_name),
            };
            users::Entity::insert(user).exec(&db).await?;

            println!("created user: {}", args.username);
        }
        Command::Shop(Shop {
            command: ShopCommand::Create(args),
        }) => {
            let engine = Engine::builder().database(db.clone()).build().await?;
            let input = ShopInput::named(&args.name)
                .currency(args.currency)
                .timezone(args.timezone);
            let shop = engine.create_shop(&args.owner, input).await?;
            println!("created shop: {} ({})", shop.name, shop.id);
        }
        Command::Workflow(Workflow {
            command: WorkflowCommand::Seed(args),
        }) => {
            let engine = Engine::builder().database(db.clone()).build().await?;
            let workflow = engine
                .create_workflow(&args.owner, default_workflow(args.name))
                .await?;
            println!(
                "created workflow: {} ({} stages)",
                workflow.workflow.name,
                workflow.stages.len()
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn default_workflow_ends_with_terminal_stages() {
        let input = default_workflow("Default Workflow".to_string());
        let stages = input.stages.unwrap();
        assert_eq!(stages.len(), DEFAULT_STAGES.len());
        assert_eq!(stages[0].order, Some(0));
        assert_eq!(stages[5].key.as_deref(), Some("completed"));
        assert_eq!(stages[6].key.as_deref(), Some("cancelled"));
    }
}

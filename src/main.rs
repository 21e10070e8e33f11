use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tokio_stream::wrappers::ReceiverStream;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use dtm_reg::csv::{read_registrations, write_roster};
use dtm_reg::{
    Grade, JsonFileStore, Mutation, NewStudent, Roster, RosterSummary, StudentId, StudentRecord,
    Subject, filter_by_name,
};

const MASKED_DEBT: &str = "•••••";

#[derive(Parser, Debug)]
#[command(name = "dtm-reg", version, about = "DTM exam registration and fee tracking")]
struct Cli {
    /// Directory holding the roster file
    #[arg(long, global = true, env = "DTM_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Output machine-readable JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Register a new student
    Add {
        first_name: String,
        last_name: String,
        /// Grade: 1-9 or Abiturient
        #[arg(long)]
        grade: Grade,
        /// First exam subject, e.g. "Matematika" or "Ingliz tili"
        #[arg(long)]
        subject1: Subject,
        /// Second exam subject, must differ from the first
        #[arg(long)]
        subject2: Subject,
    },
    /// Mark a student's exam fee as paid
    Pay { id: StudentId },
    /// Delete a student from the roster
    Remove { id: StudentId },
    /// List registered students
    List {
        /// Filter by first or last name (case-insensitive substring)
        #[arg(long)]
        search: Option<String>,
        /// Hide debt figures
        #[arg(long)]
        mask: bool,
    },
    /// Show roster totals
    Summary {
        /// Hide debt figures
        #[arg(long)]
        mask: bool,
    },
    /// Register students in bulk from a csv file
    Import { file: PathBuf },
    /// Write the roster to stdout as csv
    Export,
}

#[derive(Serialize)]
struct JsonOut<T: Serialize> {
    ok: bool,
    data: T,
}

fn print_json<T: Serialize>(data: T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(&JsonOut { ok: true, data })?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("warn".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let data_dir = match cli.data_dir {
        Some(dir) => dir,
        None => default_data_dir()?,
    };
    let store = JsonFileStore::new(&data_dir);
    let mut roster = Roster::open(store).context("failed to load roster")?;

    match cli.command {
        Commands::Add {
            first_name,
            last_name,
            grade,
            subject1,
            subject2,
        } => {
            if first_name.is_empty() {
                bail!("first name must not be empty");
            }
            if last_name.is_empty() {
                bail!("last name must not be empty");
            }
            if subject1 == subject2 {
                bail!("subject2 must differ from subject1 ({subject1})");
            }

            let id = roster.register(NewStudent {
                first_name,
                last_name,
                grade,
                subject1,
                subject2,
            })?;
            let record = roster.get(id).context("registered student missing")?;
            if cli.json {
                print_json(record)?;
            } else {
                println!(
                    "Registered {} {} (id {})",
                    record.first_name, record.last_name, record.id
                );
            }
        }

        Commands::Pay { id } => {
            roster.mark_paid(id)?;
            if cli.json {
                print_json(roster.get(id).context("paid student missing")?)?;
            } else {
                println!("Marked {id} as paid");
            }
        }

        Commands::Remove { id } => {
            roster.remove(id)?;
            if cli.json {
                print_json(id)?;
            } else {
                println!("Removed {id}");
            }
        }

        Commands::List { search, mask } => {
            let query = search.unwrap_or_default();
            let filtered = filter_by_name(roster.students(), &query);
            if cli.json {
                print_json(&filtered)?;
            } else {
                render_table(&filtered, mask);
            }
        }

        Commands::Summary { mask } => {
            let summary = RosterSummary::of(roster.students());
            if cli.json {
                print_json(summary)?;
            } else {
                let debt = if mask {
                    MASKED_DEBT.to_string()
                } else {
                    format!("{} UZS", summary.total_debt)
                };
                println!("Jami o'quvchilar: {}", summary.total_students);
                println!(
                    "Umumiy qarzdorlik: {debt} ({} ta to'lanmagan)",
                    summary.unpaid_students
                );
            }
        }

        Commands::Import { file } => {
            if file.extension().is_none_or(|ext| ext != "csv") {
                warn!(path = %file.display(), "input file seems to not be a csv file");
            }
            let rows = read_registrations(file)?;

            let (tx_sender, tx_receiver) = tokio::sync::mpsc::channel(16);
            tokio::spawn(async move {
                for result in rows {
                    match result {
                        Ok(input) => {
                            if tx_sender.send(Mutation::Register(input)).await.is_err() {
                                break;
                            }
                        }
                        Err(e) => {
                            warn!("{e}");
                        }
                    }
                }
            });

            let before = roster.students().len();
            roster.run(ReceiverStream::new(tx_receiver)).await;
            let imported = roster.students().len() - before;
            if cli.json {
                print_json(imported)?;
            } else {
                println!("Imported {imported} students");
            }
        }

        Commands::Export => {
            write_roster(roster.students());
        }
    }

    Ok(())
}

fn default_data_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME is not set; pass --data-dir")?;
    Ok(PathBuf::from(home).join(".local").join("share").join("dtm-reg"))
}

fn render_table(students: &[&StudentRecord], mask: bool) {
    if students.is_empty() {
        println!("No students registered yet");
        return;
    }

    println!(
        "{:<36}  {:<12} {:<12} {:<10} {:<13} {:<13} {:<8} {:>10}",
        "Id", "First Name", "Last Name", "Grade", "Subject 1", "Subject 2", "Status", "Debt (UZS)"
    );
    for student in students {
        let status = if student.is_paid { "Paid" } else { "Unpaid" };
        let debt = if mask {
            MASKED_DEBT.to_string()
        } else {
            student.debt.to_string()
        };
        // width formatting needs plain strings, the domain Display impls do
        // not honor padding
        println!(
            "{:<36}  {:<12} {:<12} {:<10} {:<13} {:<13} {:<8} {:>10}",
            student.id.to_string(),
            student.first_name,
            student.last_name,
            student.grade.label(),
            student.subject1.label(),
            student.subject2.label(),
            status,
            debt
        );
    }
}

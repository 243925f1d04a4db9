use std::str::FromStr;
use std::sync::Arc;

use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use crs_core::{
    build_report, constants::DEFAULT_DATA_DIR, Actor, CoreConfig, FsStore, LifecycleService,
    PayloadView, RecordDraft, RecordKind, RecordStatus, RecordView, ReportIdentities, Role,
    StaticDirectory,
};
use crs_types::{ActorId, NonEmptyText, RecordId, SubjectId};

#[derive(Parser)]
#[command(name = "crs")]
#[command(about = "CRS clinical record lifecycle CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// The acting staff member, passed explicitly into every engine call.
#[derive(Args)]
struct ActorArgs {
    /// Role of the acting staff member (e.g. admin, doctor, laboratory_technician)
    #[arg(long)]
    role: String,
    /// Display name of the acting staff member
    #[arg(long = "actor-name")]
    actor_name: String,
    /// Stable identifier of the acting staff member (generated if omitted)
    #[arg(long = "actor-id")]
    actor_id: Option<String>,
}

impl ActorArgs {
    fn into_actor(self) -> Result<Actor, Box<dyn std::error::Error>> {
        let role = Role::from_str(&self.role)?;
        let id = match self.actor_id {
            Some(raw) => ActorId::from_str(&raw)?,
            None => ActorId::generate(),
        };
        let name = NonEmptyText::new(&self.actor_name)?;
        Ok(Actor::new(id, name, role))
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new record (ordering role or admin)
    Create {
        /// Record kind: laboratory_test or prescription
        kind: String,
        /// Patient identifier
        subject_id: String,
        /// Initial assignee (optional)
        #[arg(long)]
        assignee: Option<String>,
        /// Initial clinician notes (optional)
        #[arg(long)]
        notes: Option<String>,
        #[command(flatten)]
        actor: ActorArgs,
    },
    /// Show a record as seen by the acting staff member
    Show {
        record_id: String,
        #[command(flatten)]
        actor: ActorArgs,
    },
    /// List all records
    List {
        #[command(flatten)]
        actor: ActorArgs,
    },
    /// Update the result payload (and optionally the notes) of a record
    Update {
        record_id: String,
        payload: String,
        #[arg(long)]
        notes: Option<String>,
        #[command(flatten)]
        actor: ActorArgs,
    },
    /// Change the assignee of a record
    Assign {
        record_id: String,
        /// New assignee; omit to clear the assignment
        #[arg(long)]
        assignee: Option<String>,
        #[command(flatten)]
        actor: ActorArgs,
    },
    /// Request a status transition
    Transition {
        record_id: String,
        /// Target status: pending, in_progress, completed or cancelled
        target: String,
        #[command(flatten)]
        actor: ActorArgs,
    },
    /// Write the final payload and mark the record completed
    Complete {
        record_id: String,
        payload: String,
        #[command(flatten)]
        actor: ActorArgs,
    },
    /// Revert a completed record to pending (admin only)
    Revert {
        record_id: String,
        #[command(flatten)]
        actor: ActorArgs,
    },
    /// Print the plain-text audit report for a record
    Report {
        record_id: String,
        #[command(flatten)]
        actor: ActorArgs,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let data_dir = std::env::var("CRS_DATA_DIR").unwrap_or_else(|_| DEFAULT_DATA_DIR.into());
    let cfg = CoreConfig::new(data_dir.into())?;
    let service = LifecycleService::new(Arc::new(FsStore::new(&cfg)));

    match cli.command {
        Commands::Create {
            kind,
            subject_id,
            assignee,
            notes,
            actor,
        } => {
            let actor = actor.into_actor()?;
            let kind = RecordKind::from_str(&kind)?;
            let mut draft = RecordDraft::new(kind, SubjectId::from_str(&subject_id)?);
            draft.assigned_actor_id = assignee.as_deref().map(ActorId::from_str).transpose()?;
            draft.notes = notes;

            match service.create(&actor, draft) {
                Ok(record) => println!("Created {} with id {}", record.kind, record.id),
                Err(e) => eprintln!("Error creating record: {e}"),
            }
        }
        Commands::Show { record_id, actor } => {
            let actor = actor.into_actor()?;
            match service.load(RecordId::from_str(&record_id)?, &actor) {
                Ok(view) => print_view(&view),
                Err(e) => eprintln!("Error loading record: {e}"),
            }
        }
        Commands::List { actor } => {
            let actor = actor.into_actor()?;
            let views = service.list(&actor)?;
            if views.is_empty() {
                println!("No records found.");
            } else {
                for view in views {
                    println!(
                        "{}  {}  {}  updated {}",
                        view.id,
                        view.kind,
                        view.status,
                        view.updated_at.to_rfc3339()
                    );
                }
            }
        }
        Commands::Update {
            record_id,
            payload,
            notes,
            actor,
        } => {
            let actor = actor.into_actor()?;
            match service.update_payload(RecordId::from_str(&record_id)?, &actor, payload, notes)
            {
                Ok(record) => println!("Updated {} ({})", record.id, record.status),
                Err(e) => eprintln!("Error updating record: {e}"),
            }
        }
        Commands::Assign {
            record_id,
            assignee,
            actor,
        } => {
            let actor = actor.into_actor()?;
            let assignee = assignee.as_deref().map(ActorId::from_str).transpose()?;
            match service.assign(RecordId::from_str(&record_id)?, &actor, assignee) {
                Ok(record) => match record.assigned_actor_id {
                    Some(id) => println!("Assigned {} to {id}", record.id),
                    None => println!("Cleared assignment on {}", record.id),
                },
                Err(e) => eprintln!("Error assigning record: {e}"),
            }
        }
        Commands::Transition {
            record_id,
            target,
            actor,
        } => {
            let actor = actor.into_actor()?;
            let target = RecordStatus::from_str(&target)?;
            match service.transition_status(RecordId::from_str(&record_id)?, &actor, target) {
                Ok(record) => println!("Record {} is now {}", record.id, record.status),
                Err(e) => eprintln!("Error changing status: {e}"),
            }
        }
        Commands::Complete {
            record_id,
            payload,
            actor,
        } => {
            let actor = actor.into_actor()?;
            match service.complete(RecordId::from_str(&record_id)?, &actor, payload) {
                Ok(record) => println!("Record {} is now {}", record.id, record.status),
                Err(e) => eprintln!("Error completing record: {e}"),
            }
        }
        Commands::Revert { record_id, actor } => {
            let actor = actor.into_actor()?;
            match service.revert(RecordId::from_str(&record_id)?, &actor) {
                Ok(record) => println!("Record {} reverted to {}", record.id, record.status),
                Err(e) => eprintln!("Error reverting record: {e}"),
            }
        }
        Commands::Report { record_id, actor } => {
            let actor = actor.into_actor()?;
            match service.load(RecordId::from_str(&record_id)?, &actor) {
                Ok(view) => {
                    let directory = StaticDirectory::new();
                    let identities = ReportIdentities::resolve(
                        &directory,
                        view.subject_id,
                        view.ordering_actor_id,
                        view.assigned_actor_id,
                    );
                    print!("{}", build_report(&view, &identities, &actor, Utc::now()));
                }
                Err(e) => eprintln!("Error building report: {e}"),
            }
        }
    }

    Ok(())
}

fn print_view(view: &RecordView) {
    println!("Record:      {}", view.id);
    println!("Kind:        {}", view.kind);
    println!("Status:      {}", view.status);
    println!("Patient:     {}", view.subject_id);
    println!("Ordered by:  {}", view.ordering_actor_id);
    match view.assigned_actor_id {
        Some(id) => println!("Assigned to: {id}"),
        None => println!("Assigned to: -"),
    }
    match &view.payload {
        PayloadView::Visible(payload) => println!("Results:     {payload}"),
        PayloadView::Restricted => println!("Results:     [access restricted]"),
        PayloadView::Absent => println!("Results:     No results available"),
    }
    match view.notes.as_deref() {
        Some(notes) => println!("Notes:       {notes}"),
        None => println!("Notes:       No notes provided"),
    }
    println!("Created:     {}", view.created_at.to_rfc3339());
    println!("Updated:     {}", view.updated_at.to_rfc3339());
}

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use certstudio::data_url::{DataUrl, DataUrlError};
use certstudio::firebase::{self, FirebaseConfig};
use certstudio::model::{NewTemplate, Requester, Template, Visibility};
use certstudio::services::backgrounds::{BackgroundProvisioner, GenerateError};
use certstudio::services::templates::{Scope, TemplateError, TemplateRepository};
use certstudio::store::StoreError;
use clap::{Args, Parser, Subcommand};
use designer::background::presets;
use designer::content::CertificateContent;
use designer::layout::Layout;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("missing user id; pass --uid or set CERTSTUDIO_UID")]
    MissingUid,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error("{0}\n{guidance}", guidance = .0.guidance())]
    Generate(#[from] GenerateError),
    #[error("generated image is not decodable: {0}")]
    Image(#[from] DataUrlError),
    #[error("failed to write {path}: {source}")]
    Write { path: PathBuf, source: std::io::Error },
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "certstudio", about = "Certificate studio template and background CLI")]
struct Cli {
    #[command(flatten)]
    identity: IdentityArgs,

    #[command(subcommand)]
    command: Command,
}

/// Who the store's access rules should see.
#[derive(Args, Debug)]
struct IdentityArgs {
    #[arg(long, global = true, env = "CERTSTUDIO_UID")]
    uid: Option<String>,

    #[arg(long, global = true, env = "CERTSTUDIO_EMAIL")]
    email: Option<String>,

    #[arg(long, global = true, env = "CERTSTUDIO_DISPLAY_NAME")]
    display_name: Option<String>,

    #[arg(long, global = true, env = "CERTSTUDIO_ID_TOKEN", hide_env_values = true)]
    id_token: Option<String>,
}

impl IdentityArgs {
    fn requester(&self) -> Option<Requester> {
        let mut requester = Requester::new(self.uid.clone()?);
        if let Some(email) = &self.email {
            requester = requester.with_email(email);
        }
        if let Some(name) = &self.display_name {
            requester = requester.with_display_name(name);
        }
        if let Some(token) = &self.id_token {
            requester = requester.with_id_token(token);
        }
        Some(requester)
    }

    fn require(&self) -> Result<Requester, CliError> {
        self.requester().ok_or(CliError::MissingUid)
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the built-in backgrounds as JSON.
    Presets,
    /// List templates in a scope.
    List {
        #[arg(long, default_value = "public", help = "public, mine or shared")]
        scope: Scope,
    },
    /// Generate a background from a prompt.
    Generate(GenerateArgs),
    /// Delete one of your templates and clean up its uploaded background.
    Delete { id: String },
}

#[derive(Args, Debug)]
struct GenerateArgs {
    prompt: String,

    #[arg(long, help = "Write the image to this file")]
    out: Option<PathBuf>,

    #[arg(long, help = "Save a template with this name using the generated background")]
    save_as: Option<String>,

    #[arg(long, default_value_t = false, requires = "save_as")]
    public: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt::init();
    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!(error = %e, "no .env loaded");
    }

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Presets => print_json(presets()),
        Command::List { scope } => run_list(&cli.identity, scope).await,
        Command::Generate(args) => run_generate(&cli.identity, args).await,
        Command::Delete { id } => run_delete(&cli.identity, &id).await,
    }
}

fn repository() -> Result<TemplateRepository, CliError> {
    let config = FirebaseConfig::from_env()?;
    let (documents, blobs) = firebase::connect(&config)?;
    Ok(TemplateRepository::new(Arc::new(documents), Arc::new(blobs)))
}

async fn run_list(identity: &IdentityArgs, scope: Scope) -> Result<(), CliError> {
    let requester = identity.requester();
    let templates = repository()?.list(scope, requester.as_ref()).await?;
    if templates.is_empty() {
        println!("no templates");
    }
    for template in &templates {
        println!("{}", summary_line(template));
    }
    Ok(())
}

async fn run_generate(identity: &IdentityArgs, args: GenerateArgs) -> Result<(), CliError> {
    // Resolve identity before spending a generation.
    let requester = match args.save_as {
        Some(_) => Some(identity.require()?),
        None => None,
    };

    let asset = BackgroundProvisioner::from_env().generate(&args.prompt).await?;
    println!("{} ({})", asset.name, asset.id);

    if let Some(path) = args.out {
        let image = DataUrl::parse(&asset.image_ref)?;
        tokio::fs::write(&path, &image.bytes)
            .await
            .map_err(|source| CliError::Write { path: path.clone(), source })?;
        println!("wrote {}", path.display());
    }

    if let (Some(name), Some(requester)) = (args.save_as, requester) {
        let visibility = if args.public { Visibility::Public } else { Visibility::Private };
        let template = NewTemplate {
            name,
            content: CertificateContent::default(),
            layout: Layout::default(),
            background: asset,
            visibility,
        };
        let id = repository()?.save(template, &requester).await?;
        println!("saved template {id}");
    }
    Ok(())
}

async fn run_delete(identity: &IdentityArgs, id: &str) -> Result<(), CliError> {
    let requester = identity.require()?;
    let outcome = repository()?.delete(id, &requester).await?;
    println!("deleted {id}; background: {outcome:?}");
    Ok(())
}

fn summary_line(template: &Template) -> String {
    let created = i128::from(template.created_at_epoch_millis)
        .checked_mul(1_000_000)
        .and_then(|nanos| OffsetDateTime::from_unix_timestamp_nanos(nanos).ok())
        .and_then(|at| at.format(&Rfc3339).ok())
        .unwrap_or_else(|| template.created_at_epoch_millis.to_string());
    let visibility = match &template.visibility {
        Visibility::Public => "public".to_owned(),
        Visibility::Private => "private".to_owned(),
        Visibility::SharedWith(emails) => format!("shared with {}", emails.len()),
    };
    format!("{}\t{created}\t{}\t{visibility}\t{}", template.id, template.owner_display_name, template.name)
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

use std::io::{self, Write};

use anyhow::{bail, Context, Result};
use fmcsync_core::auth::CredentialStore;
use fmcsync_core::models::object::IP_OBJECT_TYPE;
use fmcsync_core::models::{MappingAction, NewDynamicObject};
use fmcsync_core::snapshot::SnapshotAges;
use fmcsync_core::utils::{parse_address_list, strip_scheme};
use fmcsync_core::{Config, Credentials, FmcClient, Session, SnapshotStore, SyncTarget, Syncer, TokenCell};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Init,
    Sync(SyncTarget),
    Token,
    Mappings {
        object_id: String,
        action: MappingAction,
        addresses: Vec<String>,
    },
    CreateObject {
        name: String,
        description: Option<String>,
    },
    Rules {
        file: String,
    },
    Status,
    Help,
}

impl Command {
    /// Parse arguments, excluding the program name
    pub fn parse(args: &[String]) -> Result<Self> {
        let Some(first) = args.first() else {
            return Ok(Command::Help);
        };

        match first.as_str() {
            "init" => Ok(Command::Init),
            "sync" => {
                let target = args
                    .get(1)
                    .map(|s| s.parse::<SyncTarget>())
                    .transpose()?
                    .unwrap_or(SyncTarget::All);
                Ok(Command::Sync(target))
            }
            "token" => Ok(Command::Token),
            "mappings" => {
                let object_id = args
                    .get(1)
                    .filter(|s| !s.trim().is_empty())
                    .ok_or_else(|| anyhow::anyhow!("mappings: missing <object_id>"))?
                    .trim()
                    .to_string();
                let action = args
                    .get(2)
                    .ok_or_else(|| anyhow::anyhow!("mappings: missing <add|remove>"))?
                    .parse::<MappingAction>()?;
                let addresses = args
                    .get(3)
                    .map(|s| parse_address_list(s))
                    .unwrap_or_default();
                Ok(Command::Mappings {
                    object_id,
                    action,
                    addresses,
                })
            }
            "create-object" => {
                let name = args
                    .get(1)
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .ok_or_else(|| anyhow::anyhow!("create-object: missing <name>"))?;
                let description = Some(args[2..].join(" ")).filter(|d| !d.trim().is_empty());
                Ok(Command::CreateObject { name, description })
            }
            "rules" => {
                let file = args
                    .get(1)
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .ok_or_else(|| anyhow::anyhow!("rules: missing <policy file>"))?;
                Ok(Command::Rules { file })
            }
            "status" => Ok(Command::Status),
            "help" | "-h" | "--help" => Ok(Command::Help),
            other => bail!("Unknown command '{}'. Run `fmcsync help` for usage.", other),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::Init => "init",
            Command::Sync(_) => "sync",
            Command::Token => "token",
            Command::Mappings { .. } => "mappings",
            Command::CreateObject { .. } => "create-object",
            Command::Rules { .. } => "rules",
            Command::Status => "status",
            Command::Help => "help",
        }
    }
}

pub fn print_usage() {
    println!(
        "\
fmcsync - sync Firepower Management Center policies and objects to JSON

USAGE:
    fmcsync <command> [args]

COMMANDS:
    init                                   Configure host and credentials, discover the domain
    sync [policies|dynamic|static|all]     Fetch data and write snapshots (default: all)
    token                                  Authenticate and print an access token
    mappings <object_id> <add|remove> [ip,ip,...]
                                           Edit dynamic object mappings; remove without IPs clears all
    create-object <name> [description]     Create an IP-typed dynamic object
    rules <policy file>                    Print a policy's rules with resolved source/destination IPs
    status                                 Show snapshot ages and policy files

ENVIRONMENT:
    FMC_HOST, FMC_USERNAME, FMC_PASSWORD, FMC_VERIFY_SSL, FMC_DOMAIN_UUID
    FMCSYNC_DATA_DIR    Snapshot directory (default: ./data)
    FMCSYNC_LOG_DIR     Also write daily log files here
    RUST_LOG            Log filter (default: info)"
    );
}

pub async fn run(command: Command) -> Result<()> {
    match command {
        Command::Init => init().await,
        Command::Sync(target) => sync(target).await,
        Command::Token => token().await,
        Command::Mappings {
            object_id,
            action,
            addresses,
        } => mappings(&object_id, action, &addresses).await,
        Command::CreateObject { name, description } => {
            create_object(&name, description.as_deref()).await
        }
        Command::Rules { file } => rules(&file),
        Command::Status => status(),
        Command::Help => {
            print_usage();
            Ok(())
        }
    }
}

fn connect(config: &Config) -> Result<FmcClient> {
    let session = Session::new(config.credentials(), TokenCell::new())?;
    Ok(FmcClient::new(session, config.domain_uuid()?))
}

fn prompt(label: &str, default: Option<&str>) -> Result<String> {
    match default {
        Some(value) if !value.is_empty() => print!("{} [{}]: ", label, value),
        _ => print!("{}: ", label),
    }
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let input = input.trim();

    if input.is_empty() {
        Ok(default.unwrap_or_default().to_string())
    } else {
        Ok(input.to_string())
    }
}

fn prompt_yes_no(label: &str, default: bool) -> Result<bool> {
    let hint = if default { "Y/n" } else { "y/N" };
    print!("{} [{}]: ", label, hint);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(match input.trim().to_lowercase().as_str() {
        "" => default,
        answer => answer.starts_with('y'),
    })
}

async fn init() -> Result<()> {
    let mut config = Config::load()?;

    println!("\n=== fmcsync setup ===\n");
    let host = strip_scheme(&prompt("FMC host (IP or FQDN)", config.host.as_deref())?);
    let username = prompt("Username", config.username.as_deref())?;
    let password = rpassword::prompt_password("Password: ")?;
    let verify_ssl = prompt_yes_no("Verify TLS certificates?", config.verify_ssl)?;

    if host.is_empty() || username.is_empty() || password.is_empty() {
        bail!("Host, username and password are all required");
    }

    let session = Session::new(
        Credentials::new(host.clone(), username.clone(), password.clone(), verify_ssl),
        TokenCell::new(),
    )?;
    println!("\nAuthenticating against {}...", session.base_url());

    let domain_uuid = FmcClient::fetch_domain_uuid(&session)
        .await
        .context("Failed to discover domain UUID")?;
    println!("Domain UUID: {}", domain_uuid);

    if let Err(e) = CredentialStore::store(&username, &password) {
        warn!(error = %e, "Could not store password in keychain");
        println!("Password not stored in keychain; set FMC_PASSWORD for later runs.");
    }

    config.host = Some(host);
    config.username = Some(username);
    config.verify_ssl = verify_ssl;
    config.domain_uuid = Some(domain_uuid);
    config.save()?;

    println!("Configuration saved to {}\n", Config::config_path()?.display());
    Ok(())
}

async fn sync(target: SyncTarget) -> Result<()> {
    let config = Config::load()?;
    let client = connect(&config)?;
    let store = SnapshotStore::new(config.data_dir())?;

    info!(sync = %target, data_dir = %store.data_dir().display(), "Starting sync");
    let report = Syncer::new(&client, &store).run(target).await?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn token() -> Result<()> {
    let config = Config::load()?;
    let session = Session::new(config.credentials(), TokenCell::new())?;
    let token = session.obtain_token(false).await?;
    println!("{}", token);
    Ok(())
}

async fn mappings(object_id: &str, action: MappingAction, addresses: &[String]) -> Result<()> {
    let config = Config::load()?;
    let client = connect(&config)?;

    match (action, addresses.is_empty()) {
        (MappingAction::Remove, true) => {
            let removed = client.clear_mappings(object_id).await?;
            println!("Removed {} mappings from {}", removed.len(), object_id);
        }
        (MappingAction::Add, true) => bail!("No addresses given to add"),
        _ => {
            let response = client.update_mappings(object_id, action, addresses).await?;
            println!("Mappings updated ({}): {}", action, addresses.join(", "));
            if !response.is_null() {
                println!("{}", serde_json::to_string_pretty(&response)?);
            }
        }
    }
    Ok(())
}

async fn create_object(name: &str, description: Option<&str>) -> Result<()> {
    let config = Config::load()?;
    let store = SnapshotStore::new(config.data_dir())?;

    if store.dynamic_object_exists(name)? {
        bail!("Dynamic object '{}' already exists in the local snapshot", name);
    }

    let client = connect(&config)?;
    let created = client
        .create_dynamic_object(&NewDynamicObject {
            name: name.to_string(),
            object_type: IP_OBJECT_TYPE.to_string(),
            description: description.unwrap_or_default().to_string(),
        })
        .await?;

    println!("Created dynamic object '{}' (id {})", created.name, created.id);
    Ok(())
}

fn rules(file: &str) -> Result<()> {
    let config = Config::load()?;
    let store = SnapshotStore::new(config.data_dir())?;

    let Some(rules) = store.load_resolved_rules(file)? else {
        bail!("No rules file '{}'. Run `fmcsync status` to list policy files.", file);
    };
    println!("{}", serde_json::to_string_pretty(&rules)?);
    Ok(())
}

fn status() -> Result<()> {
    let config = Config::load()?;
    let store = SnapshotStore::new(config.data_dir())?;
    let ages = store.ages();

    println!("Data directory:   {}", store.data_dir().display());
    println!("Last updated:     {}", ages.last_updated());
    println!("Policy rules:     {}", SnapshotAges::describe(ages.policies));
    println!("Dynamic objects:  {}", SnapshotAges::describe(ages.dynamic_objects));
    println!("Static objects:   {}", SnapshotAges::describe(ages.static_objects));

    let files = store.policy_files()?;
    if !files.is_empty() {
        println!("\nPolicy files:");
        for file in files {
            println!("  {}", file);
        }
    }
    Ok(())
}

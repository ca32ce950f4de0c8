use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use steam_backlog::config::AppConfig;
use steam_backlog::library::{LinkRequest, ListQuery};
use steam_backlog::util::db::Db;
use steam_backlog::util::env;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "backlog", version, about = "Steam backlog admin CLI")]
struct Cli {
    /// Optional override for the database URL
    #[arg(long, global = true)]
    db_url: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
#[command(rename_all = "kebab-case")]
enum Commands {
    /// Apply pending database migrations
    Migrate,
    /// Create an account and print it
    CreateAccount {
        #[arg(long)]
        email: String,
    },
    /// Link a Steam identity from a profile URL or a raw SteamID64
    Link {
        #[arg(long)]
        account: i64,
        /// steamcommunity.com/id/<vanity> or /profiles/<steamid64>
        #[arg(long)]
        profile_url: Option<String>,
        #[arg(long)]
        steam_id: Option<String>,
    },
    /// Pull owned games and achievement completion from Steam
    Sync {
        #[arg(long)]
        account: i64,
    },
    /// Print one page of the stored library
    List {
        #[arg(long)]
        account: i64,
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        per_page: Option<u32>,
        /// name, playtime (alias usage) or completion
        #[arg(long)]
        sort: Option<String>,
        /// asc or desc
        #[arg(long)]
        order: Option<String>,
        #[arg(long)]
        tag: Option<String>,
        /// Sync from Steam before listing
        #[arg(long, default_value_t = false)]
        refresh: bool,
    },
    /// Set the backlog status of one title
    SetStatus {
        #[arg(long)]
        account: i64,
        #[arg(long)]
        appid: i64,
        #[arg(long)]
        status: String,
    },
    /// Replace the tags of one title
    SetTags {
        #[arg(long)]
        account: i64,
        #[arg(long)]
        appid: i64,
        #[arg(long, value_delimiter = ',')]
        tags: Vec<String>,
    },
}

impl Commands {
    /// Whether the command talks to the Steam Web API.
    fn needs_steam(&self) -> bool {
        match self {
            Commands::Link { .. } | Commands::Sync { .. } => true,
            Commands::List { refresh, .. } => *refresh,
            Commands::Migrate
            | Commands::CreateAccount { .. }
            | Commands::SetStatus { .. }
            | Commands::SetTags { .. } => false,
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("failed to encode output")?
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    steam_backlog::tracing::init_tracing("warn,steam_backlog=info")?;
    env::init_env();
    let cli = Cli::parse();

    let database_url = match cli.db_url {
        Some(url) => url,
        None => env::db_url()?,
    };
    let max_connections: u32 = env::env_parse("DB_MAX_CONNS", 4u32);
    let db = Db::connect(&database_url, max_connections).await?;

    if let Commands::Migrate = cli.command {
        db.migrate().await?;
        info!("migrate complete");
        return Ok(());
    }

    let config = AppConfig::load(cli.command.needs_steam())?;
    let library = steam_backlog::steam_library(config, &db)?;

    match cli.command {
        Commands::Migrate => {}
        Commands::CreateAccount { email } => {
            print_json(&library.create_account(&email).await?)?;
        }
        Commands::Link {
            account,
            profile_url,
            steam_id,
        } => {
            let request = LinkRequest {
                profile_url,
                steam_id64: steam_id,
            };
            let linked = library.linker.link_identity(account, &request).await?;
            println!("{linked}");
        }
        Commands::Sync { account } => {
            let items = library.synchronizer.sync(account).await?;
            info!(account, items = items.len(), "sync complete");
            print_json(&items)?;
        }
        Commands::List {
            account,
            page,
            per_page,
            sort,
            order,
            tag,
            refresh,
        } => {
            if refresh {
                library.synchronizer.sync(account).await?;
            }
            let query = ListQuery::new(
                library.config().query,
                page,
                per_page,
                sort.as_deref(),
                order.as_deref(),
                tag.as_deref(),
            );
            print_json(&library.query.list(account, &query).await?)?;
        }
        Commands::SetStatus {
            account,
            appid,
            status,
        } => {
            print_json(&library.update_status(account, appid, &status).await?)?;
        }
        Commands::SetTags {
            account,
            appid,
            tags,
        } => {
            print_json(&library.set_tags(account, appid, &tags).await?)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Commands {
        Cli::try_parse_from(std::iter::once("backlog").chain(args.iter().copied()))
            .unwrap()
            .command
    }

    #[test]
    fn only_steam_backed_commands_need_the_api_key() {
        assert!(parse(&["sync", "--account", "1"]).needs_steam());
        assert!(parse(&["link", "--account", "1", "--steam-id", "76561198000000000"]).needs_steam());
        assert!(parse(&["list", "--account", "1", "--refresh"]).needs_steam());

        assert!(!parse(&["list", "--account", "1"]).needs_steam());
        assert!(!parse(&["create-account", "--email", "a@b.c"]).needs_steam());
        assert!(!parse(&["set-status", "--account", "1", "--appid", "10", "--status", "Playing"])
            .needs_steam());
        assert!(!parse(&["set-tags", "--account", "1", "--appid", "10", "--tags", "coop,rpg"])
            .needs_steam());
        assert!(!parse(&["migrate"]).needs_steam());
    }
}

use std::process::ExitCode;

use catalog::{AppInput, Catalog, CatalogError, Price, StoreInput};
use clap::{Args, Parser, Subcommand};
use migration::{Migrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "miniapp_admin")]
#[command(about = "Admin utilities for the mini app catalog (bootstrap users, apps, stores)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./miniapp.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
    App(App),
    Store(Store),
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
    password: String,
    /// Allow the user into `/admin/`.
    #[arg(long)]
    staff: bool,
}

#[derive(Args, Debug)]
struct App {
    #[command(subcommand)]
    command: AppCommand,
}

#[derive(Subcommand, Debug)]
enum AppCommand {
    Create(AppCreateArgs),
}

#[derive(Args, Debug)]
struct AppCreateArgs {
    #[arg(long)]
    name: String,
    /// One of FR, SO, JR, SR, GR.
    #[arg(long)]
    category: String,
    #[arg(long, default_value = "0.00")]
    price: String,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    inactive: bool,
}

#[derive(Args, Debug)]
struct Store {
    #[command(subcommand)]
    command: StoreCommand,
}

#[derive(Subcommand, Debug)]
enum StoreCommand {
    Create(StoreCreateArgs),
}

#[derive(Args, Debug)]
struct StoreCreateArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    mother_company: String,
    #[arg(long)]
    contact_number: Option<String>,
    #[arg(long)]
    email: Option<String>,
    /// Id of an app the store carries; repeat for more.
    #[arg(long = "app")]
    apps: Vec<i32>,
}

async fn connect_db(database_url: &str) -> Result<DatabaseConnection, CatalogError> {
    let db = Database::connect(database_url).await?;
    Migrator::up(&db, None).await?;
    Ok(db)
}

async fn run(cli: Cli) -> Result<(), CatalogError> {
    let db = connect_db(&cli.database_url).await?;
    let catalog = Catalog::builder().database(db).build();

    match cli.command {
        Command::User(User {
            command: UserCommand::Create(args),
        }) => {
            let user = catalog
                .create_user(&args.username, &args.password, args.staff)
                .await?;
            let role = if user.is_staff { "staff user" } else { "user" };
            println!("created {role}: {} ({})", user.username, user.id);
        }
        Command::App(App {
            command: AppCommand::Create(args),
        }) => {
            let price: Price = args.price.parse()?;
            let app = catalog
                .create_app(AppInput {
                    name: args.name,
                    category: args.category,
                    image: None,
                    description: args.description,
                    is_active: !args.inactive,
                    price,
                })
                .await?;
            println!(
                "created app: {} ({}) [{}] {}",
                app.name,
                app.id,
                app.category.code(),
                app.price
            );
        }
        Command::Store(Store {
            command: StoreCommand::Create(args),
        }) => {
            let store = catalog
                .create_store(StoreInput {
                    name: args.name,
                    mother_company: args.mother_company,
                    contact_number: args.contact_number,
                    email: args.email,
                    app_ids: args.apps,
                })
                .await?;
            println!("created store: {} ({})", store.name, store.id);
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("miniapp_admin=warn,catalog=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!("command failed: {err:?}");
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn store_create_collects_repeated_apps() {
        let cli = Cli::try_parse_from([
            "miniapp_admin",
            "store",
            "create",
            "--name",
            "Corner",
            "--mother-company",
            "Acme",
            "--app",
            "1",
            "--app",
            "3",
        ])
        .unwrap();
        let Command::Store(Store {
            command: StoreCommand::Create(args),
        }) = cli.command
        else {
            panic!("expected store create");
        };
        assert_eq!(args.apps, vec![1, 3]);
        assert_eq!(args.email, None);
    }

    #[test]
    fn app_create_defaults_to_active_and_free() {
        let cli = Cli::try_parse_from([
            "miniapp_admin",
            "app",
            "create",
            "--name",
            "Todo",
            "--category",
            "FR",
        ])
        .unwrap();
        let Command::App(App {
            command: AppCommand::Create(args),
        }) = cli.command
        else {
            panic!("expected app create");
        };
        assert!(!args.inactive);
        assert_eq!(args.price.parse::<Price>().unwrap(), Price::ZERO);
    }

    #[test]
    fn user_create_requires_password() {
        let parsed = Cli::try_parse_from([
            "miniapp_admin",
            "user",
            "create",
            "--username",
            "admin",
        ]);
        assert!(parsed.is_err());
    }
}

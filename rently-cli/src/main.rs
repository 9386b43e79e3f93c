//! Rently CLI - property-rental management from the terminal
//!
//! Every command goes through the guarded router, so unauthenticated use is
//! bounced the same way the web views bounce to the login screen.

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

use rently_app::{
    LoginForm, PropertyForm, QueryState, RegisterForm, RentalForm, RentlyApp, Route, TenantForm,
    TenantUpdateForm, View,
};
use rently_core::{init_logging, RentlyConfig};

#[derive(Parser)]
#[command(name = "rently")]
#[command(about = "Manage properties, tenants and rentals")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and persist the session
    Login {
        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,
    },

    /// Create an owner account and log in
    Register {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,
    },

    /// End the session
    Logout,

    /// Show the logged-in user
    Whoami,

    /// Show aggregate statistics
    Dashboard,

    /// Manage properties
    Properties {
        #[command(subcommand)]
        command: PropertyCommands,
    },

    /// Manage tenants
    Tenants {
        #[command(subcommand)]
        command: TenantCommands,
    },

    /// Manage rentals
    Rentals {
        #[command(subcommand)]
        command: RentalCommands,
    },
}

#[derive(Subcommand)]
enum PropertyCommands {
    /// List your properties
    List,

    /// Add a property
    Add {
        #[arg(long)]
        name: String,

        #[arg(long)]
        address: String,

        #[arg(long)]
        price: f64,
    },

    /// Update a property
    Update {
        id: String,

        #[arg(long)]
        name: String,

        #[arg(long)]
        address: String,

        #[arg(long)]
        price: f64,
    },

    /// Delete a property
    Rm { id: String },
}

#[derive(Subcommand)]
enum TenantCommands {
    /// List your tenants
    List,

    /// Add a tenant account
    Add {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        phone: String,

        #[arg(long)]
        password: String,
    },

    /// Update a tenant
    Update {
        id: String,

        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        phone: String,
    },
}

#[derive(Subcommand)]
enum RentalCommands {
    /// List your rentals
    List,

    /// List rentals for one property
    ByProperty { property_id: String },

    /// Create a rental
    Add {
        #[arg(long)]
        property: String,

        #[arg(long)]
        tenant: String,

        /// Start date, YYYY-MM-DD
        #[arg(long)]
        start: String,

        /// Day of month the rent is due
        #[arg(long, default_value = "5")]
        due_day: u8,
    },

    /// Close a rental with an end date
    Finish {
        id: String,

        /// End date, YYYY-MM-DD
        #[arg(long)]
        end: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = RentlyConfig::load(cli.config.as_ref())?;
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    if let Err(e) = init_logging(&config.logging) {
        eprintln!("Warning: failed to initialize logging: {}", e);
    }

    let app = RentlyApp::new(config)?;
    app.initialize();
    debug!("Application initialized");

    match cli.command {
        Commands::Login { email, password } => {
            let next = app.auth().login(LoginForm { email, password }).await?;
            let user = app.session().user();
            match user {
                Some(user) => println!("Logged in as {} <{}>", user.name, user.email),
                None => println!("Logged in"),
            }
            println!("Continue at {}", next.path());
        }
        Commands::Register {
            name,
            email,
            password,
        } => {
            app.auth()
                .register(RegisterForm {
                    name,
                    email,
                    password,
                })
                .await?;
            println!("Account created, you are now logged in");
        }
        Commands::Logout => {
            app.auth().logout().await;
            println!("Logged out");
        }
        Commands::Whoami => match app.session().user() {
            Some(user) => println!("{} <{}> ({})", user.name, user.email, user.role),
            None => println!("Not logged in"),
        },
        Commands::Dashboard => {
            ensure_screen(&app, Route::Dashboard)?;
            let stats = app.dashboard().stats().await?;
            println!("Properties:  {} total, {} rented, {} available",
                stats.total_properties, stats.properties_rented, stats.properties_available);
            println!("Rentals:     {} total, {} active", stats.total_rentals, stats.active_rentals);
            println!("Tenants:     {}", stats.total_users);
            println!("Payments:    {} totalling {:.2}", stats.total_payments, stats.total_revenue);
        }
        Commands::Properties { command } => {
            ensure_screen(&app, Route::Properties)?;
            run_property_command(&app, command).await?;
        }
        Commands::Tenants { command } => {
            ensure_screen(&app, Route::Tenants)?;
            run_tenant_command(&app, command).await?;
        }
        Commands::Rentals { command } => {
            ensure_screen(&app, Route::Rentals)?;
            run_rental_command(&app, command).await?;
        }
    }

    Ok(())
}

/// Apply the route guard before running a screen command
fn ensure_screen(app: &RentlyApp, route: Route) -> Result<()> {
    match app.router().navigate(route) {
        View::Screen(current) if current == route => Ok(()),
        View::Screen(Route::Login) => {
            bail!("You are not logged in. Run 'rently login' first.")
        }
        View::AccessDenied => bail!("You do not have permission to access this screen."),
        View::Loading => bail!("Session state is still loading, try again."),
        View::Screen(other) => bail!("Unexpected redirect to {}", other.path()),
    }
}

async fn run_property_command(app: &RentlyApp, command: PropertyCommands) -> Result<()> {
    let screen = app.properties();
    match command {
        PropertyCommands::List => {
            let properties = screen.list().await?;
            if properties.is_empty() {
                println!("No properties yet");
                return Ok(());
            }
            for property in properties {
                println!(
                    "{}  {:<24} {:<32} {:>10.2}  {}",
                    property.id,
                    property.name,
                    property.address,
                    property.price,
                    if property.rented { "rented" } else { "available" }
                );
            }
        }
        PropertyCommands::Add {
            name,
            address,
            price,
        } => {
            let property = screen
                .create(PropertyForm {
                    name,
                    address,
                    price,
                })
                .await?;
            println!("Created property {}", property.id);
        }
        PropertyCommands::Update {
            id,
            name,
            address,
            price,
        } => {
            let property = screen
                .update(
                    &id,
                    PropertyForm {
                        name,
                        address,
                        price,
                    },
                )
                .await?;
            println!("Updated property {}", property.id);
        }
        PropertyCommands::Rm { id } => {
            screen.delete(&id).await?;
            println!("Deleted property {}", id);
        }
    }
    Ok(())
}

async fn run_tenant_command(app: &RentlyApp, command: TenantCommands) -> Result<()> {
    let screen = app.tenants();
    match command {
        TenantCommands::List => {
            let tenants = screen.list().await?;
            if tenants.is_empty() {
                println!("No tenants yet");
                return Ok(());
            }
            for tenant in tenants {
                println!(
                    "{}  {:<24} {:<28} {:<16} {}",
                    tenant.id,
                    tenant.name,
                    tenant.email,
                    tenant.phone_number,
                    if tenant.is_active { "active" } else { "inactive" }
                );
            }
        }
        TenantCommands::Add {
            name,
            email,
            phone,
            password,
        } => {
            let tenant = screen
                .create(TenantForm {
                    name,
                    email,
                    phone_number: phone,
                    password,
                })
                .await?;
            println!("Created tenant {}", tenant.id);
        }
        TenantCommands::Update {
            id,
            name,
            email,
            phone,
        } => {
            let tenant = screen
                .update(
                    &id,
                    TenantUpdateForm {
                        name,
                        email,
                        phone_number: phone,
                    },
                )
                .await?;
            println!("Updated tenant {}", tenant.id);
        }
    }
    Ok(())
}

async fn run_rental_command(app: &RentlyApp, command: RentalCommands) -> Result<()> {
    let screen = app.rentals();
    match command {
        RentalCommands::List => {
            let rentals = screen.list().await?;
            print_rentals(&rentals);
        }
        RentalCommands::ByProperty { property_id } => {
            match screen.by_property(&property_id).await? {
                QueryState::NotReady => println!("Pick a property first"),
                QueryState::Ready(rentals) => print_rentals(&rentals),
            }
        }
        RentalCommands::Add {
            property,
            tenant,
            start,
            due_day,
        } => {
            let rental = screen
                .create(RentalForm {
                    property_id: property,
                    tenant_id: tenant,
                    start_date: start,
                    due_day,
                })
                .await?;
            println!("Created rental {}", rental.id);
        }
        RentalCommands::Finish { id, end } => {
            let rental = screen.finish(&id, &end).await?;
            println!(
                "Finished rental {} on {}",
                rental.id,
                rental.end_date.as_deref().unwrap_or(&end)
            );
        }
    }
    Ok(())
}

fn print_rentals(rentals: &[rently_client::Rental]) {
    if rentals.is_empty() {
        println!("No rentals yet");
        return;
    }
    for rental in rentals {
        println!(
            "{}  property {:<12} from {}  due day {:>2}  {}",
            rental.id,
            rental.property_id,
            rental.start_date,
            rental.due_day,
            rental
                .end_date
                .as_deref()
                .map(|end| format!("ended {}", end))
                .unwrap_or_else(|| "active".to_string())
        );
    }
}

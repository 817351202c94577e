//! Команды командной строки. Каждая команда печатает результат в stdout;
//! уведомления выводит `main` после завершения.

mod admin;
mod concerts;

use anyhow::Result;
use clap::{Parser, Subcommand};

use concert_booking::{
    error::ClientError,
    models::{LoginForm, RegisterForm, User},
    AppContext,
};

#[derive(Debug, Parser)]
#[command(name = "concert-booking", version, about = "Concert catalog and ticket booking client")]
pub struct Cli {
    /// Адрес API (перекрывает API_BASE_URL).
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in and remember the session token
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "CONCERT_BOOKING_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account and sign in
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "CONCERT_BOOKING_PASSWORD", hide_env_values = true)]
        password: String,
        /// Repeat the password (defaults to --password)
        #[arg(long)]
        confirm_password: Option<String>,
        #[arg(long)]
        age: Option<u32>,
    },
    /// Forget the stored session
    Logout,
    /// Show the signed-in user
    Profile,
    /// Browse the concert catalog
    Concerts(concerts::ConcertsArgs),
    /// Book tickets for a concert
    Book {
        #[arg(long)]
        concert: i64,
        #[arg(long, default_value_t = 1)]
        tickets: u32,
    },
    /// List bookings (all of them for admins)
    Bookings {
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Manage concerts
    #[command(subcommand)]
    Admin(admin::AdminCommand),
}

pub async fn run(ctx: &AppContext, command: Command) -> Result<()> {
    match command {
        Command::Login { email, password } => login(ctx, &email, &password).await,
        Command::Register {
            name,
            email,
            password,
            confirm_password,
            age,
        } => {
            let confirm = confirm_password.unwrap_or_else(|| password.clone());
            let form = RegisterForm::new(&name, &email, &password, &confirm, age);
            register(ctx, form).await
        }
        Command::Logout => {
            ctx.session.logout()?;
            ctx.notifier.info("Logged out");
            Ok(())
        }
        Command::Profile => {
            let user = ctx.session.profile().await?;
            print_user(&user);
            Ok(())
        }
        Command::Concerts(args) => concerts::list(ctx, args).await,
        Command::Book { concert, tickets } => concerts::book(ctx, concert, tickets).await,
        Command::Bookings { page } => concerts::bookings(ctx, page).await,
        Command::Admin(command) => admin::run(ctx, command).await,
    }
}

async fn login(ctx: &AppContext, email: &str, password: &str) -> Result<()> {
    let form = LoginForm::new(email, password);
    match ctx.session.login(&form).await {
        Ok(user) => {
            println!("Welcome back, {}!", user.name);
            print_user(&user);
            Ok(())
        }
        Err(e) => Err(report_auth_error(ctx, e, "Login failed. Please try again.")),
    }
}

async fn register(ctx: &AppContext, form: RegisterForm) -> Result<()> {
    match ctx.session.register(&form).await {
        Ok(user) => {
            ctx.notifier
                .success(format!("Account created successfully! Welcome {}!", user.name));
            print_user(&user);
            Ok(())
        }
        Err(e) => Err(report_auth_error(ctx, e, "Registration failed. Please try again.")),
    }
}

fn report_auth_error(ctx: &AppContext, e: ClientError, fallback: &str) -> anyhow::Error {
    match &e {
        ClientError::InvalidForm(errors) => {
            for (field, message) in errors.iter() {
                println!("  {}: {}", field, message);
            }
        }
        other => {
            ctx.notifier.error(other.user_message(fallback));
        }
    }
    e.into()
}

fn print_user(user: &User) {
    println!("{} <{}>", user.name, user.email);
    println!("  id:   {}", user.id);
    println!("  role: {}", if user.is_admin() { "admin" } else { "user" });
    if user.age > 0 {
        println!("  age:  {}", user.age);
    }
}

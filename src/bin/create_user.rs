use std::{
    error::Error,
    io::{self},
    path::Path,
    process::exit,
};

use clap::Parser;
use rusqlite::Connection;

use budget_buddy::{
    PasswordHash, ValidatedPassword, create_user, initialize_db, set_display_name,
};

/// A utility for adding a member of the trip group.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long, env = "BUDGET_BUDDY_DB_PATH")]
    db_path: String,

    /// The name the user logs in with.
    #[arg(long)]
    username: String,

    /// The name their expenses are recorded under.
    ///
    /// If not set, the user is asked for one after logging in.
    #[arg(long)]
    display_name: Option<String>,

    /// Allow the user to record expenses on behalf of others.
    #[arg(long)]
    admin: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let db_path = Path::new(&args.db_path);
    validate_db_path(db_path);

    let username = args.username.trim();
    if username.is_empty() {
        print_error("Username cannot be empty.");
        exit(1);
    }

    let password_hash = match get_new_password_hash(username) {
        Some(password_hash) => password_hash,
        None => return Ok(()),
    };

    println!("Creating user {username} in {db_path:#?}");
    let conn = Connection::open(db_path)?;
    initialize_db(&conn)?;

    let user = create_user(username, password_hash, args.admin, &conn)?;

    if let Some(display_name) = args.display_name.as_deref().map(str::trim)
        && !display_name.is_empty()
    {
        set_display_name(user.id, display_name, &conn)?;
    }

    println!(
        "Created {}user {username} with ID {}.",
        if args.admin { "admin " } else { "" },
        user.id
    );

    Ok(())
}

fn validate_db_path(db_path: &Path) {
    match db_path.extension() {
        None => {
            print_error("Database path must include a file extension (e.g., 'trip.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            print_error("Database path must include a file extension (e.g., 'trip.db').");
            exit(1);
        }
        _ => {}
    }
}

fn get_new_password_hash(username: &str) -> Option<PasswordHash> {
    loop {
        println!();

        let first_password = match rpassword::prompt_password("Enter a password: ") {
            Ok(string) => string,
            Err(error) if error.kind() == io::ErrorKind::UnexpectedEof => {
                return None;
            }
            Err(error) => {
                print_error(format!("Could not read password from stdin: {error}"));
                return None;
            }
        };

        let password = match ValidatedPassword::new(&first_password, &[username]) {
            Ok(password) => password,
            Err(error) => {
                print_error(error);
                continue;
            }
        };

        let second_password = match rpassword::prompt_password("Enter the same password again: ") {
            Ok(string) => string,
            Err(error) if error.kind() == io::ErrorKind::UnexpectedEof => {
                return None;
            }
            Err(error) => {
                print_error(format!("Could not read password from stdin: {error}"));
                return None;
            }
        };

        if first_password != second_password {
            print_error("Passwords must match, try again.");
            continue;
        }

        match PasswordHash::new(password, PasswordHash::DEFAULT_COST) {
            Ok(password_hash) => return Some(password_hash),
            Err(error) => {
                print_error(format!("Could not hash password: {error}. Try again."));
                continue;
            }
        }
    }
}

fn print_error(error: impl ToString) {
    eprintln!("\x1b[31;1m{}\x1b[0m", error.to_string());
}

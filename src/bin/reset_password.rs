use std::{io, path::Path, process::ExitCode};

use clap::Parser;
use rusqlite::Connection;

use expense_tracker::{
    Error, PasswordHash, User, ValidatedPassword, get_user_by_email, parse_email, update_password,
};

/// A utility for changing the password for a registered user.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: String,

    /// The email of the user whose password should be changed.
    #[arg(long)]
    email: String,
}

fn main() -> ExitCode {
    let args = Args::parse();
    let db_path = Path::new(&args.db_path);

    if let Err(message) = validate_db_path(db_path) {
        print_error(message);
        return ExitCode::FAILURE;
    }

    let mut connection = match Connection::open(db_path) {
        Ok(connection) => connection,
        Err(error) => {
            print_error(format!("Could not open the database at {db_path:?}: {error}"));
            return ExitCode::FAILURE;
        }
    };

    let user = match get_user(&args.email, &connection) {
        Ok(user) => user,
        Err(error) => {
            print_error(error);
            return ExitCode::FAILURE;
        }
    };
    println!("Resetting password for {} ({})", user.name, user.email);

    let Some(password_hash) = get_new_password_hash(&user) else {
        return ExitCode::SUCCESS;
    };

    match set_password(&user, &password_hash, &mut connection) {
        Ok(()) => {
            println!("Password updated successfully!");
            ExitCode::SUCCESS
        }
        Err(error) => {
            print_error(format!("Could not update password: {error}"));
            ExitCode::FAILURE
        }
    }
}

fn get_user(raw_email: &str, connection: &Connection) -> Result<User, String> {
    let email = parse_email(raw_email).map_err(|error| error.to_string())?;

    match get_user_by_email(&email, connection) {
        Ok(user) => Ok(user),
        Err(Error::NotFound) => Err(format!("No user is registered with the email {email}.")),
        Err(error) => Err(format!("Could not load the user {email}: {error}")),
    }
}

fn validate_db_path(db_path: &Path) -> Result<(), String> {
    match db_path.extension() {
        Some(extension) if !extension.is_empty() => {}
        _ => {
            return Err(
                "Database path must include a file extension (e.g., 'my_database.db').".to_owned(),
            );
        }
    }

    if !db_path.is_file() {
        return Err(format!("File does not exist at {db_path:#?}!"));
    }

    Ok(())
}

fn prompt_password(prompt: &str) -> Option<String> {
    match rpassword::prompt_password(prompt) {
        Ok(string) => Some(string),
        Err(error) if error.kind() == io::ErrorKind::UnexpectedEof => None,
        Err(error) => {
            print_error(format!("Could not read password from stdin: {error}"));
            None
        }
    }
}

fn get_new_password_hash(user: &User) -> Option<PasswordHash> {
    let email = user.email.to_string();

    loop {
        println!();

        let first_password = prompt_password("Enter a new password: ")?;

        let password = match ValidatedPassword::new(&first_password, &[&email, &user.name]) {
            Ok(password) => password,
            Err(error) => {
                print_error(error);
                continue;
            }
        };

        let second_password = prompt_password("Enter the same password again: ")?;

        if first_password != second_password {
            print_error("Passwords must match, try again.");
            continue;
        }

        match PasswordHash::new(password, PasswordHash::DEFAULT_COST) {
            Ok(password_hash) => return Some(password_hash),
            Err(error) => {
                print_error(format!("Could not hash password: {error}. Try again."));
            }
        }
    }
}

fn print_error(error: impl ToString) {
    eprintln!(
        "\x1b[31;1m{}\x1b[0m",
        capitalise_first_char(&error.to_string())
    )
}

/// From https://crates.io/crates/capitalize
fn capitalise_first_char(string: &str) -> String {
    let mut chars = string.chars();
    let Some(first) = chars.next() else {
        return String::with_capacity(0);
    };
    first.to_uppercase().chain(chars).collect()
}

fn set_password(
    user: &User,
    password_hash: &PasswordHash,
    connection: &mut Connection,
) -> Result<(), Error> {
    let transaction = connection.transaction()?;
    update_password(user.id, password_hash, &transaction)?;
    transaction.commit()?;

    Ok(())
}

//! Account and session commands.

use secrecy::SecretString;

use vitrine_core::Role;
use vitrine_store::AppState;
use vitrine_store::services::users::NewUser;

/// Register a new account.
///
/// # Errors
///
/// Returns validation errors with every invalid field listed.
#[allow(clippy::print_stdout)]
pub fn register(
    state: &AppState,
    name: String,
    email: String,
    password: String,
    role: &str,
    phone: Option<String>,
    tax_id: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let role: Role = role.parse()?;
    let password = SecretString::from(password);

    let user = state.user_service().register(NewUser {
        name,
        email,
        password: password.clone(),
        password_confirmation: password,
        role,
        phone,
        tax_id,
    })?;

    println!("Registered {} <{}> as {}.", user.name, user.email, user.role);
    Ok(())
}

/// Sign in; the session record persists across invocations.
///
/// # Errors
///
/// Returns a uniform error on any authentication failure.
#[allow(clippy::print_stdout)]
pub fn login(
    state: &AppState,
    email: &str,
    password: String,
) -> Result<(), Box<dyn std::error::Error>> {
    let user = state.auth().login(email, &SecretString::from(password))?;
    println!("Signed in as {} ({}).", user.name, user.role);
    Ok(())
}

/// End the session. Safe to run while signed out.
///
/// # Errors
///
/// Returns an error only if the session store fails.
#[allow(clippy::print_stdout)]
pub fn logout(state: &AppState) -> Result<(), Box<dyn std::error::Error>> {
    state.auth().logout()?;
    println!("Signed out.");
    Ok(())
}

/// Show the signed-in user, if the session is still live.
///
/// # Errors
///
/// Returns an error only if the session store fails.
#[allow(clippy::print_stdout)]
pub fn whoami(state: &AppState) -> Result<(), Box<dyn std::error::Error>> {
    match state.auth().current_user()? {
        Some(user) => println!("{} <{}> ({})", user.name, user.email, user.role),
        None => println!("Not signed in."),
    }
    Ok(())
}

/// List every account. Admin only.
///
/// # Errors
///
/// Returns a permission error for non-admins.
#[allow(clippy::print_stdout)]
pub fn users(state: &AppState) -> Result<(), Box<dyn std::error::Error>> {
    let users = state.user_service().list_users()?;
    for user in &users {
        println!("{}  {:<25} <{}>  {}", user.id, user.name, user.email, user.role);
    }
    println!("{} accounts.", users.len());
    Ok(())
}

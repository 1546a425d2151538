//! Account commands.
//!
//! # Usage
//!
//! ```bash
//! medicart register -n "Rahim Uddin" -e rahim@example.com -p secret --phone 01700000000 --address Dhaka
//! medicart login -e rahim@example.com -p secret
//! medicart whoami
//! medicart logout
//! ```

use secrecy::SecretString;

use medicart_client::MediCart;
use medicart_client::api::Registration;
use medicart_core::Email;

use super::{CliError, Result};

/// Log in and remember the session.
pub async fn login(app: &mut MediCart, email: &str, password: String) -> Result<()> {
    let password = SecretString::from(password);
    let outcome = app.auth_mut().login(email.trim(), &password).await;
    if !outcome.is_success() {
        return Err(CliError::Auth(outcome.message().to_string()));
    }

    println!("{}", outcome.message());
    if let Some(user) = app.auth().current_user() {
        println!("Hello, {}", user.name);
    }
    Ok(())
}

/// New account fields, as typed by the user.
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: String,
    pub address: String,
}

/// Create an account.
pub async fn register(app: &MediCart, account: NewAccount) -> Result<()> {
    let registration = Registration {
        name: account.name,
        email: Email::parse(&account.email)?,
        password: SecretString::from(account.password),
        phone: account.phone,
        address: account.address,
    };

    let outcome = app.auth().register(&registration).await;
    if !outcome.is_success() {
        return Err(CliError::Auth(outcome.message().to_string()));
    }

    println!("{}", outcome.message());
    println!("You can now log in with `medicart login -e {}`", registration.email);
    Ok(())
}

/// Forget the session.
pub fn logout(app: &mut MediCart) {
    app.auth_mut().logout();
    println!("Logged out successfully!");
}

/// Print the logged-in user.
pub fn whoami(app: &MediCart) {
    let Some(user) = app.auth().current_user() else {
        println!("Not logged in");
        return;
    };

    println!("{} <{}>", user.name, user.email);
    if let Some(role) = &user.role {
        println!("  Role:    {role}");
    }
    if let Some(phone) = &user.phone {
        println!("  Phone:   {phone}");
    }
    if let Some(address) = &user.address {
        println!("  Address: {address}");
    }
}

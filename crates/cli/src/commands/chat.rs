//! Chat with the assistant.
//!
//! # Usage
//!
//! ```bash
//! medicart chat what are your opening hours
//! medicart chat --page cart.html do you deliver
//! ```

use medicart_client::MediCart;
use medicart_core::ChatSender;

/// Send one message and print the conversation.
pub async fn chat(app: &mut MediCart, message: &str, page: Option<String>) {
    let assistant = app.assistant_mut();
    if let Some(page) = page {
        assistant.set_current_page(page);
    }

    if assistant.send(message).await.is_none() {
        tracing::debug!("Empty chat message ignored");
    }

    for entry in assistant.messages() {
        let who = match entry.sender {
            ChatSender::User => "You",
            ChatSender::Bot => "MediCart",
        };
        println!("{who}: {}", entry.text);
    }
}

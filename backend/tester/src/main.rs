use client::{
    sanitize::sanitize,
    storage::MemoryStore,
    submit::{CancelToken, SubmitClient},
};
use flags::FlagSubmission;

#[tokio::main]
async fn main() {
    let submit_client = SubmitClient::new("http://localhost:8080", MemoryStore::new());

    let mut draft = FlagSubmission {
        name: sanitize("Test Participant"),
        flag1: sanitize("CTF{end-to-end}"),
        ..Default::default()
    };

    println!("Submitting: {:?}", draft);

    let outcome = submit_client.submit(&mut draft, &CancelToken::new()).await;

    println!("Outcome: {:?}", outcome);
    println!("Draft after attempt: {:?}", draft);
}

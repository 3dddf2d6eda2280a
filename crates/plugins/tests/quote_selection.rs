use std::sync::Arc;

use sentinel_core::config::QuoterConfig;
use sentinel_core::{IncomingMessage, InMemoryUserDirectory, QuoteConfig, UserInfo};
use sentinel_plugins::quoter::Quoter;

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}

async fn quoter() -> Quoter {
    let directory = Arc::new(InMemoryUserDirectory::new());
    directory.record(UserInfo { id: "U1".to_owned(), is_bot: false }).await;
    directory.record(UserInfo { id: "B1".to_owned(), is_bot: true }).await;
    Quoter::new(directory)
}

fn config(frequency: f64) -> QuoterConfig {
    QuoterConfig {
        enabled: true,
        quote_configs: vec![QuoteConfig::new(
            strings(&["make it so"]),
            frequency,
            strings(&["Make it so.", "Engage.", "Tea, Earl Grey, hot.", "Shut up, Wesley."]),
        )
        .expect("valid quote config")],
    }
}

#[tokio::test]
async fn command_answers_are_identical_for_an_edited_message() {
    let plugin = quoter().await.plugin(&config(0.1));
    let command = &plugin.commands()[0];

    let original =
        IncomingMessage::ambient("C1", "U1", "make it so", "1712345678.123456").addressed();
    let mut edited = original.clone();
    edited.normalized_text = "Make it so, please".to_owned();

    assert!(command.matches(&original).await);
    assert!(command.matches(&edited).await);
    assert_eq!(command.answer(&original), command.answer(&edited));
}

#[tokio::test]
async fn hear_action_answer_agrees_with_its_own_decision() {
    let plugin = quoter().await.plugin(&config(0.5));
    let hear = &plugin.hear_actions()[0];

    let mut decisions = Vec::new();
    for micros in 0..100 {
        let message = IncomingMessage::ambient(
            "C1",
            "U1",
            "ok, make it so",
            format!("1712345678.{micros:06}"),
        );
        let heard = hear.matches(&message).await;
        let again = hear.matches(&message).await;
        assert_eq!(heard, again);
        decisions.push(heard);

        if heard {
            let answer = hear.answer(&message).expect("quote answer");
            assert_eq!(Some(answer), hear.answer(&message));
        }
    }

    assert!(decisions.contains(&true) && decisions.contains(&false));
}

#[tokio::test]
async fn bots_are_ignored_by_both_registrations() {
    let plugin = quoter().await.plugin(&config(1.0));
    let message = IncomingMessage::ambient("C1", "B1", "make it so", "1.0");

    assert!(!plugin.hear_actions()[0].matches(&message).await);
    assert!(!plugin.commands()[0].matches(&message.clone().addressed()).await);
}

//! Integration tests against live LLM providers.

use strictly_arena::{ArenaConfig, LlmClient, LlmOracle, MoveOracle};
use strictly_rps::Move;

fn live_oracle() -> LlmOracle {
    dotenvy::dotenv().ok();
    let config = ArenaConfig::default();
    let llm = config
        .create_llm_config()
        .expect("provider API key not set");
    LlmOracle::new(LlmClient::new(llm), config.request_timeout())
}

#[tokio::test]
#[cfg_attr(not(feature = "api"), ignore)]
async fn test_live_move() {
    let oracle = live_oracle();
    let choice = oracle.request_move(&[]).await;
    assert!(Move::ALL.contains(&choice));
}

#[tokio::test]
#[cfg_attr(not(feature = "api"), ignore)]
async fn test_live_commentary() {
    let oracle = live_oracle();
    let text = oracle
        .request_commentary("Striker Wins!", Move::Rock, Move::Scissors)
        .await;
    assert!(!text.is_empty(), "Commentary should not be empty");
    eprintln!("Commentary: {}", text);
}

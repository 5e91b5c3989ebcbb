//! # Recipe Workflow Integration Tests
//!
//! The recommend → select → consume → dismiss cycle end to end, including
//! the unit-aware consumption scenarios and the exactly-once guarantee
//! under re-entrant dispatch.

mod mock;

use mock::MockService;
use pantry::config::CoreConfig;
use pantry::error::CoreError;
use pantry::inventory::StockItem;
use pantry::nutrition::Nutrients;
use pantry::recipe::RecipeCandidate;
use pantry::service::SufficiencyJudgement;
use pantry::session::{Action, ActionOutcome, Session};
use pantry::units::Unit;

fn candidate(name: &str, lines: &[&str], calories: f64) -> RecipeCandidate {
    RecipeCandidate {
        name: name.to_string(),
        nutrition: Nutrients { calories, protein: 25.0, carbs: 70.0, fat: 18.0 },
        ingredient_lines: lines.iter().map(|l| l.to_string()).collect(),
        steps: vec!["chop".to_string(), "cook".to_string()],
        external_search_query: format!("{name} recipe"),
        reason: None,
        missing_ingredients: None,
    }
}

async fn listing_session(service: &MockService, stock: &[(&str, f64, Unit)]) -> Session {
    let mut session = Session::new(CoreConfig::default());
    for (i, (name, quantity, unit)) in stock.iter().enumerate() {
        session
            .dispatch(
                service,
                Action::AddItem {
                    entry_id: format!("seed-{i}"),
                    item: StockItem::new(name, *quantity, *unit),
                },
            )
            .await
            .unwrap();
    }
    session
        .dispatch(service, Action::RequestRecommendations { request_id: "req-1".to_string() })
        .await
        .unwrap();
    session
}

#[tokio::test]
async fn test_recommendations_enter_listing() {
    let service = MockService::new();
    service.script_candidates(vec![
        candidate("onion soup", &["onion 150g"], 420.0),
        candidate("omelette", &["egg 3"], 350.0),
    ]);

    let session = listing_session(&service, &[("onion", 1.0, Unit::Count)]).await;
    assert_eq!(session.workflow().name(), "listing");
    assert_eq!(session.workflow().candidates().len(), 2);
    assert_eq!(service.recommend_calls(), 1);
}

#[tokio::test]
async fn test_cook_decrements_stock_with_count_rounding() {
    // One onion averages 200g; a 150g requirement leaves half an onion
    // of stock after the 0.5-count rounding rule.
    let service = MockService::new();
    service.script_candidates(vec![candidate("onion soup", &["onion 150g"], 420.0)]);
    let mut session = listing_session(&service, &[("onion", 1.0, Unit::Count)]).await;

    let outcome = session
        .dispatch(&service, Action::CookRecipe { index: 0 })
        .await
        .unwrap();

    match outcome {
        ActionOutcome::Cooked { recipe_name, warnings, status } => {
            assert_eq!(recipe_name, "onion soup");
            assert!(warnings.is_empty());
            assert_eq!(status.daily_average.calories, 420.0);
            assert_eq!(status.deficiency.calories, 2000.0 - 420.0);
        }
        other => panic!("expected Cooked, got {other:?}"),
    }

    assert_eq!(session.ledger().get("onion").unwrap().quantity, 0.5);
    assert_eq!(session.meal_history().len(), 1);
    assert_eq!(session.meal_history()[0].recipe_name, "onion soup");
    assert_eq!(session.workflow().name(), "committed");
    assert_eq!(session.workflow().focused().unwrap().name, "onion soup");
}

#[tokio::test]
async fn test_insufficient_stock_surfaces_shortage_without_mutation() {
    // Two eggs average 100g, short of the 150g requirement
    let service = MockService::new();
    service.script_candidates(vec![candidate("egg bake", &["egg 150g"], 380.0)]);
    let mut session = listing_session(&service, &[("egg", 2.0, Unit::Count)]).await;

    let err = session
        .dispatch(&service, Action::CookRecipe { index: 0 })
        .await
        .unwrap_err();

    match err {
        CoreError::InsufficientStock { shortages } => {
            assert_eq!(shortages.len(), 1);
            assert_eq!(shortages[0].name, "egg");
            assert_eq!(shortages[0].required, 150.0);
            assert_eq!(shortages[0].available, 100.0);
        }
        other => panic!("expected InsufficientStock, got {other:?}"),
    }

    // No mutation: stock, history and workflow state are untouched
    assert_eq!(session.ledger().get("egg").unwrap().quantity, 2.0);
    assert!(session.meal_history().is_empty());
    assert_eq!(session.workflow().name(), "listing");
}

#[tokio::test]
async fn test_reentrant_cook_mutates_exactly_once() {
    // The render loop replays the same cook gesture three times; the
    // decrement, the meal append and the advisory service call all happen
    // once.
    let service = MockService::new();
    service.script_candidates(vec![
        candidate("onion soup", &["onion 150g"], 420.0),
        candidate("omelette", &["egg 3"], 350.0),
        candidate("fried rice", &["rice 200g"], 520.0),
    ]);
    let mut session = listing_session(&service, &[("onion", 3.0, Unit::Count)]).await;

    let mut outcomes = Vec::new();
    for _ in 0..3 {
        outcomes.push(
            session
                .dispatch(&service, Action::CookRecipe { index: 0 })
                .await
                .unwrap(),
        );
    }

    assert_eq!(service.judge_calls(), 1);
    assert_eq!(session.meal_history().len(), 1);
    // 3 onions = 600g, minus 150g leaves 450g = 2.25 pieces -> 2.5 rounded
    assert_eq!(session.ledger().get("onion").unwrap().quantity, 2.5);
    // Every replay observed the identical outcome
    assert_eq!(outcomes[0], outcomes[1]);
    assert_eq!(outcomes[1], outcomes[2]);
}

#[tokio::test]
async fn test_absent_ingredient_blocks_at_the_sufficiency_check() {
    let service = MockService::new();
    service.script_candidates(vec![candidate(
        "onion soup",
        &["onion 150g", "parsley 5g"],
        420.0,
    )]);
    let mut session = listing_session(&service, &[("onion", 1.0, Unit::Count)]).await;

    let err = session.dispatch(&service, Action::CookRecipe { index: 0 }).await;
    assert!(matches!(err, Err(CoreError::InsufficientStock { .. })));
    assert_eq!(session.ledger().get("onion").unwrap().quantity, 1.0);
}

#[tokio::test]
async fn test_advisory_judgement_never_blocks_a_sufficient_cook() {
    let service = MockService::new();
    service.script_candidates(vec![candidate("onion soup", &["onion 150g"], 420.0)]);
    // The advisory service disagrees, and on a later call even fails
    service.script_judgement(SufficiencyJudgement {
        sufficient: false,
        missing_items: vec!["onion".to_string()],
    });
    let mut session = listing_session(&service, &[("onion", 1.0, Unit::Count)]).await;

    let outcome = session
        .dispatch(&service, Action::CookRecipe { index: 0 })
        .await
        .unwrap();
    assert!(matches!(outcome, ActionOutcome::Cooked { .. }));
}

#[tokio::test]
async fn test_advisory_failure_is_tolerated() {
    let service = MockService::new();
    service.script_candidates(vec![candidate("onion soup", &["onion 150g"], 420.0)]);
    service.fail_judge_with("service unreachable");
    let mut session = listing_session(&service, &[("onion", 1.0, Unit::Count)]).await;

    let outcome = session
        .dispatch(&service, Action::CookRecipe { index: 0 })
        .await
        .unwrap();
    assert!(matches!(outcome, ActionOutcome::Cooked { .. }));
}

#[tokio::test]
async fn test_malformed_ingredient_line_aborts_before_mutation() {
    let service = MockService::new();
    service.script_candidates(vec![candidate("mystery stew", &["salt to taste"], 300.0)]);
    let mut session = listing_session(&service, &[("onion", 1.0, Unit::Count)]).await;

    let err = session
        .dispatch(&service, Action::CookRecipe { index: 0 })
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Parse(_)));
    assert!(session.meal_history().is_empty());
    assert_eq!(session.workflow().name(), "listing");
}

#[tokio::test]
async fn test_cook_requires_listing_state() {
    let service = MockService::new();
    let mut session = Session::new(CoreConfig::default());

    let err = session
        .dispatch(&service, Action::CookRecipe { index: 0 })
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::InvalidTransition { state: "idle", .. }));
}

#[tokio::test]
async fn test_dismiss_returns_to_idle() {
    let service = MockService::new();
    service.script_candidates(vec![candidate("onion soup", &["onion 150g"], 420.0)]);
    let mut session = listing_session(&service, &[("onion", 1.0, Unit::Count)]).await;

    session.dispatch(&service, Action::CookRecipe { index: 0 }).await.unwrap();
    let outcome = session.dispatch(&service, Action::Dismiss).await.unwrap();
    assert_eq!(outcome, ActionOutcome::Dismissed);
    assert_eq!(session.workflow().name(), "idle");

    // Meal history survives the dismissal
    assert_eq!(session.meal_history().len(), 1);
}

#[tokio::test]
async fn test_new_candidate_list_opens_a_new_logical_action() {
    // "consume_recipe_0" completes once, then a fresh recommendation
    // arrives; the same trigger identity now describes a new gesture and
    // must execute again.
    let service = MockService::new();
    service.script_candidates(vec![candidate("onion soup", &["onion 150g"], 420.0)]);
    let mut session = listing_session(&service, &[("onion", 4.0, Unit::Count)]).await;

    session.dispatch(&service, Action::CookRecipe { index: 0 }).await.unwrap();
    assert_eq!(session.meal_history().len(), 1);

    service.script_candidates(vec![candidate("onion tart", &["onion 200g"], 510.0)]);
    session
        .dispatch(&service, Action::RequestRecommendations { request_id: "req-2".to_string() })
        .await
        .unwrap();
    assert_eq!(session.workflow().name(), "listing");

    session.dispatch(&service, Action::CookRecipe { index: 0 }).await.unwrap();
    assert_eq!(session.meal_history().len(), 2);
    assert_eq!(session.meal_history()[1].recipe_name, "onion tart");
    assert_eq!(service.judge_calls(), 2);
}

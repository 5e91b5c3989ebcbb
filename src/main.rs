use anyhow::Result;
use log::info;
use pantry::config::CoreConfig;
use pantry::error::CoreError;
use pantry::inventory::StockItem;
use pantry::nutrition::{Nutrients, NutritionStatus};
use pantry::openai::OpenAiClient;
use pantry::recipe::parse_requirement_line;
use pantry::session::{Action, ActionOutcome, Session};
use std::io::{self, BufRead, Write};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    info!("Starting pantry session");

    // Load environment variables from .env file
    dotenv::dotenv().ok();

    let config = CoreConfig::from_env();
    let service = OpenAiClient::from_env(&config)?;
    let mut session = Session::new(config);

    println!("pantry — type 'help' for commands");
    let stdin = io::stdin();
    let mut gesture = 0u64;

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        gesture += 1;

        let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
        let action = match command {
            "help" => {
                print_help();
                continue;
            }
            "quit" | "exit" => break,
            "stock" => {
                print_stock(&session);
                continue;
            }
            "status" => {
                print_status(session.status());
                continue;
            }
            "ingest" => Action::IngestText { input_id: gesture.to_string(), text: rest.to_string() },
            "add" => match parse_requirement_line(rest) {
                Ok(req) => Action::AddItem {
                    entry_id: gesture.to_string(),
                    item: StockItem::new(&req.name, req.quantity, req.unit),
                },
                Err(err) => {
                    println!("{err}");
                    continue;
                }
            },
            "remove" => Action::RemoveItem { entry_id: gesture.to_string(), name: rest.to_string() },
            "recommend" => Action::RequestRecommendations { request_id: gesture.to_string() },
            "focus" => Action::RequestDeficiencyRecipes { request_id: gesture.to_string() },
            "cook" => match rest.parse::<usize>() {
                Ok(index) => Action::CookRecipe { index },
                Err(_) => {
                    println!("usage: cook <candidate index>");
                    continue;
                }
            },
            "dismiss" => Action::Dismiss,
            other => {
                println!("Unknown command: {other}");
                continue;
            }
        };

        match session.dispatch(&service, action).await {
            Ok(outcome) => report(&session, outcome),
            Err(err) => report_error(&err),
        }
    }

    info!("Session ended");
    Ok(())
}

fn print_help() {
    println!("  ingest <free text>      stock ingredients described in text");
    println!("  add <name> <qty><unit>  stock one item, e.g. 'add onion 2' or 'add flour 500g'");
    println!("  remove <name>           drop an item from stock");
    println!("  stock                   show current stock");
    println!("  status                  show nutrition status");
    println!("  recommend               ask for recipe recommendations");
    println!("  focus                   ask for deficiency-focused recipes");
    println!("  cook <n>                consume candidate n");
    println!("  dismiss                 dismiss the cooked recipe");
    println!("  quit");
}

fn print_stock(session: &Session) {
    if session.ledger().is_empty() {
        println!("(stock is empty)");
        return;
    }
    for item in session.ledger().items() {
        let price = match item.unit_price {
            Some(p) => format!(" @ {p:.2}/{}", item.unit),
            None => String::new(),
        };
        println!("  {} {} {}{price}", item.name, item.quantity, item.unit);
    }
}

fn print_status(status: &NutritionStatus) {
    println!("Daily average over the last {} day(s):", status.period_days);
    print_nutrients("  average", &status.daily_average);
    print_nutrients("  target", &status.daily_target);
    print_nutrients("  deficiency", &status.deficiency);
}

fn print_nutrients(label: &str, n: &Nutrients) {
    println!(
        "{label}: {:.0} kcal, {:.1}g protein, {:.1}g carbs, {:.1}g fat",
        n.calories, n.protein, n.carbs, n.fat
    );
}

fn report(session: &Session, outcome: ActionOutcome) {
    match outcome {
        ActionOutcome::ItemsAdded { count } => println!("Stocked {count} item(s)"),
        ActionOutcome::ItemRemoved { existed: true } => println!("Removed"),
        ActionOutcome::ItemRemoved { existed: false } => println!("Nothing to remove"),
        ActionOutcome::ProfileUpdated { target } => print_nutrients("new target", &target),
        ActionOutcome::CandidatesReceived { count } => {
            println!("{count} candidate(s):");
            for (i, candidate) in session.workflow().visible().iter().enumerate() {
                println!("  [{i}] {} ({:.0} kcal)", candidate.name, candidate.nutrition.calories);
            }
        }
        ActionOutcome::Cooked { recipe_name, warnings, status } => {
            println!("Cooked '{recipe_name}'");
            for warning in warnings {
                println!("  note: {warning}");
            }
            print_status(&status);
        }
        ActionOutcome::Dismissed => println!("Dismissed"),
    }
}

fn report_error(err: &CoreError) {
    match err {
        CoreError::InsufficientStock { shortages } => {
            println!("Not enough stock:");
            for s in shortages {
                println!(
                    "  {} needs {:.0}{} but only {:.0}{} available",
                    s.name, s.required, s.base, s.available, s.base
                );
            }
        }
        _ => println!("{err}"),
    }
}

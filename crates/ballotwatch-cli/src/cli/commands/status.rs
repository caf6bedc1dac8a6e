use crate::cli::args::StatusArgs;
use crate::cli::commands::{exit_codes, load_app_config};
use ballotwatch_core::completeness::CompletenessValidator;
use ballotwatch_core::model::DataStatus;
use ballotwatch_core::storage::Store;
use chrono::Utc;
use std::sync::Arc;

pub async fn run(args: StatusArgs) -> anyhow::Result<i32> {
    let cfg = load_app_config(args.config.as_deref())?;
    let db = args.db.unwrap_or_else(|| cfg.db_path.clone());

    let store = Store::open(&db)?;
    store.init_schema()?;

    let validator = CompletenessValidator::new(Arc::new(store), cfg.completeness.clone());
    let status = validator.verify(Utc::now()).await?;

    if args.format == "json" {
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        print_status(&status);
    }

    if status.is_comprehensive {
        Ok(exit_codes::OK)
    } else {
        Ok(exit_codes::GATE_FAILED)
    }
}

fn print_status(status: &DataStatus) {
    println!("Election data status");
    println!("  total:    {}", status.total_elections);
    println!("  federal:  {}", status.federal_elections);
    println!("  state:    {}", status.state_elections);
    println!("  local:    {}", status.local_elections);
    println!("  upcoming: {}", status.upcoming_elections);
    println!("  states:   {} covered", status.states_covered.len());

    if status.is_comprehensive {
        println!("✅ dataset is comprehensive");
    } else {
        println!("❌ dataset is not comprehensive:");
        for req in &status.missing_requirements {
            println!("   - {}", req);
        }
    }
}

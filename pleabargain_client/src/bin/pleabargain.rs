use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};
use pleabargain_client::{
    analysis::SimulatedAnalyzer,
    app::CaseApp,
    contract::{ContractInterface, FileContract, StaticProvider},
    wallet::LocalWallet,
    CaseDraft, CaseRecord, CaseStore, Config,
};
use std::path::PathBuf;
use std::sync::Arc;

/// PleaBargainFHE command line client
#[derive(Parser)]
#[clap(name = "pleabargain")]
#[clap(about = "PleaBargainFHE - confidential analysis of plea bargaining data")]
struct Args {
    /// Path to client configuration file
    #[clap(long, default_value = "config/pleabargain.yaml")]
    config_path: PathBuf,

    /// Contract snapshot file, overrides contract.data_file
    #[clap(long)]
    data_file: Option<PathBuf>,

    /// Wallet account that signs writes; reads only when absent
    #[clap(long)]
    account: Option<String>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List cases, newest first
    List {
        /// Case-insensitive match on crime type or jurisdiction
        #[clap(long, default_value = "")]
        search: String,

        /// Jurisdiction filter, or "all"
        #[clap(long, default_value = "all")]
        jurisdiction: String,
    },
    /// Show one case with its decoded details
    Show { id: String },
    /// Submit a new case
    Submit {
        #[clap(long)]
        jurisdiction: String,

        #[clap(long)]
        crime_type: String,

        #[clap(long)]
        outcome: String,

        #[clap(long, default_value = "")]
        details: String,
    },
    /// Run the simulated FHE fairness analysis on a case
    Analyze { id: String },
    /// Case statistics
    Stats,
    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut config = Config::load(Some(args.config_path.as_path()))?;
    if let Some(data_file) = args.data_file {
        config.contract.data_file = data_file;
    }

    if let Command::Config = args.command {
        print!("{}", config.to_yaml()?);
        return Ok(());
    }

    info!("Contract snapshot: {:?}", config.contract.data_file);
    let contract: Arc<dyn ContractInterface> =
        Arc::new(FileContract::open(&config.contract.data_file).await?);
    let provider = match &args.account {
        Some(_) => StaticProvider::new(contract),
        None => StaticProvider::reader_only(contract),
    };
    let store = CaseStore::new(Arc::new(provider), config.store.clone());
    let app = CaseApp::new(
        store,
        Arc::new(SimulatedAnalyzer::new(&config.analysis)),
        config.status.clone(),
    );

    if let Some(account) = &args.account {
        let wallet = Arc::new(LocalWallet::new(vec![account.clone()]));
        app.connect_wallet(wallet).await?;
    }
    app.init().await;

    match args.command {
        Command::List {
            search,
            jurisdiction,
        } => {
            app.set_search_term(search);
            app.select_jurisdiction(jurisdiction);
            let state = app.snapshot();
            let cases = state.filtered_cases();
            if cases.is_empty() {
                println!("No plea bargain cases found");
            }
            for case in cases {
                print_case_line(case);
            }
        }
        Command::Show { id } => {
            let case = app
                .store()
                .get(&id)
                .await?
                .ok_or_else(|| anyhow!("Case not found: {}", id))?;
            print_case_line(&case);
            match app.store().codec().decode(&case.payload) {
                Ok(draft) if !draft.details.is_empty() => println!("  details: {}", draft.details),
                Ok(_) => {}
                Err(e) => warn!("Could not decode payload of {}: {}", id, e),
            }
            println!("  analysis:");
            for line in case.analysis.lines() {
                println!("    {}", line);
            }
        }
        Command::Submit {
            jurisdiction,
            crime_type,
            outcome,
            details,
        } => {
            if !config.catalog.is_known_jurisdiction(&jurisdiction) {
                warn!("Unknown jurisdiction {:?}", jurisdiction);
            }
            if !config.catalog.is_known_crime_type(&crime_type) {
                warn!("Unknown crime type {:?}", crime_type);
            }
            app.open_create_form();
            app.update_draft(
                CaseDraft::new(jurisdiction, crime_type, outcome).with_details(details),
            );
            let result = app.submit_case().await;
            print_status(&app);
            let id = result?;
            println!("{}", id);
        }
        Command::Analyze { id } => {
            let result = app.run_analysis(&id).await;
            print_status(&app);
            result?;
        }
        Command::Stats => {
            let stats = app.snapshot().stats();
            println!("Total cases:   {}", stats.total);
            println!("Jurisdictions: {}", stats.jurisdiction_count());
            println!("Crime types:   {}", stats.crime_type_count());
            println!("FHE analyses:  {}", stats.analyzed);
            for (jurisdiction, count) in &stats.by_jurisdiction {
                println!("  {:<12} {}", jurisdiction, count);
            }
            for (crime_type, count) in &stats.by_crime_type {
                println!("  {:<12} {}", crime_type, count);
            }
        }
        // Printed before the contract was opened.
        Command::Config => {}
    }

    Ok(())
}

fn print_case_line(case: &CaseRecord) {
    let date = case
        .created_at_utc()
        .map(|t| t.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| case.created_at.to_string());
    println!(
        "{}  {}  {:<10} {:<12} {:<20} [{}]",
        case.id,
        date,
        case.jurisdiction,
        case.crime_type,
        case.outcome,
        case.analysis_state().name()
    );
}

fn print_status(app: &CaseApp) {
    let status = app.snapshot().status;
    if status.visible {
        println!("{}", status.message);
    }
}

//! researchdesk command implementations

use anyhow::{bail, Context, Result};
use std::io::Write;
use tracing::info;

use researchdesk_agent::{ResearchFacade, ResponseEnvelope};
use researchdesk_config::{self, Config};
use researchdesk_web::AppState;

async fn load_config() -> Result<Config> {
    Config::load().await.context("failed to load configuration")
}

fn print_envelope(envelope: &ResponseEnvelope) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(envelope)?);
    Ok(())
}

/// Write a default config file
pub async fn init_command() -> Result<()> {
    println!("◆ Initializing researchdesk...");

    let config = researchdesk_config::init().await?;

    println!(
        "\n◆ researchdesk initialized at {}",
        researchdesk_config::config_path().display()
    );
    println!("\nNext steps:");
    if !config.has_api_key() {
        println!("  - Set GROQ_API_KEY (environment, config/.env, configs/.env or the config file)");
        println!("    Get one at: https://console.groq.com/keys");
    }
    if config.news_api_key().is_none() {
        println!("  - Optionally set NEWS_API_KEY for news search (https://newsapi.org)");
    }
    println!("  - Ask something: researchdesk ask -q \"What is CRISPR?\"");

    Ok(())
}

/// Run one query, or read queries from stdin until `exit`
pub async fn ask_command(query: Option<String>) -> Result<()> {
    let config = load_config().await?;
    let facade = ResearchFacade::from_config(&config);

    if let Some(query) = query {
        let envelope = facade.search(&query).await;
        print_envelope(&envelope)?;
        if let Some(error) = envelope.error() {
            bail!("{}", error);
        }
        return Ok(());
    }

    println!("◆ Interactive mode (type 'exit' to quit)");

    loop {
        print!("◆ ");
        std::io::stdout().flush()?;

        let mut input = String::new();
        if std::io::stdin().read_line(&mut input)? == 0 {
            break;
        }

        let input = input.trim();
        if input.is_empty() {
            continue;
        }
        if input == "exit" || input == "quit" {
            break;
        }

        let envelope = facade.search(input).await;
        print_envelope(&envelope)?;
        println!();
    }

    Ok(())
}

/// Start the HTTP server
pub async fn serve_command(host: Option<String>, port: Option<u16>) -> Result<()> {
    let mut config = load_config().await?;
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    let state = AppState::from_config(&config);
    if let Some(e) = state.facade().init_error() {
        // Keep serving; requests get a "not initialized" envelope.
        info!("starting without a research agent: {}", e);
    }

    researchdesk_web::serve(&config.server.listen_addr(), state).await
}

/// Show configuration and credential status
pub async fn status_command(check: bool) -> Result<()> {
    let config_path = researchdesk_config::config_path();

    println!("◆ researchdesk status");
    println!(
        "Config:        {} {}",
        config_path.display(),
        if config_path.exists() {
            "[OK]"
        } else {
            "[Missing]"
        }
    );

    let config = load_config().await?;
    let set = |present: bool| if present { "[Set]" } else { "[Missing]" };

    println!("Agent:         {}", config.agent.name);
    println!("Model:         {}", config.default_model());
    println!("GROQ_API_KEY:  {}", set(config.has_api_key()));
    println!("NEWS_API_KEY:  {}", set(config.news_api_key().is_some()));
    println!("Listen:        {}", config.server.listen_addr());

    if !check {
        return Ok(());
    }

    println!("\n◆ Running health check...");
    let report = ResearchFacade::from_config(&config).health_check().await;
    println!("{}", serde_json::to_string_pretty(&report)?);

    if report.healthy {
        println!("\n◆ healthy");
        Ok(())
    } else {
        println!("\n◆ unhealthy");
        bail!(
            "health check failed: {}",
            report.error.as_deref().unwrap_or("answer too short")
        )
    }
}

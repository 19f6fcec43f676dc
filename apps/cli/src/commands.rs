//! CLI command definitions, routing, and tracing setup.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use descenhancer_core::{CategoryIndex, DescriptionGenerator};
use descenhancer_core::pipeline::{
    self, EnhanceConfig, EnhancePlan, EnhanceResult, ProgressReporter,
};
use descenhancer_generation::OpenAiGenerator;
use descenhancer_shared::{
    AppConfig, ProductRecord, Scope, api_key, config_file_path, init_config, load_config,
    load_config_from,
};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, info};

use crate::menu::{MainChoice, ProductChoice, Prompter};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// DescriptionEnhancer: rewrite product descriptions, one category at a time.
#[derive(Parser)]
#[command(
    name = "descenhancer",
    version,
    about = "Browse a product catalog by category and rewrite its descriptions with an LLM.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file (defaults to ~/.descenhancer/descenhancer.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Product catalog CSV (overrides `defaults.products_path`).
    #[arg(long, global = true)]
    pub products: Option<PathBuf>,

    /// Output CSV (overrides `defaults.output_path`).
    #[arg(long, global = true)]
    pub out: Option<PathBuf>,

    /// Defaults to the interactive menu.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Interactive menu.
    Menu,

    /// Print the numbered category tree.
    Categories {
        /// Emit index entries as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Enhance descriptions without the menu.
    Enhance {
        #[command(subcommand)]
        scope: EnhanceScope,

        /// Skip the confirmation prompt.
        #[arg(short, long, global = true)]
        yes: bool,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Which products `enhance` touches.
#[derive(Subcommand)]
pub(crate) enum EnhanceScope {
    /// Every product in the catalog.
    All,
    /// Products in one category.
    Category {
        /// Number from `descenhancer categories`.
        #[arg(long, conflicts_with = "label", required_unless_present = "label")]
        index: Option<usize>,

        /// Category label, matched against whole path segments.
        #[arg(long)]
        label: Option<String>,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs go to stderr; stdout belongs
/// to the menu.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "descenhancer=info",
        1 => "descenhancer=debug",
        _ => "descenhancer=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(io::stderr)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Resolved config plus the catalog and output paths for this invocation.
struct Session {
    config: AppConfig,
    products_path: PathBuf,
    output_path: PathBuf,
}

impl Session {
    fn from_cli(cli: &Cli) -> Result<Self> {
        let config = match &cli.config {
            Some(path) => load_config_from(path)?,
            None => load_config()?,
        };
        let products_path = cli
            .products
            .clone()
            .unwrap_or_else(|| PathBuf::from(&config.defaults.products_path));
        let output_path = cli
            .out
            .clone()
            .unwrap_or_else(|| PathBuf::from(&config.defaults.output_path));

        Ok(Self {
            config,
            products_path,
            output_path,
        })
    }

    fn load_products(&self) -> Result<Vec<ProductRecord>> {
        let records = descenhancer_catalog::load_products(&self.products_path)?;
        info!(
            path = %self.products_path.display(),
            records = records.len(),
            "catalog loaded"
        );
        Ok(records)
    }

    fn generator(&self) -> Result<OpenAiGenerator> {
        let key = api_key(&self.config)?;
        Ok(OpenAiGenerator::new(&self.config.openai, key)?)
    }

    fn enhance_config(&self) -> EnhanceConfig {
        EnhanceConfig {
            products_path: self.products_path.clone(),
            output_path: self.output_path.clone(),
            model: self.config.openai.model.clone(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    if let Some(Command::Config { action }) = &cli.command {
        return match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(&cli),
        };
    }

    let session = Session::from_cli(&cli)?;
    match cli.command.unwrap_or(Command::Menu) {
        Command::Menu => cmd_menu(&session).await,
        Command::Categories { json } => cmd_categories(&session, json),
        Command::Enhance { scope, yes } => cmd_enhance(&session, scope, yes).await,
        Command::Config { .. } => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

fn cmd_categories(session: &Session, json: bool) -> Result<()> {
    let records = session.load_products()?;
    let index = CategoryIndex::build(&records)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&categories_json(&index))?);
    } else if index.is_empty() {
        println!("No categories found in {}.", session.products_path.display());
    } else {
        print!("{}", index.render());
    }
    Ok(())
}

/// Nested tree plus the numbered entries `enhance category --index` accepts.
fn categories_json(index: &CategoryIndex) -> serde_json::Value {
    serde_json::json!({
        "tree": index.tree(),
        "entries": index.entries(),
    })
}

async fn cmd_enhance(session: &Session, scope: EnhanceScope, yes: bool) -> Result<()> {
    let records = session.load_products()?;

    let scope = match scope {
        EnhanceScope::All => Scope::All,
        EnhanceScope::Category {
            index: Some(chosen),
            ..
        } => {
            let index = CategoryIndex::build(&records)?;
            Scope::Category(index.resolve(chosen)?.to_string())
        }
        EnhanceScope::Category {
            label: Some(label), ..
        } => Scope::Category(label),
        EnhanceScope::Category { .. } => return Err(eyre!("pass --index or --label")),
    };

    let plan = EnhancePlan::new(&records, scope);
    if plan.is_empty() {
        println!("Nothing to enhance: no products in {}.", plan.scope);
        return Ok(());
    }

    // Fail on a missing key before asking for confirmation.
    let generator = session.generator()?;

    if !yes {
        let stdin = io::stdin();
        let mut prompter = Prompter::new(stdin.lock(), io::stdout());
        if !prompter.confirm(plan.len())? {
            println!("Enhancement cancelled.");
            return Ok(());
        }
    }

    let result = execute(session, &plan, &generator).await?;
    print_summary(&result);
    Ok(())
}

async fn cmd_menu(session: &Session) -> Result<()> {
    let stdin = io::stdin();
    let mut prompter = Prompter::new(stdin.lock(), io::stdout());

    prompter.say("Welcome to E-Commerce Description Enhancer")?;
    loop {
        match prompter.main_menu()? {
            MainChoice::Products => {
                product_loop(session, &mut prompter, &|| session.generator()).await?
            }
            MainChoice::Exit => {
                prompter.say("Exiting the program. Goodbye!")?;
                return Ok(());
            }
        }
    }
}

/// Product menu until "Back". `make_generator` runs only after a confirmed
/// choice.
async fn product_loop<R, W, G, F>(
    session: &Session,
    prompter: &mut Prompter<R, W>,
    make_generator: &F,
) -> Result<()>
where
    R: BufRead,
    W: Write,
    G: DescriptionGenerator,
    F: Fn() -> Result<G>,
{
    loop {
        let choice = prompter.product_menu()?;
        if choice == ProductChoice::Back {
            return Ok(());
        }

        // A failed action is reported; the operator stays in this menu.
        if let Err(e) = menu_enhance(session, prompter, choice, make_generator).await {
            error!(error = %e, "action failed");
            prompter.say(format!("Error: {e}"))?;
        }
    }
}

async fn menu_enhance<R, W, G, F>(
    session: &Session,
    prompter: &mut Prompter<R, W>,
    choice: ProductChoice,
    make_generator: &F,
) -> Result<()>
where
    R: BufRead,
    W: Write,
    G: DescriptionGenerator,
    F: Fn() -> Result<G>,
{
    let records = session.load_products()?;

    let scope = match choice {
        ProductChoice::All => Scope::All,
        ProductChoice::ByCategory => {
            let index = CategoryIndex::build(&records)?;
            if index.is_empty() {
                prompter.say("No categories found.")?;
                return Ok(());
            }
            match prompter.choose_category(&index)? {
                Some(label) => Scope::Category(label.to_string()),
                None => return Ok(()),
            }
        }
        ProductChoice::Back => return Ok(()),
    };

    let plan = EnhancePlan::new(&records, scope);
    match &plan.scope {
        Scope::All => prompter.say(format!("There are {} products to enhance.", plan.len()))?,
        Scope::Category(label) => prompter.say(format!(
            "There are {} products in the '{label}' category to enhance.",
            plan.len()
        ))?,
    }
    if plan.is_empty() {
        return Ok(());
    }

    if !prompter.confirm(plan.len())? {
        prompter.say("Enhancement cancelled.")?;
        return Ok(());
    }

    let generator = make_generator()?;
    let result = execute(session, &plan, &generator).await?;

    for row in &result.descriptions {
        prompter.say(format!(
            "Enhanced description for product '{}': {}",
            row.name, row.enhanced_description
        ))?;
    }
    match &result.scope {
        Scope::All => prompter.say("Product descriptions enhanced successfully.")?,
        Scope::Category(label) => prompter.say(format!(
            "Product descriptions in category '{label}' enhanced successfully."
        ))?,
    }
    prompter.say(format!("Saved to {}", result.output_path.display()))?;
    Ok(())
}

async fn execute<G: DescriptionGenerator>(
    session: &Session,
    plan: &EnhancePlan<'_>,
    generator: &G,
) -> Result<EnhanceResult> {
    let config = session.enhance_config();
    info!(scope = %plan.scope, records = plan.len(), "enhancing descriptions");

    let reporter = CliProgress::new(plan.len());
    match pipeline::enhance(&config, plan, generator, &reporter).await {
        Ok(result) => Ok(result),
        Err(e) => {
            reporter.abandon();
            Err(e.into())
        }
    }
}

fn print_summary(result: &EnhanceResult) {
    println!();
    println!("  Descriptions enhanced!");
    println!("  Run:      {}", result.run_id);
    println!("  Scope:    {}", result.scope);
    println!("  Products: {}", result.record_count);
    println!("  Output:   {}", result.output_path.display());
    println!("  Manifest: {}", result.manifest_path.display());
    println!("  Time:     {:.1}s", result.elapsed.as_secs_f64());
    println!();
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(cli: &Cli) -> Result<()> {
    let (path, config) = match &cli.config {
        Some(path) => (path.clone(), load_config_from(path)?),
        None => (config_file_path()?, load_config()?),
    };
    println!("# {}", path.display());
    println!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif bar.
struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    fn new(total: usize) -> Self {
        let bar = ProgressBar::new(total as u64);
        let style =
            ProgressStyle::with_template("{spinner:.cyan} [{pos}/{len}] {bar:30.cyan/blue} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style);
        bar.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { bar }
    }

    fn abandon(&self) {
        self.bar.abandon();
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.bar.set_message(name.to_string());
    }

    fn product_started(&self, name: &str, current: usize, _total: usize) {
        self.bar.set_position(current.saturating_sub(1) as u64);
        self.bar.set_message(name.to_string());
    }

    fn done(&self, result: &EnhanceResult) {
        self.bar.set_position(result.record_count as u64);
        self.bar.finish_and_clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    use descenhancer_shared::EnhancerError;

    #[test]
    fn no_subcommand_means_menu() {
        let cli = Cli::try_parse_from(["descenhancer"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn enhance_category_needs_index_or_label() {
        assert!(Cli::try_parse_from(["descenhancer", "enhance", "category"]).is_err());
        assert!(
            Cli::try_parse_from([
                "descenhancer", "enhance", "category", "--index", "2", "--label", "Signs"
            ])
            .is_err()
        );

        let cli = Cli::try_parse_from([
            "descenhancer", "enhance", "category", "--index", "2", "--yes",
        ])
        .unwrap();
        match cli.command {
            Some(Command::Enhance {
                scope: EnhanceScope::Category { index, label },
                yes,
            }) => {
                assert_eq!(index, Some(2));
                assert_eq!(label, None);
                assert!(yes);
            }
            _ => panic!("expected enhance category"),
        }
    }

    #[test]
    fn global_paths_override_config() {
        let dir = std::env::temp_dir().join(format!("descenhancer-cli-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let config = dir.join("descenhancer.toml");
        std::fs::write(&config, "[defaults]\nproducts_path = \"from-config.csv\"\n").unwrap();

        let cli = Cli::try_parse_from([
            "descenhancer",
            "categories",
            "--config",
            config.to_str().unwrap(),
            "--out",
            "elsewhere.csv",
        ])
        .unwrap();
        let session = Session::from_cli(&cli).unwrap();

        assert_eq!(session.products_path, PathBuf::from("from-config.csv"));
        assert_eq!(session.output_path, PathBuf::from("elsewhere.csv"));

        std::fs::remove_dir_all(&dir).ok();
    }

    // -- interactive product flow --

    type Generator = fn(&ProductRecord) -> descenhancer_shared::Result<String>;

    const CATALOG: &str = "\
name,short_description,description,categories
Hito,h,hito largo,Outdoor/Signs
Valla,v,valla larga,Outdoor/Fences
Cartel,c,cartel largo,Indoor/Signs
";

    fn rewrite(product: &ProductRecord) -> descenhancer_shared::Result<String> {
        Ok(format!("new {}", product.name))
    }

    fn fail_on_valla(product: &ProductRecord) -> descenhancer_shared::Result<String> {
        if product.name == "Valla" {
            Err(EnhancerError::generation(&product.name, "HTTP 500"))
        } else {
            Ok("ok".into())
        }
    }

    fn session(name: &str, catalog: &str) -> Session {
        let dir = std::env::temp_dir().join(format!(
            "descenhancer-menu-{name}-{}",
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        let products_path = dir.join("products.csv");
        std::fs::write(&products_path, catalog).unwrap();

        Session {
            config: AppConfig::default(),
            products_path,
            output_path: dir.join("out").join("enhanced_products.csv"),
        }
    }

    fn cleanup(session: &Session) {
        if let Some(dir) = session.products_path.parent() {
            std::fs::remove_dir_all(dir).ok();
        }
    }

    async fn drive<F>(session: &Session, input: &str, make_generator: F) -> String
    where
        F: Fn() -> Result<Generator>,
    {
        let mut prompter = Prompter::new(Cursor::new(input.as_bytes().to_vec()), Vec::new());
        product_loop(session, &mut prompter, &make_generator)
            .await
            .unwrap();
        String::from_utf8(prompter.into_output()).unwrap()
    }

    #[tokio::test]
    async fn category_count_then_cancel_leaves_no_output() {
        let session = session("cancel", CATALOG);

        let out = drive(&session, "2\n2\nno\n3\n", || {
            Err(eyre!("generator must not be built"))
        })
        .await;

        assert!(out.contains("There are 2 products in the 'Signs' category to enhance."));
        assert!(out.contains(
            "This action will enhance 2 products. Are you sure you want to proceed? (yes/no)"
        ));
        assert!(out.contains("Enhancement cancelled."));
        assert!(!out.contains("Error:"));
        assert_eq!(out.matches("Product Improvement Options:").count(), 2);
        assert!(!session.output_path.exists());

        cleanup(&session);
    }

    #[tokio::test]
    async fn confirmed_category_run_writes_and_returns_to_menu() {
        let session = session("category", CATALOG);

        let out = drive(&session, "2\n4\nyes\n3\n", || Ok(rewrite as Generator)).await;

        assert!(out.contains("There are 1 products in the 'Indoor' category to enhance."));
        assert!(out.contains("Enhanced description for product 'Cartel': new Cartel"));
        assert!(out.contains("Product descriptions in category 'Indoor' enhanced successfully."));
        assert_eq!(out.matches("Product Improvement Options:").count(), 2);

        let written = std::fs::read_to_string(&session.output_path).unwrap();
        assert_eq!(written, "name,enhanced_description\nCartel,new Cartel\n");

        cleanup(&session);
    }

    #[tokio::test]
    async fn failed_run_reports_error_and_stays_in_product_menu() {
        let session = session("failure", CATALOG);

        let out = drive(&session, "1\nyes\n3\n", || Ok(fail_on_valla as Generator)).await;

        assert!(out.contains("There are 3 products to enhance."));
        assert!(out.contains("Error: generation failed for 'Valla': HTTP 500"));
        assert!(!out.contains("enhanced successfully"));
        assert!(out.trim_end().ends_with("Enter your choice:"));
        assert_eq!(out.matches("Product Improvement Options:").count(), 2);
        assert!(!session.output_path.exists());

        cleanup(&session);
    }

    #[tokio::test]
    async fn missing_generator_is_reported_after_confirmation() {
        let session = session("no-key", CATALOG);

        let out = drive(&session, "1\nyes\n3\n", || {
            Err(eyre!("API key not found. Set the OPENAI_API_KEY environment variable."))
        })
        .await;

        assert!(out.contains("Error: API key not found."));
        assert_eq!(out.matches("Product Improvement Options:").count(), 2);

        cleanup(&session);
    }

    #[tokio::test]
    async fn empty_catalog_skips_confirmation() {
        let session = session("empty", "name,short_description,description,categories\n");

        let out = drive(&session, "1\n2\n3\n", || {
            Err(eyre!("generator must not be built"))
        })
        .await;

        assert!(out.contains("There are 0 products to enhance."));
        assert!(out.contains("No categories found."));
        assert!(!out.contains("Are you sure"));
        assert!(!out.contains("Error:"));

        cleanup(&session);
    }

    #[test]
    fn categories_json_has_tree_and_entries() {
        let records = vec![
            ProductRecord::new("a", "", "", "Outdoor/Signs"),
            ProductRecord::new("b", "", "", "Indoor"),
        ];
        let index = CategoryIndex::build(&records).unwrap();
        let json = categories_json(&index);

        assert_eq!(
            json["tree"],
            serde_json::json!([
                {"label": "Outdoor", "children": [{"label": "Signs"}]},
                {"label": "Indoor"}
            ])
        );
        assert_eq!(json["entries"][1]["index"], 2);
        assert_eq!(json["entries"][1]["label"], "Signs");
        assert_eq!(json["entries"][1]["depth"], 1);
    }
}

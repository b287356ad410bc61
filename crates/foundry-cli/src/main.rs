use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use foundry_core::config::{self, CONFIG_FILE_NAME, FoundryConfig};
use foundry_core::{LogDiagnostics, SpecEditor, SpecInput, SpecSource, TextFormat};
use foundry_gateway::iam::{gateway_assume_role_policy, s3_read_policy};
use foundry_gateway::provision::GatewayEndpoint;
use foundry_gateway::{
    Authorizer, BackendUnit, ContentEntry, Deferred, Function, Integration, ProvisionError,
    ProvisionedApi, Provisioner, RestApiArgs, RestApiRequest,
};

#[derive(Parser)]
#[command(name = "foundry", about = "OpenAPI composition for API Gateway", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge spec fragments in order and print the result
    Merge {
        /// Spec files (YAML or JSON); later files append lists and win conflicts
        #[arg(short, long = "input", required = true)]
        inputs: Vec<PathBuf>,

        /// Output format
        #[arg(long, default_value = "yaml")]
        format: OutputFormat,

        /// Remove keys matching this pattern before printing
        #[arg(long)]
        strip: Option<String>,
    },

    /// List the functions referenced by x-function-name
    Functions {
        /// Spec files merged in order
        #[arg(short, long = "input", required = true)]
        inputs: Vec<PathBuf>,
    },

    /// Remove keys matching a pattern and print the result
    Strip {
        /// Path to the spec file
        #[arg(short, long)]
        input: PathBuf,

        /// Pattern matched from the start of each key
        #[arg(short, long, default_value = "x-")]
        pattern: String,
    },

    /// Run the full build using the configured functions and write the spec
    Render {
        /// Config file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Print the gateway role policies for the configured content buckets
    Policy {
        /// Config file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Initialize a new foundry configuration
    Init {
        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Yaml,
    Json,
}

impl From<OutputFormat> for TextFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Yaml => TextFormat::Yaml,
            OutputFormat::Json => TextFormat::Json,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Merge {
            inputs,
            format,
            strip,
        } => cmd_merge(inputs, format, strip),

        Commands::Functions { inputs } => cmd_functions(inputs),

        Commands::Strip { input, pattern } => cmd_strip(input, pattern),

        Commands::Render { config } => cmd_render(config).await,

        Commands::Policy { config } => cmd_policy(config),

        Commands::Init { force } => cmd_init(force),

        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            clap_complete::generate(shell, &mut cmd, "foundry", &mut std::io::stdout());
            Ok(())
        }
    }
}

/// Load the config file, falling back to defaults when it is absent.
fn load_config(path: Option<PathBuf>) -> Result<FoundryConfig> {
    let explicit = path.is_some();
    let path = path.unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));
    match config::load_config(&path).map_err(|e| anyhow::anyhow!(e))? {
        Some(cfg) => {
            log::debug!("loaded config from {}", path.display());
            Ok(cfg)
        }
        None if explicit => anyhow::bail!("config file {} not found", path.display()),
        None => Ok(FoundryConfig::default()),
    }
}

fn load_editor(inputs: Vec<PathBuf>) -> Result<SpecEditor> {
    let sources: Vec<SpecSource> = inputs.into_iter().map(SpecSource::File).collect();
    SpecEditor::new(sources).context("failed to load spec")
}

fn cmd_merge(inputs: Vec<PathBuf>, format: OutputFormat, strip: Option<String>) -> Result<()> {
    let mut editor = load_editor(inputs)?;
    if let Some(pattern) = strip {
        editor.remove_attributes_by_pattern(&pattern)?;
    }
    print!("{}", editor.to_text(format.into())?);
    Ok(())
}

fn cmd_functions(inputs: Vec<PathBuf>) -> Result<()> {
    let editor = load_editor(inputs)?;
    for name in editor.get_function_names() {
        println!("{name}");
    }
    Ok(())
}

fn cmd_strip(input: PathBuf, pattern: String) -> Result<()> {
    let mut editor = load_editor(vec![input])?;
    editor.remove_attributes_by_pattern(&pattern)?;
    print!("{}", editor.to_yaml()?);
    Ok(())
}

/// Writes the rendered spec to disk in place of creating a live gateway.
struct FileProvisioner {
    output: PathBuf,
    format: TextFormat,
    region: String,
}

#[async_trait]
impl Provisioner for FileProvisioner {
    async fn create_rest_api(&self, request: RestApiRequest) -> Result<ProvisionedApi, ProvisionError> {
        let content = match self.format {
            TextFormat::Yaml => request.body.clone(),
            TextFormat::Json => SpecEditor::new(request.body.as_str())
                .and_then(|editor| editor.to_json())
                .map_err(|e| ProvisionError(e.to_string()))?,
        };
        write_output(&self.output, &content).map_err(|e| ProvisionError(format!("{e:#}")))?;
        eprintln!("  wrote {}", self.output.display());

        Ok(ProvisionedApi {
            id: request.name.clone(),
            execution_arn: format!(
                "arn:aws:execute-api:{}:000000000000:{}",
                self.region, request.name
            ),
        })
    }
}

fn write_output(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }
    fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))
}

fn build_args(cfg: &FoundryConfig) -> Result<RestApiArgs> {
    let function = |name: &str| -> Result<Arc<dyn BackendUnit>> {
        let f = cfg
            .functions
            .get(name)
            .with_context(|| format!("function '{name}' is not listed under `functions`"))?;
        let unit: Arc<dyn BackendUnit> =
            Arc::new(Function::resolved(name, &f.invoke_arn, &f.function_name));
        Ok(unit)
    };

    let specs: Vec<SpecSource> = cfg
        .specs
        .iter()
        .map(|s| SpecSource::File(PathBuf::from(s)))
        .collect();
    let mut args = RestApiArgs::new(
        &cfg.name,
        SpecInput::Many(specs),
        Deferred::resolved("gateway role ARN", &cfg.gateway_role_arn),
    );
    for i in &cfg.integrations {
        args.integrations
            .push(Integration::new(&i.path, &i.method, function(&i.function)?));
    }
    for a in &cfg.authorizers {
        args.authorizers
            .push(Authorizer::new(&a.name, a.kind, function(&a.function)?));
    }
    args.content = cfg.content.iter().cloned().map(ContentEntry::from).collect();
    args.strip_pattern = cfg.strip_pattern.clone();
    args.logging = cfg.logging;
    Ok(args)
}

async fn cmd_render(config: Option<PathBuf>) -> Result<()> {
    let cfg = load_config(config)?;
    let args = build_args(&cfg)?;
    let provisioner = FileProvisioner {
        output: PathBuf::from(&cfg.output),
        format: cfg.format,
        region: cfg.region.clone(),
    };

    eprintln!("Rendering {}", cfg.name);
    let built = foundry_gateway::build(args, &provisioner, LogDiagnostics::shared("foundry::build"))
        .await
        .with_context(|| format!("failed to build {}", cfg.name))?;

    let endpoint = if cfg.localstack {
        GatewayEndpoint::Localstack
    } else {
        GatewayEndpoint::Aws {
            region: cfg.region.clone(),
        }
    };
    eprintln!("  host: {}", built.host(&endpoint));
    for permission in &built.permissions {
        eprintln!("  permission: {} -> {}", permission.function_name, permission.source_arn);
    }
    Ok(())
}

fn cmd_policy(config: Option<PathBuf>) -> Result<()> {
    let cfg = load_config(config)?;
    let mut buckets: Vec<String> = Vec::new();
    for route in &cfg.content {
        if !buckets.contains(&route.bucket_name) {
            buckets.push(route.bucket_name.clone());
        }
    }
    let policies = serde_json::json!({
        "assume_role_policy": gateway_assume_role_policy(),
        "s3_access_policy": s3_read_policy(&buckets),
    });
    println!("{}", serde_json::to_string_pretty(&policies)?);
    Ok(())
}

fn cmd_init(force: bool) -> Result<()> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(&config_path, config::default_config_content())?;
    eprintln!("Created {}", config_path.display());
    Ok(())
}

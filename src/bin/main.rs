//! ASiC signer CLI
//!
//! Produces and checks detached CMS signatures with keys held in JKS or
//! PKCS#12 keystores, and manages the persistent signer configuration.

use clap::{Parser, Subcommand, ValueEnum};
use miette::{Context, IntoDiagnostic, Result};
use std::path::{Path, PathBuf};
use asic_signer::{
    adapters::keystore::JksWriter, AlgorithmRegistry, CmsSigner, CmsVerifier, ConfigManager,
    DigestAlgorithm, ExportFormat, KeyMaterialLoader, KeyStoreFormat, SignatureBlob,
    SignerConfiguration, VerificationPolicy,
};

#[derive(Parser)]
#[command(name = "asic-signer")]
#[command(about = "Detached CMS signatures for ASiC signed containers")]
#[command(long_about = "
ASiC Signer - detached CMS (PKCS#7) signing and verification

EXAMPLES:
    # Sign a file with the first key entry of a JKS keystore
    asic-signer sign manifest.xml -k signer.jks -o manifest.p7s

    # Sign with an explicit alias and SHA-256
    asic-signer sign manifest.xml -k signer.jks -a signer --digest sha256

    # Verify a detached signature
    asic-signer verify manifest.xml manifest.p7s

    # Convert a PKCS#12 file into a JKS keystore
    asic-signer keystore import identity.p12 -o signer.jks

ENVIRONMENT VARIABLES:
    ASIC_STORE_PASSWORD   Keystore password (name configurable)
    ASIC_KEY_PASSWORD     Key password, defaults to the keystore password
    RUST_LOG              Logging level (debug, info, warn, error)
")]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to the user config directory)
    #[arg(long, global = true, value_name = "FILE", env = "ASIC_SIGNER_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a detached signature over a file
    Sign {
        /// File to sign
        #[arg(value_name = "INPUT_FILE")]
        input_file: PathBuf,

        /// Signature output (defaults to INPUT_FILE.p7s)
        #[arg(short, long, value_name = "OUTPUT_FILE")]
        output: Option<PathBuf>,

        #[command(flatten)]
        keystore: KeystoreArgs,

        /// Key alias (defaults to the configured alias, then the first entry)
        #[arg(short, long)]
        alias: Option<String>,

        /// Digest algorithm (overrides config)
        #[arg(long, value_enum)]
        digest: Option<DigestArg>,

        /// Write the signature base64 encoded
        #[arg(long)]
        base64: bool,
    },

    /// Verify a detached signature against its content
    Verify {
        /// Signed content
        #[arg(value_name = "INPUT_FILE")]
        input_file: PathBuf,

        /// Detached signature (DER or base64)
        #[arg(value_name = "SIGNATURE_FILE")]
        signature: PathBuf,

        /// How multiple signers are combined (overrides config)
        #[arg(long, value_enum)]
        policy: Option<PolicyArg>,

        /// Show per-signer results and embedded certificates
        #[arg(short, long)]
        verbose: bool,
    },

    /// Keystore inspection and conversion
    #[command(subcommand)]
    Keystore(KeystoreCommands),

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(clap::Args)]
struct KeystoreArgs {
    /// Keystore file (overrides config)
    #[arg(short, long, value_name = "KEYSTORE")]
    keystore: Option<PathBuf>,

    /// Keystore format (detected when omitted)
    #[arg(long, value_enum)]
    format: Option<FormatArg>,
}

#[derive(Subcommand)]
enum KeystoreCommands {
    /// List aliases of a keystore
    List {
        #[command(flatten)]
        keystore: KeystoreArgs,
    },

    /// Import a PKCS#12 identity into a JKS keystore
    Import {
        /// PKCS#12 file to import
        #[arg(value_name = "PKCS12_FILE")]
        source: PathBuf,

        /// JKS keystore to write
        #[arg(short, long, value_name = "JKS_FILE")]
        output: PathBuf,

        /// Alias for the imported entry (defaults to the PKCS#12 alias)
        #[arg(short, long)]
        alias: Option<String>,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Create default configuration file
    Init,

    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,
        /// Configuration value
        value: String,
    },

    /// Export configuration
    Export {
        /// Export format
        #[arg(short, long, value_enum, default_value = "toml")]
        format: ExportFormatArg,
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(ValueEnum, Clone, Copy)]
enum DigestArg {
    Sha1,
    Sha256,
    Sha384,
    Sha512,
}

impl From<DigestArg> for DigestAlgorithm {
    fn from(arg: DigestArg) -> Self {
        match arg {
            DigestArg::Sha1 => DigestAlgorithm::Sha1,
            DigestArg::Sha256 => DigestAlgorithm::Sha256,
            DigestArg::Sha384 => DigestAlgorithm::Sha384,
            DigestArg::Sha512 => DigestAlgorithm::Sha512,
        }
    }
}

#[derive(ValueEnum, Clone, Copy)]
enum FormatArg {
    Jks,
    Pkcs12,
}

impl From<FormatArg> for KeyStoreFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Jks => KeyStoreFormat::Jks,
            FormatArg::Pkcs12 => KeyStoreFormat::Pkcs12,
        }
    }
}

#[derive(ValueEnum, Clone, Copy)]
enum PolicyArg {
    All,
    Any,
}

impl From<PolicyArg> for VerificationPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::All => VerificationPolicy::AllSigners,
            PolicyArg::Any => VerificationPolicy::AnySigner,
        }
    }
}

#[derive(ValueEnum, Clone, Copy)]
enum ExportFormatArg {
    Toml,
    Json,
}

impl From<ExportFormatArg> for ExportFormat {
    fn from(arg: ExportFormatArg) -> Self {
        match arg {
            ExportFormatArg::Toml => ExportFormat::Toml,
            ExportFormatArg::Json => ExportFormat::Json,
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config_manager = match &cli.config {
        Some(path) => ConfigManager::with_path(path),
        None => ConfigManager::new(),
    };

    match cli.command {
        Commands::Sign {
            input_file,
            output,
            keystore,
            alias,
            digest,
            base64,
        } => {
            let config = config_manager.load_or_default().into_diagnostic()?;
            handle_sign_command(&config, input_file, output, &keystore, alias, digest, base64)?;
        }

        Commands::Verify {
            input_file,
            signature,
            policy,
            verbose,
        } => {
            let config = config_manager.load_or_default().into_diagnostic()?;
            handle_verify_command(&config, &input_file, &signature, policy, verbose)?;
        }

        Commands::Keystore(keystore_cmd) => {
            let config = config_manager.load_or_default().into_diagnostic()?;
            handle_keystore_command(&config, keystore_cmd)?;
        }

        Commands::Config(config_cmd) => {
            handle_config_command(&config_manager, config_cmd)?;
        }
    }

    Ok(())
}

fn handle_sign_command(
    config: &SignerConfiguration,
    input_file: PathBuf,
    output: Option<PathBuf>,
    keystore: &KeystoreArgs,
    alias: Option<String>,
    digest: Option<DigestArg>,
    base64: bool,
) -> Result<()> {
    let (keystore_path, format) = resolve_keystore(config, keystore)?;
    let store_password = config.store_password().into_diagnostic()?;
    let key_password = config.key_password().into_diagnostic()?;
    let alias = alias.or_else(|| config.default_alias.clone());

    let loader = format.map_or_else(KeyMaterialLoader::new, KeyMaterialLoader::with_format);
    let material = loader
        .load_file(&keystore_path, &store_password, alias.as_deref(), &key_password)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to load key from {}", keystore_path.display()))?;

    let digest = match digest {
        Some(digest) => digest.into(),
        None => config.signing_digest().into_diagnostic()?,
    };
    let registry = AlgorithmRegistry::initialize().with_signing_digest(digest);
    let signer = CmsSigner::new(material, &registry).into_diagnostic()?;

    let content = std::fs::read(&input_file)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to read {}", input_file.display()))?;
    let signature = signer.sign(&content).into_diagnostic()?;

    let output = output.unwrap_or_else(|| {
        let mut name = input_file.clone().into_os_string();
        name.push(".p7s");
        PathBuf::from(name)
    });
    if base64 {
        std::fs::write(&output, signature.to_base64()).into_diagnostic()?;
    } else {
        std::fs::write(&output, signature.as_bytes()).into_diagnostic()?;
    }

    if config.log_signatures {
        println!("{}", signature.to_base64());
    }
    println!(
        "✅ Signed {} as '{}' ({}, {})",
        input_file.display(),
        signer.key_material().alias(),
        signer.scheme().name(),
        signer.certificate().subject()
    );
    println!("   Signature written to: {}", output.display());
    Ok(())
}

fn handle_verify_command(
    config: &SignerConfiguration,
    input_file: &Path,
    signature_file: &Path,
    policy: Option<PolicyArg>,
    verbose: bool,
) -> Result<()> {
    let content = std::fs::read(input_file)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to read {}", input_file.display()))?;
    let signature = read_signature(signature_file)?;

    let policy = match policy {
        Some(policy) => policy.into(),
        None => config.verification_policy().into_diagnostic()?,
    };
    let verifier = CmsVerifier::new(AlgorithmRegistry::initialize()).with_policy(policy);

    if verbose {
        if let Ok(certificates) = verifier.signer_certificates(&signature) {
            for cert in &certificates {
                println!("📜 Certificate: {} (serial {})", cert.subject(), cert.serial_hex());
            }
        }
        if let Ok(report) = verifier.verify_report(&content, &signature) {
            for outcome in &report.signers {
                let subject = outcome.subject.as_deref().unwrap_or("<unknown>");
                match &outcome.result {
                    Ok(()) => println!("   signer #{}: valid ({subject})", outcome.index),
                    Err(cause) => {
                        println!("   signer #{}: {cause} ({subject})", outcome.index);
                    }
                }
            }
        }
    }

    verifier.verify(&content, &signature).into_diagnostic()?;
    println!("✅ Signature valid ({policy} policy)");
    Ok(())
}

fn handle_keystore_command(config: &SignerConfiguration, cmd: KeystoreCommands) -> Result<()> {
    match cmd {
        KeystoreCommands::List { keystore } => {
            let (keystore_path, format) = resolve_keystore(config, &keystore)?;
            let store_password = config.store_password().into_diagnostic()?;
            let bytes = std::fs::read(&keystore_path).into_diagnostic()?;

            let loader = format.map_or_else(KeyMaterialLoader::new, KeyMaterialLoader::with_format);
            let aliases = loader
                .list_aliases(&bytes, &store_password)
                .into_diagnostic()?;
            println!("🔑 {} ({} entries)", keystore_path.display(), aliases.len());
            for alias in aliases {
                println!("   {alias}");
            }
        }

        KeystoreCommands::Import {
            source,
            output,
            alias,
        } => {
            let store_password = config.store_password().into_diagnostic()?;
            let key_password = config.key_password().into_diagnostic()?;

            let material = KeyMaterialLoader::with_format(KeyStoreFormat::Pkcs12)
                .load_file(&source, &store_password, None, &store_password)
                .into_diagnostic()
                .wrap_err_with(|| format!("Failed to read {}", source.display()))?;
            let alias = alias.unwrap_or_else(|| material.alias().to_string());

            let mut writer = JksWriter::new();
            writer
                .add_private_key(
                    &alias,
                    material.key_pair().private_key(),
                    material.certificate_chain().certificates(),
                    &key_password,
                )
                .into_diagnostic()?;
            let bytes = writer.encode(&store_password).into_diagnostic()?;
            std::fs::write(&output, bytes).into_diagnostic()?;

            println!("✅ Imported '{alias}' into {}", output.display());
        }
    }

    Ok(())
}

fn handle_config_command(config_manager: &ConfigManager, config_cmd: ConfigCommands) -> Result<()> {
    match config_cmd {
        ConfigCommands::Show => match config_manager.load() {
            Ok(config) => {
                let unset = || "<unset>".to_string();
                println!("📋 Current Configuration:");
                println!(
                    "  Keystore: {}",
                    config
                        .keystore_path
                        .as_ref()
                        .map_or_else(unset, |path| path.display().to_string())
                );
                println!(
                    "  Keystore format: {}",
                    config.keystore_format.clone().unwrap_or_else(|| "auto".to_string())
                );
                println!(
                    "  Default alias: {}",
                    config.default_alias.clone().unwrap_or_else(unset)
                );
                println!("  Store password variable: {}", config.store_password_env);
                println!("  Key password variable: {}", config.key_password_env);
                println!("  Signing digest: {}", config.signing_digest);
                println!("  Verification policy: {}", config.verification_policy);
                println!("  Log signatures: {}", config.log_signatures);
                println!(
                    "  Configuration file: {}",
                    config_manager.config_path().display()
                );
            }
            Err(_) => {
                println!("📋 No configuration file found. Use 'config init' to create one.");
            }
        },

        ConfigCommands::Init => {
            config_manager.load_or_create_default().into_diagnostic()?;
            println!(
                "✅ Configuration initialized: {}",
                config_manager.config_path().display()
            );
        }

        ConfigCommands::Set { key, value } => {
            config_manager
                .update_value(&key, &value)
                .into_diagnostic()?;
            println!("✅ Configuration updated: {key} = {value}");
        }

        ConfigCommands::Export { format, output } => {
            let content = config_manager
                .export_config(format.into())
                .into_diagnostic()?;

            if let Some(output_path) = output {
                std::fs::write(&output_path, content).into_diagnostic()?;
                println!("✅ Configuration exported to: {}", output_path.display());
            } else {
                println!("{content}");
            }
        }
    }

    Ok(())
}

fn resolve_keystore(
    config: &SignerConfiguration,
    args: &KeystoreArgs,
) -> Result<(PathBuf, Option<KeyStoreFormat>)> {
    let path = args
        .keystore
        .clone()
        .or_else(|| config.keystore_path.clone())
        .ok_or_else(|| miette::miette!("No keystore given and none configured"))?;
    let format = match args.format {
        Some(format) => Some(format.into()),
        None => config.keystore_format().into_diagnostic()?,
    };
    Ok((path, format))
}

/// Signature files are accepted as raw DER or as base64 text.
fn read_signature(path: &Path) -> Result<SignatureBlob> {
    let bytes = std::fs::read(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to read {}", path.display()))?;

    if bytes.first() == Some(&0x30) {
        return Ok(SignatureBlob::from_der(bytes));
    }
    let text = String::from_utf8(bytes)
        .into_diagnostic()
        .wrap_err("Signature is neither DER nor base64")?;
    SignatureBlob::from_base64(text.trim())
        .into_diagnostic()
        .wrap_err("Signature is neither DER nor base64")
}

//! IPA inspection commands

use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use console::style;
use serde_json::{json, Value as JsonValue};
use tracing::info;

use tarmac_core::Config;
use tarmac_packages::{Ipa, SystemUnzip};
use tarmac_signing::{Certificate, ProvisioningProfile};

use crate::cli::{output, Cli, OutputFormat};

/// iOS application package commands
#[derive(Debug, Args)]
pub struct IpaCommand {
    #[command(subcommand)]
    pub command: IpaSubcommand,
}

/// IPA subcommands
#[derive(Debug, Subcommand)]
pub enum IpaSubcommand {
    /// Show a summary of the package
    Show(ShowCommand),

    /// Extract the application bundle
    Extract(ExtractCommand),

    /// Show the embedded provisioning profile and certificate
    Profile(ProfileCommand),

    /// Dump the bundle's Info.plist
    Plist(PlistCommand),
}

/// Show a summary of the package
#[derive(Debug, Args)]
pub struct ShowCommand {
    /// Path to the .ipa file
    pub ipa: PathBuf,
}

/// Extract the application bundle
#[derive(Debug, Args)]
pub struct ExtractCommand {
    /// Path to the .ipa file
    pub ipa: PathBuf,

    /// Target directory (defaults to packages.extract_dir, then ./<ipa name>)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Show the embedded provisioning profile and certificate
#[derive(Debug, Args)]
pub struct ProfileCommand {
    /// Path to the .ipa file
    pub ipa: PathBuf,
}

/// Dump the bundle's Info.plist
#[derive(Debug, Args)]
pub struct PlistCommand {
    /// Path to the .ipa file
    pub ipa: PathBuf,

    /// Only print this key
    #[arg(short, long)]
    pub key: Option<String>,
}

impl IpaCommand {
    /// Execute the ipa command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        let config = cli.load_config()?;

        match &self.command {
            IpaSubcommand::Show(cmd) => {
                info!(subcommand = "show", ipa = %cmd.ipa.display(), "executing ipa command");
                self.show(cmd, &config, cli)
            }
            IpaSubcommand::Extract(cmd) => {
                info!(subcommand = "extract", ipa = %cmd.ipa.display(), "executing ipa command");
                self.extract(cmd, &config, cli)
            }
            IpaSubcommand::Profile(cmd) => {
                info!(subcommand = "profile", ipa = %cmd.ipa.display(), "executing ipa command");
                self.profile(cmd, &config, cli)
            }
            IpaSubcommand::Plist(cmd) => {
                info!(subcommand = "plist", ipa = %cmd.ipa.display(), "executing ipa command");
                self.plist(cmd, &config, cli)
            }
        }
    }

    fn show(&self, cmd: &ShowCommand, config: &Config, cli: &Cli) -> anyhow::Result<()> {
        let ipa = open(&cmd.ipa, config)?;
        let summary = ipa.summary()?;
        let tvos = ipa.is_for_tvos();

        match cli.format {
            OutputFormat::Json => {
                let mut value = serde_json::to_value(&summary)?;
                value["is_for_tvos"] = json!(tvos);
                println!("{}", serde_json::to_string_pretty(&value)?);
            }
            OutputFormat::Text => {
                println!("{}", output::header(&format!("{}", ipa.path().display())));
                println!();
                print!("{}", summary);
                if tvos {
                    println!();
                    println!("  {}", style("Built for tvOS").cyan());
                }
            }
        }

        Ok(())
    }

    fn extract(&self, cmd: &ExtractCommand, config: &Config, cli: &Cli) -> anyhow::Result<()> {
        let ipa = open(&cmd.ipa, config)?;
        let target = extract_target(&cmd.ipa, cmd.output.as_deref(), config);
        std::fs::create_dir_all(&target)?;

        let app_dir = ipa.extract_app(&target)?;

        match cli.format {
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&json!({
                        "success": true,
                        "app": app_dir.display().to_string(),
                    }))?
                );
            }
            OutputFormat::Text => {
                if !cli.quiet {
                    output::success(&format!(
                        "Extracted {}",
                        style(app_dir.display()).cyan()
                    ));
                }
            }
        }

        Ok(())
    }

    fn profile(&self, cmd: &ProfileCommand, config: &Config, cli: &Cli) -> anyhow::Result<()> {
        let ipa = open(&cmd.ipa, config)?;
        let profile = ipa.embedded_provisioning_profile()?;
        let certificate = ipa.certificate()?;

        match cli.format {
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&json!({
                        "profile": profile,
                        "certificate": certificate,
                        "archive_method": ipa.archive_method()?,
                    }))?
                );
            }
            OutputFormat::Text => match profile {
                Some(profile) => {
                    print_profile(profile);
                    if let Some(cert) = certificate {
                        println!();
                        print_certificate(cert);
                    }
                }
                None => output::warning("No embedded provisioning profile"),
            },
        }

        Ok(())
    }

    fn plist(&self, cmd: &PlistCommand, config: &Config, cli: &Cli) -> anyhow::Result<()> {
        let ipa = open(&cmd.ipa, config)?;
        let info = ipa.info_plist();

        let value = match &cmd.key {
            Some(key) => {
                let value = info
                    .get(key)
                    .ok_or_else(|| anyhow::anyhow!("Key '{}' not found in Info.plist", key))?;
                plist_to_json(value)
            }
            None => plist_to_json(&plist::Value::Dictionary(info.clone())),
        };

        match cli.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&value)?),
            OutputFormat::Text => match (&cmd.key, &value) {
                (None, JsonValue::Object(entries)) => {
                    let width = entries.keys().map(String::len).max().unwrap_or(0);
                    for (key, entry) in entries {
                        println!("{}", output::key_value(key, &plist_text(entry), width));
                    }
                }
                _ => println!("{}", plist_text(&value)),
            },
        }
        Ok(())
    }
}

fn open(path: &Path, config: &Config) -> anyhow::Result<Ipa> {
    let unzipper = SystemUnzip::new(&config.packages.unzip_program);
    Ok(Ipa::with_unzipper(path, unzipper)?)
}

/// Explicit output, else the configured extract dir, else `./<ipa stem>`
fn extract_target(ipa: &Path, output: Option<&Path>, config: &Config) -> PathBuf {
    if let Some(output) = output {
        return output.to_path_buf();
    }
    if let Some(dir) = &config.packages.extract_dir {
        return dir.clone();
    }
    let stem = ipa
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "extracted".to_string());
    PathBuf::from(stem)
}

fn print_profile(profile: &ProvisioningProfile) {
    let none = || "-".to_string();
    println!("{}", output::header("Provisioning Profile"));
    println!("{}", output::key_value("Name", &profile.name, 12));
    println!("{}", output::key_value("UUID", &profile.uuid, 12));
    println!("{}", output::key_value("Bundle ID", &profile.bundle_id(), 12));
    println!(
        "{}",
        output::key_value(
            "Team",
            &format!("{} ({})", profile.team_name, profile.team_identifier),
            12
        )
    );
    println!(
        "{}",
        output::key_value(
            "Expires",
            &profile
                .expiration_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(none),
            12
        )
    );
    println!(
        "{}",
        output::key_value("Devices", &profile.provisioned_devices.len().to_string(), 12)
    );
    println!(
        "{}",
        output::key_value("Debuggable", &profile.get_task_allow().to_string(), 12)
    );
    if profile.is_expired() {
        output::warning("Profile has expired");
    }
}

fn print_certificate(cert: &Certificate) {
    println!("{}", output::header("Certificate"));
    println!("{}", output::key_value("Name", &cert.common_name, 12));
    println!("{}", output::key_value("Type", &cert.kind.to_string(), 12));
    if let Some(team) = &cert.team_id {
        println!("{}", output::key_value("Team ID", team, 12));
    }
    println!("{}", output::key_value("Fingerprint", &cert.fingerprint, 12));

    let expires = cert.expires_at.format("%Y-%m-%d").to_string();
    let expires = if cert.is_expired() {
        style(format!("{} (expired)", expires)).red().to_string()
    } else if cert.expires_within_days(30) {
        style(format!(
            "{} ({} days left)",
            expires,
            cert.days_until_expiration()
        ))
        .yellow()
        .to_string()
    } else {
        expires
    };
    println!("{}", output::key_value("Expires", &expires, 12));
}

/// Convert a plist value to JSON for display
fn plist_to_json(value: &plist::Value) -> JsonValue {
    match value {
        plist::Value::String(s) => JsonValue::String(s.clone()),
        plist::Value::Boolean(b) => JsonValue::Bool(*b),
        plist::Value::Integer(i) => match i.as_signed() {
            Some(n) => json!(n),
            None => json!(i.as_unsigned()),
        },
        plist::Value::Real(r) => json!(r),
        plist::Value::Date(d) => JsonValue::String(d.to_xml_format()),
        plist::Value::Data(bytes) => JsonValue::String(format!("<{} bytes>", bytes.len())),
        plist::Value::Array(items) => JsonValue::Array(items.iter().map(plist_to_json).collect()),
        plist::Value::Dictionary(dict) => JsonValue::Object(
            dict.iter()
                .map(|(k, v)| (k.clone(), plist_to_json(v)))
                .collect(),
        ),
        plist::Value::Uid(uid) => json!(uid.get()),
        _ => JsonValue::Null,
    }
}

/// Plain-text form of a manifest value: strings unquoted, everything else
/// as compact JSON
fn plist_text(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_plist_to_json() {
        let mut dict = plist::Dictionary::new();
        dict.insert(
            "CFBundleIdentifier".to_string(),
            plist::Value::String("com.example.app".to_string()),
        );
        dict.insert("UIRequiresFullScreen".to_string(), plist::Value::Boolean(true));
        dict.insert("Build".to_string(), plist::Value::Integer(42i64.into()));
        dict.insert("Icon".to_string(), plist::Value::Data(vec![0; 16]));
        dict.insert(
            "CFBundleSupportedPlatforms".to_string(),
            plist::Value::Array(vec![plist::Value::String("iPhoneOS".to_string())]),
        );

        let json = plist_to_json(&plist::Value::Dictionary(dict));
        assert_eq!(json["CFBundleIdentifier"], "com.example.app");
        assert_eq!(json["UIRequiresFullScreen"], true);
        assert_eq!(json["Build"], 42);
        assert_eq!(json["Icon"], "<16 bytes>");
        assert_eq!(json["CFBundleSupportedPlatforms"][0], "iPhoneOS");
    }

    #[test]
    fn test_plist_text() {
        assert_eq!(plist_text(&json!("com.example.app")), "com.example.app");
        assert_eq!(plist_text(&json!(true)), "true");
        assert_eq!(plist_text(&json!(["iPhoneOS", "AppleTVOS"])), r#"["iPhoneOS","AppleTVOS"]"#);
    }

    #[test]
    fn test_extract_target_precedence() {
        let mut config = Config::default();
        let ipa = Path::new("/builds/MyApp.ipa");

        assert_eq!(extract_target(ipa, None, &config), PathBuf::from("MyApp"));

        config.packages.extract_dir = Some(PathBuf::from("build/extracted"));
        assert_eq!(
            extract_target(ipa, None, &config),
            PathBuf::from("build/extracted")
        );
        assert_eq!(
            extract_target(ipa, Some(Path::new("out")), &config),
            PathBuf::from("out")
        );
    }

    #[test]
    fn test_parse_plist_key() {
        let cli = Cli::try_parse_from(["tarmac", "ipa", "plist", "App.ipa", "--key", "CFBundleVersion"])
            .unwrap();
        match cli.command {
            crate::cli::Commands::Ipa(IpaCommand {
                command: IpaSubcommand::Plist(cmd),
            }) => {
                assert_eq!(cmd.ipa, PathBuf::from("App.ipa"));
                assert_eq!(cmd.key.as_deref(), Some("CFBundleVersion"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_open_reports_invalid_package() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("broken.ipa");
        std::fs::write(&path, b"not a zip").unwrap();

        let err = open(&path, &Config::default()).unwrap_err();
        assert_eq!(crate::exit_codes::for_error(&err), crate::exit_codes::INVALID_PACKAGE);
    }
}

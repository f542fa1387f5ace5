// ABOUTME: Command line argument definitions and parsing using Clap
// ABOUTME: Defines the main CLI structure and subcommands for knotenmail

use clap::{Parser, Subcommand};
use serde_json::Value as JsonValue;
use std::path::PathBuf;

use crate::template::Layer;

#[derive(Parser)]
#[command(name = "knotenmail")]
#[command(about = "Render transactional mail templates for the Freifunk node management form")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(short, long, global = true, help = "Path to configuration file")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "Disable colored output")]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render a mail template and print subject and body
    Render {
        #[arg(help = "Template name, e.g. monitoring-offline-1")]
        template: String,

        #[arg(short, long, help = "JSON or YAML file with template data")]
        data: Option<PathBuf>,

        #[arg(
            short = 'V',
            long = "var",
            help = "Override template data (key=value)"
        )]
        vars: Vec<String>,

        #[arg(
            long,
            help = "Monitoring token; adds confirmUrl and disableUrl to the template data"
        )]
        token: Option<String>,

        #[arg(long, help = "Mail id used in diagnostics (defaults to a random UUID)")]
        id: Option<String>,

        #[arg(long, help = "Print the plain-text alternative instead of HTML")]
        text: bool,
    },

    /// Check syntax of every mail template and snippet
    Validate,

    /// List available mail templates and snippets
    List,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Parse variables from key=value format
    pub fn parse_variables(vars: &[String]) -> anyhow::Result<Layer> {
        let mut variables = Layer::new();

        for var in vars {
            if let Some((key, value)) = var.split_once('=') {
                variables.insert(key.to_string(), JsonValue::String(value.to_string()));
            } else {
                return Err(anyhow::anyhow!(
                    "Invalid variable format '{}'. Expected 'key=value'",
                    var
                ));
            }
        }

        Ok(variables)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_variables() {
        let vars = vec![
            "name=Alice".to_string(),
            "hostname=ff-node-1".to_string(),
            "query=a=b".to_string(),
        ];

        let parsed = Args::parse_variables(&vars).unwrap();

        assert_eq!(parsed.get("name"), Some(&JsonValue::from("Alice")));
        assert_eq!(parsed.get("hostname"), Some(&JsonValue::from("ff-node-1")));
        assert_eq!(parsed.get("query"), Some(&JsonValue::from("a=b")));
    }

    #[test]
    fn test_parse_variables_invalid() {
        let vars = vec!["invalid_format".to_string()];
        let result = Args::parse_variables(&vars);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_render_command() {
        let args = Args::try_parse_from([
            "knotenmail",
            "--config",
            "config.json",
            "render",
            "welcome",
            "--var",
            "name=Alice",
            "--token",
            "abc123",
            "--text",
        ])
        .unwrap();

        assert_eq!(args.config, Some(PathBuf::from("config.json")));
        match args.command {
            Commands::Render {
                template,
                vars,
                text,
                id,
                token,
                ..
            } => {
                assert_eq!(template, "welcome");
                assert_eq!(vars, vec!["name=Alice".to_string()]);
                assert!(text);
                assert!(id.is_none());
                assert_eq!(token.as_deref(), Some("abc123"));
            }
            _ => panic!("expected render command"),
        }
    }
}

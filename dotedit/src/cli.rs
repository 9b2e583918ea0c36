use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "dotedit")]
#[command(about = "Terminal editor for your dotfiles")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Copy every document into DIR, one subdirectory per category
    Export {
        dir: PathBuf,
    },
    /// Write the documents found in bundle DIR back to their locations
    Import {
        dir: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_opens_the_editor() {
        let cli = Cli::try_parse_from(["dotedit"]).unwrap();
        assert_eq!(cli.command, None);
    }

    #[test]
    fn export_takes_a_directory() {
        let cli = Cli::try_parse_from(["dotedit", "export", "/tmp/dots"]).unwrap();
        assert_eq!(cli.command, Some(Command::Export { dir: "/tmp/dots".into() }));
    }

    #[test]
    fn import_requires_a_directory() {
        assert!(Cli::try_parse_from(["dotedit", "import"]).is_err());
    }
}

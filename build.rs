#[path = "src/cli.rs"]
mod cli;

use clap::{CommandFactory, ValueEnum};
use clap_complete::{generate_to, Shell};
use cli::Cli;
use std::fs::{create_dir_all, write};
use std::io::Result;
use std::path::Path;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=src/cli.rs");

    generate_completions(Path::new("contrib/completions")).unwrap();
    generate_manpage(Path::new("man/man1")).unwrap();
}

/// Write a completion script for every shell that clap_complete supports
fn generate_completions(out_dir: &Path) -> Result<()> {
    create_dir_all(out_dir)?;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_owned();
    for shell in Shell::value_variants() {
        generate_to(*shell, &mut cmd, &bin_name, out_dir)?;
    }

    Ok(())
}

fn generate_manpage(out_dir: &Path) -> Result<()> {
    create_dir_all(out_dir)?;

    let cmd = Cli::command();
    let mut buffer = Vec::new();
    clap_mangen::Man::new(cmd.clone()).render(&mut buffer)?;
    write(out_dir.join(format!("{}.1", cmd.get_name())), buffer)?;

    Ok(())
}

//! Text processing: escaping, placeholder masking and diffs

pub mod diff;
pub mod escape;
pub mod placeholder;

use anyhow::Result;
use colored::Colorize;

use crate::utils::colorize_edits;

pub fn run_diff(old: &str, new: &str, html: bool) -> Result<()> {
    if html {
        println!("{}", diff::render_diff(old, new));
    } else {
        println!("{}", colorize_edits(&diff::diff(old, new)));
    }
    Ok(())
}

pub fn run_mask(text: &str) -> Result<()> {
    let (masked, subs) = placeholder::extract(text);

    println!("{}", "[Masked]".green());
    println!("  {}", masked);

    if subs.is_empty() {
        println!("{}", "Nothing to protect".yellow());
        return Ok(());
    }

    println!("{}", "[Placeholders]".green());
    for (i, sub) in subs.iter().enumerate() {
        println!(
            "  {} {:?} {}",
            placeholder::marker(i).cyan(),
            sub.class,
            sub.original
        );
    }
    Ok(())
}
